//! Raspberry Pi rover server.
//!
//! Opens the PCA9685 on the configured I2C bus and the four H-bridge
//! direction lines on the GPIO character device, then serves the control
//! channel until Ctrl-C.
//!
//! Run with:
//!   cargo run --bin rover --features web,rpi
//!
//! Configuration:
//!   `ROVER_CONFIG=/etc/rover.json` loads a JSON config file, then the
//!   `ROVER_*` overrides apply. `RUST_LOG` sets the log level (default `info`).

use std::sync::Arc;

use anyhow::Context;
use env_logger::Env;
use gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::{CdevPin, I2cdev};
use rs_rover::{
    hal::EmbeddedHalBus,
    services::{run_server_with_state, SharedRobotState, WebServerConfig},
    Config, PinConfig, RobotController,
};

const CONSUMER: &str = "rs-rover";

fn load_config() -> anyhow::Result<Config> {
    let config = match std::env::var("ROVER_CONFIG") {
        Ok(path) => Config::from_json_file(&path)?,
        Err(_) => Config::default(),
    };
    Ok(config.apply_env())
}

fn open_pins(pins: &PinConfig) -> anyhow::Result<[CdevPin; 4]> {
    let mut chip = Chip::new(pins.gpio_chip.as_str())
        .with_context(|| format!("cannot open GPIO chip {}", pins.gpio_chip))?;

    let mut open = |line: u32| -> anyhow::Result<CdevPin> {
        let handle = chip
            .get_line(line)
            .and_then(|l| l.request(LineRequestFlags::OUTPUT, 0, CONSUMER))
            .with_context(|| format!("cannot request GPIO line {}", line))?;
        CdevPin::new(handle).with_context(|| format!("cannot drive GPIO line {}", line))
    };

    let [lf, lr, rf, rr] = pins.lines();
    Ok([open(lf)?, open(lr)?, open(rf)?, open(rr)?])
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = load_config()?;

    log::info!(
        "opening PWM driver at {:#04x} on {}",
        config.pwm.address,
        config.pwm.i2c_bus
    );
    let i2c = I2cdev::new(config.pwm.i2c_bus.as_str())
        .with_context(|| format!("cannot open I2C bus {}", config.pwm.i2c_bus))?;
    let pins = open_pins(&config.pins)?;

    let bus = EmbeddedHalBus::new(i2c, config.pwm.address, pins)
        .map_err(|e| anyhow::anyhow!("cannot reset direction pins: {:?}", e))?;

    let mut controller = RobotController::with_config(bus, &config);
    controller
        .initialize()
        .map_err(|e| anyhow::anyhow!("PWM driver did not initialize: {}", e))?;

    let state = Arc::new(SharedRobotState::new(controller));
    run_server_with_state(state, WebServerConfig::from_config(&config.web)).await?;

    log::info!("shutdown complete");
    Ok(())
}
