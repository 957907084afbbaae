//! Desktop server with a mock device bus.
//!
//! Serves the same UI and control channel as the rover, but every register
//! write and pin change lands in a [`MockBus`]. Useful for working on the
//! web UI away from the hardware; run with `RUST_LOG=debug` to watch the
//! commands go by.
//!
//! Run with:
//!   cargo run --bin desktop_server --features web

use std::sync::Arc;

use env_logger::Env;
use rs_rover::{
    hal::MockBus,
    services::{run_server_with_state, SharedRobotState, WebServerConfig},
    Config, RobotController,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match std::env::var("ROVER_CONFIG") {
        Ok(path) => Config::from_json_file(&path)?,
        Err(_) => Config::default(),
    }
    .apply_env();

    let mut controller = RobotController::with_config(MockBus::new().with_identity(0x01), &config);
    controller
        .initialize()
        .map_err(|e| anyhow::anyhow!("mock bus did not initialize: {}", e))?;

    let state = Arc::new(SharedRobotState::new(controller));
    run_server_with_state(Arc::clone(&state), WebServerConfig::from_config(&config.web)).await?;

    let frames = state.with_controller(|controller| controller.bus().writes.len());
    log::info!("mock bus received {} frames", frames);
    Ok(())
}
