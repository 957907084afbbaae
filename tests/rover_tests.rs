//! End-to-end tests: control-channel text in, device frames and pins out.

use rs_rover::codec::decode;
use rs_rover::{
    hal::MockBus, Config, Direction, Dispatch, DrivePin, PinLevel, PwmConfig, RobotController,
};

use PinLevel::{High, Low};

fn controller() -> RobotController<MockBus> {
    let mut controller = RobotController::new(MockBus::new());
    controller.initialize().unwrap();
    controller.bus_mut().clear_writes();
    controller
}

/// (register, value) of every frame written so far.
fn frames(controller: &RobotController<MockBus>) -> Vec<(u8, u16)> {
    controller
        .bus()
        .writes
        .iter()
        .map(|w| {
            let write = decode(w).unwrap();
            (write.address, write.value)
        })
        .collect()
}

fn pins(controller: &RobotController<MockBus>) -> [PinLevel; 4] {
    controller.bus().pins
}

// ============================================================================
// Startup
// ============================================================================

#[test]
fn startup_sequence() {
    let mut controller = RobotController::new(MockBus::new().with_identity(0x01));
    assert_eq!(controller.initialize(), Ok(0x01));

    let bus = controller.bus();
    assert_eq!(bus.reads, vec![0x00]);
    assert_eq!(
        bus.writes,
        vec![
            vec![0x06, 0x00, 0x00, 0x77, 0x01], // pan 375
            vec![0x0a, 0x00, 0x00, 0x2c, 0x01], // tilt 300
        ]
    );
    assert_eq!(bus.pins, [Low; 4]);
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn pan_session() {
    let mut controller = controller();

    controller.handle_message("cameraPan,5.0");
    controller.handle_message("cameraPan,-2.5");
    controller.handle_message("cameraPan,100");

    assert_eq!(frames(&controller), vec![(0x06, 325), (0x06, 350), (0x06, 150)]);
    assert_eq!(controller.state().pan, 150);
}

#[test]
fn tilt_session() {
    let mut controller = controller();

    controller.handle_message("cameraTilt,1");
    controller.handle_message("cameraTilt,-100");

    assert_eq!(frames(&controller), vec![(0x0a, 310), (0x0a, 150)]);
    assert_eq!(controller.state().tilt, 150);
}

#[test]
fn camera_and_drive_are_independent() {
    let mut controller = controller();

    controller.handle_message("move,0,-1");
    controller.handle_message("cameraTilt,3");

    let state = controller.state();
    assert_eq!(state.tilt, 330);
    assert_eq!(state.pan, 375);
    assert_eq!(state.drive.left.direction, Direction::Forward);
    // Camera writes never touch the pins
    assert_eq!(pins(&controller), [High, Low, High, Low]);
}

// ============================================================================
// Drive
// ============================================================================

#[test]
fn full_forward() {
    let mut controller = controller();
    controller.handle_message("move,0,-1");

    assert_eq!(frames(&controller), vec![(0x42, 4095), (0x3e, 4095)]);
    assert_eq!(pins(&controller), [High, Low, High, Low]);
}

#[test]
fn full_reverse() {
    let mut controller = controller();
    controller.handle_message("move,0,1");

    assert_eq!(frames(&controller), vec![(0x42, 4095), (0x3e, 4095)]);
    assert_eq!(pins(&controller), [Low, High, Low, High]);
}

#[test]
fn gentle_right_turn_slows_right_side() {
    let mut controller = controller();
    controller.handle_message("move,0.375,-1");

    // Left and right magnitudes are written independently
    assert_eq!(frames(&controller), vec![(0x42, 4095), (0x3e, 1023)]);
    assert_eq!(pins(&controller), [High, Low, High, Low]);
}

#[test]
fn hard_left_while_forward_pivots() {
    let mut controller = controller();
    let dispatch = controller.handle_message("move,-1,-1");

    let Dispatch::Moved(out) = dispatch else {
        panic!("expected Moved, got {:?}", dispatch);
    };
    assert_eq!(out.left.direction, Direction::Reverse);
    assert_eq!(out.right.direction, Direction::Forward);
    assert_eq!(pins(&controller), [Low, High, High, Low]);
}

#[test]
fn centered_joystick_parks() {
    let mut controller = controller();
    controller.handle_message("move,0,-1");
    controller.bus_mut().clear_writes();

    controller.handle_message("move,0,0");

    assert_eq!(frames(&controller), vec![(0x42, 0), (0x3e, 0)]);
    assert_eq!(pins(&controller), [Low; 4]);
}

#[test]
fn stop_after_drive() {
    let mut controller = controller();
    controller.handle_message("move,0.2,0.9");
    controller.stop().unwrap();

    assert_eq!(controller.bus().level(DrivePin::LeftReverse), Low);
    assert_eq!(controller.bus().level(DrivePin::RightReverse), Low);
    assert_eq!(&frames(&controller)[2..], &[(0x42, 0), (0x3e, 0)]);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn custom_register_map() {
    let config = Config::default().with_pwm(
        PwmConfig::default()
            .with_camera_registers(0x10, 0x14)
            .with_motor_registers(0x20, 0x24),
    );
    let mut controller = RobotController::with_config(MockBus::new(), &config);
    controller.initialize().unwrap();
    controller.handle_message("move,0,-1");

    let written: Vec<u8> = frames(&controller).iter().map(|(reg, _)| *reg).collect();
    assert_eq!(written, vec![0x10, 0x14, 0x20, 0x24]);
}

#[cfg(feature = "json")]
#[test]
fn json_config_drives_controller() {
    let config = Config::from_json_str(
        r#"{ "camera": { "initial_pan": 200, "initial_tilt": 400, "step": 5.0 } }"#,
    )
    .unwrap();
    let mut controller = RobotController::with_config(MockBus::new(), &config);
    controller.initialize().unwrap();

    assert_eq!(
        controller.handle_message("cameraPan,2"),
        Dispatch::Panned { from: 200, to: 190 }
    );
}
