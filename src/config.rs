//! Shared configuration for the rover gateway.
//!
//! Uses `heapless::String` for device paths so the core stays `no_std`
//! compatible while remaining ergonomic to use on desktop with `std`.
//! Defaults match the reference wiring: PCA9685 at 0x40 on `/dev/i2c-1`,
//! direction pins on BCM 24/23/17/22, web server on port 3000.
//!
//! # Example
//!
//! ```rust
//! use rs_rover::config::{Config, PinConfig, WebConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.pwm.address, 0x40);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_web(WebConfig::default().with_port(8080))
//!     .with_pins(PinConfig::default().with_gpio_chip("/dev/gpiochip4"));
//! ```

use heapless::String as HString;

use crate::command::KindMatch;

/// Maximum length for short config strings (device paths)
pub const MAX_SHORT_STRING: usize = 64;

/// Maximum length for longer config strings (directories)
pub const MAX_LONG_STRING: usize = 128;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Type alias for longer config strings
pub type LongString = HString<MAX_LONG_STRING>;

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

fn truncated<const N: usize>(s: &str) -> HString<N> {
    let mut hs = HString::new();
    // Find the last char boundary that still fits
    let valid_end = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|end| *end <= N)
        .last()
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    truncated(s)
}

/// Create a LongString from a &str, truncating if too long
pub fn long_string(s: &str) -> LongString {
    truncated(s)
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Web server configuration
    pub web: WebConfig,
    /// I2C PWM driver configuration
    pub pwm: PwmConfig,
    /// Motor direction pin configuration
    pub pins: PinConfig,
    /// Pan/tilt servo configuration
    pub camera: CameraConfig,
    /// Skid-steer mapping configuration
    pub drive: DriveConfig,
    /// Control channel protocol options
    pub protocol: ProtocolConfig,
}

impl Config {
    /// Set web configuration
    pub fn with_web(mut self, web: WebConfig) -> Self {
        self.web = web;
        self
    }

    /// Set PWM driver configuration
    pub fn with_pwm(mut self, pwm: PwmConfig) -> Self {
        self.pwm = pwm;
        self
    }

    /// Set direction pin configuration
    pub fn with_pins(mut self, pins: PinConfig) -> Self {
        self.pins = pins;
        self
    }

    /// Set camera configuration
    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    /// Set drive configuration
    pub fn with_drive(mut self, drive: DriveConfig) -> Self {
        self.drive = drive;
        self
    }

    /// Set protocol configuration
    pub fn with_protocol(mut self, protocol: ProtocolConfig) -> Self {
        self.protocol = protocol;
        self
    }
}

#[cfg(feature = "std")]
impl Config {
    /// Apply `ROVER_*` environment overrides.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `ROVER_PORT` | `web.port` |
    /// | `ROVER_STATIC_DIR` | `web.static_dir` |
    /// | `ROVER_I2C_BUS` | `pwm.i2c_bus` |
    /// | `ROVER_GPIO_CHIP` | `pins.gpio_chip` |
    /// | `ROVER_PREFIX_MATCH` | `protocol.prefix_match` (`1`/`true`) |
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (used by [`Config::apply_env`]).
    pub fn apply_vars<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<std::string::String>,
    {
        if let Some(port) = lookup("ROVER_PORT") {
            match port.trim().parse() {
                Ok(port) => self.web.port = port,
                Err(_) => log::warn!("ignoring invalid ROVER_PORT {:?}", port),
            }
        }
        if let Some(dir) = lookup("ROVER_STATIC_DIR") {
            self.web.static_dir = long_string(&dir);
        }
        if let Some(bus) = lookup("ROVER_I2C_BUS") {
            self.pwm.i2c_bus = short_string(&bus);
        }
        if let Some(chip) = lookup("ROVER_GPIO_CHIP") {
            self.pins.gpio_chip = short_string(&chip);
        }
        if let Some(flag) = lookup("ROVER_PREFIX_MATCH") {
            self.protocol.prefix_match = matches!(flag.trim(), "1" | "true" | "yes");
        }
        self
    }
}

#[cfg(feature = "json")]
impl Config {
    /// Load a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read config {}: {}", path.display(), e))?;
        Self::from_json_str(&text)
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).map_err(|e| anyhow::anyhow!("invalid config: {}", e))
    }
}

// ============================================================================
// Web Config
// ============================================================================

/// Web server configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WebConfig {
    /// Port to listen on
    pub port: u16,
    /// Directory served under `/static`
    pub static_dir: LongString,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            static_dir: long_string("./static"),
            cors_permissive: false,
        }
    }
}

impl WebConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the static asset directory
    pub fn with_static_dir(mut self, dir: &str) -> Self {
        self.static_dir = long_string(dir);
        self
    }

    /// Set CORS mode
    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }
}

// ============================================================================
// PWM Config
// ============================================================================

/// I2C PWM driver configuration (PCA9685 register map)
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PwmConfig {
    /// I2C bus device path
    pub i2c_bus: ShortString,
    /// 7-bit device address
    pub address: u8,
    /// Register read at startup to confirm the device responds
    pub identity_register: u8,
    /// Pan servo channel register
    pub pan_register: u8,
    /// Tilt servo channel register
    pub tilt_register: u8,
    /// Left motor channel register
    pub left_register: u8,
    /// Right motor channel register
    pub right_register: u8,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            i2c_bus: short_string("/dev/i2c-1"),
            address: 0x40,
            identity_register: 0x00,
            pan_register: 0x06,
            tilt_register: 0x0a,
            left_register: 0x42,
            right_register: 0x3e,
        }
    }
}

impl PwmConfig {
    /// Set the I2C bus path
    pub fn with_i2c_bus(mut self, path: &str) -> Self {
        self.i2c_bus = short_string(path);
        self
    }

    /// Set the device address
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Set the camera servo registers
    pub fn with_camera_registers(mut self, pan: u8, tilt: u8) -> Self {
        self.pan_register = pan;
        self.tilt_register = tilt;
        self
    }

    /// Set the motor channel registers
    pub fn with_motor_registers(mut self, left: u8, right: u8) -> Self {
        self.left_register = left;
        self.right_register = right;
        self
    }
}

// ============================================================================
// Pin Config
// ============================================================================

/// Motor direction pins (GPIO line offsets)
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PinConfig {
    /// GPIO character device
    pub gpio_chip: ShortString,
    /// Left forward line
    pub left_forward: u32,
    /// Left reverse line
    pub left_reverse: u32,
    /// Right forward line
    pub right_forward: u32,
    /// Right reverse line
    pub right_reverse: u32,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            gpio_chip: short_string("/dev/gpiochip0"),
            left_forward: 24,
            left_reverse: 23,
            right_forward: 17,
            right_reverse: 22,
        }
    }
}

impl PinConfig {
    /// Set the GPIO chip path
    pub fn with_gpio_chip(mut self, path: &str) -> Self {
        self.gpio_chip = short_string(path);
        self
    }

    /// Set the left side lines
    pub fn with_left(mut self, forward: u32, reverse: u32) -> Self {
        self.left_forward = forward;
        self.left_reverse = reverse;
        self
    }

    /// Set the right side lines
    pub fn with_right(mut self, forward: u32, reverse: u32) -> Self {
        self.right_forward = forward;
        self.right_reverse = reverse;
        self
    }

    /// Line offsets in [`DrivePin::ALL`](crate::traits::DrivePin::ALL) order
    pub fn lines(&self) -> [u32; 4] {
        [
            self.left_forward,
            self.left_reverse,
            self.right_forward,
            self.right_reverse,
        ]
    }
}

// ============================================================================
// Camera Config
// ============================================================================

/// Pan/tilt servo configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CameraConfig {
    /// Pan set-point written at startup
    pub initial_pan: u16,
    /// Tilt set-point written at startup
    pub initial_tilt: u16,
    /// Lowest allowed set-point
    pub min: u16,
    /// Highest allowed set-point
    pub max: u16,
    /// Set-point change per unit of command input
    pub step: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial_pan: 375,
            initial_tilt: 300,
            min: 150,
            max: 600,
            step: 10.0,
        }
    }
}

impl CameraConfig {
    /// Set the startup set-points
    pub fn with_initial(mut self, pan: u16, tilt: u16) -> Self {
        self.initial_pan = pan;
        self.initial_tilt = tilt;
        self
    }

    /// Set the travel range
    pub fn with_range(mut self, min: u16, max: u16) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Set the step scale
    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }
}

// ============================================================================
// Drive Config
// ============================================================================

/// Skid-steer mapping configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DriveConfig {
    /// Stick deflection (|x|) beyond which turn bias applies
    pub turn_threshold: f32,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            turn_threshold: 0.3,
        }
    }
}

impl DriveConfig {
    /// Set the turn dead-zone, clamped to 0.0-1.0
    pub fn with_turn_threshold(mut self, threshold: f32) -> Self {
        self.turn_threshold = threshold.clamp(0.0, 1.0);
        self
    }
}

// ============================================================================
// Protocol Config
// ============================================================================

/// Control channel protocol options
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProtocolConfig {
    /// Accept command names by prefix (`cameraPanXYZ` as `cameraPan`)
    pub prefix_match: bool,
}

impl ProtocolConfig {
    /// Enable or disable prefix matching
    pub fn with_prefix_match(mut self, enabled: bool) -> Self {
        self.prefix_match = enabled;
        self
    }

    /// Matching rule for command names
    pub fn kind_match(&self) -> KindMatch {
        if self.prefix_match {
            KindMatch::Prefix
        } else {
            KindMatch::Exact
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
