// Loop timing, topics, pin defaults and the tunable drive configuration
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// Runtime loop frequency
pub const LOOP_HZ: u64 = 100;

// Diagnostic heartbeat (throttle, limit %, PWM)
pub const TELEMETRY_PERIOD: Duration = Duration::from_millis(500);

// Simulated pedal watchdog: throttle drops to zero if the input source goes quiet
pub const INPUT_TIMEOUT: Duration = Duration::from_millis(250);

// Zenoh topics
pub const TOPIC_CMD_TUNE: &str = "fourwd/cmd/tune"; // tuning commands
pub const TOPIC_SIM_INPUT: &str = "fourwd/sim/input"; // simulated pedal + switch
pub const TOPIC_TELEMETRY: &str = "fourwd/state/telemetry"; // diagnostic dump
pub const TOPIC_HEALTH: &str = "fourwd/state/health"; // health status

// Output scale: 8-bit PWM duty
pub const SCALE_MAX: u16 = 255;

// 10-bit ADC
pub const ANALOG_MAX: u16 = 1023;

// Default wiring (BTS7960 pair, 3-position toggle to GND, 0-5 V pedal)
pub const PIN_RPWM: u8 = 5; // forward PWM
pub const PIN_LPWM: u8 = 6; // reverse PWM
pub const PIN_FAST_SW: u8 = 3;
pub const PIN_REV_SW: u8 = 4;
pub const PIN_THROTTLE: u8 = 14; // A0

/// Every runtime-tunable drive parameter.
///
/// The controller reads one snapshot of this per cycle (see
/// [`crate::drive::TuningHandle`]). No field is validated on assignment; the
/// target resolver reports degenerate values instead of acting on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// ADC counts treated as zero
    pub deadband: u16,
    /// Throttle reading mapped to zero intensity
    pub input_min: u16,
    /// Throttle reading mapped to the full mode cap
    pub input_max: u16,
    /// % ceiling with the switch in the centre (slow) position
    pub slow_pct: u8,
    /// % ceiling in fast
    pub fast_pct: u8,
    /// % ceiling in reverse
    pub reverse_pct: u8,
    /// Intensity counts added per cycle while speeding up
    pub accel_step: u16,
    /// Intensity counts removed per cycle while slowing down
    pub decel_step: u16,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            deadband: 30,
            input_min: 0,
            input_max: ANALOG_MAX,
            slow_pct: 50,
            fast_pct: 100,
            reverse_pct: 30,
            accel_step: 3,
            decel_step: 3,
        }
    }
}

/// Errors loading a drive configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid drive config in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DriveConfig {
    /// Load a JSON config file. Fields left out keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigFileError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Set the same step for speeding up and slowing down
    pub fn set_ramp_step(&mut self, step: u16) {
        self.accel_step = step;
        self.decel_step = step;
    }
}
