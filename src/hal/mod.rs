// Hardware capability interface consumed by the drive controller
//
// Provides:
// - DriveIo: analog/digital read, analog (PWM) write, pin setup
// - PinMap: which pin does what
// - SimulatedBoard: in-memory board used by the runtime and by tests

pub mod sim;

use crate::config::{PIN_FAST_SW, PIN_LPWM, PIN_REV_SW, PIN_RPWM, PIN_THROTTLE};

pub use sim::{PinWrite, SimulatedBoard};

/// Pin direction / pull configuration applied once during setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// PWM output
    Output,
    /// Digital input with pull-up; the line is asserted when pulled to GND
    InputPullUp,
    /// Analog input
    Analog,
}

/// Error types for the I/O collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HalError {
    #[error("Pin {pin} has not been configured")]
    Unconfigured { pin: u8 },

    #[error("Pin {pin} is configured as {actual:?}, expected {expected:?}")]
    WrongMode {
        pin: u8,
        expected: PinMode,
        actual: PinMode,
    },

    #[error("Read on pin {pin} failed: {reason}")]
    ReadFailed { pin: u8, reason: String },

    #[error("Write on pin {pin} failed: {reason}")]
    WriteFailed { pin: u8, reason: String },
}

pub type Result<T> = std::result::Result<T, HalError>;

/// Platform primitives the controller needs.
///
/// `read_digital` reports whether the line is at its asserted level, so
/// callers never deal with active-low wiring. `write_analog` takes a value in
/// `0..=SCALE_MAX`; implementations clamp anything above.
pub trait DriveIo {
    fn configure(&mut self, pin: u8, mode: PinMode) -> Result<()>;
    fn read_analog(&mut self, pin: u8) -> Result<u16>;
    fn read_digital(&mut self, pin: u8) -> Result<bool>;
    fn write_analog(&mut self, pin: u8, value: u16) -> Result<()>;
}

/// Pin assignment for one H-bridge pair and its operator inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMap {
    pub rpwm: u8,     // forward PWM
    pub lpwm: u8,     // reverse PWM
    pub fast_sw: u8,  // FAST switch position
    pub rev_sw: u8,   // REVERSE switch position
    pub throttle: u8, // pedal
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            rpwm: PIN_RPWM,
            lpwm: PIN_LPWM,
            fast_sw: PIN_FAST_SW,
            rev_sw: PIN_REV_SW,
            throttle: PIN_THROTTLE,
        }
    }
}

impl PinMap {
    /// Configure every pin and park both PWM outputs at zero
    pub fn begin<B: DriveIo>(&self, io: &mut B) -> Result<()> {
        io.configure(self.rpwm, PinMode::Output)?;
        io.configure(self.lpwm, PinMode::Output)?;
        io.configure(self.fast_sw, PinMode::InputPullUp)?;
        io.configure(self.rev_sw, PinMode::InputPullUp)?;
        io.configure(self.throttle, PinMode::Analog)?;

        // Keep motors off until the first cycle
        io.write_analog(self.rpwm, 0)?;
        io.write_analog(self.lpwm, 0)
    }
}
