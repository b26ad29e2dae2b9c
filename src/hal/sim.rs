// In-memory board: settable inputs, recorded outputs
//
// Used by the runtime when no real board is attached, and as the
// deterministic fake in tests.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use super::{DriveIo, HalError, PinMode, Result};
use crate::config::{ANALOG_MAX, SCALE_MAX};

/// Number of output writes kept for inspection
const WRITE_HISTORY: usize = 4096;

/// One recorded `write_analog` call (value after clamping)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinWrite {
    pub pin: u8,
    pub value: u16,
}

#[derive(Debug, Default)]
pub struct SimulatedBoard {
    modes: HashMap<u8, PinMode>,
    analog_in: HashMap<u8, u16>,
    digital_in: HashMap<u8, bool>,
    outputs: HashMap<u8, u16>,
    faulty: HashSet<u8>,
    history: VecDeque<PinWrite>,
}

impl SimulatedBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the analog level seen on `pin` (clamped to the ADC range)
    pub fn set_analog(&mut self, pin: u8, value: u16) {
        self.analog_in.insert(pin, value.min(ANALOG_MAX));
    }

    /// Set whether the digital line on `pin` is asserted
    pub fn set_digital(&mut self, pin: u8, asserted: bool) {
        self.digital_in.insert(pin, asserted);
    }

    /// Make every read and write on `pin` fail until cleared
    pub fn set_fault(&mut self, pin: u8, faulty: bool) {
        if faulty {
            self.faulty.insert(pin);
        } else {
            self.faulty.remove(&pin);
        }
    }

    pub fn mode(&self, pin: u8) -> Option<PinMode> {
        self.modes.get(&pin).copied()
    }

    /// Last value written to `pin`, 0 if never written
    pub fn output(&self, pin: u8) -> u16 {
        self.outputs.get(&pin).copied().unwrap_or(0)
    }

    /// Recorded writes, oldest first
    pub fn writes(&self) -> &VecDeque<PinWrite> {
        &self.history
    }

    pub fn clear_writes(&mut self) {
        self.history.clear();
    }

    fn check_mode(&self, pin: u8, expected: &[PinMode]) -> Result<()> {
        match self.modes.get(&pin) {
            None => Err(HalError::Unconfigured { pin }),
            Some(actual) if !expected.contains(actual) => Err(HalError::WrongMode {
                pin,
                expected: expected[0],
                actual: *actual,
            }),
            Some(_) => Ok(()),
        }
    }
}

impl DriveIo for SimulatedBoard {
    fn configure(&mut self, pin: u8, mode: PinMode) -> Result<()> {
        debug!("Sim pin {} -> {:?}", pin, mode);
        self.modes.insert(pin, mode);
        Ok(())
    }

    fn read_analog(&mut self, pin: u8) -> Result<u16> {
        self.check_mode(pin, &[PinMode::Analog])?;
        if self.faulty.contains(&pin) {
            return Err(HalError::ReadFailed {
                pin,
                reason: "injected fault".to_string(),
            });
        }
        Ok(self.analog_in.get(&pin).copied().unwrap_or(0))
    }

    fn read_digital(&mut self, pin: u8) -> Result<bool> {
        self.check_mode(pin, &[PinMode::InputPullUp])?;
        if self.faulty.contains(&pin) {
            return Err(HalError::ReadFailed {
                pin,
                reason: "injected fault".to_string(),
            });
        }
        // Pulled up: released unless something drives it
        Ok(self.digital_in.get(&pin).copied().unwrap_or(false))
    }

    fn write_analog(&mut self, pin: u8, value: u16) -> Result<()> {
        self.check_mode(pin, &[PinMode::Output])?;
        if self.faulty.contains(&pin) {
            return Err(HalError::WriteFailed {
                pin,
                reason: "injected fault".to_string(),
            });
        }
        let value = value.min(SCALE_MAX);
        self.outputs.insert(pin, value);

        if self.history.len() == WRITE_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(PinWrite { pin, value });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_pin_is_an_error() {
        let mut board = SimulatedBoard::new();
        assert_eq!(board.read_analog(14), Err(HalError::Unconfigured { pin: 14 }));
        assert_eq!(board.write_analog(5, 10), Err(HalError::Unconfigured { pin: 5 }));
    }

    #[test]
    fn test_wrong_mode_is_an_error() {
        let mut board = SimulatedBoard::new();
        board.configure(3, PinMode::InputPullUp).unwrap();
        let err = board.write_analog(3, 100).unwrap_err();
        assert!(matches!(err, HalError::WrongMode { pin: 3, .. }));
    }

    #[test]
    fn test_write_clamps_to_scale_max() {
        let mut board = SimulatedBoard::new();
        board.configure(5, PinMode::Output).unwrap();
        board.write_analog(5, 4000).unwrap();
        assert_eq!(board.output(5), SCALE_MAX);
        assert_eq!(board.writes().back(), Some(&PinWrite { pin: 5, value: 255 }));
    }

    #[test]
    fn test_inputs_and_faults() {
        let mut board = SimulatedBoard::new();
        board.configure(14, PinMode::Analog).unwrap();
        board.configure(4, PinMode::InputPullUp).unwrap();

        // Released and zero by default
        assert_eq!(board.read_analog(14), Ok(0));
        assert_eq!(board.read_digital(4), Ok(false));

        board.set_analog(14, 5000);
        board.set_digital(4, true);
        assert_eq!(board.read_analog(14), Ok(ANALOG_MAX));
        assert_eq!(board.read_digital(4), Ok(true));

        board.set_fault(14, true);
        assert!(matches!(board.read_analog(14), Err(HalError::ReadFailed { .. })));
        board.set_fault(14, false);
        assert_eq!(board.read_analog(14), Ok(ANALOG_MAX));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut board = SimulatedBoard::new();
        board.configure(5, PinMode::Output).unwrap();
        for i in 0..(WRITE_HISTORY + 10) {
            board.write_analog(5, (i % 256) as u16).unwrap();
        }
        assert_eq!(board.writes().len(), WRITE_HISTORY);
        board.clear_writes();
        assert!(board.writes().is_empty());
    }
}
