// H-bridge direction output
//
// | reverse | RPWM      | LPWM      |
// |---------|-----------|-----------|
// | false   | intensity | 0         |
// | true    | 0         | intensity |
//
// The idle channel is always written first, so even between the two writes
// the bridge never sees drive on both inputs.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hal::{DriveIo, PinMap, Result};

/// Values last asserted on the two direction channels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outputs {
    pub forward: u16,
    pub reverse: u16,
}

#[derive(Debug, Clone, Copy)]
pub struct OutputDriver {
    rpwm: u8,
    lpwm: u8,
    last: Outputs,
}

impl OutputDriver {
    pub fn new(pins: &PinMap) -> Self {
        Self {
            rpwm: pins.rpwm,
            lpwm: pins.lpwm,
            last: Outputs::default(),
        }
    }

    pub fn last(&self) -> Outputs {
        self.last
    }

    /// Drive `intensity` on one channel, zero on the other
    pub fn drive<B: DriveIo>(&mut self, io: &mut B, intensity: u16, reverse: bool) -> Result<Outputs> {
        let (active, idle) = if reverse {
            (self.lpwm, self.rpwm)
        } else {
            (self.rpwm, self.lpwm)
        };

        // Zero the idle side before energising the active one
        io.write_analog(idle, 0)?;
        if reverse {
            self.last.forward = 0;
        } else {
            self.last.reverse = 0;
        }

        io.write_analog(active, intensity)?;
        self.last = if reverse {
            Outputs {
                forward: 0,
                reverse: intensity,
            }
        } else {
            Outputs {
                forward: intensity,
                reverse: 0,
            }
        };
        Ok(self.last)
    }

    /// Both channels to zero (coast)
    pub fn stop<B: DriveIo>(&mut self, io: &mut B) -> Result<()> {
        debug!("Output stop: RPWM={} LPWM={} -> 0", self.last.forward, self.last.reverse);
        io.write_analog(self.rpwm, 0)?;
        self.last.forward = 0;
        io.write_analog(self.lpwm, 0)?;
        self.last.reverse = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{HalError, PinWrite, SimulatedBoard};

    fn setup() -> (PinMap, SimulatedBoard, OutputDriver) {
        let pins = PinMap::default();
        let mut board = SimulatedBoard::new();
        pins.begin(&mut board).unwrap();
        board.clear_writes();
        let driver = OutputDriver::new(&pins);
        (pins, board, driver)
    }

    #[test]
    fn test_forward_and_reverse_channels() {
        let (pins, mut board, mut driver) = setup();

        let out = driver.drive(&mut board, 120, false).unwrap();
        assert_eq!(out, Outputs { forward: 120, reverse: 0 });
        assert_eq!(board.output(pins.rpwm), 120);
        assert_eq!(board.output(pins.lpwm), 0);

        let out = driver.drive(&mut board, 40, true).unwrap();
        assert_eq!(out, Outputs { forward: 0, reverse: 40 });
        assert_eq!(board.output(pins.rpwm), 0);
        assert_eq!(board.output(pins.lpwm), 40);
    }

    #[test]
    fn test_idle_channel_written_first() {
        let (pins, mut board, mut driver) = setup();
        driver.drive(&mut board, 200, false).unwrap();
        board.clear_writes();

        // Direction flip: RPWM must be zeroed before LPWM is raised
        driver.drive(&mut board, 50, true).unwrap();
        let writes: Vec<_> = board.writes().iter().copied().collect();
        assert_eq!(
            writes,
            vec![
                PinWrite { pin: pins.rpwm, value: 0 },
                PinWrite { pin: pins.lpwm, value: 50 },
            ]
        );
    }

    #[test]
    fn test_stop_zeroes_both() {
        let (pins, mut board, mut driver) = setup();
        driver.drive(&mut board, 90, true).unwrap();
        driver.stop(&mut board).unwrap();
        assert_eq!(board.output(pins.rpwm), 0);
        assert_eq!(board.output(pins.lpwm), 0);
        assert_eq!(driver.last(), Outputs::default());
    }

    #[test]
    fn test_write_failure_propagates() {
        let (pins, mut board, mut driver) = setup();
        board.set_fault(pins.rpwm, true);
        let err = driver.drive(&mut board, 10, false).unwrap_err();
        assert!(matches!(err, HalError::WriteFailed { .. }));
        // Idle side was still zeroed
        assert_eq!(board.output(pins.lpwm), 0);
    }
}
