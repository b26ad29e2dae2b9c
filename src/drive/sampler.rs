// Raw input capture: pedal ADC and the two switch lines
//
// Values are passed through untouched. A failed read is replaced with a
// fallback (0 / released) so the cycle always has something to work with.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::hal::{DriveIo, PinMap};

/// Inputs captured at the start of a cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub raw: u16,
    pub fast: bool,
    pub reverse: bool,
}

#[derive(Debug, Default)]
pub struct InputSampler {
    last: Sample,
    read_fault: bool,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent sample, for telemetry
    pub fn last(&self) -> Sample {
        self.last
    }

    pub fn sample<B: DriveIo>(&mut self, io: &mut B, pins: &PinMap) -> Sample {
        let mut failed = false;

        let raw = io.read_analog(pins.throttle).unwrap_or_else(|e| {
            self.report(&e);
            failed = true;
            0
        });
        let reverse = io.read_digital(pins.rev_sw).unwrap_or_else(|e| {
            self.report(&e);
            failed = true;
            false
        });
        let fast = io.read_digital(pins.fast_sw).unwrap_or_else(|e| {
            self.report(&e);
            failed = true;
            false
        });

        if self.read_fault && !failed {
            info!("Input reads recovered");
        }
        self.read_fault = failed;

        self.last = Sample { raw, fast, reverse };
        self.last
    }

    // Only the first failure of a run is logged
    fn report(&self, err: &crate::hal::HalError) {
        if !self.read_fault {
            warn!("Input read failed, using fallback: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::SimulatedBoard;

    fn setup() -> (PinMap, SimulatedBoard) {
        let pins = PinMap::default();
        let mut board = SimulatedBoard::new();
        pins.begin(&mut board).unwrap();
        (pins, board)
    }

    #[test]
    fn test_passes_values_through() {
        let (pins, mut board) = setup();
        board.set_analog(pins.throttle, 17);
        board.set_digital(pins.fast_sw, true);

        let mut sampler = InputSampler::new();
        let sample = sampler.sample(&mut board, &pins);
        // Below any sensible deadband, but the sampler does not care
        assert_eq!(
            sample,
            Sample {
                raw: 17,
                fast: true,
                reverse: false
            }
        );
        assert_eq!(sampler.last(), sample);
    }

    #[test]
    fn test_failed_reads_fall_back() {
        let (pins, mut board) = setup();
        board.set_analog(pins.throttle, 900);
        board.set_digital(pins.rev_sw, true);
        board.set_fault(pins.throttle, true);
        board.set_fault(pins.rev_sw, true);

        let mut sampler = InputSampler::new();
        let sample = sampler.sample(&mut board, &pins);
        assert_eq!(sample.raw, 0);
        assert!(!sample.reverse);

        board.set_fault(pins.throttle, false);
        board.set_fault(pins.rev_sw, false);
        let sample = sampler.sample(&mut board, &pins);
        assert_eq!(sample.raw, 900);
        assert!(sample.reverse);
    }
}
