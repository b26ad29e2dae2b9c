// Drive control for a dual-direction H-bridge pair
//
// Provides:
// - Input sampling (pedal ADC, mode switch lines)
// - Target resolution (deadband, range remap, per-mode speed cap)
// - Asymmetric ramp limiting
// - Single-direction output
// - A controller running the four stages once per cycle

mod controller;
pub mod output;
pub mod ramp;
pub mod resolver;
pub mod sampler;
pub mod tuning;

pub use controller::{CycleReport, CycleState, DriveController};
pub use output::{OutputDriver, Outputs};
pub use ramp::{ramp_step, RampLimiter};
pub use resolver::{resolve, ConfigError, DriveMode, Resolution};
pub use sampler::{InputSampler, Sample};
pub use tuning::TuningHandle;
