// One control cycle: sample -> resolve -> ramp -> drive

use serde::Serialize;
use tracing::{debug, info, warn};

use super::output::{OutputDriver, Outputs};
use super::ramp::RampLimiter;
use super::resolver::{self, ConfigError, DriveMode};
use super::sampler::{InputSampler, Sample};
use super::tuning::TuningHandle;
use crate::hal::{DriveIo, PinMap, Result};

/// State carried by the controller between cycles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleState {
    pub sample: Sample,
    pub target: u16,
    pub current: u16,
}

/// Result of one `poll()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub sample: Sample,
    pub mode: DriveMode,
    pub cap_pct: u8,
    pub cap_scale: u16,
    pub target: u16,
    pub current: u16,
    pub outputs: Outputs,
    pub fault: Option<ConfigError>,
}

/// Throttle-to-H-bridge controller for one motor channel pair.
///
/// Owns the board and the cycle state. Configuration comes from a
/// [`TuningHandle`] that other tasks may hold clones of.
pub struct DriveController<B: DriveIo> {
    io: B,
    pins: PinMap,
    tuning: TuningHandle,
    sampler: InputSampler,
    ramp: RampLimiter,
    output: OutputDriver,
    target: u16,
    last_fault: Option<ConfigError>,
}

impl<B: DriveIo> DriveController<B> {
    pub fn new(io: B, pins: PinMap, tuning: TuningHandle) -> Self {
        Self {
            io,
            output: OutputDriver::new(&pins),
            pins,
            tuning,
            sampler: InputSampler::new(),
            ramp: RampLimiter::new(),
            target: 0,
            last_fault: None,
        }
    }

    /// One-time hardware setup; motors stay off until the first poll
    pub fn begin(&mut self) -> Result<()> {
        info!("Configuring drive pins {:?}", self.pins);
        self.pins.begin(&mut self.io)
    }

    /// Run one control cycle.
    ///
    /// Only output write failures are returned; read failures fall back to
    /// released inputs and configuration faults resolve to a zero target.
    pub fn poll(&mut self) -> Result<CycleReport> {
        let cfg = self.tuning.snapshot();

        // 1) Raw inputs
        let sample = self.sampler.sample(&mut self.io, &self.pins);

        // 2) Mode cap and target
        let res = resolver::resolve(sample.raw, sample.reverse, sample.fast, &cfg);
        self.track_fault(&res.fault);
        self.target = res.target;

        // 3) Slew toward target, bounded by the cap
        let current = self
            .ramp
            .advance(res.target, cfg.accel_step, cfg.decel_step, res.cap_scale);

        // 4) Drive exactly one direction
        let outputs = self.output.drive(&mut self.io, current, sample.reverse)?;

        debug!(
            "raw={} mode={:?} cap={} target={} current={}",
            sample.raw, res.mode, res.cap_scale, res.target, current
        );

        Ok(CycleReport {
            sample,
            mode: res.mode,
            cap_pct: res.cap_pct,
            cap_scale: res.cap_scale,
            target: res.target,
            current,
            outputs,
            fault: res.fault,
        })
    }

    /// Cut drive immediately, without ramping
    pub fn stop(&mut self) -> Result<()> {
        self.ramp.reset();
        self.target = 0;
        self.output.stop(&mut self.io)
    }

    pub fn state(&self) -> CycleState {
        CycleState {
            sample: self.sampler.last(),
            target: self.target,
            current: self.ramp.current(),
        }
    }

    pub fn tuning(&self) -> &TuningHandle {
        &self.tuning
    }

    pub fn pins(&self) -> &PinMap {
        &self.pins
    }

    pub fn io(&self) -> &B {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut B {
        &mut self.io
    }

    // Log config faults when they appear and when they clear, not every cycle
    fn track_fault(&mut self, fault: &Option<ConfigError>) {
        if *fault == self.last_fault {
            return;
        }
        match fault {
            Some(f) => warn!("Drive config rejected, holding target at 0: {}", f),
            None => info!("Drive config fault cleared"),
        }
        self.last_fault = fault.clone();
    }
}

impl<B: DriveIo> Drop for DriveController<B> {
    fn drop(&mut self) {
        // Try to stop motors when controller is dropped (safety measure)
        if let Err(e) = self.stop() {
            warn!("Failed to stop motors on drop: {}", e);
        }
    }
}
