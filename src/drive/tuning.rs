// Shared tuning handle
//
// The configuration lives behind one lock as an Arc snapshot. Writers copy,
// modify and swap; the control cycle grabs the Arc once per cycle and never
// sees half an update.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::config::DriveConfig;
use crate::messages::TuneCommand;

#[derive(Debug, Clone, Default)]
pub struct TuningHandle {
    inner: Arc<RwLock<Arc<DriveConfig>>>,
}

impl TuningHandle {
    pub fn new(config: DriveConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    /// Current configuration
    pub fn snapshot(&self) -> Arc<DriveConfig> {
        Arc::clone(&self.inner.read())
    }

    /// Copy, modify, swap
    pub fn update(&self, f: impl FnOnce(&mut DriveConfig)) {
        let mut guard = self.inner.write();
        let mut next = DriveConfig::clone(&guard);
        f(&mut next);
        *guard = Arc::new(next);
    }

    pub fn replace(&self, config: DriveConfig) {
        *self.inner.write() = Arc::new(config);
    }

    pub fn set_deadband(&self, adc: u16) {
        self.update(|c| c.deadband = adc);
    }

    pub fn set_input_range(&self, min: u16, max: u16) {
        self.update(|c| {
            c.input_min = min;
            c.input_max = max;
        });
    }

    pub fn set_accel_step(&self, step: u16) {
        self.update(|c| c.accel_step = step);
    }

    pub fn set_decel_step(&self, step: u16) {
        self.update(|c| c.decel_step = step);
    }

    pub fn set_ramp_step(&self, step: u16) {
        self.update(|c| c.set_ramp_step(step));
    }

    pub fn set_slow_pct(&self, pct: u8) {
        self.update(|c| c.slow_pct = pct);
    }

    pub fn set_fast_pct(&self, pct: u8) {
        self.update(|c| c.fast_pct = pct);
    }

    pub fn set_reverse_pct(&self, pct: u8) {
        self.update(|c| c.reverse_pct = pct);
    }

    /// Apply a tuning message
    pub fn apply(&self, cmd: &TuneCommand) {
        info!("Applying tune command: {:?}", cmd);
        match cmd {
            TuneCommand::Deadband { value } => self.set_deadband(*value),
            TuneCommand::InputRange { min, max } => self.set_input_range(*min, *max),
            TuneCommand::AccelStep { value } => self.set_accel_step(*value),
            TuneCommand::DecelStep { value } => self.set_decel_step(*value),
            TuneCommand::RampStep { value } => self.set_ramp_step(*value),
            TuneCommand::SlowPct { value } => self.set_slow_pct(*value),
            TuneCommand::FastPct { value } => self.set_fast_pct(*value),
            TuneCommand::ReversePct { value } => self.set_reverse_pct(*value),
            TuneCommand::Replace { config } => self.replace(config.clone()),
            TuneCommand::Defaults => self.replace(DriveConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_stable_across_updates() {
        let tuning = TuningHandle::new(DriveConfig::default());
        let before = tuning.snapshot();

        tuning.set_input_range(100, 900);
        tuning.set_slow_pct(40);

        // The old snapshot is untouched
        assert_eq!(*before, DriveConfig::default());

        let after = tuning.snapshot();
        assert_eq!((after.input_min, after.input_max), (100, 900));
        assert_eq!(after.slow_pct, 40);
    }

    #[test]
    fn test_clones_share_state() {
        let tuning = TuningHandle::default();
        let remote = tuning.clone();
        remote.set_decel_step(12);
        assert_eq!(tuning.snapshot().decel_step, 12);
    }

    #[test]
    fn test_setters_do_not_validate() {
        let tuning = TuningHandle::default();
        tuning.set_input_range(800, 200);
        tuning.set_fast_pct(250);
        let cfg = tuning.snapshot();
        assert_eq!((cfg.input_min, cfg.input_max), (800, 200));
        assert_eq!(cfg.fast_pct, 250);
    }

    #[test]
    fn test_apply_every_command() {
        let tuning = TuningHandle::default();
        let cmds = [
            TuneCommand::Deadband { value: 12 },
            TuneCommand::InputRange { min: 50, max: 1000 },
            TuneCommand::AccelStep { value: 2 },
            TuneCommand::DecelStep { value: 9 },
            TuneCommand::SlowPct { value: 45 },
            TuneCommand::FastPct { value: 90 },
            TuneCommand::ReversePct { value: 20 },
        ];
        for cmd in &cmds {
            tuning.apply(cmd);
        }
        let expected = DriveConfig {
            deadband: 12,
            input_min: 50,
            input_max: 1000,
            slow_pct: 45,
            fast_pct: 90,
            reverse_pct: 20,
            accel_step: 2,
            decel_step: 9,
        };
        assert_eq!(*tuning.snapshot(), expected);

        tuning.apply(&TuneCommand::RampStep { value: 5 });
        assert_eq!(tuning.snapshot().accel_step, 5);
        assert_eq!(tuning.snapshot().decel_step, 5);

        tuning.apply(&TuneCommand::Defaults);
        assert_eq!(*tuning.snapshot(), DriveConfig::default());

        tuning.apply(&TuneCommand::Replace { config: expected.clone() });
        assert_eq!(*tuning.snapshot(), expected);
    }

    #[test]
    fn test_concurrent_writers() {
        let tuning = TuningHandle::default();
        let handles: Vec<_> = (0..4u16)
            .map(|i| {
                let t = tuning.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        t.set_input_range(i, 1000 + i);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        // Min and max always come from the same writer
        let cfg = tuning.snapshot();
        assert_eq!(cfg.input_max - cfg.input_min, 1000);
    }
}
