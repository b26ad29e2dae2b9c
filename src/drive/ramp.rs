// Asymmetric slew-rate limiter
//
// Moves the current intensity toward the target by at most one step per
// cycle, with separate steps for speeding up and slowing down, then bounds
// the result by the active mode's cap.

/// One limiter step.
///
/// The step toward `target` never passes it. The final clamp to `cap_scale`
/// applies even when it means dropping faster than `decel`, e.g. right after
/// a switch into a lower-capped mode.
pub fn ramp_step(current: u16, target: u16, accel: u16, decel: u16, cap_scale: u16) -> u16 {
    let next = if current < target {
        current.saturating_add(accel).min(target)
    } else if current > target {
        current.saturating_sub(decel).max(target)
    } else {
        current
    };
    next.min(cap_scale)
}

/// Holds the drive intensity between cycles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RampLimiter {
    current: u16,
}

impl RampLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u16 {
        self.current
    }

    /// Advance one cycle toward `target` and return the new intensity
    pub fn advance(&mut self, target: u16, accel: u16, decel: u16, cap_scale: u16) -> u16 {
        self.current = ramp_step(self.current, target, accel, decel, cap_scale);
        self.current
    }

    /// Drop straight to zero
    pub fn reset(&mut self) {
        self.current = 0;
    }
}
