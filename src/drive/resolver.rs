// Throttle -> target drive intensity
//
// Deadband, clamp into the configured input range, mode cap, then a linear
// remap onto 0..=cap_scale. Pure functions; no state.

use serde::{Deserialize, Serialize};

use crate::config::{DriveConfig, SCALE_MAX};

/// Switch position after priority resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveMode {
    /// Centre position
    #[default]
    Slow,
    Fast,
    Reverse,
}

impl DriveMode {
    /// Reverse beats fast, fast beats slow
    pub fn resolve(reverse: bool, fast: bool) -> Self {
        if reverse {
            DriveMode::Reverse
        } else if fast {
            DriveMode::Fast
        } else {
            DriveMode::Slow
        }
    }

    /// Configured cap for this mode, in percent
    pub fn cap_pct(self, cfg: &DriveConfig) -> u8 {
        match self {
            DriveMode::Slow => cfg.slow_pct,
            DriveMode::Fast => cfg.fast_pct,
            DriveMode::Reverse => cfg.reverse_pct,
        }
    }
}

/// Configuration the resolver refuses to act on
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Throttle input range [{min}, {max}] is empty or inverted")]
    InvalidInputRange { min: u16, max: u16 },

    #[error("{mode:?} cap of {pct}% exceeds 100%")]
    CapOutOfRange { mode: DriveMode, pct: u8 },
}

/// Everything the resolver worked out for one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub mode: DriveMode,
    pub cap_pct: u8,
    /// Highest intensity allowed in this mode
    pub cap_scale: u16,
    pub target: u16,
    /// Set when the configuration was unusable; `target` is 0 in that case
    pub fault: Option<ConfigError>,
}

/// `floor(scale_max * pct / 100)`, with the percentage limited to 100
pub fn cap_scale(pct: u8, scale_max: u16) -> u16 {
    let pct = u32::from(pct.min(100));
    (u32::from(scale_max) * pct / 100) as u16
}

/// Resolve mode, cap and target intensity on the default output scale.
///
/// Never fails: an unusable configuration yields target 0 and the fault is
/// carried in [`Resolution::fault`] so the ramp brings the drive to rest.
pub fn resolve(raw: u16, reverse: bool, fast: bool, cfg: &DriveConfig) -> Resolution {
    resolve_with_scale(raw, reverse, fast, cfg, SCALE_MAX)
}

pub fn resolve_with_scale(
    raw: u16,
    reverse: bool,
    fast: bool,
    cfg: &DriveConfig,
    scale_max: u16,
) -> Resolution {
    let mode = DriveMode::resolve(reverse, fast);
    let cap_pct = mode.cap_pct(cfg);
    let cap = cap_scale(cap_pct, scale_max);

    let result = if cap_pct > 100 {
        Err(ConfigError::CapOutOfRange { mode, pct: cap_pct })
    } else {
        target_intensity(raw, cfg, cap)
    };

    match result {
        Ok(target) => Resolution {
            mode,
            cap_pct,
            cap_scale: cap,
            target,
            fault: None,
        },
        Err(fault) => Resolution {
            mode,
            cap_pct,
            cap_scale: cap,
            target: 0,
            fault: Some(fault),
        },
    }
}

/// Map a raw throttle reading onto `0..=cap_scale`.
///
/// Readings below the deadband count as zero. The result is then clamped into
/// `[input_min, input_max]` and scaled proportionally, truncating toward zero.
pub fn target_intensity(raw: u16, cfg: &DriveConfig, cap_scale: u16) -> Result<u16, ConfigError> {
    let (min, max) = (cfg.input_min, cfg.input_max);
    if min >= max {
        return Err(ConfigError::InvalidInputRange { min, max });
    }

    let raw = if raw < cfg.deadband { 0 } else { raw };
    let clamped = raw.clamp(min, max);

    let span = u32::from(max - min);
    let offset = u32::from(clamped - min);
    Ok((offset * u32::from(cap_scale) / span) as u16)
}
