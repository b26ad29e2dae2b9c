// Define message types for the runtime

use serde::{Deserialize, Serialize};

use crate::config::DriveConfig;
use crate::drive::{CycleReport, DriveMode, Outputs};

// Tuning command from scripts/console -> runtime
// One variant per configuration field; tagged so the JSON reads {"param": "deadband", "value": 40}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "param", rename_all = "snake_case")]
pub enum TuneCommand {
    Deadband { value: u16 },
    InputRange { min: u16, max: u16 },
    AccelStep { value: u16 },
    DecelStep { value: u16 },
    // Same step both ways
    RampStep { value: u16 },
    SlowPct { value: u8 },
    FastPct { value: u8 },
    ReversePct { value: u8 },
    Replace { config: DriveConfig },
    Defaults,
}

// Simulated pedal and toggle switch -> runtime
// Flags are "asserted", i.e. the switch position is selected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimInput {
    pub throttle: u16,
    pub fast: bool,
    pub reverse: bool,
}

// Periodic diagnostic dump from runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Telemetry {
    pub raw: u16,
    pub mode: DriveMode,
    pub cap_pct: u8,
    pub target: u16,
    pub current: u16,
    pub outputs: Outputs,
    pub fault: Option<String>,
}

impl From<&CycleReport> for Telemetry {
    fn from(report: &CycleReport) -> Self {
        Self {
            raw: report.sample.raw,
            mode: report.mode,
            cap_pct: report.cap_pct,
            target: report.target,
            current: report.current,
            outputs: report.outputs,
            fault: report.fault.as_ref().map(|f| f.to_string()),
        }
    }
}

/// Health status published by runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Ok,
    InputStale,
    ConfigFault,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tune_command_json_shape() {
        let cmd: TuneCommand = serde_json::from_str(r#"{"param":"deadband","value":40}"#).unwrap();
        assert_eq!(cmd, TuneCommand::Deadband { value: 40 });

        let cmd: TuneCommand =
            serde_json::from_str(r#"{"param":"input_range","min":100,"max":900}"#).unwrap();
        assert_eq!(cmd, TuneCommand::InputRange { min: 100, max: 900 });

        let cmd: TuneCommand = serde_json::from_str(r#"{"param":"defaults"}"#).unwrap();
        assert_eq!(cmd, TuneCommand::Defaults);

        let json = serde_json::to_string(&TuneCommand::ReversePct { value: 25 }).unwrap();
        assert_eq!(json, r#"{"param":"reverse_pct","value":25}"#);
    }

    #[test]
    fn test_unknown_param_rejected() {
        assert!(serde_json::from_str::<TuneCommand>(r#"{"param":"boost","value":1}"#).is_err());
    }

    #[test]
    fn test_health_json() {
        assert_eq!(
            serde_json::to_string(&RuntimeHealth::InputStale).unwrap(),
            r#""input_stale""#
        );
    }
}
