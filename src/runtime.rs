// Fixed-rate control loop with pedal watchdog
// Note: the watchdog drops the simulated throttle to zero if the pedal source
// stops publishing, so the ramp brings the car to rest instead of holding speed

use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{info, warn};

// local imports
use crate::config::{
    DriveConfig, INPUT_TIMEOUT, LOOP_HZ, TELEMETRY_PERIOD, TOPIC_CMD_TUNE, TOPIC_HEALTH,
    TOPIC_SIM_INPUT, TOPIC_TELEMETRY,
};
use crate::drive::{CycleReport, DriveController, TuningHandle};
use crate::hal::{HalError, PinMap, SimulatedBoard};
use crate::messages::{RuntimeHealth, SimInput, Telemetry, TuneCommand};

/// Knobs the binary can override
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: DriveConfig,
    pub loop_hz: u64,
    pub input_timeout: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            config: DriveConfig::default(),
            loop_hz: LOOP_HZ,
            input_timeout: INPUT_TIMEOUT,
        }
    }
}

pub struct Runtime {
    controller: DriveController<SimulatedBoard>,
    latest_input: Option<SimInput>,
    input_received_at: Instant,
    input_timeout: Duration,
    input_stale: bool,
    health: RuntimeHealth,
}

impl Runtime {
    pub fn new(tuning: TuningHandle, input_timeout: Duration) -> Result<Self, HalError> {
        let mut controller = DriveController::new(SimulatedBoard::new(), PinMap::default(), tuning);
        controller.begin()?;
        Ok(Self {
            controller,
            latest_input: None,
            input_received_at: Instant::now(),
            input_timeout,
            input_stale: true,
            health: RuntimeHealth::InputStale, // Start stale until first input
        })
    }

    pub fn health(&self) -> RuntimeHealth {
        self.health
    }

    pub fn controller(&self) -> &DriveController<SimulatedBoard> {
        &self.controller
    }

    /// Process incoming pedal/switch state
    pub fn on_input(&mut self, input: SimInput) {
        self.latest_input = Some(input);
        self.input_received_at = Instant::now();
    }

    /// Process incoming tuning command
    pub fn on_tune(&self, cmd: &TuneCommand) {
        self.controller.tuning().apply(cmd);
    }

    /// Feed the board (watchdog applied) and run one control cycle
    pub fn step(&mut self) -> Result<CycleReport, HalError> {
        let input_age = self.input_received_at.elapsed();
        let stale = input_age > self.input_timeout || self.latest_input.is_none();

        let input = if stale {
            // Watchdog triggered - release pedal and switch
            if !self.input_stale && self.latest_input.is_some() {
                warn!("Pedal input stale ({:?} old), releasing throttle", input_age);
            }
            SimInput::default()
        } else {
            if self.input_stale {
                info!("Pedal input live");
            }
            self.latest_input.unwrap_or_default()
        };
        self.input_stale = stale;

        let pins = *self.controller.pins();
        let board = self.controller.io_mut();
        board.set_analog(pins.throttle, input.throttle);
        board.set_digital(pins.fast_sw, input.fast);
        board.set_digital(pins.rev_sw, input.reverse);

        let report = self.controller.poll()?;

        self.health = if report.fault.is_some() {
            RuntimeHealth::ConfigFault
        } else if stale {
            RuntimeHealth::InputStale
        } else {
            RuntimeHealth::Ok
        };
        Ok(report)
    }

    pub fn stop(&mut self) -> Result<(), HalError> {
        self.controller.stop()
    }
}

pub async fn run(opts: RunOptions) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    info!("Setting up publishers and subscribers...");
    let sub_tune = session.declare_subscriber(TOPIC_CMD_TUNE).await?;
    let sub_input = session.declare_subscriber(TOPIC_SIM_INPUT).await?;
    let pub_telemetry = session.declare_publisher(TOPIC_TELEMETRY).await?;
    let pub_health = session.declare_publisher(TOPIC_HEALTH).await?;

    let tuning = TuningHandle::new(opts.config);
    let mut runtime = Runtime::new(tuning, opts.input_timeout)?;
    let loop_hz = opts.loop_hz.max(1);
    let mut tick = interval(Duration::from_millis(1000 / loop_hz));
    let mut last_telemetry = Instant::now();

    info!(
        "Runtime started: {}Hz loop, {}ms pedal watchdog",
        loop_hz,
        opts.input_timeout.as_millis()
    );
    info!("Subscribed to: {}, {}", TOPIC_CMD_TUNE, TOPIC_SIM_INPUT);
    info!("Publishing to: {}, {}", TOPIC_TELEMETRY, TOPIC_HEALTH);

    loop {
        tokio::select! {
            _ = tick.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }

        // 1. Drain pending tuning commands and pedal updates (non-blocking)
        while let Ok(Some(sample)) = sub_tune.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<TuneCommand>(&payload) {
                Ok(cmd) => runtime.on_tune(&cmd),
                Err(e) => warn!("Failed to parse tune command: {}", e),
            }
        }
        while let Ok(Some(sample)) = sub_input.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<SimInput>(&payload) {
                Ok(input) => runtime.on_input(input),
                Err(e) => warn!("Failed to parse pedal input: {}", e),
            }
        }

        // 2. Control cycle (includes watchdog)
        let report = runtime.step()?;

        // 3. Diagnostic heartbeat
        if last_telemetry.elapsed() >= TELEMETRY_PERIOD {
            last_telemetry = Instant::now();
            info!(
                "Throttle:{}  Limit%:{}  PWM:{}",
                report.sample.raw, report.cap_pct, report.current
            );
            let telemetry_json = serde_json::to_string(&Telemetry::from(&report))?;
            pub_telemetry.put(telemetry_json).await?;
        }

        // 4. Publish health
        let health_json = serde_json::to_string(&runtime.health())?;
        pub_health.put(health_json).await?;
    }

    runtime.stop()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime(timeout: Duration) -> Runtime {
        Runtime::new(TuningHandle::default(), timeout).unwrap()
    }

    #[test]
    fn test_stale_until_first_input() {
        let mut rt = runtime(Duration::from_secs(10));
        let report = rt.step().unwrap();
        assert_eq!(rt.health(), RuntimeHealth::InputStale);
        assert_eq!(report.target, 0);
    }

    #[test]
    fn test_fresh_input_drives() {
        let mut rt = runtime(Duration::from_secs(10));
        rt.on_input(SimInput {
            throttle: 1023,
            fast: true,
            reverse: false,
        });
        let report = rt.step().unwrap();
        assert_eq!(rt.health(), RuntimeHealth::Ok);
        assert_eq!(report.target, 255);
        assert_eq!(report.current, 3);
    }

    #[test]
    fn test_watchdog_releases_throttle() {
        let mut rt = runtime(Duration::from_millis(200));
        rt.on_input(SimInput {
            throttle: 1023,
            fast: true,
            reverse: false,
        });
        for _ in 0..10 {
            rt.step().unwrap();
        }
        let running = rt.controller().state().current;
        assert_eq!(running, 30);

        std::thread::sleep(Duration::from_millis(300));
        let report = rt.step().unwrap();
        assert_eq!(rt.health(), RuntimeHealth::InputStale);
        assert_eq!(report.sample.raw, 0);
        assert_eq!(report.target, 0);
        // Ramps down, no hard cut
        assert_eq!(report.current, running - 3);
    }

    #[test]
    fn test_tune_and_config_fault_health() {
        let mut rt = runtime(Duration::from_secs(10));
        rt.on_input(SimInput {
            throttle: 600,
            fast: false,
            reverse: false,
        });
        rt.on_tune(&TuneCommand::InputRange { min: 300, max: 300 });
        let report = rt.step().unwrap();
        assert_eq!(rt.health(), RuntimeHealth::ConfigFault);
        assert!(report.fault.is_some());

        rt.on_tune(&TuneCommand::Defaults);
        rt.step().unwrap();
        assert_eq!(rt.health(), RuntimeHealth::Ok);
    }
}
