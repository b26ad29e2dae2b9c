// Ramp trace: offline run of the controller against the simulated board
//
// No zenoh, no hardware. Walks through a scripted pedal/switch sequence and
// prints every cycle so ramp and cap behaviour can be eyeballed.
//
// Usage: cargo run --example ramp_trace -- [accel] [decel]

use fourwd_runtime::config::DriveConfig;
use fourwd_runtime::drive::{DriveController, TuningHandle};
use fourwd_runtime::hal::{PinMap, SimulatedBoard};

// (label, throttle, fast, reverse, cycles)
const SCRIPT: [(&str, u16, bool, bool, usize); 6] = [
    ("pedal in deadband", 20, false, false, 3),
    ("full pedal, SLOW", 1023, false, false, 45),
    ("switch to FAST", 1023, true, false, 50),
    ("back to SLOW mid-ramp", 1023, false, false, 5),
    ("release pedal", 0, false, false, 50),
    ("full pedal, REVERSE", 1023, false, true, 30),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().unwrap()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let mut config = DriveConfig::default();
    if let Some(accel) = args.next() {
        config.accel_step = accel.parse()?;
    }
    if let Some(decel) = args.next() {
        config.decel_step = decel.parse()?;
    }

    println!("Config: {:?}", config);
    println!();

    let pins = PinMap::default();
    let mut ctl = DriveController::new(SimulatedBoard::new(), pins, TuningHandle::new(config));
    ctl.begin()?;

    let mut cycle = 0;
    for (label, throttle, fast, reverse, cycles) in SCRIPT {
        println!("── {} ──", label);
        let board = ctl.io_mut();
        board.set_analog(pins.throttle, throttle);
        board.set_digital(pins.fast_sw, fast);
        board.set_digital(pins.rev_sw, reverse);

        for _ in 0..cycles {
            let r = ctl.poll()?;
            cycle += 1;
            println!(
                "{:4}  raw={:4}  mode={:<7}  cap={:3}  target={:3}  pwm={:3}  RPWM={:3} LPWM={:3}",
                cycle,
                r.sample.raw,
                format!("{:?}", r.mode),
                r.cap_scale,
                r.target,
                r.current,
                r.outputs.forward,
                r.outputs.reverse
            );
        }
        println!();
    }

    ctl.stop()?;
    println!("Stopped after {} cycles", cycle);
    Ok(())
}
