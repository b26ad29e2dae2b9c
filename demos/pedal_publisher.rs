// Keyboard pedal: Up/Down throttle, 1/2/3 SLOW/FAST/REVERSE, Space release, Q quit
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::time::Duration;
use tracing::info;

use fourwd_runtime::config::{ANALOG_MAX, TOPIC_SIM_INPUT};
use fourwd_runtime::drive::DriveMode;
use fourwd_runtime::messages::SimInput;

const THROTTLE_STEP: u16 = 64; // ADC counts per key press

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let publisher = session.declare_publisher(TOPIC_SIM_INPUT).await?;

    info!("Controls: Up/Down=throttle, 1/2/3=SLOW/FAST/REVERSE, Space=release, Q=quit");
    info!("Mode: SLOW");

    enable_raw_mode()?;
    let result = run_pedal(&publisher).await;
    disable_raw_mode()?;

    result
}

async fn run_pedal(
    publisher: &zenoh::pubsub::Publisher<'_>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut throttle: u16 = 0;
    let mut mode = DriveMode::Slow;

    loop {
        // Poll for key with 20ms timeout (50Hz effective rate)
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;

                match code {
                    KeyCode::Up if pressed => {
                        throttle = (throttle + THROTTLE_STEP).min(ANALOG_MAX);
                        info!("Throttle: {}", throttle);
                    }
                    KeyCode::Down if pressed => {
                        throttle = throttle.saturating_sub(THROTTLE_STEP);
                        info!("Throttle: {}", throttle);
                    }
                    KeyCode::Char(' ') if pressed => {
                        throttle = 0;
                        info!("Throttle released");
                    }

                    // Toggle switch position
                    KeyCode::Char('1') if pressed => set_mode(&mut mode, DriveMode::Slow),
                    KeyCode::Char('2') if pressed => set_mode(&mut mode, DriveMode::Fast),
                    KeyCode::Char('3') if pressed => set_mode(&mut mode, DriveMode::Reverse),

                    // Quit
                    KeyCode::Char('q') | KeyCode::Esc if pressed => break,

                    _ => {}
                }
            }
        }

        // Always publish at ~50Hz so the runtime watchdog stays fed
        let input = SimInput {
            throttle,
            fast: mode == DriveMode::Fast,
            reverse: mode == DriveMode::Reverse,
        };
        publisher.put(serde_json::to_string(&input)?).await?;
    }

    Ok(())
}

fn set_mode(mode: &mut DriveMode, next: DriveMode) {
    *mode = next;
    info!("Mode: {:?}", next);
}
