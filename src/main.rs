//! # Rover Link
//!
//! Drive a rover and its arm from a gamepad over UDP.
//!
//! This application reads the first connected gamepad and sends drive (`D_...`)
//! and arm (`A_...`) packets to the rover receiver whenever the command changes.

use anyhow::{Context, Result};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info, warn};

use rover_link::config::Config;
use rover_link::controller::gamepad::Gamepad;
use rover_link::controller::sampler::{InputSampler, AXIS_COUNT};
use rover_link::link::UdpLink;
use rover_link::rover::control::{ControlLoop, LoopState};
use rover_link::telemetry::logger::PacketLogger;

/// Environment variable naming an optional TOML configuration file
const CONFIG_ENV_VAR: &str = "ROVER_LINK_CONFIG";

/// Main entry point for Rover Link
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (built-in defaults unless `ROVER_LINK_CONFIG` is set)
///    - Open the gamepad; a missing gamepad is fatal
///    - Bind the UDP socket to the receiver
///
/// 2. **Main Loop**
///    - Feed gamepad events into the sampler as they arrive
///    - Every poll interval, run one control tick and send on change
///    - Handle Ctrl+C for shutdown
///
/// # Errors
///
/// Returns error if:
/// - The configuration file cannot be loaded
/// - No gamepad is found, or reading from it fails
/// - The receiver host cannot be resolved
///
/// # Examples
///
/// ```bash
/// cargo run --release
/// ```
///
/// Expected output:
/// ```text
/// INFO rover_link: Rover Link v0.1.0 starting...
/// INFO rover_link::controller::gamepad: Found gamepad at: /dev/input/event5
/// INFO rover_link::link: Sending rover packets to 127.0.0.1:12345 (localhost:12345)
/// INFO rover_link::rover::control: Sent D_255_255_255_128_128_128
/// INFO rover_link::rover::control: Switched to A packet.
/// ```
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("Rover Link v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => Config::default(),
    };

    let gamepad = if config.controller.device_path.is_empty() {
        Gamepad::open()?
    } else {
        Gamepad::open_path(&config.controller.device_path)?
    };
    info!(
        "Using gamepad {} ({})",
        gamepad.device_path(),
        gamepad.name().unwrap_or("unnamed")
    );
    let layout = config.controller.right_stick;
    let axis_ranges = match config.controller.axis_range_override() {
        Some(range) => [range; AXIS_COUNT],
        None => gamepad.axis_ranges(layout),
    };
    let mut events = gamepad.into_event_stream()?;

    let link = UdpLink::open(&config.link.host, config.link.port).await?;

    let mut packet_log = if config.telemetry.enabled {
        Some(PacketLogger::new(
            &config.telemetry.log_dir,
            config.telemetry.max_records_per_file,
            config.telemetry.max_files_to_keep,
        )?)
    } else {
        None
    };

    let mut sampler = InputSampler::with_ranges(layout, axis_ranges);
    let mut control = ControlLoop::new(link, config.controller.deadzone);
    let mut state = LoopState::new();

    let mut poll = interval(Duration::from_millis(config.control.poll_interval_ms));
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        "Polling every {}ms, starting in {:?} mode",
        config.control.poll_interval_ms,
        state.mode()
    );
    info!("Press Ctrl+C to exit");

    let mut packets_sent: u64 = 0;

    // Main control loop
    loop {
        tokio::select! {
            event = events.next_event() => {
                match event {
                    Ok(event) => sampler.process_event(&event),
                    Err(e) => {
                        error!("Lost gamepad: {}", e);
                        return Err(e).context("Failed to read gamepad events");
                    }
                }
            }

            _ = poll.tick() => {
                let outcome = control.tick(&mut state, &sampler.sample()).await;

                if let Some(packet) = outcome.sent {
                    packets_sent += 1;
                    if let Some(logger) = packet_log.as_mut() {
                        if let Err(e) = logger.log(state.mode(), &packet) {
                            warn!("Failed to write packet log: {}", e);
                        }
                    }
                }
            }

            // Handle Ctrl+C for shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total packets sent: {}", packets_sent);
                break;
            }
        }
    }

    Ok(())
}
