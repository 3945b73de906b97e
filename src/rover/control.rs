//! # Control Loop Module
//!
//! Turns one [`DeviceState`] snapshot per tick into at most one transmitted
//! packet.
//!
//! ## Per-Tick Steps
//!
//! 1. Flip the mode once for every toggle-button press since the last tick
//! 2. Build the active mode's packet from the latest stick and button levels
//! 3. Transmit it only if it differs from the last transmitted packet
//!
//! The last transmitted packet is tracked across both modes, so a mode switch
//! always produces a send unless the new packet happens to match the record.
//!
//! ## Button Roles
//!
//! | Role | Button index | PlayStation label |
//! |------|--------------|-------------------|
//! | Mode toggle | 1 | Circle (○) |
//! | Claw open (held) | 3 | Triangle (△) |
//! | Claw close (held) | 0 | Cross (×) |
//!
//! ## Usage
//!
//! ```no_run
//! use rover_link::controller::sampler::InputSampler;
//! use rover_link::link::UdpLink;
//! use rover_link::rover::control::{ControlLoop, LoopState, DEFAULT_DEADZONE};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let link = UdpLink::open("localhost", 12345).await?;
//!     let mut control = ControlLoop::new(link, DEFAULT_DEADZONE);
//!     let mut state = LoopState::new();
//!     let mut sampler = InputSampler::new();
//!
//!     let outcome = control.tick(&mut state, &sampler.sample()).await;
//!     assert!(outcome.sent.is_none()); // Idle sticks match the initial record
//!     Ok(())
//! }
//! ```

use tracing::{debug, info};

use super::mapping::{
    corrected_analog, gated_analog, linear_map, to_channel, CHANNEL_MAX, CHANNEL_MIN, NEUTRAL,
};
use super::packet::{ArmChannels, ChannelValue, Mode, Packet};
use crate::controller::sampler::{axes, buttons, DeviceState};
use crate::error::RoverLinkError;
use crate::link::PacketTransport;

/// Default stick deadzone (fraction of full deflection).
pub const DEFAULT_DEADZONE: f64 = 0.1;

/// Default delay between ticks in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Button that switches between drive and arm mode.
pub const TOGGLE_BUTTON: usize = buttons::CIRCLE;

/// Button that opens the claw while held.
pub const CLAW_OPEN_BUTTON: usize = buttons::TRIANGLE;

/// Button that closes the claw while held.
pub const CLAW_CLOSE_BUTTON: usize = buttons::CROSS;

/// State carried from one tick to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopState {
    mode: Mode,
    last_sent: String,
}

impl Default for LoopState {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopState {
    /// Drive mode, with the drive rest packet as the last transmitted one.
    ///
    /// An idle gamepad therefore sends nothing at startup.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mode: Mode::Drive,
            last_sent: Mode::Drive.rest_packet().to_string(),
        }
    }

    /// Currently active mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Text of the last transmitted packet.
    #[must_use]
    pub fn last_sent(&self) -> &str {
        &self.last_sent
    }

    /// Switches to the other mode and returns it.
    pub fn toggle_mode(&mut self) -> Mode {
        self.mode = self.mode.toggled();
        self.mode
    }
}

/// What happened during one tick.
#[derive(Debug, Default)]
pub struct TickOutcome {
    /// Number of mode switches applied.
    pub mode_switches: usize,
    /// Packet text handed to the transport, if any.
    pub sent: Option<String>,
    /// Transport failure for `sent`; the packet is still recorded as sent.
    pub send_error: Option<RoverLinkError>,
}

/// Builds the packet for `mode` from a device snapshot.
#[must_use]
pub fn compute_packet(mode: Mode, device: &DeviceState, deadzone: f64) -> Packet {
    match mode {
        Mode::Drive => drive_packet(device, deadzone),
        Mode::Arm => arm_packet(device, deadzone),
    }
}

/// Left stick drives the right-hand wheels and the right stick the left-hand
/// wheels.
fn drive_packet(device: &DeviceState, deadzone: f64) -> Packet {
    Packet::Drive {
        right_wheels: corrected_analog(device.axis(axes::LEFT_Y), deadzone),
        left_wheels: corrected_analog(device.axis(axes::RIGHT_Y), deadzone),
    }
}

fn arm_packet(device: &DeviceState, deadzone: f64) -> Packet {
    let (wrist_right, wrist_left) = wrists(device.axis(axes::LEFT_Y), deadzone);

    Packet::Arm(ArmChannels {
        elbow: gated_analog(device.axis(axes::RIGHT_Y), deadzone),
        wrist_right,
        wrist_left,
        claw: claw(device),
        gantry: gated_analog(device.axis(axes::LEFT_X), deadzone),
        shoulder: gated_analog(device.axis(axes::RIGHT_X), deadzone),
    })
}

/// Both wrists follow the full-range mapping of the stick, except that the
/// right wrist pins to maximum while the stick is pushed up.
fn wrists(axis: f64, deadzone: f64) -> (ChannelValue, ChannelValue) {
    if axis.abs() <= deadzone {
        return (NEUTRAL, NEUTRAL);
    }

    let mapped = to_channel(linear_map(axis, -1.0, 1.0, 0.0, 255.0));
    if axis < 0.0 {
        (CHANNEL_MAX, mapped)
    } else {
        (mapped, mapped)
    }
}

/// Open wins when both claw buttons are held.
fn claw(device: &DeviceState) -> ChannelValue {
    if device.button(CLAW_OPEN_BUTTON) {
        CHANNEL_MAX
    } else if device.button(CLAW_CLOSE_BUTTON) {
        CHANNEL_MIN
    } else {
        NEUTRAL
    }
}

/// Runs control ticks against a packet transport.
pub struct ControlLoop<T> {
    transport: T,
    deadzone: f64,
}

impl<T: std::fmt::Debug> std::fmt::Debug for ControlLoop<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlLoop")
            .field("transport", &self.transport)
            .field("deadzone", &self.deadzone)
            .finish()
    }
}

impl<T: PacketTransport> ControlLoop<T> {
    /// Creates a control loop sending through `transport`.
    pub fn new(transport: T, deadzone: f64) -> Self {
        Self {
            transport,
            deadzone,
        }
    }

    /// Runs one tick.
    ///
    /// Transport errors are reported in the outcome and never abort the tick.
    pub async fn tick(&mut self, state: &mut LoopState, device: &DeviceState) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        for _ in 0..device.press_count(TOGGLE_BUTTON) {
            let mode = state.toggle_mode();
            outcome.mode_switches += 1;
            info!("Switched to {} packet.", mode.tag());
        }

        let packet = compute_packet(state.mode, device, self.deadzone);
        let text = packet.to_string();

        if text != state.last_sent {
            info!("Sent {}", text);
            if let Err(e) = self.transport.send(text.as_bytes()).await {
                debug!("Failed to send packet {}: {}", text, e);
                outcome.send_error = Some(RoverLinkError::Transport(e.to_string()));
            }
            state.last_sent = text.clone();
            outcome.sent = Some(text.clone());
        }

        // A rest packet is always left as the record, so holding still is quiet
        if packet.is_rest() {
            state.last_sent = text;
        }

        outcome
    }
}
