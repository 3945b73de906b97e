//! # Rover Packet Module
//!
//! Text packets understood by the rover receiver.
//!
//! ## Wire Format
//!
//! A packet is a tag character followed by six decimal channel values, all
//! joined with `_`. There is no terminator, length prefix or checksum.
//!
//! | Mode | Layout |
//! |------|--------|
//! | Drive | `D_<right>_<right>_<right>_<left>_<left>_<left>` |
//! | Arm | `A_<elbow>_<wrist_right>_<wrist_left>_<claw>_<gantry>_<shoulder>` |
//!
//! ```
//! use rover_link::rover::packet::Packet;
//!
//! let packet = Packet::Drive { right_wheels: 200, left_wheels: 50 };
//! assert_eq!(packet.to_string(), "D_200_200_200_50_50_50");
//! ```

use serde::Serialize;
use std::fmt;

use super::mapping::NEUTRAL;

/// A single channel command (0-255, 128 = neutral).
pub type ChannelValue = u8;

/// Field separator.
pub const SEPARATOR: char = '_';

/// Number of channel fields in every packet.
pub const CHANNELS_PER_PACKET: usize = 6;

/// Which half of the rover the gamepad is driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Wheels.
    #[default]
    Drive,
    /// Arm joints and claw.
    Arm,
}

impl Mode {
    /// Leading tag character of this mode's packets.
    #[must_use]
    pub fn tag(self) -> char {
        match self {
            Mode::Drive => 'D',
            Mode::Arm => 'A',
        }
    }

    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Mode::Drive => Mode::Arm,
            Mode::Arm => Mode::Drive,
        }
    }

    /// Packet with every channel at neutral.
    #[must_use]
    pub fn rest_packet(self) -> Packet {
        match self {
            Mode::Drive => Packet::Drive {
                right_wheels: NEUTRAL,
                left_wheels: NEUTRAL,
            },
            Mode::Arm => Packet::Arm(ArmChannels::default()),
        }
    }
}

/// Arm channel set, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmChannels {
    pub elbow: ChannelValue,
    pub wrist_right: ChannelValue,
    pub wrist_left: ChannelValue,
    pub claw: ChannelValue,
    pub gantry: ChannelValue,
    pub shoulder: ChannelValue,
}

impl Default for ArmChannels {
    fn default() -> Self {
        Self {
            elbow: NEUTRAL,
            wrist_right: NEUTRAL,
            wrist_left: NEUTRAL,
            claw: NEUTRAL,
            gantry: NEUTRAL,
            shoulder: NEUTRAL,
        }
    }
}

/// One rover command, ready to be formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet {
    /// Each side's three wheels share one value.
    Drive {
        right_wheels: ChannelValue,
        left_wheels: ChannelValue,
    },
    /// Six independent arm channels.
    Arm(ArmChannels),
}

impl Packet {
    /// Mode this packet belongs to.
    #[must_use]
    pub fn mode(&self) -> Mode {
        match self {
            Packet::Drive { .. } => Mode::Drive,
            Packet::Arm(_) => Mode::Arm,
        }
    }

    /// Channel values in wire order.
    #[must_use]
    pub fn channels(&self) -> [ChannelValue; CHANNELS_PER_PACKET] {
        match *self {
            Packet::Drive {
                right_wheels,
                left_wheels,
            } => [
                right_wheels,
                right_wheels,
                right_wheels,
                left_wheels,
                left_wheels,
                left_wheels,
            ],
            Packet::Arm(arm) => [
                arm.elbow,
                arm.wrist_right,
                arm.wrist_left,
                arm.claw,
                arm.gantry,
                arm.shoulder,
            ],
        }
    }

    /// Returns true if every channel is neutral.
    #[must_use]
    pub fn is_rest(&self) -> bool {
        *self == self.mode().rest_packet()
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mode().tag())?;
        for value in self.channels() {
            write!(f, "{}{}", SEPARATOR, value)?;
        }
        Ok(())
    }
}
