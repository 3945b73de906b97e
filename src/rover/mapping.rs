//! # Value Mapping Module
//!
//! Converts normalized stick positions (-1.0 to 1.0) into PWM-style channel
//! values (0-255, 128 = neutral).
//!
//! ## Direction Convention
//!
//! Stick up reports a negative value and maps into the upper half of the
//! output range; stick down maps into the lower half:
//!
//! | Axis value | Channel value |
//! |------------|---------------|
//! | -1.0 | 255 |
//! | 0.0 | 128 |
//! | 1.0 | 0 |
//!
//! ## Deadzone
//!
//! Inside the deadzone the neutral value is returned. Outside it the mapping
//! pivots at 0.0, not at the deadzone edge, so the first value past the edge
//! is a few steps away from 128 rather than exactly 128.
//!
//! ```
//! use rover_link::rover::mapping::corrected_analog;
//!
//! assert_eq!(corrected_analog(0.05, 0.1), 128);
//! assert_eq!(corrected_analog(-0.5, 0.1), 191);
//! assert_eq!(corrected_analog(1.0, 0.1), 0);
//! ```

use super::packet::ChannelValue;

/// Neutral channel value (stick centered, claw idle).
pub const NEUTRAL: ChannelValue = 128;

/// Lowest channel value.
pub const CHANNEL_MIN: ChannelValue = 0;

/// Highest channel value.
pub const CHANNEL_MAX: ChannelValue = 255;

/// Linearly maps `value` from `[in_min, in_max]` to `[out_min, out_max]`.
///
/// The result is truncated toward zero. No clamping is applied, so values
/// outside the input range map outside the output range.
///
/// `in_min` must differ from `in_max`.
///
/// # Examples
///
/// ```
/// use rover_link::rover::mapping::linear_map;
///
/// assert_eq!(linear_map(0.0, -1.0, 0.0, 255.0, 128.0), 128);
/// assert_eq!(linear_map(-1.0, -1.0, 0.0, 255.0, 128.0), 255);
/// assert_eq!(linear_map(1.0, 0.0, 1.0, 128.0, 0.0), 0);
/// ```
#[must_use]
pub fn linear_map(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> i32 {
    debug_assert!(in_min != in_max, "input range must not be empty");
    (out_min + (value - in_min) * (out_max - out_min) / (in_max - in_min)) as i32
}

/// Maps a stick position to a channel value, returning [`NEUTRAL`] when
/// `|axis| < deadzone`.
#[must_use]
pub fn corrected_analog(axis: f64, deadzone: f64) -> ChannelValue {
    if axis.abs() < deadzone {
        NEUTRAL
    } else if axis < 0.0 {
        to_channel(linear_map(axis, -1.0, 0.0, 255.0, 128.0))
    } else {
        to_channel(linear_map(axis, 0.0, 1.0, 128.0, 0.0))
    }
}

/// Like [`corrected_analog`], but only maps when `|axis| > deadzone`.
///
/// The arm joints use this stricter gate, so an axis sitting exactly on the
/// deadzone edge still reads as neutral.
#[must_use]
pub fn gated_analog(axis: f64, deadzone: f64) -> ChannelValue {
    if axis.abs() > deadzone {
        corrected_analog(axis, deadzone)
    } else {
        NEUTRAL
    }
}

/// Narrows a mapped integer into the channel range.
#[inline]
#[must_use]
pub fn to_channel(value: i32) -> ChannelValue {
    value.clamp(i32::from(CHANNEL_MIN), i32::from(CHANNEL_MAX)) as ChannelValue
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEADZONE: f64 = 0.1;

    // ==================== linear_map Tests ====================

    #[test]
    fn test_linear_map_reference_points() {
        assert_eq!(linear_map(0.0, -1.0, 0.0, 255.0, 128.0), 128);
        assert_eq!(linear_map(-1.0, -1.0, 0.0, 255.0, 128.0), 255);
        assert_eq!(linear_map(1.0, 0.0, 1.0, 128.0, 0.0), 0);
    }

    #[test]
    fn test_linear_map_truncates() {
        // 0 + 0.5 * 255 / 2 = 63.75
        assert_eq!(linear_map(-0.5, -1.0, 1.0, 0.0, 255.0), 63);
        // 128 + 0.3 * -128 = 89.6
        assert_eq!(linear_map(0.3, 0.0, 1.0, 128.0, 0.0), 89);
    }

    #[test]
    fn test_linear_map_truncates_toward_zero() {
        // -0.5 * 3 = -1.5 truncates to -1, not -2
        assert_eq!(linear_map(-0.5, 0.0, 1.0, 0.0, 3.0), -1);
    }

    #[test]
    fn test_linear_map_does_not_clamp() {
        assert_eq!(linear_map(2.0, 0.0, 1.0, 0.0, 100.0), 200);
        assert_eq!(linear_map(-1.0, 0.0, 1.0, 0.0, 100.0), -100);
    }

    // ==================== corrected_analog Tests ====================

    #[test]
    fn test_corrected_analog_inside_deadzone() {
        for x in [0.0, 0.05, -0.05, 0.099, -0.099] {
            assert_eq!(corrected_analog(x, DEADZONE), NEUTRAL, "x = {}", x);
        }
    }

    #[test]
    fn test_corrected_analog_full_deflection() {
        assert_eq!(corrected_analog(-1.0, DEADZONE), 255);
        assert_eq!(corrected_analog(1.0, DEADZONE), 0);
    }

    #[test]
    fn test_corrected_analog_half_up() {
        // 255 + 0.5 * (128 - 255) = 191.5
        assert_eq!(corrected_analog(-0.5, DEADZONE), 191);
    }

    #[test]
    fn test_corrected_analog_half_down() {
        // 128 - 0.5 * 128 = 64
        assert_eq!(corrected_analog(0.5, DEADZONE), 64);
    }

    #[test]
    fn test_corrected_analog_jumps_at_deadzone_edge() {
        // Pivot is 0.0, so the edge value is not neutral
        assert_eq!(corrected_analog(0.1, DEADZONE), 115);
        assert_eq!(corrected_analog(-0.1, DEADZONE), 140);
    }

    #[test]
    fn test_corrected_analog_zero_deadzone() {
        assert_eq!(corrected_analog(0.0, 0.0), 128);
    }

    #[test]
    fn test_corrected_analog_out_of_range_input_clamped() {
        assert_eq!(corrected_analog(-1.5, DEADZONE), CHANNEL_MAX);
        assert_eq!(corrected_analog(1.5, DEADZONE), CHANNEL_MIN);
    }

    // ==================== gated_analog Tests ====================

    #[test]
    fn test_gated_analog_edge_is_neutral() {
        assert_eq!(gated_analog(0.1, DEADZONE), NEUTRAL);
        assert_eq!(gated_analog(-0.1, DEADZONE), NEUTRAL);
    }

    #[test]
    fn test_gated_analog_matches_corrected_outside_deadzone() {
        for x in [-1.0, -0.5, -0.11, 0.11, 0.5, 1.0] {
            assert_eq!(gated_analog(x, DEADZONE), corrected_analog(x, DEADZONE));
        }
    }

    // ==================== to_channel Tests ====================

    #[test]
    fn test_to_channel() {
        assert_eq!(to_channel(-3), 0);
        assert_eq!(to_channel(128), 128);
        assert_eq!(to_channel(300), 255);
    }
}
