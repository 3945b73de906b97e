//! # Input Sampler Module
//!
//! Folds raw evdev events from the gamepad into a per-tick [`DeviceState`]
//! snapshot.
//!
//! ## Axis Indices (EV_ABS)
//!
//! | Index | Default code | `z_rz` layout | Description |
//! |-------|--------------|---------------|-------------|
//! | 0 | ABS_X | ABS_X | Left stick X |
//! | 1 | ABS_Y | ABS_Y | Left stick Y (up = negative) |
//! | 2 | ABS_RX | ABS_Z | Right stick X |
//! | 3 | ABS_RY | ABS_RZ | Right stick Y (up = negative) |
//!
//! ## Button Indices (EV_KEY)
//!
//! | Index | evdev Code | PlayStation label |
//! |-------|------------|-------------------|
//! | 0 | BTN_SOUTH | Cross (×) |
//! | 1 | BTN_EAST | Circle (○) |
//! | 2 | BTN_WEST | Square (□) |
//! | 3 | BTN_NORTH | Triangle (△) |
//!
//! Axes and buttons are tracked as level state. Button-down transitions are
//! also queued as presses and handed out once by [`InputSampler::sample`], so
//! a held button (including kernel autorepeat) yields a single press.
//!
//! ## Usage
//!
//! ```no_run
//! use rover_link::controller::gamepad::Gamepad;
//! use rover_link::controller::sampler::{InputSampler, RightStickLayout};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let gamepad = Gamepad::open()?;
//!     let layout = RightStickLayout::default();
//!     let mut sampler = InputSampler::with_ranges(layout, gamepad.axis_ranges(layout));
//!     let mut events = gamepad.into_event_stream()?;
//!
//!     loop {
//!         let event = events.next_event().await?;
//!         sampler.process_event(&event);
//!         let state = sampler.sample();
//!         // Build a packet from state...
//!     }
//! }
//! ```

use evdev::{AbsoluteAxisType, InputEvent, InputEventKind, Key};
use serde::Deserialize;

/// Number of sampled analog axes.
pub const AXIS_COUNT: usize = 4;

/// Number of sampled buttons.
pub const BUTTON_COUNT: usize = 4;

/// Default raw axis minimum (8-bit sticks).
pub const AXIS_MIN: i32 = 0;
/// Default raw axis maximum (8-bit sticks).
pub const AXIS_MAX: i32 = 255;

/// Axis indices for semantic access.
pub mod axes {
    pub const LEFT_X: usize = 0;
    pub const LEFT_Y: usize = 1;
    pub const RIGHT_X: usize = 2;
    pub const RIGHT_Y: usize = 3;
}

/// Button indices for semantic access.
pub mod buttons {
    pub const CROSS: usize = 0;
    pub const CIRCLE: usize = 1;
    pub const SQUARE: usize = 2;
    pub const TRIANGLE: usize = 3;
}

/// evdev key codes, indexed by button index.
const BUTTON_CODES: [Key; BUTTON_COUNT] = [
    Key::BTN_SOUTH,
    Key::BTN_EAST,
    Key::BTN_WEST,
    Key::BTN_NORTH,
];

/// Key event value for a fresh press (1 = press, 2 = autorepeat, 0 = release).
const KEY_PRESSED: i32 = 1;

/// Where the controller reports its right stick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RightStickLayout {
    /// ABS_RX / ABS_RY (Linux gamepad convention, Xbox pads, hid-playstation).
    #[default]
    RxRy,
    /// ABS_Z / ABS_RZ (older DualShock drivers and many generic pads).
    ZRz,
}

impl RightStickLayout {
    /// evdev axis codes, indexed by axis index.
    #[must_use]
    pub fn codes(self) -> [AbsoluteAxisType; AXIS_COUNT] {
        match self {
            RightStickLayout::RxRy => [
                AbsoluteAxisType::ABS_X,
                AbsoluteAxisType::ABS_Y,
                AbsoluteAxisType::ABS_RX,
                AbsoluteAxisType::ABS_RY,
            ],
            RightStickLayout::ZRz => [
                AbsoluteAxisType::ABS_X,
                AbsoluteAxisType::ABS_Y,
                AbsoluteAxisType::ABS_Z,
                AbsoluteAxisType::ABS_RZ,
            ],
        }
    }
}

/// Raw value range reported by the stick axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
}

impl Default for AxisRange {
    fn default() -> Self {
        Self {
            min: AXIS_MIN,
            max: AXIS_MAX,
        }
    }
}

impl AxisRange {
    /// Range from reported limits, or `None` if the span is empty.
    #[must_use]
    pub fn from_limits(min: i32, max: i32) -> Option<Self> {
        (min < max).then_some(Self { min, max })
    }

    /// Scales a raw reading to -1.0..=1.0.
    #[must_use]
    pub fn normalize(&self, raw: i32) -> f64 {
        let center = (f64::from(self.min) + f64::from(self.max)) / 2.0;
        let half_span = (f64::from(self.max) - f64::from(self.min)) / 2.0;
        ((f64::from(raw) - center) / half_span).clamp(-1.0, 1.0)
    }
}

/// Per-axis ranges for `layout`, looked up through `limits`.
///
/// Axes whose reported limits are unusable fall back to the 8-bit default.
#[must_use]
pub fn axis_ranges<F>(layout: RightStickLayout, limits: F) -> [AxisRange; AXIS_COUNT]
where
    F: Fn(AbsoluteAxisType) -> (i32, i32),
{
    layout.codes().map(|code| {
        let (min, max) = limits(code);
        AxisRange::from_limits(min, max).unwrap_or_default()
    })
}

/// Snapshot of the gamepad for one control tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceState {
    /// Normalized stick positions (-1.0 to 1.0), indexed by [`axes`].
    pub axes: [f64; AXIS_COUNT],
    /// Held buttons, indexed by [`buttons`].
    pub buttons: [bool; BUTTON_COUNT],
    /// Button indices pressed since the previous snapshot, oldest first.
    pub presses: Vec<usize>,
}

impl DeviceState {
    /// Position of an axis, or 0.0 for an unknown index.
    #[must_use]
    pub fn axis(&self, index: usize) -> f64 {
        self.axes.get(index).copied().unwrap_or(0.0)
    }

    /// Whether a button is held; unknown indices read as released.
    #[must_use]
    pub fn button(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }

    /// Number of presses of `index` since the previous snapshot.
    #[must_use]
    pub fn press_count(&self, index: usize) -> usize {
        self.presses.iter().filter(|&&pressed| pressed == index).count()
    }
}

/// Accumulates evdev events between ticks.
///
/// # Thread Safety
///
/// `InputSampler` is not thread-safe. Use from a single task/thread only.
#[derive(Debug)]
pub struct InputSampler {
    axis_codes: [AbsoluteAxisType; AXIS_COUNT],
    ranges: [AxisRange; AXIS_COUNT],
    axes: [f64; AXIS_COUNT],
    buttons: [bool; BUTTON_COUNT],
    presses: Vec<usize>,
}

impl Default for InputSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSampler {
    /// Creates a sampler for the default layout and 8-bit axis range.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ranges(RightStickLayout::default(), [AxisRange::default(); AXIS_COUNT])
    }

    /// Creates a sampler for a right-stick layout and per-axis raw ranges.
    #[must_use]
    pub fn with_ranges(layout: RightStickLayout, ranges: [AxisRange; AXIS_COUNT]) -> Self {
        Self {
            axis_codes: layout.codes(),
            ranges,
            axes: [0.0; AXIS_COUNT],
            buttons: [false; BUTTON_COUNT],
            presses: Vec::new(),
        }
    }

    /// Processes a single evdev input event.
    ///
    /// Sync events, unmapped axes and unmapped keys are ignored.
    pub fn process_event(&mut self, event: &InputEvent) {
        match event.kind() {
            InputEventKind::AbsAxis(axis) => {
                if let Some(index) = self.axis_codes.iter().position(|&code| code == axis) {
                    self.axes[index] = self.ranges[index].normalize(event.value());
                }
            }
            InputEventKind::Key(key) => {
                if let Some(index) = BUTTON_CODES.iter().position(|&code| code == key) {
                    self.process_key(index, event.value());
                }
            }
            _ => {}
        }
    }

    fn process_key(&mut self, index: usize, value: i32) {
        if value == KEY_PRESSED && !self.buttons[index] {
            self.presses.push(index);
        }
        self.buttons[index] = value != 0;
    }

    /// Returns the current state and drains the queued presses.
    pub fn sample(&mut self) -> DeviceState {
        DeviceState {
            axes: self.axes,
            buttons: self.buttons,
            presses: std::mem::take(&mut self.presses),
        }
    }
}
