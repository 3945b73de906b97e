//! # Gamepad Module
//!
//! Finds and opens the gamepad using the Linux evdev interface.
//!
//! ## Controller Detection
//!
//! The first `/dev/input/event*` device (in path order) is used if it reports:
//! - Key: BTN_SOUTH (a face button)
//! - Absolute axis: ABS_X (an analog stick)
//!
//! Keyboards, mice and touchpads lack one or the other and are skipped.

use evdev::{AbsoluteAxisType, Device, Key};
use std::path::Path;
use tracing::{debug, info, warn};

use super::sampler::{axis_ranges, AxisRange, RightStickLayout, AXIS_COUNT, AXIS_MAX, AXIS_MIN};
use crate::error::{Result, RoverLinkError};

/// Directory scanned for input devices.
const INPUT_DIR: &str = "/dev/input";

/// Gamepad handle
///
/// Represents an open evdev gamepad device.
pub struct Gamepad {
    device: Device,
    device_path: String,
}

impl std::fmt::Debug for Gamepad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gamepad")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl Gamepad {
    /// Detect and open the first available gamepad
    ///
    /// # Errors
    ///
    /// - `ControllerNotFound`: No gamepad-like device could be opened
    /// - `Controller`: `/dev/input` is missing or unreadable
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rover_link::controller::gamepad::Gamepad;
    ///
    /// let gamepad = Gamepad::open()?;
    /// println!("Connected to gamepad at: {}", gamepad.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open() -> Result<Self> {
        let input_dir = Path::new(INPUT_DIR);

        if !input_dir.exists() {
            return Err(RoverLinkError::Controller(format!(
                "{} directory not found",
                INPUT_DIR
            )));
        }

        let mut entries: Vec<_> = std::fs::read_dir(input_dir)
            .map_err(|e| {
                RoverLinkError::Controller(format!("Failed to read {}: {}", INPUT_DIR, e))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                RoverLinkError::Controller(format!("Failed to read directory entry: {}", e))
            })?;

        // Sorted so "first" is deterministic
        entries.sort_by_key(|entry| entry.path());

        for entry in entries {
            let path = entry.path();

            let is_event_node = path
                .file_name()
                .map(|name| name.to_string_lossy().starts_with("event"))
                .unwrap_or(false);
            if !is_event_node {
                continue;
            }

            match Device::open(&path) {
                Ok(device) => {
                    debug!(
                        "Found input device: {} ({})",
                        path.display(),
                        device.name().unwrap_or("unnamed")
                    );

                    if is_gamepad(&device) {
                        let device_path = path.to_string_lossy().to_string();
                        info!("Found gamepad at: {}", device_path);
                        return Ok(Gamepad {
                            device,
                            device_path,
                        });
                    }
                }
                Err(e) => {
                    // Permission denied or other errors - skip device
                    debug!("Could not open {}: {}", path.display(), e);
                }
            }
        }

        Err(RoverLinkError::ControllerNotFound)
    }

    /// Open a specific event device
    ///
    /// The device is not checked for gamepad capabilities.
    ///
    /// # Errors
    ///
    /// Returns `Controller` error if the device cannot be opened.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let device = Device::open(path).map_err(|e| {
            RoverLinkError::Controller(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let device_path = path.to_string_lossy().to_string();
        info!("Opened gamepad at: {}", device_path);
        Ok(Gamepad {
            device,
            device_path,
        })
    }

    /// Get the device path of this gamepad
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Get gamepad name from evdev
    pub fn name(&self) -> Option<&str> {
        self.device.name()
    }

    /// Raw ranges of the sampled axes, as reported by the device
    ///
    /// Axes the device does not report fall back to 0..255. If the absolute
    /// axis state cannot be read at all, every axis uses that default.
    pub fn axis_ranges(&self, layout: RightStickLayout) -> [AxisRange; AXIS_COUNT] {
        match self.device.get_abs_state() {
            Ok(abs_state) => {
                let ranges = axis_ranges(layout, |code| {
                    abs_state
                        .get(usize::from(code.0))
                        .map_or((0, 0), |info| (info.minimum, info.maximum))
                });
                debug!("Axis ranges for {}: {:?}", self.device_path, ranges);
                ranges
            }
            Err(e) => {
                warn!(
                    "Could not read axis ranges from {}: {}; assuming {}..{}",
                    self.device_path, e, AXIS_MIN, AXIS_MAX
                );
                [AxisRange::default(); AXIS_COUNT]
            }
        }
    }

    /// Convert into an async event stream for use inside the tokio runtime
    ///
    /// # Errors
    ///
    /// Returns `Controller` error if the device cannot be switched to non-blocking mode.
    pub fn into_event_stream(self) -> Result<evdev::EventStream> {
        let Gamepad {
            device,
            device_path,
        } = self;
        device.into_event_stream().map_err(|e| {
            RoverLinkError::Controller(format!(
                "Failed to stream events from {}: {}",
                device_path, e
            ))
        })
    }
}

/// Returns true if the device has a face button and an analog stick.
fn is_gamepad(device: &Device) -> bool {
    let has_face_button = device
        .supported_keys()
        .map_or(false, |keys| keys.contains(Key::BTN_SOUTH));
    let has_stick = device
        .supported_absolute_axes()
        .map_or(false, |axes| axes.contains(AbsoluteAxisType::ABS_X));
    has_face_button && has_stick
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_dir() {
        assert_eq!(INPUT_DIR, "/dev/input");
    }

    #[test]
    fn test_open_path_missing_device() {
        let result = Gamepad::open_path("/dev/input/nonexistent_event_device_12345");

        match result {
            Err(RoverLinkError::Controller(msg)) => {
                assert!(msg.contains("nonexistent_event_device_12345"));
                assert!(msg.contains("Failed to open"));
            }
            other => panic!("Expected Controller error, got: {:?}", other),
        }
    }

    // Integration test - only runs with real hardware
    #[test]
    #[ignore]
    fn test_open_with_real_hardware() {
        // This test requires a connected gamepad
        let result = Gamepad::open();
        assert!(result.is_ok(), "Should detect connected gamepad");

        let gamepad = result.unwrap();
        assert!(gamepad.device_path().starts_with("/dev/input/event"));
        assert!(gamepad.name().is_some());
    }

    // Integration test - only runs with real hardware
    #[test]
    #[ignore]
    fn test_axis_ranges_with_real_hardware() {
        let gamepad = Gamepad::open().expect("Gamepad not found");

        for range in gamepad.axis_ranges(RightStickLayout::default()) {
            assert!(range.min < range.max);
        }
    }

    // Integration test - only runs with real hardware
    #[tokio::test]
    #[ignore]
    async fn test_event_stream_with_real_hardware() {
        let gamepad = Gamepad::open().expect("Gamepad not found");
        let mut events = gamepad.into_event_stream().expect("Failed to stream events");

        println!("Move the sticks or press buttons...");

        let event = events.next_event().await.expect("Failed to read event");
        println!("Received event: {:?}", event);
    }
}
