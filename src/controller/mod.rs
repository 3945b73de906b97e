//! # Controller Module
//!
//! Gamepad input handling.
//!
//! This module handles:
//! - Gamepad detection and connection via evdev
//! - Folding stick and button events into per-tick snapshots
//! - Button-down edge detection for the mode toggle

pub mod gamepad;
pub mod sampler;
