//! # Rover Module
//!
//! Rover-side command model.
//!
//! This module handles:
//! - Mapping stick positions to 0-255 channel values with a deadzone
//! - Drive (`D_...`) and arm (`A_...`) packet layouts
//! - The per-tick control loop with mode toggling and change-only sending

pub mod control;
pub mod mapping;
pub mod packet;
