//! # Rover Link Library
//!
//! Drive a rover and its arm from a gamepad over UDP.
//!
//! This library turns gamepad stick and button state into fixed-format text
//! packets (`D_...` for the drive train, `A_...` for the arm) and sends each
//! packet once, only when it differs from the previous one.

pub mod config;
pub mod error;
pub mod controller;
pub mod link;
pub mod rover;
pub mod telemetry;
