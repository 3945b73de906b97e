//! # Telemetry Module
//!
//! Handles packet logging to JSONL files with rotation.
//!
//! This module handles:
//! - Formatting transmitted packets as JSONL (JSON Lines)
//! - Writing to rotating log files
//! - Managing file rotation (max N records per file)
//! - Retaining only last M files

pub mod logger;
