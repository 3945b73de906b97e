//! # Packet Logger
//!
//! Appends every transmitted packet to rotating JSONL files.
//!
//! ## Record Format
//!
//! ```text
//! {"timestamp":"2024-05-01T12:00:00.123456789+00:00","mode":"drive","packet":"D_255_255_255_128_128_128"}
//! ```
//!
//! ## Rotation
//!
//! A new file `packets_<YYYYmmdd_HHMMSS>_<NNNN>.jsonl` is started after
//! `max_records_per_file` records. Only the newest `max_files_to_keep` files
//! are retained.

use chrono::Utc;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::rover::packet::Mode;

const FILE_PREFIX: &str = "packets_";
const FILE_EXTENSION: &str = ".jsonl";

/// One line of the packet log.
#[derive(Debug, Serialize)]
struct PacketRecord<'a> {
    timestamp: String,
    mode: Mode,
    packet: &'a str,
}

/// Rotating JSONL packet log.
#[derive(Debug)]
pub struct PacketLogger {
    log_dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    file: Option<File>,
    current_path: Option<PathBuf>,
    records_in_file: usize,
    file_index: u32,
}

impl PacketLogger {
    /// Creates the log directory if needed. No file is opened until the first
    /// record.
    ///
    /// # Errors
    ///
    /// Returns `Io` error if the directory cannot be created.
    pub fn new<P: AsRef<Path>>(
        log_dir: P,
        max_records_per_file: usize,
        max_files_to_keep: usize,
    ) -> Result<Self> {
        let log_dir = log_dir.as_ref().to_path_buf();
        fs::create_dir_all(&log_dir)?;

        Ok(Self {
            log_dir,
            max_records_per_file: max_records_per_file.max(1),
            max_files_to_keep: max_files_to_keep.max(1),
            file: None,
            current_path: None,
            records_in_file: 0,
            file_index: 0,
        })
    }

    /// Path of the file currently being written, if any.
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// Appends one packet record, rotating first if the current file is full.
    ///
    /// # Errors
    ///
    /// Returns `Io` error on any file system failure.
    pub fn log(&mut self, mode: Mode, packet: &str) -> Result<()> {
        if self.file.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        let record = PacketRecord {
            timestamp: Utc::now().to_rfc3339(),
            mode,
            packet,
        };
        let line = serde_json::to_string(&record).map_err(std::io::Error::from)?;

        if let Some(file) = self.file.as_mut() {
            writeln!(file, "{}", line)?;
            self.records_in_file += 1;
        }

        Ok(())
    }

    fn rotate(&mut self) -> Result<()> {
        let name = format!(
            "{}{}_{:04}{}",
            FILE_PREFIX,
            Utc::now().format("%Y%m%d_%H%M%S"),
            self.file_index,
            FILE_EXTENSION
        );
        let path = self.log_dir.join(name);
        self.file_index += 1;

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!("Packet log rotated to {}", path.display());

        self.file = Some(file);
        self.current_path = Some(path);
        self.records_in_file = 0;

        self.prune()
    }

    /// Removes the oldest log files beyond `max_files_to_keep`.
    fn prune(&self) -> Result<()> {
        let mut files = self.log_files()?;
        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for path in files.into_iter().take(excess) {
            debug!("Removing old packet log {}", path.display());
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn log_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.log_dir)? {
            let path = entry?.path();
            let is_log = path
                .file_name()
                .map(|name| {
                    let name = name.to_string_lossy();
                    name.starts_with(FILE_PREFIX) && name.ends_with(FILE_EXTENSION)
                })
                .unwrap_or(false);
            if is_log {
                files.push(path);
            }
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_new_creates_directory() {
        let dir = TempDir::new().unwrap();
        let log_dir = dir.path().join("nested").join("logs");

        let logger = PacketLogger::new(&log_dir, 10, 2).unwrap();
        assert!(log_dir.is_dir());
        assert!(logger.current_path().is_none());
    }

    #[test]
    fn test_log_writes_jsonl_record() {
        let dir = TempDir::new().unwrap();
        let mut logger = PacketLogger::new(dir.path(), 10, 2).unwrap();

        logger.log(Mode::Drive, "D_255_255_255_128_128_128").unwrap();
        logger.log(Mode::Arm, "A_128_128_128_255_128_128").unwrap();

        let lines = read_lines(logger.current_path().unwrap());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["mode"], "drive");
        assert_eq!(lines[0]["packet"], "D_255_255_255_128_128_128");
        assert_eq!(lines[1]["mode"], "arm");
        assert!(lines[1]["timestamp"].is_string());
    }

    #[test]
    fn test_rotation_after_max_records() {
        let dir = TempDir::new().unwrap();
        let mut logger = PacketLogger::new(dir.path(), 2, 10).unwrap();

        for _ in 0..5 {
            logger.log(Mode::Drive, "D_128_128_128_128_128_128").unwrap();
        }

        let files = logger.log_files().unwrap();
        assert_eq!(files.len(), 3);
        assert_eq!(read_lines(logger.current_path().unwrap()).len(), 1);
    }

    #[test]
    fn test_prune_keeps_newest_files() {
        let dir = TempDir::new().unwrap();
        let mut logger = PacketLogger::new(dir.path(), 1, 2).unwrap();

        logger.log(Mode::Drive, "D_1_1_1_1_1_1").unwrap();
        logger.log(Mode::Drive, "D_2_2_2_2_2_2").unwrap();
        logger.log(Mode::Drive, "D_3_3_3_3_3_3").unwrap();

        let mut files = logger.log_files().unwrap();
        files.sort();
        assert_eq!(files.len(), 2);

        let packets: Vec<String> = files
            .iter()
            .map(|path| read_lines(path)[0]["packet"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(packets, vec!["D_2_2_2_2_2_2", "D_3_3_3_3_3_3"]);
    }

    #[test]
    fn test_foreign_files_are_left_alone() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

        let mut logger = PacketLogger::new(dir.path(), 1, 1).unwrap();
        logger.log(Mode::Drive, "D_1_1_1_1_1_1").unwrap();
        logger.log(Mode::Drive, "D_2_2_2_2_2_2").unwrap();

        assert!(dir.path().join("notes.txt").exists());
        assert_eq!(logger.log_files().unwrap().len(), 1);
    }

    #[test]
    fn test_zero_limits_are_raised_to_one() {
        let dir = TempDir::new().unwrap();
        let mut logger = PacketLogger::new(dir.path(), 0, 0).unwrap();

        logger.log(Mode::Arm, "A_1_1_1_1_1_1").unwrap();
        assert_eq!(logger.log_files().unwrap().len(), 1);
    }
}
