//! File sink: appends decoded events as JSON lines

use super::{encode_event, Sink};
use crate::sia::event::SiaEvent;
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends one timestamped JSON line per event to a log file.
///
/// On a write failure the file is reopened and the write retried exactly
/// once; a second failure is reported as message loss.
pub struct FileSink {
    path: PathBuf,
    file: Option<File>,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let file = match Self::open(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                log::warn!("FileSink: cannot open {}: {}", path.display(), e);
                None
            }
        };
        Self { path, file }
    }

    fn open(path: &Path) -> std::io::Result<File> {
        OpenOptions::new().create(true).append(true).open(path)
    }

    fn try_write(&mut self, line: &str) -> std::io::Result<()> {
        let file = match self.file {
            Some(ref mut file) => file,
            None => self.file.insert(Self::open(&self.path)?),
        };
        file.write_all(line.as_bytes())?;
        file.flush()
    }
}

impl Sink for FileSink {
    fn write(&mut self, event: &SiaEvent) -> bool {
        let line = format!(
            "{} {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            encode_event(event)
        );

        if let Err(e) = self.try_write(&line) {
            log::warn!(
                "FileSink: write to {} failed ({}), reopening and retrying",
                self.path.display(),
                e
            );
            self.file = None;
            if let Err(e) = self.try_write(&line) {
                log::error!(
                    "FileSink: message lost, write to {} failed twice: {}",
                    self.path.display(),
                    e
                );
                return false;
            }
        }
        true
    }

    fn name(&self) -> &'static str {
        "File output"
    }

    fn description(&self) -> &'static str {
        "Append events to a file in JSON lines format"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sia::block::{FunctionCode, SiaBlock};
    use crate::sia::event::lookup_event_code;

    fn event() -> SiaEvent {
        SiaEvent {
            raw: SiaBlock::new(FunctionCode::NewEvent, b"CL1"),
            account_id: 9,
            code: lookup_event_code("CL").unwrap(),
            date: None,
            time: None,
            subscriber_id: None,
            area_id: Some(1),
            peripheral_id: None,
            automated_id: None,
            telephone_id: None,
            level: None,
            value: None,
            path: None,
            route_group: None,
            sub_subscriber: None,
            address_number: Some(1),
            units: None,
            units_type: None,
            ascii: None,
        }
    }

    #[test]
    fn test_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");
        let mut sink = FileSink::new(&path);

        assert!(sink.write(&event()));
        assert!(sink.write(&event()));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        // Timestamp prefix, then a JSON object
        let json_part = lines[0].splitn(3, ' ').nth(2).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(json_part).unwrap();
        assert_eq!(parsed["EventCode"], "CL");
    }

    #[test]
    fn test_reopens_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");
        let mut sink = FileSink::new(&path);
        assert!(sink.write(&event()));

        // Simulate a dead handle; the sink must reopen and retry
        sink.file = None;
        assert!(sink.write(&event()));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn test_unwritable_path_reports_loss() {
        let mut sink = FileSink::new("/nonexistent-dir/events.log");
        assert!(!sink.write(&event()));
    }
}
