use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::PomoError;
use crate::session::SessionKind;
use crate::stats::SessionStats;
use crate::util::serialize_duration;

/// Payload attached to an info entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InfoDetails {
    Session {
        #[serde(rename = "type")]
        kind: SessionKind,
        #[serde(serialize_with = "serialize_duration")]
        duration: Duration,
    },
    Cycle {
        cycle: u64,
    },
    Shutdown {
        sessions_completed: usize,
        total_sessions: usize,
    },
    Stats(SessionStats),
}

/// One line of the log file
#[derive(Debug, Serialize)]
#[serde(tag = "level", rename_all = "lowercase")]
pub enum LogEvent<'a> {
    Info {
        timestamp: String,
        message: &'a str,
        details: &'a InfoDetails,
    },
    Error {
        timestamp: String,
        error: String,
        code: u16,
        details: Value,
    },
}

#[derive(Debug)]
struct LogFile {
    path: PathBuf,
    file: File,
}

/// Append-only JSON-lines event sink. Logging never fails the caller.
#[derive(Debug, Default)]
pub struct EventLog {
    sink: Option<LogFile>,
}

impl EventLog {
    /// Opens (or creates) `path` for appending.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PomoError> {
        let path = path.as_ref().to_path_buf();
        let log_write = |e: std::io::Error| PomoError::LogWrite {
            path: path.clone(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(log_write)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(log_write)?;

        Ok(Self {
            sink: Some(LogFile { path, file }),
        })
    }

    /// No destination: info entries are dropped and errors go to stderr.
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.sink.as_ref().map(|s| s.path.as_path())
    }

    pub fn log_info(&self, message: &str, details: InfoDetails) {
        if self.sink.is_none() {
            return;
        }
        self.write(&LogEvent::Info {
            timestamp: now_timestamp(),
            message,
            details: &details,
        });
    }

    pub fn log_error(&self, err: &PomoError) {
        self.write(&LogEvent::Error {
            timestamp: now_timestamp(),
            error: err.to_string(),
            code: err.code() as u16,
            details: err.details(),
        });
    }

    fn write(&self, event: &LogEvent) {
        let mut line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                eprintln!("failed to serialize log entry: {}", e);
                return;
            }
        };
        line.push('\n');

        match &self.sink {
            Some(sink) => {
                let mut file = &sink.file;
                if let Err(e) = file.write_all(line.as_bytes()).and_then(|_| file.sync_all()) {
                    eprintln!("failed to write log entry to {}: {}", sink.path.display(), e);
                }
            }
            None => {
                if matches!(event, LogEvent::Error { .. }) {
                    eprint!("{}", line);
                }
            }
        }
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NumberProblem;
    use tempfile::tempdir;

    fn read_lines(path: &Path) -> Vec<Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_info_entry_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pomo.log");
        let log = EventLog::open(&path).unwrap();

        log.log_info(
            "Session completed",
            InfoDetails::Session {
                kind: SessionKind::Work,
                duration: Duration::from_secs(25 * 60),
            },
        );

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 1);
        let entry = &lines[0];
        assert_eq!(entry["level"], "info");
        assert_eq!(entry["message"], "Session completed");
        assert_eq!(entry["details"]["type"], "Work");
        assert_eq!(entry["details"]["duration"], "25m0s");
        assert!(chrono::DateTime::parse_from_rfc3339(entry["timestamp"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_error_entry_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pomo.log");
        let log = EventLog::open(&path).unwrap();

        log.log_error(&PomoError::InvalidNumber {
            field: "work_time",
            provided: "0".to_string(),
            problem: NumberProblem::NotPositive,
        });

        let entry = &read_lines(&path)[0];
        assert_eq!(entry["level"], "error");
        assert_eq!(entry["error"], "work_time must be positive");
        assert_eq!(entry["code"], 1002);
        assert_eq!(entry["details"]["field"], "work_time");
        assert_eq!(entry["details"]["reason"], "not_positive");
        assert!(entry.get("message").is_none());
    }

    #[test]
    fn test_appends_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("pomo.log");

        EventLog::open(&path)
            .unwrap()
            .log_info("Starting pomodoro cycle", InfoDetails::Cycle { cycle: 1 });
        EventLog::open(&path)
            .unwrap()
            .log_info("Starting pomodoro cycle", InfoDetails::Cycle { cycle: 2 });

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["details"]["cycle"], 1);
        assert_eq!(lines[1]["details"]["cycle"], 2);
    }

    #[test]
    fn test_stats_details_are_flattened() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pomo.log");
        let log = EventLog::open(&path).unwrap();

        log.log_info("Session manager closing", InfoDetails::Stats(SessionStats::default()));

        let entry = &read_lines(&path)[0];
        assert_eq!(entry["details"]["total_sessions"], 0);
        assert_eq!(entry["details"]["total_work_time"], "0s");
    }

    #[test]
    fn test_open_fails_on_directory() {
        let dir = tempdir().unwrap();
        let err = EventLog::open(dir.path()).unwrap_err();
        assert!(matches!(err, PomoError::LogWrite { .. }));
    }

    #[test]
    fn test_disabled_log_has_no_path() {
        let log = EventLog::disabled();
        assert!(log.path().is_none());
        // dropped silently
        log.log_info("Session started", InfoDetails::Cycle { cycle: 1 });
    }
}
