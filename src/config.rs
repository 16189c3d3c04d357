use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_dirs::AppDirs;
use crate::error::{NumberProblem, PomoError, VALID_FLAGS};
use crate::session::SessionKind;

pub const MAX_SESSION_DURATION: Duration = Duration::from_secs(12 * 60 * 60);
pub const MAX_TIME_VALUE: u32 = 999;
pub const DEFAULT_PROGRESS_BAR_WIDTH: usize = 30;
pub const HOURS_FLAG: &str = VALID_FLAGS[0];

/// Immutable timer settings for the life of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub work_duration: Duration,
    pub break_duration: Duration,
    pub progress_bar_width: usize,
    pub max_session_duration: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            work_duration: Duration::from_secs(25 * 60),
            break_duration: Duration::from_secs(5 * 60),
            progress_bar_width: DEFAULT_PROGRESS_BAR_WIDTH,
            max_session_duration: MAX_SESSION_DURATION,
        }
    }
}

impl EngineConfig {
    pub fn duration_for(&self, kind: SessionKind) -> Duration {
        match kind {
            SessionKind::Work => self.work_duration,
            SessionKind::Break => self.break_duration,
        }
    }

    pub fn with_progress_bar_width(self, progress_bar_width: usize) -> Self {
        Self {
            progress_bar_width,
            ..self
        }
    }
}

/// Unit the two numeric arguments are counted in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Minutes,
    Hours,
}

impl TimeUnit {
    pub fn duration(&self, value: u32) -> Duration {
        let secs = match self {
            TimeUnit::Minutes => 60,
            TimeUnit::Hours => 60 * 60,
        };
        Duration::from_secs(u64::from(value) * secs)
    }
}

/// Resolves `<work_time> <break_time> [-h]` (program name excluded) into a config.
pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Result<EngineConfig, PomoError> {
    let defaults = EngineConfig::default();

    if !(2..=3).contains(&args.len()) {
        return Err(PomoError::InvalidArguments {
            provided: args.len(),
        });
    }

    let unit = match args.get(2).map(|s| AsRef::<str>::as_ref(s)) {
        None => TimeUnit::Minutes,
        Some(flag) if flag == HOURS_FLAG => TimeUnit::Hours,
        Some(flag) => {
            return Err(PomoError::InvalidFlag {
                flag: flag.to_string(),
            })
        }
    };

    let work_time = parse_time_arg(AsRef::<str>::as_ref(&args[0]), "work_time")?;
    let break_time = parse_time_arg(AsRef::<str>::as_ref(&args[1]), "break_time")?;

    let work_duration = checked_duration(SessionKind::Work, unit.duration(work_time), &defaults)?;
    let break_duration =
        checked_duration(SessionKind::Break, unit.duration(break_time), &defaults)?;

    Ok(EngineConfig {
        work_duration,
        break_duration,
        ..defaults
    })
}

fn parse_time_arg(arg: &str, field: &'static str) -> Result<u32, PomoError> {
    let invalid = |problem| PomoError::InvalidNumber {
        field,
        provided: arg.to_string(),
        problem,
    };

    let value: i64 = arg
        .parse()
        .map_err(|_| invalid(NumberProblem::NotAnInteger))?;

    if value <= 0 {
        return Err(invalid(NumberProblem::NotPositive));
    }
    if value > i64::from(MAX_TIME_VALUE) {
        return Err(invalid(NumberProblem::TooLarge {
            max_allowed: MAX_TIME_VALUE,
        }));
    }

    Ok(value as u32)
}

fn checked_duration(
    kind: SessionKind,
    requested: Duration,
    config: &EngineConfig,
) -> Result<Duration, PomoError> {
    if requested > config.max_session_duration {
        return Err(PomoError::InvalidDuration {
            kind,
            max_allowed: config.max_session_duration,
            requested,
        });
    }
    Ok(requested)
}

/// Optional settings file; every field may be omitted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Preferences {
    pub progress_bar_width: usize,
    pub log_file: Option<PathBuf>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            progress_bar_width: DEFAULT_PROGRESS_BAR_WIDTH,
            log_file: None,
        }
    }
}

pub trait PreferencesStore {
    fn load(&self) -> Result<Preferences, PomoError>;
}

#[derive(Debug, Clone)]
pub struct FilePreferencesStore {
    path: PathBuf,
}

impl FilePreferencesStore {
    /// `POMO_CONFIG` overrides the platform config location.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = std::env::var_os("POMO_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(AppDirs::preferences_path);
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferencesStore for FilePreferencesStore {
    /// A missing file yields defaults; an unreadable or malformed one is an error.
    fn load(&self) -> Result<Preferences, PomoError> {
        let config_load = |message: String| PomoError::ConfigLoad {
            path: self.path.clone(),
            message,
        };

        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Preferences::default()),
            Err(e) => return Err(config_load(e.to_string())),
        };

        serde_json::from_slice::<Preferences>(&bytes).map_err(|e| config_load(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_minutes_pair() {
        let config = parse_args(&["25", "5"]).unwrap();
        assert_eq!(config.work_duration, Duration::from_secs(25 * 60));
        assert_eq!(config.break_duration, Duration::from_secs(5 * 60));
        assert_eq!(config.progress_bar_width, DEFAULT_PROGRESS_BAR_WIDTH);
        assert_eq!(config.max_session_duration, MAX_SESSION_DURATION);
    }

    #[test]
    fn test_hours_flag() {
        let config = parse_args(&["1", "1", "-h"]).unwrap();
        assert_eq!(config.work_duration, Duration::from_secs(3600));
        assert_eq!(config.break_duration, Duration::from_secs(3600));
    }

    #[test]
    fn test_valid_values_scale_by_unit() {
        for value in [1u32, 2, 59, 60, 500, 720] {
            let arg = value.to_string();
            let config = parse_args(&[arg.as_str(), "1"]).unwrap();
            assert_eq!(config.work_duration, TimeUnit::Minutes.duration(value));
        }
        for value in [1u32, 6, 12] {
            let arg = value.to_string();
            let config = parse_args(&["1", arg.as_str(), "-h"]).unwrap();
            assert_eq!(config.break_duration, TimeUnit::Hours.duration(value));
        }
    }

    #[test]
    fn test_wrong_argument_count() {
        assert_matches!(
            parse_args::<&str>(&[]),
            Err(PomoError::InvalidArguments { provided: 0 })
        );
        assert_matches!(
            parse_args(&["25"]),
            Err(PomoError::InvalidArguments { provided: 1 })
        );
        assert_matches!(
            parse_args(&["25", "5", "-h", "extra"]),
            Err(PomoError::InvalidArguments { provided: 4 })
        );
    }

    #[test]
    fn test_unknown_flag() {
        assert_matches!(
            parse_args(&["25", "5", "-x"]),
            Err(PomoError::InvalidFlag { flag }) if flag == "-x"
        );
        // flag is checked before the numbers
        assert_matches!(
            parse_args(&["abc", "5", "--hours"]),
            Err(PomoError::InvalidFlag { .. })
        );
    }

    #[test]
    fn test_zero_work_time() {
        assert_matches!(
            parse_args(&["0", "5"]),
            Err(PomoError::InvalidNumber {
                field: "work_time",
                problem: NumberProblem::NotPositive,
                ..
            })
        );
    }

    #[test]
    fn test_invalid_numbers() {
        assert_matches!(
            parse_args(&["-3", "5"]),
            Err(PomoError::InvalidNumber {
                problem: NumberProblem::NotPositive,
                ..
            })
        );
        assert_matches!(
            parse_args(&["25", "five"]),
            Err(PomoError::InvalidNumber {
                field: "break_time",
                problem: NumberProblem::NotAnInteger,
                ref provided,
            }) if provided == "five"
        );
        assert_matches!(
            parse_args(&["2.5", "5"]),
            Err(PomoError::InvalidNumber {
                problem: NumberProblem::NotAnInteger,
                ..
            })
        );
        assert_matches!(
            parse_args(&["1000", "5"]),
            Err(PomoError::InvalidNumber {
                problem: NumberProblem::TooLarge { max_allowed: 999 },
                ..
            })
        );
    }

    #[test]
    fn test_session_cap_boundary_minutes() {
        let config = parse_args(&["720", "720"]).unwrap();
        assert_eq!(config.work_duration, MAX_SESSION_DURATION);

        assert_matches!(
            parse_args(&["721", "5"]),
            Err(PomoError::InvalidDuration {
                kind: SessionKind::Work,
                ..
            })
        );
    }

    #[test]
    fn test_large_values_hit_session_cap() {
        // 999 passes the per-value check but 999 minutes exceeds 12 hours
        assert_matches!(
            parse_args(&["999", "5"]),
            Err(PomoError::InvalidDuration { .. })
        );
        assert_matches!(
            parse_args(&["1", "999", "-h"]),
            Err(PomoError::InvalidDuration {
                kind: SessionKind::Break,
                ..
            })
        );
    }

    #[test]
    fn test_session_cap_boundary_hours() {
        let config = parse_args(&["12", "12", "-h"]).unwrap();
        assert_eq!(config.break_duration, MAX_SESSION_DURATION);

        let err = parse_args(&["1", "13", "-h"]).unwrap_err();
        assert_eq!(
            err,
            PomoError::InvalidDuration {
                kind: SessionKind::Break,
                max_allowed: MAX_SESSION_DURATION,
                requested: Duration::from_secs(13 * 3600),
            }
        );
    }

    #[test]
    fn test_duration_for_kind() {
        let config = parse_args(&["50", "10"]).unwrap();
        assert_eq!(config.duration_for(SessionKind::Work), Duration::from_secs(3000));
        assert_eq!(config.duration_for(SessionKind::Break), Duration::from_secs(600));
        assert_eq!(config.with_progress_bar_width(44).progress_bar_width, 44);
    }

    #[test]
    fn test_missing_preferences_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let store = FilePreferencesStore::with_path(dir.path().join("config.json"));
        assert_eq!(store.load().unwrap(), Preferences::default());
    }

    #[test]
    fn test_partial_preferences_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "log_file": "/tmp/pomo.log" }"#).unwrap();

        let prefs = FilePreferencesStore::with_path(&path).load().unwrap();
        assert_eq!(prefs.progress_bar_width, DEFAULT_PROGRESS_BAR_WIDTH);
        assert_eq!(prefs.log_file, Some(PathBuf::from("/tmp/pomo.log")));
    }

    #[test]
    fn test_malformed_preferences_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = FilePreferencesStore::with_path(&path).load().unwrap_err();
        assert_matches!(err, PomoError::ConfigLoad { path: ref p, .. } if p == &path);
    }
}
