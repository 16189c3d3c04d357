use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::session::SessionKind;
use crate::util::format_duration;

pub const USAGE: &str = "Usage: pomo <work_time> <break_time> [-h]";
pub const USAGE_EXAMPLES: [&str; 2] = [
    "pomo 25 5      # 25 minutes work, 5 minutes break",
    "pomo 1 1 -h    # 1 hour work, 1 hour break",
];
pub const VALID_FLAGS: [&str; 1] = ["-h"];

/// Numeric codes written to the event log, one per error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    InvalidArguments = 1000,
    InvalidFlag = 1001,
    InvalidNumber = 1002,
    InvalidDuration = 1003,
    TerminalUnsupported = 1004,
    SessionInterrupted = 1005,
    ConfigLoad = 1006,
    LogWrite = 1007,
}

/// Why a numeric argument was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NumberProblem {
    NotAnInteger,
    NotPositive,
    TooLarge { max_allowed: u32 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PomoError {
    #[error("{}", USAGE)]
    InvalidArguments { provided: usize },

    #[error("Unknown flag: {flag}")]
    InvalidFlag { flag: String },

    #[error("{field} {}", number_problem_text(.problem))]
    InvalidNumber {
        field: &'static str,
        provided: String,
        problem: NumberProblem,
    },

    #[error("{kind} session too long")]
    InvalidDuration {
        kind: SessionKind,
        max_allowed: Duration,
        requested: Duration,
    },

    #[error("Failed to {operation}: {message}")]
    TerminalUnsupported {
        operation: &'static str,
        message: String,
    },

    #[error("{kind} session cancelled")]
    SessionInterrupted { kind: SessionKind },

    #[error("pomodoro cycle {cycle} cancelled")]
    CycleCancelled { cycle: u64 },

    #[error("failed to load preferences from {}: {message}", .path.display())]
    ConfigLoad { path: PathBuf, message: String },

    #[error("failed to open log file {}: {message}", .path.display())]
    LogWrite { path: PathBuf, message: String },
}

fn number_problem_text(problem: &NumberProblem) -> &'static str {
    match problem {
        NumberProblem::NotAnInteger => "must be a valid integer",
        NumberProblem::NotPositive => "must be positive",
        NumberProblem::TooLarge { .. } => "is too large",
    }
}

impl PomoError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PomoError::InvalidArguments { .. } => ErrorCode::InvalidArguments,
            PomoError::InvalidFlag { .. } => ErrorCode::InvalidFlag,
            PomoError::InvalidNumber { .. } => ErrorCode::InvalidNumber,
            PomoError::InvalidDuration { .. } => ErrorCode::InvalidDuration,
            PomoError::TerminalUnsupported { .. } => ErrorCode::TerminalUnsupported,
            PomoError::SessionInterrupted { .. } | PomoError::CycleCancelled { .. } => {
                ErrorCode::SessionInterrupted
            }
            PomoError::ConfigLoad { .. } => ErrorCode::ConfigLoad,
            PomoError::LogWrite { .. } => ErrorCode::LogWrite,
        }
    }

    /// True when the error is the "stopped by request" path rather than a failure
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            PomoError::SessionInterrupted { .. } | PomoError::CycleCancelled { .. }
        )
    }

    /// Structured payload for the event log. Each kind has a fixed shape.
    pub fn details(&self) -> Value {
        match self {
            PomoError::InvalidArguments { provided } => json!({
                "provided": provided,
                "examples": USAGE_EXAMPLES,
            }),
            PomoError::InvalidFlag { flag } => json!({
                "provided": flag,
                "valid_flags": VALID_FLAGS,
            }),
            PomoError::InvalidNumber {
                field,
                provided,
                problem,
            } => {
                let mut details = json!({ "field": field, "provided": provided });
                if let (Value::Object(map), Ok(Value::Object(extra))) =
                    (&mut details, serde_json::to_value(problem))
                {
                    map.extend(extra);
                }
                details
            }
            PomoError::InvalidDuration {
                kind,
                max_allowed,
                requested,
            } => json!({
                "type": kind.to_string(),
                "max_allowed": format_duration(*max_allowed),
                "requested": format_duration(*requested),
            }),
            PomoError::TerminalUnsupported { operation, message } => json!({
                "operation": operation,
                "error": message,
            }),
            PomoError::SessionInterrupted { kind } => json!({ "type": kind.to_string() }),
            PomoError::CycleCancelled { cycle } => json!({ "cycle": cycle }),
            PomoError::ConfigLoad { path, message } | PomoError::LogWrite { path, message } => {
                json!({ "path": path.display().to_string(), "error": message })
            }
        }
    }

    /// Extra lines shown to the operator under the `Error:` line
    pub fn hints(&self) -> Vec<String> {
        match self {
            PomoError::InvalidArguments { .. } => {
                let mut lines = vec![String::new(), "Examples:".to_string()];
                lines.extend(USAGE_EXAMPLES.iter().map(|e| format!("  {}", e)));
                lines
            }
            PomoError::InvalidFlag { .. } => {
                vec![format!("Valid flags: {}", VALID_FLAGS.join(", "))]
            }
            PomoError::InvalidNumber {
                provided,
                problem: NumberProblem::TooLarge { max_allowed },
                ..
            } => vec![format!(
                "Provided: {} (allowed range: 1 to {})",
                provided, max_allowed
            )],
            PomoError::InvalidNumber { provided, .. } => vec![format!("Provided: {}", provided)],
            PomoError::InvalidDuration {
                max_allowed,
                requested,
                ..
            } => vec![format!(
                "Requested: {} (max allowed: {})",
                format_duration(*requested),
                format_duration(*max_allowed)
            )],
            _ => Vec::new(),
        }
    }

    /// Operator-facing rendering: `Error: <message>` followed by hint lines
    pub fn report(&self) -> String {
        let mut out = format!("Error: {}", self);
        for line in self.hints() {
            out.push('\n');
            out.push_str(&line);
        }
        out
    }
}
