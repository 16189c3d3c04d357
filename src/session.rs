use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Kind of interval in the work/break cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
pub enum SessionKind {
    Work,
    Break,
}

/// How a session run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Completed,
    Cancelled,
}

/// A session that reached a terminal state. Only the engine creates these,
/// at the moment the outcome is known, so a record is never half-finished.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub kind: SessionKind,
    #[serde(serialize_with = "crate::util::serialize_duration")]
    pub planned_duration: Duration,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub outcome: Outcome,
}

impl Session {
    /// End time is fixed from the plan at creation and never recomputed.
    pub fn new(
        kind: SessionKind,
        planned_duration: Duration,
        start_time: DateTime<Utc>,
        outcome: Outcome,
    ) -> Self {
        let end_time = chrono::Duration::from_std(planned_duration)
            .ok()
            .and_then(|d| start_time.checked_add_signed(d))
            .unwrap_or(start_time);
        Self {
            kind,
            planned_duration,
            start_time,
            end_time,
            outcome,
        }
    }

    pub fn completed(&self) -> bool {
        self.outcome == Outcome::Completed
    }

    pub fn cancelled(&self) -> bool {
        self.outcome == Outcome::Cancelled
    }
}

/// Append-only record of every session the engine ran, in chronological order
#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
    sessions: Vec<Session>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, session: Session) {
        self.sessions.push(session);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn as_slice(&self) -> &[Session] {
        &self.sessions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Session> {
        self.sessions.iter()
    }

    pub fn completed(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter().filter(|s| s.completed())
    }

    pub fn last(&self) -> Option<&Session> {
        self.sessions.last()
    }
}

impl<'a> IntoIterator for &'a SessionHistory {
    type Item = &'a Session;
    type IntoIter = std::slice::Iter<'a, Session>;

    fn into_iter(self) -> Self::IntoIter {
        self.sessions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_kind_display() {
        assert_eq!(SessionKind::Work.to_string(), "Work");
        assert_eq!(SessionKind::Break.to_string(), "Break");
    }

    #[test]
    fn test_end_time_is_start_plus_plan() {
        let start = Utc::now();
        let session = Session::new(
            SessionKind::Work,
            Duration::from_secs(25 * 60),
            start,
            Outcome::Cancelled,
        );
        assert_eq!(session.end_time - session.start_time, chrono::Duration::minutes(25));
    }

    #[test]
    fn test_outcome_flags_are_exclusive() {
        let start = Utc::now();
        let done = Session::new(SessionKind::Break, Duration::from_secs(1), start, Outcome::Completed);
        assert!(done.completed() && !done.cancelled());

        let stopped = Session::new(SessionKind::Break, Duration::from_secs(1), start, Outcome::Cancelled);
        assert!(stopped.cancelled() && !stopped.completed());
    }

    #[test]
    fn test_history_preserves_insertion_order() {
        let mut history = SessionHistory::new();
        assert!(history.is_empty());

        let start = Utc::now();
        history.push(Session::new(SessionKind::Work, Duration::from_secs(1), start, Outcome::Completed));
        history.push(Session::new(SessionKind::Break, Duration::from_secs(1), start, Outcome::Cancelled));

        let kinds: Vec<SessionKind> = history.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SessionKind::Work, SessionKind::Break]);
        assert_eq!(history.completed().count(), 1);
        assert_eq!(history.last().map(|s| s.outcome), Some(Outcome::Cancelled));
    }
}
