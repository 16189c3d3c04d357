use serde::Serialize;
use std::time::Duration;

use crate::session::{Session, SessionKind};
use crate::util::serialize_duration;

/// Aggregate view over the session history. Recomputed on every call, never cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub total_sessions: usize,
    pub completed_sessions: usize,
    /// Completed work sessions only
    pub work_sessions: usize,
    /// Completed break sessions only
    pub break_sessions: usize,
    #[serde(serialize_with = "serialize_duration")]
    pub total_work_time: Duration,
    #[serde(serialize_with = "serialize_duration")]
    pub total_break_time: Duration,
}

/// Cancelled sessions count toward `total_sessions` and nothing else.
pub fn compute_stats<'a, I>(sessions: I) -> SessionStats
where
    I: IntoIterator<Item = &'a Session>,
{
    sessions
        .into_iter()
        .fold(SessionStats::default(), |mut stats, session| {
            stats.total_sessions += 1;
            if !session.completed() {
                return stats;
            }

            stats.completed_sessions += 1;
            match session.kind {
                SessionKind::Work => {
                    stats.work_sessions += 1;
                    stats.total_work_time += session.planned_duration;
                }
                SessionKind::Break => {
                    stats.break_sessions += 1;
                    stats.total_break_time += session.planned_duration;
                }
            }
            stats
        })
}
