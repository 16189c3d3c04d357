use chrono::Utc;
use std::time::Instant;

use crate::config::EngineConfig;
use crate::error::PomoError;
use crate::event_log::{EventLog, InfoDetails};
use crate::runtime::{CancellationToken, Runner, Ticker, TimerEvent};
use crate::session::{Outcome, Session, SessionHistory, SessionKind};
use crate::stats::{compute_stats, SessionStats};
use crate::terminal::{SessionDisplay, SessionInfo};

/// Ticks the completion screen stays up before the next session starts
pub const DWELL_TICKS: u32 = 2;

/// Drives work/break sessions. Owns the history; only the thread running the
/// engine ever mutates it.
pub struct Engine<D: SessionDisplay, T: Ticker> {
    config: EngineConfig,
    display: D,
    log: EventLog,
    history: SessionHistory,
    runner: Runner<T>,
}

impl<D: SessionDisplay, T: Ticker> Engine<D, T> {
    pub fn new(config: EngineConfig, display: D, log: EventLog, ticker: T) -> Self {
        Self::with_token(config, display, log, ticker, CancellationToken::new())
    }

    pub fn with_token(
        config: EngineConfig,
        display: D,
        log: EventLog,
        ticker: T,
        token: CancellationToken,
    ) -> Self {
        Self {
            config,
            display,
            log,
            history: SessionHistory::new(),
            runner: Runner::new(ticker, token),
        }
    }

    /// Handle for whoever needs to stop the engine (the signal listener)
    pub fn token(&self) -> CancellationToken {
        self.runner.token().clone()
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn stats(&self) -> SessionStats {
        compute_stats(&self.history)
    }

    /// Runs one session until its planned duration elapses or the token fires.
    ///
    /// The session is appended to the history exactly once, at the moment its
    /// outcome is decided. Display failures are logged and the timer keeps going.
    pub fn run_session(&mut self, kind: SessionKind) -> Result<(), PomoError> {
        let planned = self.config.duration_for(kind);
        let label = kind.to_string();
        let start_time = Utc::now();
        let started = Instant::now();
        let deadline = started + planned;

        self.log.log_info(
            "Session started",
            InfoDetails::Session {
                kind,
                duration: planned,
            },
        );

        loop {
            let now = match self.runner.step() {
                TimerEvent::Cancelled => {
                    self.history
                        .push(Session::new(kind, planned, start_time, Outcome::Cancelled));
                    return Err(PomoError::SessionInterrupted { kind });
                }
                TimerEvent::Tick(now) => now,
            };

            if now >= deadline {
                self.history
                    .push(Session::new(kind, planned, start_time, Outcome::Completed));

                if let Err(e) = self.display.display_completion(&label) {
                    self.log.log_error(&e);
                }
                self.log.log_info(
                    "Session completed",
                    InfoDetails::Session {
                        kind,
                        duration: planned,
                    },
                );

                // a cancel during the dwell is picked up by the cycle's next check
                self.runner.dwell(DWELL_TICKS);
                return Ok(());
            }

            let elapsed = now.duration_since(started);
            let info = SessionInfo {
                label: label.clone(),
                elapsed,
                progress: elapsed.as_secs_f64() / planned.as_secs_f64(),
                progress_bar_width: self.config.progress_bar_width,
            };

            if let Err(e) = self.display.display_session(&info) {
                self.log.log_error(&e);
            }
        }
    }

    /// Work then break, forever. Only returns once cancelled; the error carries
    /// the ordinal of the last cycle started (0 when none was).
    pub fn run_cycle(&mut self) -> Result<(), PomoError> {
        let mut cycle: u64 = 0;

        loop {
            self.ensure_running(cycle)?;
            cycle += 1;
            self.log
                .log_info("Starting pomodoro cycle", InfoDetails::Cycle { cycle });

            self.run_session(SessionKind::Work)
                .map_err(|_| PomoError::CycleCancelled { cycle })?;

            self.ensure_running(cycle)?;
            self.run_session(SessionKind::Break)
                .map_err(|_| PomoError::CycleCancelled { cycle })?;
        }
    }

    fn ensure_running(&self, cycle: u64) -> Result<(), PomoError> {
        if self.runner.token().is_cancelled() {
            return Err(PomoError::CycleCancelled { cycle });
        }
        Ok(())
    }

    /// Records that an operator interrupt reached the engine.
    pub fn log_shutdown(&self) {
        self.log.log_info(
            "Shutdown signal received",
            InfoDetails::Shutdown {
                sessions_completed: self.history.completed().count(),
                total_sessions: self.history.len(),
            },
        );
    }

    /// Fires the token (no-op if already fired) and logs final stats.
    pub fn close(&mut self) -> SessionStats {
        self.runner.token().cancel();
        let stats = self.stats();
        self.log
            .log_info("Session manager closing", InfoDetails::Stats(stats));
        stats
    }
}
