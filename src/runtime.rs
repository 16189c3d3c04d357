use std::io;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Process-wide one-way shutdown signal. Clones share the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the token and wakes every waiter. Returns false if it had already fired.
    pub fn cancel(&self) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut fired = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if *fired {
            return false;
        }
        *fired = true;
        cvar.notify_all();
        true
    }

    pub fn is_cancelled(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks for up to `timeout`. Returns true as soon as the token fires.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (fired, _) = cvar
            .wait_timeout_while(guard, timeout, |fired| !*fired)
            .unwrap_or_else(PoisonError::into_inner);
        *fired
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// What ended a wait
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    Tick(Instant),
    Cancelled,
}

/// Paces the session loop: each wait races the next tick against the token.
pub struct Runner<T: Ticker> {
    ticker: T,
    token: CancellationToken,
}

impl<T: Ticker> Runner<T> {
    pub fn new(ticker: T, token: CancellationToken) -> Self {
        Self { ticker, token }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Blocks one tick interval, or less if the token fires first.
    pub fn step(&self) -> TimerEvent {
        self.dwell(1)
    }

    /// Blocks `ticks` intervals, or less if the token fires first.
    pub fn dwell(&self, ticks: u32) -> TimerEvent {
        if self.token.wait_timeout(self.ticker.interval() * ticks) {
            TimerEvent::Cancelled
        } else {
            TimerEvent::Tick(Instant::now())
        }
    }
}

/// Listens for SIGINT/SIGTERM and fires the token. It never touches engine state;
/// teardown happens on the thread that observes the token.
#[cfg(unix)]
#[derive(Debug)]
pub struct SignalListener {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalListener {
    pub fn spawn(token: CancellationToken) -> io::Result<Self> {
        use signal_hook::consts::signal::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            for signal in signals.forever() {
                if matches!(signal, SIGINT | SIGTERM) {
                    token.cancel();
                }
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalListener {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// No signal integration off unix; the default Ctrl+C behaviour applies.
#[cfg(not(unix))]
#[derive(Debug)]
pub struct SignalListener;

#[cfg(not(unix))]
impl SignalListener {
    pub fn spawn(_token: CancellationToken) -> io::Result<Self> {
        Ok(Self)
    }
}
