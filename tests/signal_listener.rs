// Raises SIGINT in-process and checks that the listener only fires the token.
// Kept in its own test binary so the installed handler cannot affect other tests.

#![cfg(unix)]

use std::time::Duration;

use pomo::runtime::{CancellationToken, SignalListener};
use signal_hook::consts::signal::SIGINT;

#[test]
fn sigint_fires_the_token() {
    let token = CancellationToken::new();
    let listener = SignalListener::spawn(token.clone()).unwrap();

    signal_hook::low_level::raise(SIGINT).unwrap();

    assert!(token.wait_timeout(Duration::from_secs(5)));
    // a second delivery is harmless
    signal_hook::low_level::raise(SIGINT).unwrap();
    drop(listener);
    assert!(token.is_cancelled());
}
