use clap::{ArgAction, Parser};
use pomo::{
    app_dirs::AppDirs,
    config::{parse_args, FilePreferencesStore, Preferences, PreferencesStore},
    engine::Engine,
    error::PomoError,
    event_log::EventLog,
    runtime::{FixedTicker, SignalListener},
    terminal::{Terminal, TerminalCapabilities},
};
use std::{path::PathBuf, process::ExitCode};

const FAREWELL: &str = "Exiting Pomodoro. Stay productive!";

/// pomodoro interval timer: alternating work and break sessions with a live progress bar
#[derive(Parser, Debug)]
#[command(
    name = "pomo",
    version,
    about,
    disable_help_flag = true,
    override_usage = "pomo <work_time> <break_time> [-h]",
    after_help = r#"ARGUMENTS:
    work_time, break_time   whole numbers from 1 to 999, minutes by default
    -h                      count both values in hours instead of minutes
    No session may be longer than 12 hours.

EXAMPLES:
    pomo 25 5      # 25 minutes work, 5 minutes break
    pomo 1 1 -h    # 1 hour work, 1 hour break

ENVIRONMENT:
    POMO_LOG       path of the JSON-lines event log
    POMO_CONFIG    path of the preferences file
"#
)]
struct Cli {
    /// work time, break time and an optional -h flag
    #[arg(value_name = "ARGS", allow_hyphen_values = true, trailing_var_arg = true)]
    args: Vec<String>,

    /// print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let env_log = std::env::var_os("POMO_LOG").map(PathBuf::from);

    let prefs = match FilePreferencesStore::new().load() {
        Ok(prefs) => prefs,
        Err(e) => return fail(&open_event_log(env_log), &e),
    };
    let log = open_event_log(resolve_log_path(env_log, &prefs));

    let config = match parse_args(cli.args.as_slice()) {
        Ok(config) => config.with_progress_bar_width(prefs.progress_bar_width),
        Err(e) => return fail(&log, &e),
    };

    let terminal = Terminal::stdout(TerminalCapabilities::detect());
    let mut engine = Engine::new(config, terminal, log, FixedTicker::default());

    let _listener = SignalListener::spawn(engine.token())
        .map_err(|e| eprintln!("warning: Ctrl+C handling unavailable: {}", e))
        .ok();

    let exit = match engine.run_cycle() {
        Err(e) if e.is_cancellation() => {
            engine.log_shutdown();
            println!("\n{}", FAREWELL);
            ExitCode::SUCCESS
        }
        Err(e) => {
            engine.log().log_error(&e);
            eprintln!("{}", e.report());
            ExitCode::FAILURE
        }
        Ok(()) => ExitCode::SUCCESS,
    };

    engine.close();
    exit
}

fn fail(log: &EventLog, err: &PomoError) -> ExitCode {
    log.log_error(err);
    eprintln!("{}", err.report());
    ExitCode::FAILURE
}

/// `POMO_LOG`, then the preferences file, then the per-user state dir.
fn resolve_log_path(env: Option<PathBuf>, prefs: &Preferences) -> Option<PathBuf> {
    env.or_else(|| prefs.log_file.clone())
        .or_else(AppDirs::log_path)
}

/// A log that cannot be opened is reported and replaced by the stderr fallback.
fn open_event_log(path: Option<PathBuf>) -> EventLog {
    let Some(path) = path else {
        return EventLog::disabled();
    };

    EventLog::open(&path).unwrap_or_else(|e| {
        eprintln!("warning: {}", e);
        EventLog::disabled()
    })
}
