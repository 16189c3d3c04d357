// Library surface for headless/integration tests and reuse.
// The binary in main.rs only wires these together.
pub mod app_dirs;
pub mod config;
pub mod engine;
pub mod error;
pub mod event_log;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod terminal;
pub mod util;

pub use config::{parse_args, EngineConfig};
pub use engine::Engine;
pub use error::PomoError;
