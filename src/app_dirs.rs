use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "pomo";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Default event log location under $HOME/.local/state/pomo
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME);
            Some(state_dir.join("pomo.log"))
        } else {
            ProjectDirs::from("", "", APP_NAME)
                .map(|proj_dirs| proj_dirs.data_local_dir().join("pomo.log"))
        }
    }

    pub fn preferences_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("pomo_config.json"))
    }
}
