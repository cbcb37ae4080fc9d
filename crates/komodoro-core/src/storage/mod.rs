mod config;

pub use config::{ClockConfig, Config, ScheduleConfig};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the configuration directory, creating it if needed.
///
/// `KOMODORO_CONFIG_DIR` overrides the location. Otherwise this is
/// `~/.config/komodoro[-dev]/`, with the `-dev` suffix when `KOMODORO_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("KOMODORO_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("KOMODORO_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("komodoro-dev")
            } else {
                base_dir.join("komodoro")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
