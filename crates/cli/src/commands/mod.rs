pub mod ask;
pub mod health;
pub mod init;
pub mod seed;
pub mod serve;
pub mod status;

use folio_config::AppConfig;
use std::path::{Path, PathBuf};

/// The config file in effect: `--config` if given, else `~/.folio/config.toml`.
pub fn config_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

/// Load config from the effective path with environment overrides applied.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let path = config_path(path);
    let config =
        AppConfig::load_with_env(&path).map_err(|e| format!("Failed to load config: {e}"))?;
    Ok(config)
}
