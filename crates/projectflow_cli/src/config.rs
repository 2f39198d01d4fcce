//! Runtime configuration resolved from flags and environment.
//!
//! # Invariants
//! - Every resolved path is absolute.
//! - The log directory defaults to `<data_dir>/logs`.

use anyhow::{anyhow, Context, Result};
use projectflow_core::db::DB_FILE_NAME;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "projectflow";
const LOG_DIR_NAME: &str = "logs";

/// Fully resolved settings for one CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl AppConfig {
    /// Resolves optional overrides against platform defaults.
    pub fn resolve(
        data_dir: Option<PathBuf>,
        log_dir: Option<PathBuf>,
        log_level: Option<String>,
    ) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => absolutize(&dir)?,
            None => dirs::data_dir()
                .ok_or_else(|| anyhow!("no platform data directory; pass --data-dir"))?
                .join(APP_DIR_NAME),
        };
        let log_dir = match log_dir {
            Some(dir) => absolutize(&dir)?,
            None => data_dir.join(LOG_DIR_NAME),
        };
        let log_level =
            log_level.unwrap_or_else(|| projectflow_core::default_log_level().to_string());

        Ok(Self {
            data_dir,
            log_dir,
            log_level,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::AppConfig;
    use std::path::PathBuf;

    #[test]
    fn explicit_data_dir_drives_db_and_log_paths() {
        let config =
            AppConfig::resolve(Some(PathBuf::from("/tmp/pf")), None, Some("warn".into())).unwrap();

        assert_eq!(config.db_path(), PathBuf::from("/tmp/pf/projectflow.sqlite3"));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/pf/logs"));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn relative_paths_are_made_absolute() {
        let config = AppConfig::resolve(
            Some(PathBuf::from("board-data")),
            Some(PathBuf::from("board-logs")),
            None,
        )
        .unwrap();

        assert!(config.data_dir.is_absolute());
        assert!(config.log_dir.is_absolute());
        assert!(config.data_dir.ends_with("board-data"));
        assert_eq!(config.log_level, projectflow_core::default_log_level());
    }
}
