//! Runtime configuration, read from the environment
//!
//! Nothing here is global: callers load a [`ReviewConfig`] once and pass it to
//! whatever needs it.

use std::env;
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "CREATIVE_REVIEW_DB_PATH";
pub const ASSET_DIR_VAR: &str = "CREATIVE_REVIEW_ASSET_DIR";
pub const DEFAULT_LOG_FILTER: &str = "creative_review=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewConfig {
    /// sled database directory
    pub db_path: PathBuf,
    /// where uploaded payloads are written
    pub asset_dir: PathBuf,
    /// tracing filter directive
    pub log_filter: String,
}

impl ReviewConfig {
    pub fn new(db_path: impl Into<PathBuf>, asset_dir: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            asset_dir: asset_dir.into(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }

    /// Loads `.env` if present, then falls back to defaults for unset variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            db_path: env::var(DB_PATH_VAR)
                .unwrap_or_else(|_| "creative-review.db".to_string())
                .into(),
            asset_dir: env::var(ASSET_DIR_VAR)
                .unwrap_or_else(|_| "assets".to_string())
                .into(),
            log_filter: env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.db_path.as_os_str().is_empty() {
            anyhow::bail!("{DB_PATH_VAR} must not be empty");
        }
        if self.asset_dir.as_os_str().is_empty() {
            anyhow::bail!("{ASSET_DIR_VAR} must not be empty");
        }
        if self.db_path == self.asset_dir {
            anyhow::bail!("database and asset directory must differ");
        }
        Ok(())
    }
}
