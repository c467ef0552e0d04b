//! Run log configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL audit log path; `~/` is expanded. Disabled when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_log: Option<String>,
}

impl FileLoggingConfig {
    pub fn run_log_path(&self) -> Option<PathBuf> {
        let raw = self.run_log.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.strip_prefix("~/") {
            Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
            None => Some(PathBuf::from(raw)),
        }
    }
}
