//! Run settings kept between runs.
//!
//! Stored as a small JSON record so the welcome screen and the next launch
//! agree on the question count and shuffling.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::session::RunConfig;

pub const DEFAULT_NUM_QUESTIONS: usize = 20;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write settings {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSettings {
    #[serde(default = "default_num_questions")]
    pub num_questions: usize,
    #[serde(default = "default_shuffle_choices")]
    pub shuffle_choices: bool,
    /// Milliseconds since the Unix epoch when the record was saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
}

fn default_num_questions() -> usize {
    DEFAULT_NUM_QUESTIONS
}

fn default_shuffle_choices() -> bool {
    true
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            num_questions: DEFAULT_NUM_QUESTIONS,
            shuffle_choices: true,
            created_at: None,
            app_version: None,
        }
    }
}

impl RunSettings {
    /// Reads saved settings. `Ok(None)` when nothing has been saved yet.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>, SettingsError> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| SettingsError::Decode {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Saved settings, or the defaults when there are none or they cannot
    /// be used.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(settings) => settings.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "ignoring saved settings");
                Self::default()
            }
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Marks the record with the current time and crate version.
    pub fn stamped(mut self) -> Self {
        self.created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .and_then(|elapsed| u64::try_from(elapsed.as_millis()).ok());
        self.app_version = Some(env!("CARGO_PKG_VERSION").to_string());
        self
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            count: Some(self.num_questions),
            shuffle_choices: self.shuffle_choices,
        }
    }
}
