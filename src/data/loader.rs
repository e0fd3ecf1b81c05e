use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use super::normalize::{normalize, QuestionBank};

pub const DEFAULT_BANK_PATH: &str = "question_bank.json";

/// The bank could not be read or decoded at all. Fatal for that load
/// attempt; no partial quiz can start from it.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads, decodes and normalizes the bank at `path`.
pub async fn load_bank<P: AsRef<Path>>(path: P) -> Result<QuestionBank, LoadError> {
    let path = path.as_ref();

    let json_content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let bank = parse_bank(&json_content).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        path = %path.display(),
        questions = bank.questions.len(),
        skipped = bank.skipped,
        source = %bank.source,
        "loaded question bank"
    );
    Ok(bank)
}

/// Decodes and normalizes bank text already in memory.
pub fn parse_bank(json_content: &str) -> Result<QuestionBank, serde_json::Error> {
    let data: Value = serde_json::from_str(json_content)?;
    Ok(normalize(&data))
}
