//! JSON input for create and update

use serde_json::{Map, Value};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("no payload given: pass JSON with --data or a file with --file")]
    Missing,
    #[error("invalid payload: {0}")]
    Invalid(String),
    #[error("failed to read payload from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Resolve the create/update payload.
///
/// `file` wins over `data` when both are given; a file path of `-` reads
/// `stdin`. Blank input is [`PayloadError::Missing`], and anything that is
/// not a JSON object is [`PayloadError::Invalid`].
pub fn load_payload(
    data: Option<&str>,
    file: Option<&Path>,
    stdin: &mut dyn Read,
) -> Result<Map<String, Value>, PayloadError> {
    let text = match file {
        Some(path) if path == Path::new("-") => {
            let mut text = String::new();
            stdin
                .read_to_string(&mut text)
                .map_err(|source| PayloadError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
            text
        }
        Some(path) => std::fs::read_to_string(path).map_err(|source| PayloadError::Read {
            path: path.to_path_buf(),
            source,
        })?,
        None => data.unwrap_or_default().to_string(),
    };

    parse_payload(&text)
}

pub fn parse_payload(text: &str) -> Result<Map<String, Value>, PayloadError> {
    if text.trim().is_empty() {
        return Err(PayloadError::Missing);
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(PayloadError::Invalid(format!(
            "expected a JSON object, got {}",
            super::options::json_kind(&other)
        ))),
        Err(err) => Err(PayloadError::Invalid(err.to_string())),
    }
}
