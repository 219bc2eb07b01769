//! Shared helpers for command handlers.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::CliError;

/// Read and parse a JSON file for `--from-file` / `--seed` flags.
pub fn read_json_file<T: DeserializeOwned>(path: &Path, flag: &str) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: flag.into(),
        reason: format!("{}: {e}", path.display()),
    })
}
