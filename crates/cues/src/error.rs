//! Error types for loading cue scripts.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for script loading.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Errors that can occur while loading a cue script.
///
/// Authoring mistakes inside a well-formed script are not errors; see
/// [`crate::ScriptWarning`].
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Failed to read the script file.
    #[error("Failed to read script file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The script is not valid JSON or does not match the schema.
    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),
}
