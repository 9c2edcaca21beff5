//! Error types for transport operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// The backend refused to start playback.
    #[error("playback rejected: {0}")]
    PlayRejected(String),
}
