//! Sync engine: replays a cue script in lockstep with an audio clock.
//!
//! [`SyncEngine`] resolves one frame at a time from the transport clock and
//! the calibration offset. [`Player`] shares it behind a mutex and drives it
//! with a [`FrameTicker`].

mod config;
mod engine;
mod error;
mod player;
mod snapshot;
mod ticker;

pub use config::{EngineConfig, DEFAULT_FRAME_INTERVAL_MS, NEXT_CUE_DEBOUNCE, PREVIOUS_CUE_MARGIN};
pub use engine::SyncEngine;
pub use error::{ConfigError, ConfigResult};
pub use player::Player;
pub use snapshot::{EngineSnapshot, PlaybackPhase};
pub use ticker::FrameTicker;
