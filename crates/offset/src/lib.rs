//! Calibration offset between the audio transport clock and cue time.
//!
//! `effective = raw + offset`. The [`OffsetStore`] is an explicit object
//! rather than ambient state, so independent engines (and tests) never see
//! each other's calibration.

mod persistence;
mod store;

pub use persistence::{MemoryPersistence, NullPersistence, OffsetPersistence, PersistError};
pub use store::{
    OffsetConfig, OffsetListener, OffsetSnapshot, OffsetStore, Subscription, DEFAULT_OFFSET,
    MAX_OFFSET, MIN_OFFSET, OFFSET_STORAGE_KEY,
};
