//! Audio transport abstraction.
//!
//! The sync engine treats playback as a black box that exposes a clock,
//! play/pause, seeking and an end-of-media signal. Any audio backend can sit
//! behind [`Transport`]; this crate ships a manual fake clock for tests and a
//! wall-clock transport for headless replay.

mod clock;
mod error;
mod manual;

pub use clock::ClockTransport;
pub use error::TransportError;
pub use manual::ManualTransport;

/// Minimal playback surface the engine depends on.
pub trait Transport: Send {
    /// Playback position in raw seconds.
    fn current_time(&self) -> f64;

    /// Seek. Out-of-range positions are clamped by the transport.
    fn set_current_time(&mut self, seconds: f64);

    /// Start or resume playback. May be rejected (e.g. autoplay policy).
    fn play(&mut self) -> Result<(), TransportError>;

    fn pause(&mut self);

    fn is_playing(&self) -> bool;

    /// Whether playback has reached the end of the media.
    fn is_ended(&self) -> bool;

    /// Length of the media, if known.
    fn duration(&self) -> Option<f64>;

    fn is_muted(&self) -> bool;

    fn set_muted(&mut self, muted: bool);

    /// Volume in `[0.0, 1.0]`.
    fn volume(&self) -> f32;

    fn set_volume(&mut self, volume: f32);
}

/// Clamp a seek target into `[0, duration]`.
pub(crate) fn clamp_position(seconds: f64, duration: Option<f64>) -> f64 {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    match duration {
        Some(d) => seconds.min(d),
        None => seconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_position() {
        assert_eq!(clamp_position(-3.0, Some(10.0)), 0.0);
        assert_eq!(clamp_position(12.0, Some(10.0)), 10.0);
        assert_eq!(clamp_position(12.0, None), 12.0);
        assert_eq!(clamp_position(f64::NAN, None), 0.0);
    }
}
