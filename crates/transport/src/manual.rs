//! Hand-driven transport for tests.

use crate::{clamp_position, Transport, TransportError};

/// A transport whose clock only moves when told to.
///
/// `advance` moves the position while playing, stopping at the duration the
/// way a media element does. `reject_play` simulates an autoplay refusal.
#[derive(Debug, Clone)]
pub struct ManualTransport {
    position: f64,
    playing: bool,
    duration: Option<f64>,
    muted: bool,
    volume: f32,
    reject_play: Option<String>,
    seeks: usize,
}

impl Default for ManualTransport {
    fn default() -> Self {
        Self {
            position: 0.0,
            playing: false,
            duration: None,
            muted: false,
            volume: 1.0,
            reject_play: None,
            seeks: 0,
        }
    }
}

impl ManualTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    /// Move the clock forward by `dt` seconds if playing.
    pub fn advance(&mut self, dt: f64) {
        if !self.playing {
            return;
        }
        self.position = clamp_position(self.position + dt, self.duration);
        if self.is_ended() {
            self.playing = false;
        }
    }

    /// Jump to the end of the media.
    pub fn finish(&mut self) {
        if let Some(duration) = self.duration {
            self.position = duration;
        }
        self.playing = false;
    }

    /// Make subsequent `play` calls fail with `reason`, or succeed again with `None`.
    pub fn reject_play(&mut self, reason: Option<&str>) {
        self.reject_play = reason.map(str::to_string);
    }

    /// Number of seeks performed so far.
    pub fn seek_count(&self) -> usize {
        self.seeks
    }
}

impl Transport for ManualTransport {
    fn current_time(&self) -> f64 {
        self.position
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.position = clamp_position(seconds, self.duration);
        self.seeks += 1;
    }

    fn play(&mut self) -> Result<(), TransportError> {
        if let Some(reason) = &self.reject_play {
            return Err(TransportError::PlayRejected(reason.clone()));
        }
        if self.is_ended() {
            self.position = 0.0;
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn is_ended(&self) -> bool {
        self.duration.is_some_and(|d| self.position >= d)
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_only_while_playing() {
        let mut transport = ManualTransport::with_duration(10.0);
        transport.advance(1.0);
        assert_eq!(transport.current_time(), 0.0);

        transport.play().unwrap();
        transport.advance(2.5);
        assert_eq!(transport.current_time(), 2.5);

        transport.pause();
        transport.advance(1.0);
        assert_eq!(transport.current_time(), 2.5);
    }

    #[test]
    fn test_reaching_duration_ends_playback() {
        let mut transport = ManualTransport::with_duration(3.0);
        transport.play().unwrap();
        transport.advance(5.0);
        assert_eq!(transport.current_time(), 3.0);
        assert!(transport.is_ended());
        assert!(!transport.is_playing());

        transport.set_current_time(1.0);
        assert!(!transport.is_ended());
    }

    #[test]
    fn test_rejected_play() {
        let mut transport = ManualTransport::new();
        transport.reject_play(Some("autoplay blocked"));
        assert!(matches!(transport.play(), Err(TransportError::PlayRejected(_))));
        assert!(!transport.is_playing());

        transport.reject_play(None);
        assert!(transport.play().is_ok());
    }

    #[test]
    fn test_seek_clamps() {
        let mut transport = ManualTransport::with_duration(10.0);
        transport.set_current_time(-1.0);
        assert_eq!(transport.current_time(), 0.0);
        transport.set_current_time(99.0);
        assert_eq!(transport.current_time(), 10.0);
        assert_eq!(transport.seek_count(), 2);
    }

    #[test]
    fn test_volume_and_mute() {
        let mut transport = ManualTransport::new();
        transport.set_volume(1.7);
        assert_eq!(transport.volume(), 1.0);
        transport.set_muted(true);
        assert!(transport.is_muted());
    }
}
