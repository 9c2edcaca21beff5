//! Wall-clock transport for headless replay.

use crate::{clamp_position, Transport, TransportError};
use std::time::Instant;

/// Plays "silent audio": the position advances with wall-clock time.
///
/// `rate` scales elapsed time, so a rate of 2.0 replays twice as fast.
#[derive(Debug, Clone)]
pub struct ClockTransport {
    base: f64,
    resumed_at: Option<Instant>,
    rate: f64,
    duration: Option<f64>,
    muted: bool,
    volume: f32,
}

impl ClockTransport {
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            base: 0.0,
            resumed_at: None,
            rate: 1.0,
            duration,
            muted: false,
            volume: 1.0,
        }
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        if rate.is_finite() && rate > 0.0 {
            self.rate = rate;
        } else {
            tracing::warn!(rate, "ignoring invalid playback rate");
        }
        self
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl Transport for ClockTransport {
    fn current_time(&self) -> f64 {
        let elapsed = self
            .resumed_at
            .map(|at| at.elapsed().as_secs_f64() * self.rate)
            .unwrap_or(0.0);
        clamp_position(self.base + elapsed, self.duration)
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.base = clamp_position(seconds, self.duration);
        if self.resumed_at.is_some() {
            self.resumed_at = Some(Instant::now());
        }
    }

    fn play(&mut self) -> Result<(), TransportError> {
        if self.is_ended() {
            self.base = 0.0;
        }
        if self.resumed_at.is_none() {
            self.resumed_at = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.base = self.current_time();
        self.resumed_at = None;
    }

    fn is_playing(&self) -> bool {
        self.resumed_at.is_some() && !self.is_ended()
    }

    fn is_ended(&self) -> bool {
        self.duration.is_some_and(|d| self.current_time() >= d)
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
    use std::time::Duration;

    #[test]
    fn test_paused_clock_does_not_move() {
        let transport = ClockTransport::new(Some(10.0));
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(transport.current_time(), 0.0);
        assert!(!transport.is_playing());
    }

    #[test]
    fn test_clock_advances_while_playing() {
        let mut transport = ClockTransport::new(None).with_rate(10.0);
        transport.play().unwrap();
        std::thread::sleep(Duration::from_millis(50));
        transport.pause();
        let position = transport.current_time();
        assert!(position >= 0.4, "position was {position}");

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(transport.current_time(), position);
    }

    #[test]
    fn test_seek_while_paused() {
        let mut transport = ClockTransport::new(Some(100.0));
        transport.set_current_time(42.0);
        assert_eq!(transport.current_time(), 42.0);
        transport.set_current_time(400.0);
        assert!(transport.is_ended());
    }

    #[test]
    fn test_invalid_rate_is_ignored() {
        let transport = ClockTransport::new(None).with_rate(0.0);
        assert_eq!(transport.rate(), 1.0);
    }
}
