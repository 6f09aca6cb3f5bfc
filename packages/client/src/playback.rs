//! Local playback clock.
//!
//! The terminal client has no media element, so playback is modelled as a
//! position that advances with wall time while playing. Followers steer it
//! towards the host's heartbeats: small drift is absorbed by running the
//! clock slightly faster or slower, large drift by seeking.

use tokio::time::Instant;

/// Drift above which the follower seeks instead of slewing
pub const HARD_SEEK_THRESHOLD_SECS: f64 = 1.0;
/// Drift that is ignored entirely
pub const DRIFT_TOLERANCE_SECS: f64 = 0.1;
/// Time over which a slew should absorb the measured drift
pub const SLEW_WINDOW_SECS: f64 = 5.0;
/// Maximum deviation of the slew rate from 1.0
pub const MAX_SLEW: f64 = 0.1;

/// Outcome of a drift check against the host position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriftCorrection {
    InSync { drift: f64 },
    Slew { drift: f64, rate: f64 },
    HardSeek { drift: f64, to: f64 },
}

#[derive(Debug, Clone, Copy)]
pub struct PlaybackClock {
    playing: bool,
    anchor_position: f64,
    anchor: Instant,
    rate: f64,
}

impl PlaybackClock {
    /// Paused at zero
    pub fn new(now: Instant) -> Self {
        Self {
            playing: false,
            anchor_position: 0.0,
            anchor: now,
            rate: 1.0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Position in seconds at `now`
    pub fn position(&self, now: Instant) -> f64 {
        if !self.playing {
            return self.anchor_position;
        }
        let elapsed = now.saturating_duration_since(self.anchor).as_secs_f64();
        self.anchor_position + elapsed * self.rate
    }

    pub fn play(&mut self, now: Instant) {
        self.rebase(now);
        self.playing = true;
    }

    pub fn pause(&mut self, now: Instant) {
        self.rebase(now);
        self.playing = false;
        self.rate = 1.0;
    }

    pub fn seek(&mut self, seconds: f64, now: Instant) {
        self.anchor_position = seconds.max(0.0);
        self.anchor = now;
        self.rate = 1.0;
    }

    /// Adopt the host's full state (answer to a sync request)
    pub fn force(&mut self, is_playing: bool, seconds: f64, now: Instant) {
        self.seek(seconds, now);
        self.playing = is_playing;
    }

    /// Compare against a host heartbeat and steer towards it
    pub fn correct(&mut self, host_position: f64, now: Instant) -> DriftCorrection {
        let drift = host_position - self.position(now);

        if drift.abs() > HARD_SEEK_THRESHOLD_SECS {
            self.seek(host_position, now);
            return DriftCorrection::HardSeek {
                drift,
                to: self.anchor_position,
            };
        }

        self.rebase(now);
        if drift.abs() > DRIFT_TOLERANCE_SECS {
            self.rate = 1.0 + (drift / SLEW_WINDOW_SECS).clamp(-MAX_SLEW, MAX_SLEW);
            DriftCorrection::Slew {
                drift,
                rate: self.rate,
            }
        } else {
            self.rate = 1.0;
            DriftCorrection::InSync { drift }
        }
    }

    fn rebase(&mut self, now: Instant) {
        self.anchor_position = self.position(now);
        self.anchor = now;
    }
}
