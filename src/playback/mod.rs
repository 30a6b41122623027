pub mod clock;
pub mod engine;
pub mod interpolate;
pub mod locator;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::PlaybackEngine;
pub use interpolate::{interpolate, slerp_shortest};
pub use locator::{locate, Locate};

use std::time::Duration;

/// Default length of one display frame, used to expire single-instant replays
pub const NOMINAL_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Constructed or loaded, never started
    Idle,
    Playing,
    /// Halted by `stop`; elapsed time is kept
    Stopped,
    /// Reached the end or was skipped
    Finished,
}

/// Why playback ended, reported once through `PlaybackEngine::take_event`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Finished,
    Skipped,
}

/// Playback configuration
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// How long a zero-duration replay stays up after its one pose
    pub nominal_frame_interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            nominal_frame_interval: NOMINAL_FRAME_INTERVAL,
        }
    }
}
