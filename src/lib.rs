//! Crash replay: record vehicle and camera transforms during play, then
//! play them back as a smooth, time-accurate stream of interpolated poses.

pub mod config;
pub mod core;
pub mod input;
pub mod playback;
pub mod record;
pub mod session;

pub use crate::core::{FrameBuffer, FrameSample, ReplayError, ReplayResult};
pub use crate::playback::{
    Clock, ManualClock, PlaybackConfig, PlaybackEngine, PlaybackEvent, PlaybackState, SystemClock,
};
pub use crate::record::{Recorder, RecorderConfig};
