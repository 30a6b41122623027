use crate::core::{FrameBuffer, FrameSample};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;

/// Recorder configuration
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Minimum spacing between kept samples
    pub sample_interval: Duration,
    /// How much history to keep behind the newest sample
    pub max_history: Duration,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_millis(33),
            max_history: Duration::from_secs(10),
        }
    }
}

/// Rolling capture of the last few seconds of play.
///
/// `finish` hands the history to playback with times rebased so the oldest
/// kept sample is at 0, which is what the engine treats as the origin.
#[derive(Debug, Default)]
pub struct Recorder {
    config: RecorderConfig,
    frames: VecDeque<FrameSample>,
}

impl Recorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            frames: VecDeque::new(),
        }
    }

    /// Offer a sample. Returns whether it was kept.
    ///
    /// `sample.time` is the simulation time in seconds. Samples closer than
    /// `sample_interval` to the previous one, or older than it, are dropped.
    pub fn record(&mut self, sample: FrameSample) -> bool {
        if let Some(last) = self.frames.back() {
            if sample.time < last.time + self.config.sample_interval.as_secs_f64() {
                return false;
            }
        }

        self.frames.push_back(sample);

        let horizon = sample.time - self.config.max_history.as_secs_f64();
        while self.frames.front().is_some_and(|f| f.time < horizon) {
            self.frames.pop_front();
        }
        true
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Seconds between the oldest and newest kept samples
    pub fn span(&self) -> f64 {
        match (self.frames.front(), self.frames.back()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Produce a frame buffer from the current history, leaving the recorder untouched
    pub fn finish(&self) -> FrameBuffer {
        let origin = self.frames.front().map(|f| f.time).unwrap_or(0.0);
        debug!(frames = self.frames.len(), span = self.span(), "Recording finished");

        self.frames
            .iter()
            .map(|f| FrameSample {
                time: f.time - origin,
                ..*f
            })
            .collect()
    }
}
