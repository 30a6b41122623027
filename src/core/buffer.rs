use crate::core::error::{ReplayError, ReplayResult};
use crate::core::FrameSample;
use std::ops::Deref;
use std::sync::Arc;

/// Orientation length tolerance used by [`FrameBuffer::validate`]
pub const UNIT_TOLERANCE: f32 = 1e-3;

/// Ordered, immutable sequence of recorded samples.
///
/// Cloning is cheap: all clones share the same frames.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    frames: Arc<[FrameSample]>,
}

impl FrameBuffer {
    pub fn new(frames: Vec<FrameSample>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn frames(&self) -> &[FrameSample] {
        &self.frames
    }

    /// Time of the last sample, or 0 for an empty buffer.
    ///
    /// This is the absolute timestamp, not a span from the first sample.
    pub fn duration(&self) -> f64 {
        self.frames.last().map(|f| f.time).unwrap_or(0.0)
    }

    /// Check the assumptions the playback engine makes about its input.
    ///
    /// The engine itself never calls this; it is for loaders and recorders
    /// that want to reject bad data upstream.
    pub fn validate(&self) -> ReplayResult<()> {
        let mut previous: Option<f64> = None;

        for (index, frame) in self.frames.iter().enumerate() {
            if frame.time < 0.0 {
                return Err(ReplayError::NegativeTime {
                    index,
                    time: frame.time,
                });
            }

            if let Some(previous) = previous {
                if frame.time < previous {
                    return Err(ReplayError::NonMonotonic {
                        index,
                        previous,
                        current: frame.time,
                    });
                }
            }
            previous = Some(frame.time);

            for (which, q) in [
                ("primary", frame.primary_orientation),
                ("secondary", frame.secondary_orientation),
            ] {
                let length = q.length();
                if (length - 1.0).abs() > UNIT_TOLERANCE {
                    return Err(ReplayError::NonUnitOrientation {
                        index,
                        which,
                        length,
                    });
                }
            }
        }

        Ok(())
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

impl Deref for FrameBuffer {
    type Target = [FrameSample];

    fn deref(&self) -> &[FrameSample] {
        &self.frames
    }
}

impl From<Vec<FrameSample>> for FrameBuffer {
    fn from(frames: Vec<FrameSample>) -> Self {
        Self::new(frames)
    }
}

impl FromIterator<FrameSample> for FrameBuffer {
    fn from_iter<I: IntoIterator<Item = FrameSample>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}
