use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, saving or validating recordings.
///
/// The playback engine itself never produces these; it degrades to "no pose".
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame {index} goes back in time ({current}s after {previous}s)")]
    NonMonotonic {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("frame {index} has negative time {time}s")]
    NegativeTime { index: usize, time: f64 },

    #[error("frame {index} {which} orientation is not unit length (|q| = {length})")]
    NonUnitOrientation {
        index: usize,
        which: &'static str,
        length: f32,
    },

    #[error("unknown recording format: {}", .0.display())]
    UnknownFormat(PathBuf),
}

pub type ReplayResult<T> = Result<T, ReplayError>;
