use crate::core::FrameSample;

/// The two samples bracketing a query time and the blend factor between them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Locate {
    pub low: usize,
    pub high: usize,
    /// Normalized position between `low` and `high`, in `[0, 1]`
    pub t: f64,
}

impl Locate {
    fn snap(index: usize) -> Self {
        Self {
            low: index,
            high: index,
            t: 0.0,
        }
    }
}

/// Find the samples bracketing `target` seconds.
///
/// `target` is clamped to `[0, frames[last].time]`, so the result never
/// extrapolates past either end. Returns `None` only for an empty slice.
pub fn locate(frames: &[FrameSample], target: f64) -> Option<Locate> {
    let last = frames.len().checked_sub(1)?;
    let duration = frames[last].time;

    // max/min rather than clamp: a negative final timestamp must not panic
    let target = target.max(0.0).min(duration);

    // Count of samples at or before target; the bracket's low end is the one before that
    let upper = frames.partition_point(|f| f.time <= target);
    let Some(low) = upper.checked_sub(1) else {
        // Buffer starts after the query time
        return Some(Locate::snap(0));
    };

    if low >= last {
        return Some(Locate::snap(last));
    }

    let high = low + 1;
    let span = frames[high].time - frames[low].time;
    let t = if span > 0.0 {
        ((target - frames[low].time) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };

    Some(Locate { low, high, t })
}
