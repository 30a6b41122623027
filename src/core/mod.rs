pub mod buffer;
pub mod error;
pub mod sample;

pub use buffer::FrameBuffer;
pub use error::{ReplayError, ReplayResult};
pub use sample::{FrameSample, ARTICULATED_ANGLES};
