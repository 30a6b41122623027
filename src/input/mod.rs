pub mod csv;
pub mod json;

pub use self::csv::{read_csv, write_csv};
pub use self::json::{read_json, write_json};

use crate::core::{FrameBuffer, ReplayError, ReplayResult};
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// A frame buffer plus whatever metadata its file carried
#[derive(Debug, Clone)]
pub struct Recording {
    pub recorded_at: Option<DateTime<Utc>>,
    pub frames: FrameBuffer,
}

impl Recording {
    /// Wrap a freshly captured buffer, stamped with the current time
    pub fn now(frames: FrameBuffer) -> Self {
        Self {
            recorded_at: Some(Utc::now()),
            frames,
        }
    }
}

/// Input format detection result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Csv,
    Unknown,
}

impl InputFormat {
    /// Pick a format from the file extension
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => InputFormat::Json,
            Some("csv") => InputFormat::Csv,
            _ => InputFormat::Unknown,
        }
    }
}

/// Detect the format of a recording by looking at its first bytes
pub fn detect_format(data: &[u8]) -> InputFormat {
    if is_json(data) {
        return InputFormat::Json;
    }

    if is_csv(data) {
        return InputFormat::Csv;
    }

    InputFormat::Unknown
}

fn is_json(data: &[u8]) -> bool {
    data.iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b'{')
}

fn is_csv(data: &[u8]) -> bool {
    // A header line with several comma-separated columns
    let sample = &data[..data.len().min(500)];
    let text = match std::str::from_utf8(sample) {
        Ok(text) => text,
        // The cut may land inside a character; sniff the part before it
        Err(e) if e.error_len().is_none() => {
            std::str::from_utf8(&sample[..e.valid_up_to()]).unwrap_or_default()
        }
        Err(_) => return false,
    };
    text.lines()
        .next()
        .is_some_and(|line| line.chars().filter(|&c| c == ',').count() >= 2)
}

/// Load a recording, choosing the format by extension and falling back to sniffing the content
pub fn load_file(path: impl AsRef<Path>) -> ReplayResult<Recording> {
    let path = path.as_ref();

    let format = match InputFormat::from_path(path) {
        InputFormat::Unknown => detect_format(&std::fs::read(path)?),
        known => known,
    };

    let recording = match format {
        InputFormat::Json => read_json(BufReader::new(File::open(path)?))?,
        InputFormat::Csv => Recording {
            recorded_at: None,
            frames: read_csv(BufReader::new(File::open(path)?))?,
        },
        InputFormat::Unknown => return Err(ReplayError::UnknownFormat(path.to_path_buf())),
    };

    info!(
        path = %path.display(),
        frames = recording.frames.len(),
        duration = recording.frames.duration(),
        "Loaded recording"
    );
    Ok(recording)
}

/// Save a recording; the format follows the extension and defaults to JSON
pub fn save_file(path: impl AsRef<Path>, recording: &Recording) -> ReplayResult<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);

    match InputFormat::from_path(path) {
        InputFormat::Csv => write_csv(&mut writer, &recording.frames)?,
        _ => write_json(&mut writer, recording)?,
    }
    writer.flush()?;

    info!(path = %path.display(), frames = recording.frames.len(), "Saved recording");
    Ok(())
}
