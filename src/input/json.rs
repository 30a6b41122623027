use crate::core::{FrameBuffer, FrameSample, ReplayResult};
use crate::input::Recording;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

#[derive(Deserialize)]
struct RecordingFile {
    #[serde(default)]
    recorded_at: Option<DateTime<Utc>>,
    frames: Vec<FrameSample>,
}

#[derive(Serialize)]
struct RecordingFileRef<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    recorded_at: Option<DateTime<Utc>>,
    frames: &'a [FrameSample],
}

pub fn read_json<R: Read>(reader: R) -> ReplayResult<Recording> {
    let file: RecordingFile = serde_json::from_reader(reader)?;
    Ok(Recording {
        recorded_at: file.recorded_at,
        frames: FrameBuffer::new(file.frames),
    })
}

pub fn write_json<W: Write>(writer: W, recording: &Recording) -> ReplayResult<()> {
    let file = RecordingFileRef {
        recorded_at: recording.recorded_at,
        frames: recording.frames.frames(),
    };
    serde_json::to_writer_pretty(writer, &file)?;
    Ok(())
}
