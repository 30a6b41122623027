use crate::core::{FrameBuffer, FrameSample, ReplayResult};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// One CSV row per sample.
///
/// Columns: `time, px, py, pz, qx, qy, qz, qw, a0..a3, cx, cy, cz, cqx, cqy, cqz, cqw`
/// where `p`/`q` are the vehicle pose, `a` the wheel angles and `c` the camera.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    time: f64,
    px: f32,
    py: f32,
    pz: f32,
    qx: f32,
    qy: f32,
    qz: f32,
    qw: f32,
    a0: f32,
    a1: f32,
    a2: f32,
    a3: f32,
    cx: f32,
    cy: f32,
    cz: f32,
    cqx: f32,
    cqy: f32,
    cqz: f32,
    cqw: f32,
}

impl From<&FrameSample> for CsvRow {
    fn from(f: &FrameSample) -> Self {
        let [a0, a1, a2, a3] = f.articulated_angles;
        Self {
            time: f.time,
            px: f.primary_position.x,
            py: f.primary_position.y,
            pz: f.primary_position.z,
            qx: f.primary_orientation.x,
            qy: f.primary_orientation.y,
            qz: f.primary_orientation.z,
            qw: f.primary_orientation.w,
            a0,
            a1,
            a2,
            a3,
            cx: f.secondary_position.x,
            cy: f.secondary_position.y,
            cz: f.secondary_position.z,
            cqx: f.secondary_orientation.x,
            cqy: f.secondary_orientation.y,
            cqz: f.secondary_orientation.z,
            cqw: f.secondary_orientation.w,
        }
    }
}

impl From<CsvRow> for FrameSample {
    fn from(r: CsvRow) -> Self {
        Self {
            time: r.time,
            primary_position: Vec3::new(r.px, r.py, r.pz),
            primary_orientation: Quat::from_xyzw(r.qx, r.qy, r.qz, r.qw),
            articulated_angles: [r.a0, r.a1, r.a2, r.a3],
            secondary_position: Vec3::new(r.cx, r.cy, r.cz),
            secondary_orientation: Quat::from_xyzw(r.cqx, r.cqy, r.cqz, r.cqw),
        }
    }
}

/// Read samples from CSV with a header row. Column order does not matter.
pub fn read_csv<R: Read>(reader: R) -> ReplayResult<FrameBuffer> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut frames: Vec<FrameSample> = Vec::new();
    for row in rdr.deserialize::<CsvRow>() {
        frames.push(row?.into());
    }

    Ok(FrameBuffer::new(frames))
}

/// Write samples as CSV with a header row
pub fn write_csv<W: Write>(writer: W, buffer: &FrameBuffer) -> ReplayResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for frame in buffer.iter() {
        wtr.serialize(CsvRow::from(frame))?;
    }
    wtr.flush()?;
    Ok(())
}
