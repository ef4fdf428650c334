//! A small little-endian binary format for point records. The file starts with a u32 record
//! count, followed by one 52 byte block per record: position as three f64 values, orientation
//! as an (i, j, k, w) quaternion of f32 values, and scale as three f32 values.

use crate::accumulation::PointRingBuffer;
use crate::na::Quaternion;
use crate::sensors::PointRecord;
use crate::{Point3, Result, UnitQuat, Vector3};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Largest number of records reserved up front; a longer file grows the vector as it is read
const MAX_PREALLOCATED: usize = 1 << 20;

/// Write the active records of the buffer in slot order
pub fn write_records(path: &Path, buffer: &PointRingBuffer) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let count = buffer.active_count() as u32;
    writer.write_all(&count.to_le_bytes())?;

    for record in buffer.active_records() {
        for c in record.position.coords.iter() {
            writer.write_all(&c.to_le_bytes())?;
        }
        for c in record.orientation.coords.iter() {
            writer.write_all(&(*c as f32).to_le_bytes())?;
        }
        for c in record.scale.iter() {
            writer.write_all(&(*c as f32).to_le_bytes())?;
        }
    }

    writer.flush()?;
    Ok(())
}

fn read_f64(reader: &mut impl Read) -> Result<f64> {
    let mut bytes = [0u8; 8];
    reader.read_exact(&mut bytes)?;
    Ok(f64::from_le_bytes(bytes))
}

fn read_f32(reader: &mut impl Read) -> Result<f64> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(f32::from_le_bytes(bytes) as f64)
}

/// Read records written by `write_records`. The orientation is renormalized after the round trip
/// through f32.
pub fn read_records(path: &Path) -> Result<Vec<PointRecord>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut count_bytes = [0u8; 4];
    reader.read_exact(&mut count_bytes)?;
    let count = u32::from_le_bytes(count_bytes) as usize;

    let mut records = Vec::with_capacity(count.min(MAX_PREALLOCATED));
    for _ in 0..count {
        let position = Point3::new(
            read_f64(&mut reader)?,
            read_f64(&mut reader)?,
            read_f64(&mut reader)?,
        );
        let (i, j, k, w) = (
            read_f32(&mut reader)?,
            read_f32(&mut reader)?,
            read_f32(&mut reader)?,
            read_f32(&mut reader)?,
        );
        let scale = Vector3::new(
            read_f32(&mut reader)?,
            read_f32(&mut reader)?,
            read_f32(&mut reader)?,
        );

        records.push(PointRecord {
            position,
            orientation: UnitQuat::new_normalize(Quaternion::new(w, i, j, k)),
            scale,
        });
    }

    Ok(records)
}
