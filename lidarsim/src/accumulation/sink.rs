//! The contract between the accumulation buffer and whatever displays it.

use crate::accumulation::{DirtyRange, PointRingBuffer};

/// Receives the point buffer after each completed scan, and after the buffer is reset. The sink
/// may only read the buffer; it is called after every record of the scan has been ingested, never
/// part way through.
pub trait DisplaySink {
    /// # Arguments
    ///
    /// * `buffer`: the point buffer, whose `active_count` slots starting at 0 should be drawn
    /// * `dirty`: the slots written by the scan that just completed
    fn present(&mut self, buffer: &PointRingBuffer, dirty: DirtyRange);
}

/// A sink that ignores every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn present(&mut self, _buffer: &PointRingBuffer, _dirty: DirtyRange) {}
}

/// A CPU side mirror of a GPU instance array: one column-major 4x4 `f32` matrix per slot, a
/// draw count, and a flag marking that the array must be uploaded again.
#[derive(Debug, Clone)]
pub struct InstanceArray {
    matrices: Vec<[f32; 16]>,
    count: usize,
    needs_upload: bool,
}

impl InstanceArray {
    pub fn new(capacity: usize) -> Self {
        Self {
            matrices: vec![[0.0; 16]; capacity],
            count: 0,
            needs_upload: false,
        }
    }

    /// The number of instances to draw
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn matrices(&self) -> &[[f32; 16]] {
        &self.matrices
    }

    pub fn needs_upload(&self) -> bool {
        self.needs_upload
    }

    /// Clear the upload flag once the renderer has copied the matrices
    pub fn mark_uploaded(&mut self) {
        self.needs_upload = false;
    }
}

impl DisplaySink for InstanceArray {
    fn present(&mut self, buffer: &PointRingBuffer, dirty: DirtyRange) {
        if self.matrices.len() != buffer.capacity() {
            self.matrices.resize(buffer.capacity(), [0.0; 16]);
        }

        for slot in dirty.slots() {
            if let Some(record) = buffer.record_at(slot) {
                let m = record.to_matrix();
                for (dst, src) in self.matrices[slot].iter_mut().zip(m.iter()) {
                    *dst = *src as f32;
                }
            }
        }

        let count = buffer.active_count();
        if !dirty.is_empty() || count != self.count {
            self.needs_upload = true;
        }
        self.count = count;
    }
}
