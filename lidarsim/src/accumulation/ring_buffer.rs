//! A fixed capacity store of point records which is continuously overwritten, oldest first.

use crate::config::check_capacity;
use crate::sensors::PointRecord;
use crate::Result;
use std::ops::Range;

/// The span of slots written by one batch of ingests. Because the cursor wraps, the span may
/// run past the end of the buffer and continue at slot 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRange {
    /// The first slot written
    pub start: usize,

    /// The number of distinct slots written, never more than the capacity
    pub len: usize,

    capacity: usize,
}

impl DirtyRange {
    pub fn empty(capacity: usize) -> Self {
        Self {
            start: 0,
            len: 0,
            capacity,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The written slots as at most two contiguous ranges, in write order
    pub fn segments(&self) -> Vec<Range<usize>> {
        if self.len == 0 {
            return Vec::new();
        }
        let end = self.start + self.len;
        if end <= self.capacity {
            vec![self.start..end]
        } else {
            vec![self.start..self.capacity, 0..end - self.capacity]
        }
    }

    /// Every written slot index, in write order
    pub fn slots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).map(move |k| (self.start + k) % self.capacity)
    }
}

/// A ring buffer of point records. Writes go to the cursor, which then advances and wraps, so
/// once more than `capacity` records have been written the buffer holds the most recent
/// `capacity` of them. There is no way to remove a single record.
#[derive(Debug, Clone)]
pub struct PointRingBuffer {
    slots: Vec<Option<PointRecord>>,
    cursor: usize,
    total_written: u64,
}

impl PointRingBuffer {
    pub fn new(capacity: usize) -> Result<Self> {
        check_capacity(capacity)?;
        Ok(Self {
            slots: vec![None; capacity],
            cursor: 0,
            total_written: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The slot the next record will be written to
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The number of records ever written, including the ones since overwritten
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// The number of slots holding a record, `min(total_written, capacity)`
    pub fn active_count(&self) -> usize {
        self.total_written.min(self.capacity() as u64) as usize
    }

    pub fn is_full(&self) -> bool {
        self.active_count() == self.capacity()
    }

    /// Write a record at the cursor and advance the cursor.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is outside the buffer, which can only happen through a defect in the
    /// cursor bookkeeping.
    pub fn ingest(&mut self, record: PointRecord) {
        let capacity = self.capacity();
        assert!(
            self.cursor < capacity,
            "ring buffer cursor {} is outside of capacity {}",
            self.cursor,
            capacity
        );

        self.slots[self.cursor] = Some(record);
        self.cursor = (self.cursor + 1) % capacity;
        self.total_written += 1;
    }

    /// Ingest records in order and report the slots that were written.
    pub fn ingest_all<I: IntoIterator<Item = PointRecord>>(&mut self, records: I) -> DirtyRange {
        let start = self.cursor;
        let mut written = 0;
        for record in records {
            self.ingest(record);
            written += 1;
        }

        DirtyRange {
            start,
            len: written.min(self.capacity()),
            capacity: self.capacity(),
        }
    }

    /// The record currently in `slot`, or `None` if the slot has never been written or is
    /// outside the buffer.
    pub fn record_at(&self, slot: usize) -> Option<&PointRecord> {
        self.slots.get(slot).and_then(|r| r.as_ref())
    }

    /// The records of the active slots in slot order, which is the layout an instance buffer
    /// sees. This is not write order once the buffer has wrapped.
    pub fn active_records(&self) -> impl Iterator<Item = &PointRecord> {
        self.slots[..self.active_count()].iter().flatten()
    }

    /// Clear every slot and return the cursor and counter to zero
    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.cursor = 0;
        self.total_written = 0;
    }
}
