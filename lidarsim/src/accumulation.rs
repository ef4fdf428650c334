//! Accumulation of point records across scans, and the interface the display reads them through.

mod ring_buffer;
mod sink;

pub use ring_buffer::{DirtyRange, PointRingBuffer};
pub use sink::{DisplaySink, InstanceArray, NullSink};
