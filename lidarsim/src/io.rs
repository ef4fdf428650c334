//! This module has I/O functionality for exporting the accumulated point records

mod records;

pub use records::{read_records, write_records};
