//! CSV input.

pub mod csv;

pub use self::csv::{CsvReader, CsvRecordIterator, DEFAULT_DELIMITER};
