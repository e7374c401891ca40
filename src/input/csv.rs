//! CSV input reader.
//!
//! This module provides CSV parsing with header support.

use std::io::Read;

use crate::error::{Error, Result};
use crate::protocol::Row;

/// Default field delimiter.
pub const DEFAULT_DELIMITER: u8 = b',';

/// CSV reader that converts records to header-keyed rows.
pub struct CsvReader<R: Read> {
    reader: csv::Reader<R>,
    headers: Vec<String>,
    line_number: usize,
}

impl<R: Read> CsvReader<R> {
    /// Create a new comma-separated reader.
    pub fn new(reader: R) -> Result<Self> {
        Self::with_delimiter(reader, DEFAULT_DELIMITER)
    }

    /// Create a new reader with a custom single-byte delimiter.
    pub fn with_delimiter(reader: R, delimiter: u8) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            // Width is checked against the header in read_record
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        // Read headers
        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| Error::CsvParse(e.to_string()))?
            .iter()
            .map(|s| s.to_string())
            .collect();

        Ok(Self {
            reader: csv_reader,
            headers,
            line_number: 1, // Header is line 1
        })
    }

    /// Get the headers.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Get the line number of the last record read.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read the next record as a row.
    ///
    /// A record must have exactly one value per header label. When a label
    /// repeats, the first occurrence wins.
    pub fn read_record(&mut self) -> Result<Option<Row>> {
        let mut record = csv::StringRecord::new();

        match self.reader.read_record(&mut record) {
            Ok(true) => {
                self.line_number = match record.position() {
                    Some(pos) => pos.line() as usize,
                    None => self.line_number + 1,
                };

                if record.len() != self.headers.len() {
                    return Err(Error::RowWidth {
                        line: self.line_number,
                        found: record.len(),
                        expected: self.headers.len(),
                    });
                }

                let mut row = Row::with_capacity(self.headers.len());
                for (key, value) in self.headers.iter().zip(record.iter()) {
                    row.entry(key.clone())
                        .or_insert_with(|| value.to_string());
                }

                Ok(Some(row))
            }
            Ok(false) => Ok(None),
            Err(e) => Err(Error::CsvParse(e.to_string())),
        }
    }
}

/// Iterator adapter for CSV reader.
pub struct CsvRecordIterator<R: Read> {
    reader: CsvReader<R>,
}

impl<R: Read> CsvRecordIterator<R> {
    pub fn new(reader: R) -> Result<Self> {
        Ok(Self {
            reader: CsvReader::new(reader)?,
        })
    }

    pub fn with_delimiter(reader: R, delimiter: u8) -> Result<Self> {
        Ok(Self {
            reader: CsvReader::with_delimiter(reader, delimiter)?,
        })
    }

    pub fn line_number(&self) -> usize {
        self.reader.line_number()
    }

    pub fn headers(&self) -> &[String] {
        self.reader.headers()
    }
}

impl<R: Read> Iterator for CsvRecordIterator<R> {
    type Item = Result<(usize, Row)>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record() {
            Ok(Some(row)) => Some(Ok((self.reader.line_number(), row))),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
