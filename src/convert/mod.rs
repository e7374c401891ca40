//! CSV to line-protocol conversion pipeline.
//!
//! Rows are read sequentially, collected into batches, encoded (in parallel
//! when enabled) and handed to the sink in input order. The first failing row
//! of a batch aborts the conversion; nothing after it is written.

use std::io::Read;

use rayon::prelude::*;

use crate::config::ConversionConfig;
use crate::error::{Error, Result};
use crate::input::{CsvRecordIterator, DEFAULT_DELIMITER};
use crate::output::LineSink;
use crate::protocol::{LineProtocolEncoder, Row};

/// Rows encoded per batch.
pub const DEFAULT_BATCH_SIZE: usize = 4096;

/// Counters for one converted input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertStats {
    /// Data rows read (header excluded).
    pub rows: usize,
    /// Lines handed to the sink.
    pub lines: usize,
}

impl std::ops::AddAssign for ConvertStats {
    fn add_assign(&mut self, other: Self) {
        self.rows += other.rows;
        self.lines += other.lines;
    }
}

/// Converts CSV inputs with one configuration.
#[derive(Debug, Clone)]
pub struct Converter {
    config: ConversionConfig,
    delimiter: u8,
    batch_size: usize,
    parallel: bool,
}

impl Converter {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            config,
            delimiter: DEFAULT_DELIMITER,
            batch_size: DEFAULT_BATCH_SIZE,
            parallel: true,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Encode batches on the rayon pool instead of the calling thread.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Convert one CSV input into `sink`.
    ///
    /// The header is resolved against the configuration before any row is
    /// read. The sink is not finished, so several inputs can share it.
    pub fn convert<R: Read, S: LineSink + ?Sized>(
        &self,
        input: R,
        sink: &mut S,
    ) -> Result<ConvertStats> {
        let iter = CsvRecordIterator::with_delimiter(input, self.delimiter)?;
        log::debug!("Header labels: [{}]", iter.headers().join(", "));

        let encoder = LineProtocolEncoder::new(self.config.resolve(iter.headers())?);

        let mut stats = ConvertStats::default();
        let mut batch: Vec<(usize, Row)> = Vec::with_capacity(self.batch_size);

        for result in iter {
            match result {
                Ok(item) => batch.push(item),
                Err(e) => {
                    // Rows before the unreadable one still go out
                    self.flush_batch(&encoder, &mut batch, sink, &mut stats)?;
                    return Err(e);
                }
            }
            if batch.len() >= self.batch_size {
                self.flush_batch(&encoder, &mut batch, sink, &mut stats)?;
            }
        }
        self.flush_batch(&encoder, &mut batch, sink, &mut stats)?;

        Ok(stats)
    }

    fn flush_batch<S: LineSink + ?Sized>(
        &self,
        encoder: &LineProtocolEncoder,
        batch: &mut Vec<(usize, Row)>,
        sink: &mut S,
        stats: &mut ConvertStats,
    ) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let encoded: Vec<_> = if self.parallel && batch.len() > 1 {
            batch
                .par_iter()
                .map(|(_, row)| encoder.encode(row))
                .collect()
        } else {
            batch.iter().map(|(_, row)| encoder.encode(row)).collect()
        };

        for ((line_number, _), result) in batch.iter().zip(encoded) {
            stats.rows += 1;
            let line = result.map_err(|e| Error::at_line(*line_number, e))?;
            sink.write_line(&line)?;
            stats.lines += 1;
        }

        log::trace!("Flushed batch of {} rows", batch.len());
        batch.clear();
        Ok(())
    }
}
