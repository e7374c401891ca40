//! csv2influx
//!
//! A Rust library and CLI tool for converting CSV data into InfluxDB line
//! protocol, and optionally posting it to an InfluxDB write endpoint.
//!
//! Columns are mapped onto points by configuration: some columns become
//! tags, some become typed fields, and every line can be stamped with one
//! fixed timestamp. Values are written as found in the CSV; only the type
//! suffix, quoting and escaping required by line protocol are applied.
//!
//! # Example
//!
//! ```rust
//! use csv2influx::{ColumnSpec, EncoderConfig, FieldType, LineProtocolEncoder, Row};
//!
//! let config = EncoderConfig::new(
//!     "movement",
//!     vec![
//!         ColumnSpec::tag("class"),
//!         ColumnSpec::field("speed", FieldType::Int),
//!     ],
//! )
//! .unwrap();
//! let encoder = LineProtocolEncoder::new(config);
//!
//! let mut row = Row::new();
//! row.insert("speed".to_string(), "42".to_string());
//! row.insert("class".to_string(), "A,B".to_string());
//!
//! assert_eq!(encoder.encode(&row).unwrap(), r"movement,class=A\,B speed=42i");
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod input;
pub mod output;
pub mod protocol;
pub mod timestamp;

// Re-export commonly used types
pub use config::{
    parse_field_columns, parse_tag_columns, ConversionConfig, TagSelection, DEFAULT_MEASUREMENT,
};
pub use convert::{ConvertStats, Converter};
pub use error::{Error, Result};
pub use input::{CsvReader, CsvRecordIterator};
pub use output::{HttpSink, LineSink, MultiSink, OutputPath, WriterSink};
pub use protocol::{
    encode, ColumnSpec, EncodeError, EncoderConfig, FieldType, LineProtocolEncoder, Row,
    Validation,
};
pub use timestamp::{parse_timestamp, Precision};

use std::io::{Read, Write};

/// High-level function to convert CSV from a reader into line protocol on a
/// writer.
pub fn convert_csv<R: Read, W: Write>(
    input: R,
    output: &mut W,
    config: ConversionConfig,
) -> Result<ConvertStats> {
    let mut sink = WriterSink::new(output);
    let stats = Converter::new(config).convert(input, &mut sink)?;
    sink.finish()?;

    log::info!("Converted {} lines", stats.lines);
    Ok(stats)
}
