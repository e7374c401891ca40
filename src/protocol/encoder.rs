//! Row to line-protocol encoding.
//!
//! A line has the shape
//!
//! ```text
//! measurement[,tag=value...] field=value[,field=value...][ timestamp]
//! ```
//!
//! Tags and fields are written in the order they were configured. Tags are
//! never sorted; callers that want InfluxDB's preferred ordering pass them
//! sorted.

use std::collections::HashSet;

use super::error::EncodeError;
use super::escape::{push_key, push_measurement, push_string_field};
use super::types::{ColumnSpec, FieldType, Row};
use super::values::is_valid_literal;
use crate::timestamp::Precision;

/// How much the encoder trusts field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validation {
    /// Write the CSV text as-is (only suffixing and quoting are applied).
    #[default]
    Lenient,
    /// Reject values that are not literals of the declared field type.
    Strict,
}

/// Immutable encoder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    measurement: String,
    tag_columns: Vec<ColumnSpec>,
    field_columns: Vec<ColumnSpec>,
    timestamp: Option<i64>,
    precision: Precision,
    validation: Validation,
}

impl EncoderConfig {
    /// Build a configuration from a measurement and a list of columns.
    ///
    /// Tag and field columns keep their relative order from `columns`.
    /// Fails if the measurement is empty, if no field column is given, or if
    /// a column name appears twice.
    pub fn new(
        measurement: impl Into<String>,
        columns: impl IntoIterator<Item = ColumnSpec>,
    ) -> Result<Self, EncodeError> {
        let measurement = measurement.into();
        if measurement.is_empty() {
            return Err(EncodeError::EmptyMeasurement);
        }

        let mut seen = HashSet::new();
        let (tag_columns, field_columns): (Vec<_>, Vec<_>) = columns
            .into_iter()
            .map(|column| {
                if seen.insert(column.name().to_string()) {
                    Ok(column)
                } else {
                    Err(EncodeError::DuplicateColumn(column.name().to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .partition(ColumnSpec::is_tag);

        if field_columns.is_empty() {
            return Err(EncodeError::EmptyFieldSet);
        }

        Ok(Self {
            measurement,
            tag_columns,
            field_columns,
            timestamp: None,
            precision: Precision::default(),
            validation: Validation::default(),
        })
    }

    /// Stamp every line with a fixed instant, in Unix epoch nanoseconds.
    pub fn with_timestamp(mut self, timestamp: Option<i64>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn tag_columns(&self) -> &[ColumnSpec] {
        &self.tag_columns
    }

    pub fn field_columns(&self) -> &[ColumnSpec] {
        &self.field_columns
    }

    pub fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn validation(&self) -> Validation {
        self.validation
    }

    /// Every configured column, tags first.
    pub fn columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.tag_columns.iter().chain(self.field_columns.iter())
    }
}

/// A configured field with its key already escaped.
#[derive(Debug, Clone)]
struct FieldSlot {
    name: String,
    key: String,
    value_type: FieldType,
}

/// A configured tag with its key already escaped.
#[derive(Debug, Clone)]
struct TagSlot {
    name: String,
    key: String,
}

/// Stateless line-protocol encoder.
///
/// Escaped keys, measurement and timestamp are computed once at
/// construction; `encode` only touches the row. The encoder is `Sync` and
/// can be shared between worker threads.
#[derive(Debug, Clone)]
pub struct LineProtocolEncoder {
    config: EncoderConfig,
    prefix: String,
    tags: Vec<TagSlot>,
    fields: Vec<FieldSlot>,
    suffix: String,
}

impl LineProtocolEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        let mut prefix = String::with_capacity(config.measurement.len());
        push_measurement(&mut prefix, &config.measurement);

        let tags = config
            .tag_columns
            .iter()
            .map(|column| TagSlot {
                name: column.name().to_string(),
                key: escaped_key(column.name()),
            })
            .collect();

        let fields = config
            .field_columns
            .iter()
            .filter_map(|column| match column {
                ColumnSpec::Field { name, value_type } => Some(FieldSlot {
                    name: name.clone(),
                    key: escaped_key(name),
                    value_type: *value_type,
                }),
                ColumnSpec::Tag { .. } => None,
            })
            .collect();

        let suffix = match config.timestamp {
            Some(nanos) => format!(" {}", config.precision.from_nanos(nanos)),
            None => String::new(),
        };

        Self {
            config,
            prefix,
            tags,
            fields,
            suffix,
        }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encode one row into a new line (without trailing newline).
    pub fn encode(&self, row: &Row) -> Result<String, EncodeError> {
        let mut line = String::with_capacity(self.prefix.len() + 16 * self.fields.len());
        self.encode_into(row, &mut line)?;
        Ok(line)
    }

    /// Append the encoded row to `out`.
    ///
    /// On error `out` may hold a partially written line.
    pub fn encode_into(&self, row: &Row, out: &mut String) -> Result<(), EncodeError> {
        out.push_str(&self.prefix);

        for tag in &self.tags {
            let value = lookup(row, &tag.name)?;
            // Empty tag values are dropped, InfluxDB rejects `key=`
            if value.is_empty() {
                continue;
            }
            out.push(',');
            out.push_str(&tag.key);
            out.push('=');
            push_key(out, value);
        }

        for (i, field) in self.fields.iter().enumerate() {
            let value = lookup(row, &field.name)?;
            if self.config.validation == Validation::Strict
                && !is_valid_literal(value, field.value_type)
            {
                return Err(EncodeError::InvalidFieldValue {
                    column: field.name.clone(),
                    value: value.to_string(),
                    expected: field.value_type,
                });
            }

            out.push(if i == 0 { ' ' } else { ',' });
            out.push_str(&field.key);
            out.push('=');
            push_field_value(out, value, field.value_type);
        }

        out.push_str(&self.suffix);
        Ok(())
    }
}

fn escaped_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    push_key(&mut key, name);
    key
}

fn lookup<'a>(row: &'a Row, name: &str) -> Result<&'a str, EncodeError> {
    row.get(name)
        .map(String::as_str)
        .ok_or_else(|| EncodeError::MissingColumn(name.to_string()))
}

/// Append a field value rendered for its declared type.
pub fn push_field_value(out: &mut String, value: &str, value_type: FieldType) {
    match value_type {
        FieldType::Int => {
            out.push_str(value);
            out.push('i');
        }
        FieldType::Float | FieldType::Bool => out.push_str(value),
        FieldType::String => push_string_field(out, value),
    }
}

/// Encode a single row with a one-off encoder.
pub fn encode(config: &EncoderConfig, row: &Row) -> Result<String, EncodeError> {
    LineProtocolEncoder::new(config.clone()).encode(row)
}
