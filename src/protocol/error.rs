//! Errors raised while building or running the encoder.

use thiserror::Error;

use super::types::FieldType;

/// Error returned by [`EncoderConfig`](super::EncoderConfig) construction and
/// by [`LineProtocolEncoder::encode`](super::LineProtocolEncoder::encode).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Missing column '{0}'")]
    MissingColumn(String),

    #[error("At least one field column is required")]
    EmptyFieldSet,

    #[error("Measurement name must not be empty")]
    EmptyMeasurement,

    #[error("Column '{0}' is configured more than once")]
    DuplicateColumn(String),

    #[error("Column '{column}': '{value}' is not a valid {expected} value")]
    InvalidFieldValue {
        column: String,
        value: String,
        expected: FieldType,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_display() {
        let error = EncodeError::MissingColumn("class".to_string());
        assert_eq!(format!("{}", error), "Missing column 'class'");
    }

    #[test]
    fn test_empty_field_set_display() {
        assert_eq!(
            format!("{}", EncodeError::EmptyFieldSet),
            "At least one field column is required"
        );
    }

    #[test]
    fn test_invalid_field_value_display() {
        let error = EncodeError::InvalidFieldValue {
            column: "speed".to_string(),
            value: "fast".to_string(),
            expected: FieldType::Int,
        };
        assert_eq!(
            format!("{}", error),
            "Column 'speed': 'fast' is not a valid int value"
        );
    }
}
