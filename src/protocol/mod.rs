//! InfluxDB line-protocol encoding.

pub mod encoder;
pub mod error;
pub mod escape;
pub mod types;
pub mod values;

pub use encoder::{encode, EncoderConfig, LineProtocolEncoder, Validation};
pub use error::EncodeError;
pub use types::{ColumnSpec, FieldType, Row};
