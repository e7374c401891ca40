//! Column and row types for line-protocol encoding.

use std::fmt;

use indexmap::IndexMap;

/// One CSV record, keyed by header label in header order.
pub type Row = IndexMap<String, String>;

/// Declared type of a field column.
///
/// The type only decides how the raw CSV text is rendered; the value itself
/// is not parsed unless strict validation is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Float,
    Int,
    String,
    Bool,
}

impl FieldType {
    /// Canonical short name, as accepted in `name:type` column specs.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Float => "float",
            FieldType::Int => "int",
            FieldType::String => "str",
            FieldType::Bool => "bool",
        }
    }

    /// All field types, in the order they are listed in help and errors.
    pub fn all() -> [FieldType; 4] {
        [
            FieldType::Float,
            FieldType::Int,
            FieldType::String,
            FieldType::Bool,
        ]
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "float" => Ok(FieldType::Float),
            "int" | "integer" => Ok(FieldType::Int),
            "str" | "string" => Ok(FieldType::String),
            "bool" | "boolean" => Ok(FieldType::Bool),
            _ => Err(format!(
                "Unknown field type '{}'. Valid types are: {}",
                s,
                FieldType::all()
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

/// How a single CSV column is mapped onto a point.
///
/// A column is either a tag or a field; only fields carry a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSpec {
    Tag { name: String },
    Field { name: String, value_type: FieldType },
}

impl ColumnSpec {
    pub fn tag(name: impl Into<String>) -> Self {
        ColumnSpec::Tag { name: name.into() }
    }

    pub fn field(name: impl Into<String>, value_type: FieldType) -> Self {
        ColumnSpec::Field {
            name: name.into(),
            value_type,
        }
    }

    /// Header label this column reads from.
    pub fn name(&self) -> &str {
        match self {
            ColumnSpec::Tag { name } | ColumnSpec::Field { name, .. } => name,
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, ColumnSpec::Tag { .. })
    }

    /// Declared type, `None` for tags.
    pub fn value_type(&self) -> Option<FieldType> {
        match self {
            ColumnSpec::Tag { .. } => None,
            ColumnSpec::Field { value_type, .. } => Some(*value_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_from_str() {
        assert_eq!("float".parse::<FieldType>().unwrap(), FieldType::Float);
        assert_eq!("int".parse::<FieldType>().unwrap(), FieldType::Int);
        assert_eq!("integer".parse::<FieldType>().unwrap(), FieldType::Int);
        assert_eq!("str".parse::<FieldType>().unwrap(), FieldType::String);
        assert_eq!("string".parse::<FieldType>().unwrap(), FieldType::String);
        assert_eq!("bool".parse::<FieldType>().unwrap(), FieldType::Bool);
        assert_eq!("BOOLEAN".parse::<FieldType>().unwrap(), FieldType::Bool);
    }

    #[test]
    fn test_field_type_from_str_unknown() {
        let err = "double".parse::<FieldType>().unwrap_err();
        assert!(err.contains("double"));
        assert!(err.contains("float, int, str, bool"));
    }

    #[test]
    fn test_field_type_display_round_trips() {
        for t in FieldType::all() {
            assert_eq!(t.to_string().parse::<FieldType>().unwrap(), t);
        }
    }

    #[test]
    fn test_column_spec_accessors() {
        let tag = ColumnSpec::tag("class");
        assert!(tag.is_tag());
        assert_eq!(tag.name(), "class");
        assert_eq!(tag.value_type(), None);

        let field = ColumnSpec::field("speed", FieldType::Int);
        assert!(!field.is_tag());
        assert_eq!(field.name(), "speed");
        assert_eq!(field.value_type(), Some(FieldType::Int));
    }
}
