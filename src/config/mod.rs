//! Column configuration.
//!
//! Columns are configured as comma-separated lists: bare names for tags
//! (`name,class`, or `*` for every non-field column) and `name:type` pairs
//! for fields (`speed:int,strength:float`). The configuration is resolved
//! against a CSV header into an [`EncoderConfig`].

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::protocol::{ColumnSpec, EncodeError, EncoderConfig, FieldType, Validation};
use crate::timestamp::Precision;

/// Measurement used when none is configured.
pub const DEFAULT_MEASUREMENT: &str = "sample_measurement";

/// Separator between a field name and its type.
const FIELD_TYPE_SEPARATOR: char = ':';

/// Selects which columns become tags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagSelection {
    /// No tags.
    #[default]
    None,
    /// The listed columns, in this order.
    Columns(Vec<String>),
    /// Every header column that is not a field, in header order.
    AllOtherColumns,
}

/// Parse a field column list such as `speed:int,strength:float`.
pub fn parse_field_columns(spec: &str) -> Result<Vec<(String, FieldType)>> {
    let mut fields = Vec::new();
    let mut seen = HashSet::new();

    for item in split_list(spec) {
        let (name, type_name) = item.rsplit_once(FIELD_TYPE_SEPARATOR).ok_or_else(|| {
            Error::InvalidColumnSpec(format!(
                "field '{}' has no type (expected name{}type)",
                item, FIELD_TYPE_SEPARATOR
            ))
        })?;

        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidColumnSpec(format!(
                "field '{}' has an empty name",
                item
            )));
        }

        let value_type: FieldType = type_name
            .trim()
            .parse()
            .map_err(|e: String| Error::InvalidColumnSpec(format!("field '{}': {}", name, e)))?;

        if !seen.insert(name.to_string()) {
            return Err(Error::InvalidColumnSpec(format!(
                "field '{}' is listed twice",
                name
            )));
        }
        fields.push((name.to_string(), value_type));
    }

    if fields.is_empty() {
        return Err(EncodeError::EmptyFieldSet.into());
    }

    Ok(fields)
}

/// Parse a tag column list such as `name,class`, or `*`.
pub fn parse_tag_columns(spec: Option<&str>) -> Result<TagSelection> {
    let spec = match spec.map(str::trim) {
        None | Some("") => return Ok(TagSelection::None),
        Some("*") => return Ok(TagSelection::AllOtherColumns),
        Some(spec) => spec,
    };

    let mut tags = Vec::new();
    let mut seen = HashSet::new();
    for item in split_list(spec) {
        if item == "*" {
            return Err(Error::InvalidColumnSpec(
                "'*' cannot be combined with other tag columns".to_string(),
            ));
        }
        if !seen.insert(item) {
            return Err(Error::InvalidColumnSpec(format!(
                "tag '{}' is listed twice",
                item
            )));
        }
        tags.push(item.to_string());
    }

    Ok(TagSelection::Columns(tags))
}

/// Header label for `name`: an exact match, else the first label equal
/// ignoring case.
fn find_label<'h>(headers: &'h [String], name: &str) -> Option<&'h str> {
    headers
        .iter()
        .find(|h| *h == name)
        .or_else(|| {
            let wanted = name.to_lowercase();
            headers.iter().find(|h| h.to_lowercase() == wanted)
        })
        .map(String::as_str)
}

fn split_list(spec: &str) -> impl Iterator<Item = &str> {
    spec.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Run configuration, independent of any particular CSV header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionConfig {
    pub measurement: String,
    pub tags: TagSelection,
    pub fields: Vec<(String, FieldType)>,
    /// Fixed timestamp in Unix epoch nanoseconds.
    pub timestamp: Option<i64>,
    pub precision: Precision,
    pub validation: Validation,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            measurement: DEFAULT_MEASUREMENT.to_string(),
            tags: TagSelection::None,
            fields: Vec::new(),
            timestamp: None,
            precision: Precision::default(),
            validation: Validation::default(),
        }
    }
}

impl ConversionConfig {
    /// Build a configuration from textual column lists.
    pub fn from_specs(
        measurement: &str,
        tag_spec: Option<&str>,
        field_spec: &str,
    ) -> Result<Self> {
        Ok(Self {
            measurement: measurement.to_string(),
            tags: parse_tag_columns(tag_spec)?,
            fields: parse_field_columns(field_spec)?,
            ..Default::default()
        })
    }

    /// Resolve the configuration against a CSV header.
    ///
    /// Configured names match header labels ignoring case, preferring an
    /// exact match; the header's spelling becomes the key. A configured
    /// column absent from `headers` is reported as a
    /// [`EncodeError::MissingColumn`] on line 1. A column may not be both a
    /// tag and a field.
    pub fn resolve(&self, headers: &[String]) -> Result<EncoderConfig> {
        let lookup = |name: &str| {
            find_label(headers, name)
                .map(str::to_string)
                .ok_or_else(|| Error::at_line(1, EncodeError::MissingColumn(name.to_string())))
        };

        let fields: Vec<(String, FieldType)> = self
            .fields
            .iter()
            .map(|(name, value_type)| Ok((lookup(name)?, *value_type)))
            .collect::<Result<_>>()?;
        let field_names: HashSet<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();

        let tag_names: Vec<String> = match &self.tags {
            TagSelection::None => Vec::new(),
            TagSelection::Columns(names) => {
                let tags = names
                    .iter()
                    .map(|name| lookup(name))
                    .collect::<Result<Vec<_>>>()?;
                if let Some(both) = tags.iter().find(|t| field_names.contains(t.as_str())) {
                    return Err(Error::InvalidColumnSpec(format!(
                        "column '{}' cannot be both a tag and a field",
                        both
                    )));
                }
                tags
            }
            TagSelection::AllOtherColumns => {
                let mut seen: HashSet<&String> = HashSet::new();
                headers
                    .iter()
                    .filter(|h| !h.is_empty() && !field_names.contains(h.as_str()))
                    .filter(|h| seen.insert(*h))
                    .cloned()
                    .collect()
            }
        };

        let columns = tag_names.into_iter().map(ColumnSpec::tag).chain(
            fields
                .into_iter()
                .map(|(name, value_type)| ColumnSpec::field(name, value_type)),
        );

        let config = EncoderConfig::new(self.measurement.clone(), columns)?
            .with_timestamp(self.timestamp)
            .with_precision(self.precision)
            .with_validation(self.validation);

        log::debug!(
            "Tag columns: [{}]",
            config
                .tag_columns()
                .iter()
                .map(ColumnSpec::name)
                .collect::<Vec<_>>()
                .join(", ")
        );
        log::debug!(
            "Field columns: [{}]",
            config
                .field_columns()
                .iter()
                .map(|c| format!("{}:{}", c.name(), c.value_type().map_or("", |t| t.as_str())))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_field_columns() {
        let fields = parse_field_columns("speed:int,strength:float").unwrap();
        assert_eq!(
            fields,
            vec![
                ("speed".to_string(), FieldType::Int),
                ("strength".to_string(), FieldType::Float),
            ]
        );
    }

    #[test]
    fn test_parse_field_columns_trims_and_skips_empty() {
        let fields = parse_field_columns(" name : str , ok:bool,").unwrap();
        assert_eq!(
            fields,
            vec![
                ("name".to_string(), FieldType::String),
                ("ok".to_string(), FieldType::Bool),
            ]
        );
    }

    #[test]
    fn test_parse_field_column_name_with_colon() {
        let fields = parse_field_columns("ns:key:int").unwrap();
        assert_eq!(fields, vec![("ns:key".to_string(), FieldType::Int)]);
    }

    #[test]
    fn test_parse_field_columns_missing_type() {
        let err = parse_field_columns("speed").unwrap_err();
        assert!(matches!(err, Error::InvalidColumnSpec(_)));
        assert!(err.to_string().contains("speed"));
    }

    #[test]
    fn test_parse_field_columns_unknown_type() {
        let err = parse_field_columns("speed:double").unwrap_err();
        assert!(matches!(err, Error::InvalidColumnSpec(_)));
        assert!(err.to_string().contains("double"));
    }

    #[test]
    fn test_parse_field_columns_empty_name() {
        let err = parse_field_columns(":int").unwrap_err();
        assert!(matches!(err, Error::InvalidColumnSpec(_)));
    }

    #[test]
    fn test_parse_field_columns_duplicate() {
        let err = parse_field_columns("a:int,a:float").unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn test_parse_field_columns_empty() {
        let err = parse_field_columns(" , ").unwrap_err();
        assert!(matches!(err, Error::Encode(EncodeError::EmptyFieldSet)));
    }

    #[test]
    fn test_parse_tag_columns() {
        assert_eq!(parse_tag_columns(None).unwrap(), TagSelection::None);
        assert_eq!(parse_tag_columns(Some("")).unwrap(), TagSelection::None);
        assert_eq!(
            parse_tag_columns(Some("*")).unwrap(),
            TagSelection::AllOtherColumns
        );
        assert_eq!(
            parse_tag_columns(Some("name, class")).unwrap(),
            TagSelection::Columns(vec!["name".to_string(), "class".to_string()])
        );
    }

    #[test]
    fn test_parse_tag_columns_star_mixed() {
        assert!(parse_tag_columns(Some("name,*")).is_err());
    }

    #[test]
    fn test_parse_tag_columns_duplicate() {
        assert!(parse_tag_columns(Some("a,a")).is_err());
    }

    #[test]
    fn test_resolve_keeps_tag_order() {
        let config =
            ConversionConfig::from_specs("m", Some("zone,app"), "v:float").unwrap();
        let resolved = config.resolve(&headers(&["app", "v", "zone"])).unwrap();
        let tags: Vec<_> = resolved.tag_columns().iter().map(ColumnSpec::name).collect();
        assert_eq!(tags, vec!["zone", "app"]);
    }

    #[test]
    fn test_resolve_all_other_columns() {
        let config = ConversionConfig::from_specs("m", Some("*"), "speed:int").unwrap();
        let resolved = config
            .resolve(&headers(&["name", "speed", "class"]))
            .unwrap();
        let tags: Vec<_> = resolved.tag_columns().iter().map(ColumnSpec::name).collect();
        assert_eq!(tags, vec!["name", "class"]);
        assert_eq!(resolved.field_columns().len(), 1);
    }

    #[test]
    fn test_resolve_missing_header_column() {
        let config = ConversionConfig::from_specs("m", Some("class"), "speed:int").unwrap();
        let err = config.resolve(&headers(&["speed"])).unwrap_err();
        match err {
            Error::Row { line, source } => {
                assert_eq!(line, 1);
                assert_eq!(source, EncodeError::MissingColumn("class".to_string()));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_ignores_case_and_keeps_header_spelling() {
        let config = ConversionConfig::from_specs("m", Some("HOST"), "speed:int").unwrap();
        let resolved = config.resolve(&headers(&["Host", "Speed"])).unwrap();
        let names: Vec<_> = resolved.columns().map(ColumnSpec::name).collect();
        assert_eq!(names, vec!["Host", "Speed"]);
    }

    #[test]
    fn test_resolve_prefers_exact_label() {
        let config = ConversionConfig::from_specs("m", None, "speed:int").unwrap();
        let resolved = config.resolve(&headers(&["SPEED", "speed"])).unwrap();
        assert_eq!(resolved.field_columns()[0].name(), "speed");
    }

    #[test]
    fn test_resolve_all_other_columns_skips_empty_label() {
        let config = ConversionConfig::from_specs("m", Some("*"), "v:int").unwrap();
        let resolved = config.resolve(&headers(&["", "host", "v"])).unwrap();
        let tags: Vec<_> = resolved.tag_columns().iter().map(ColumnSpec::name).collect();
        assert_eq!(tags, vec!["host"]);
    }

    #[test]
    fn test_resolve_overlap_differing_in_case() {
        let config = ConversionConfig::from_specs("m", Some("Speed"), "speed:int").unwrap();
        let err = config.resolve(&headers(&["speed"])).unwrap_err();
        assert!(matches!(err, Error::InvalidColumnSpec(_)));
    }

    #[test]
    fn test_resolve_tag_and_field_overlap() {
        let config = ConversionConfig::from_specs("m", Some("speed"), "speed:int").unwrap();
        let err = config.resolve(&headers(&["speed"])).unwrap_err();
        assert!(matches!(err, Error::InvalidColumnSpec(_)));
    }

    #[test]
    fn test_resolve_empty_measurement() {
        let config = ConversionConfig::from_specs("", None, "v:float").unwrap();
        let err = config.resolve(&headers(&["v"])).unwrap_err();
        assert!(matches!(err, Error::Encode(EncodeError::EmptyMeasurement)));
    }

    #[test]
    fn test_resolve_carries_timestamp_and_precision() {
        let config = ConversionConfig {
            timestamp: Some(42),
            precision: Precision::Seconds,
            validation: Validation::Strict,
            ..ConversionConfig::from_specs("m", None, "v:float").unwrap()
        };
        let resolved = config.resolve(&headers(&["v"])).unwrap();
        assert_eq!(resolved.timestamp(), Some(42));
        assert_eq!(resolved.precision(), Precision::Seconds);
        assert_eq!(resolved.validation(), Validation::Strict);
    }

    #[test]
    fn test_default_measurement() {
        assert_eq!(ConversionConfig::default().measurement, "sample_measurement");
    }
}
