//! Attribute schema types for feature datasets.
//!
//! The pipeline never interprets attribute values; it only needs enough
//! schema metadata to recreate the field list of the input dataset on the
//! output dataset, in the same order and with the same type tags and
//! size/precision metadata. Values themselves travel as opaque JSON.

use std::fmt;

use crate::error::{FormatError, MarsconvError, Result};
use crate::geometry::GeometryShape;

/// Attribute field type tag.
///
/// Closed set; opaque to the pipeline beyond "recreate verbatim".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Whole numbers.
    Integer,
    /// Floating-point numbers.
    Float,
    /// Free text.
    Text,
    /// Calendar dates.
    Date,
}

impl FieldType {
    /// Returns the type's display name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Integer => "Integer",
            FieldType::Float => "Float",
            FieldType::Text => "Text",
            FieldType::Date => "Date",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description of one attribute field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name; non-empty and unique within a schema.
    pub name: String,
    /// Type tag.
    pub field_type: FieldType,
    /// Numeric precision, when the source declares one.
    pub precision: Option<u32>,
    /// Numeric scale, when the source declares one.
    pub scale: Option<u32>,
    /// Text length, when the source declares one.
    pub length: Option<u32>,
}

impl FieldDescriptor {
    /// A descriptor with no size/precision metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            precision: None,
            scale: None,
            length: None,
        }
    }
}

/// Ordered attribute field list of a dataset, geometry excluded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    /// Builds a schema, validating that field names are non-empty and
    /// unique.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::SchemaInference`] on an empty or duplicate
    /// field name.
    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self> {
        for (i, field) in fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(MarsconvError::Format(FormatError::SchemaInference {
                    format: "schema".to_string(),
                    reason: format!("field #{} has an empty name", i + 1),
                }));
            }
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(MarsconvError::Format(FormatError::SchemaInference {
                    format: "schema".to_string(),
                    reason: format!("duplicate field name '{}'", field.name),
                }));
            }
        }
        Ok(Self { fields })
    }

    /// The ordered field list.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` when the dataset carries no attribute fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One feature: opaque attribute values positionally aligned with the
/// dataset schema, plus exactly one geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    /// Attribute values in schema order; copied verbatim to the output.
    pub values: Vec<serde_json::Value>,
    /// The feature's geometry.
    pub geometry: GeometryShape,
}
