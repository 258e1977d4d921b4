//! `GeoJSON`-backed feature source and sink.
//!
//! Reading accepts a `FeatureCollection`, a single `Feature`, or a bare
//! geometry. The attribute schema is inferred from feature properties
//! (field type from the first non-null value); the declared geometry kind
//! is taken from the first decodable geometry. Geometry variants with no
//! counterpart in the pipeline's shape model (`MultiPolygon`,
//! `GeometryCollection`) surface as per-record errors, not parse failures.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue, Value};
use log::debug;

use crate::error::{FormatError, IoError, IoErrorExt, MarsconvError, Result};
use crate::geometry::{GeometryKind, GeometryShape, Part};
use crate::schema::{FeatureRecord, FieldDescriptor, FieldType, Schema};
use crate::store::{DatasetInfo, FeatureSink, FeatureSource, SpatialRef};

const FORMAT: &str = "GeoJSON";

/// Forward-only reader over a `GeoJSON` dataset.
#[derive(Debug)]
pub struct GeoJsonSource {
    path: PathBuf,
    schema: Schema,
    geometry_kind: GeometryKind,
    feature_count: usize,
    features: std::vec::IntoIter<Feature>,
}

impl GeoJsonSource {
    /// Opens a `GeoJSON` dataset and infers its schema and geometry kind.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::FileNotFound`] if `path` does not exist,
    /// [`IoError::Read`] if it cannot be opened, and
    /// [`FormatError::Parse`] if it is not valid `GeoJSON`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MarsconvError::Io(IoError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let file = File::open(path).with_read_context(FORMAT, path)?;
        let geojson =
            GeoJson::from_reader(BufReader::new(file)).map_err(|e| {
                MarsconvError::Format(FormatError::Parse {
                    format: FORMAT.to_string(),
                    message: e.to_string(),
                })
            })?;

        let features = match geojson {
            GeoJson::FeatureCollection(collection) => collection.features,
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::Geometry(geometry) => vec![Feature {
                bbox: None,
                geometry: Some(geometry),
                id: None,
                properties: None,
                foreign_members: None,
            }],
        };

        let schema = infer_schema(&features)?;
        let geometry_kind = infer_geometry_kind(&features);
        debug!(
            "opened {}: {} feature(s), {} field(s), kind {}",
            path.display(),
            features.len(),
            schema.len(),
            geometry_kind
        );

        Ok(Self {
            path: path.to_path_buf(),
            schema,
            geometry_kind,
            feature_count: features.len(),
            features: features.into_iter(),
        })
    }

    /// Introspection summary for the dataset.
    #[must_use]
    pub fn describe(&self) -> DatasetInfo {
        DatasetInfo {
            path: self.path.clone(),
            geometry_kind: self.geometry_kind,
            feature_count: self.feature_count,
            schema: self.schema.clone(),
        }
    }
}

impl FeatureSource for GeoJsonSource {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn geometry_kind(&self) -> GeometryKind {
        self.geometry_kind
    }

    fn next_record(&mut self) -> Option<Result<FeatureRecord>> {
        let feature = self.features.next()?;
        Some(decode_feature(feature, &self.schema))
    }
}

/// Buffered writer creating a `GeoJSON` dataset.
///
/// The output file is created eagerly so an unwritable target fails the run
/// before any record is processed; features are buffered and persisted as a
/// `FeatureCollection` in [`FeatureSink::finish`].
pub struct GeoJsonSink {
    path: PathBuf,
    file: File,
    schema: Schema,
    spatial_ref: SpatialRef,
    features: Vec<Feature>,
}

impl GeoJsonSink {
    /// Creates the output dataset with a replicated field list.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Write`] if the target file cannot be created.
    pub fn create(
        path: impl AsRef<Path>,
        kind: GeometryKind,
        spatial_ref: SpatialRef,
        schema: &Schema,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).with_write_context(FORMAT, path)?;
        debug!(
            "created {} ({}, {}, {} field(s))",
            path.display(),
            kind,
            spatial_ref,
            schema.len()
        );
        Ok(Self {
            path: path.to_path_buf(),
            file,
            schema: schema.clone(),
            spatial_ref,
            features: Vec::new(),
        })
    }
}

impl FeatureSink for GeoJsonSink {
    fn write(&mut self, record: &FeatureRecord) -> Result<()> {
        let mut properties = JsonObject::new();
        for (field, value) in self.schema.fields().iter().zip(&record.values) {
            properties.insert(field.name.clone(), value.clone());
        }
        self.features.push(Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(encode_geometry(&record.geometry))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let mut foreign_members = JsonObject::new();
        foreign_members.insert(
            "crs".to_string(),
            serde_json::json!({
                "type": "name",
                "properties": { "name": self.spatial_ref.as_urn() },
            }),
        );
        let collection = FeatureCollection {
            bbox: None,
            features: std::mem::take(&mut self.features),
            foreign_members: Some(foreign_members),
        };
        let mut writer = BufWriter::new(&self.file);
        serde_json::to_writer_pretty(&mut writer, &collection)
            .with_write_context(FORMAT, self.path.clone())?;
        writer.flush().with_write_context(FORMAT, self.path.clone())
    }
}

fn infer_schema(features: &[Feature]) -> Result<Schema> {
    let mut fields: Vec<FieldDescriptor> = Vec::new();
    // Fields first seen as null stay untyped until a typed value appears.
    let mut settled: Vec<bool> = Vec::new();
    for feature in features {
        let Some(properties) = &feature.properties else {
            continue;
        };
        for (name, value) in properties {
            match fields.iter().position(|f| f.name == *name) {
                Some(i) => {
                    if !settled[i] && !value.is_null() {
                        apply_inferred_type(&mut fields[i], value);
                        settled[i] = true;
                    }
                },
                None => {
                    let mut field = FieldDescriptor::new(name.clone(), FieldType::Text);
                    if !value.is_null() {
                        apply_inferred_type(&mut field, value);
                    }
                    settled.push(!value.is_null());
                    fields.push(field);
                },
            }
        }
    }
    Schema::new(fields)
}

fn apply_inferred_type(field: &mut FieldDescriptor, value: &JsonValue) {
    field.field_type = match value {
        JsonValue::Number(n) if n.is_i64() || n.is_u64() => FieldType::Integer,
        JsonValue::Number(_) => FieldType::Float,
        _ => FieldType::Text,
    };
    if let JsonValue::String(s) = value {
        field.length = Some(s.len() as u32);
    }
}

fn infer_geometry_kind(features: &[Feature]) -> GeometryKind {
    features
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .find_map(|g| kind_of_value(&g.value))
        .unwrap_or(GeometryKind::Point)
}

fn kind_of_value(value: &Value) -> Option<GeometryKind> {
    match value {
        Value::Point(_) => Some(GeometryKind::Point),
        Value::MultiPoint(_) => Some(GeometryKind::Multipoint),
        Value::LineString(_) | Value::MultiLineString(_) => Some(GeometryKind::Polyline),
        Value::Polygon(_) => Some(GeometryKind::Polygon),
        _ => None,
    }
}

fn decode_feature(feature: Feature, schema: &Schema) -> Result<FeatureRecord> {
    let geometry = feature.geometry.ok_or_else(|| {
        MarsconvError::Format(FormatError::InvalidGeometry {
            message: "feature has no geometry".to_string(),
        })
    })?;
    let geometry = decode_geometry(&geometry.value)?;

    let properties = feature.properties.unwrap_or_default();
    let values = schema
        .fields()
        .iter()
        .map(|f| properties.get(&f.name).cloned().unwrap_or(JsonValue::Null))
        .collect();

    Ok(FeatureRecord { values, geometry })
}

fn decode_geometry(value: &Value) -> Result<GeometryShape> {
    match value {
        Value::Point(position) => Ok(GeometryShape::Point(decode_position(position)?)),
        Value::MultiPoint(positions) => {
            Ok(GeometryShape::Multipoint(vec![decode_part(positions)?]))
        },
        Value::LineString(positions) => Ok(GeometryShape::Polyline(vec![decode_part(positions)?])),
        Value::MultiLineString(lines) => Ok(GeometryShape::Polyline(
            lines.iter().map(|l| decode_part(l)).collect::<Result<_>>()?,
        )),
        Value::Polygon(rings) => Ok(GeometryShape::Polygon(
            rings.iter().map(|r| decode_part(r)).collect::<Result<_>>()?,
        )),
        other => Err(MarsconvError::Format(FormatError::UnsupportedGeometryType {
            geometry_type: describe_value(other).to_string(),
        })),
    }
}

/// Helper to describe geometry value kinds for error messages.
fn describe_value(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn decode_part(positions: &[Vec<f64>]) -> Result<Part> {
    Ok(Part {
        vertices: positions
            .iter()
            .map(|p| decode_position(p).map(Some))
            .collect::<Result<_>>()?,
    })
}

fn decode_position(position: &[f64]) -> Result<crate::transform::GeoPoint> {
    if position.len() < 2 {
        return Err(MarsconvError::Format(FormatError::InvalidGeometry {
            message: format!("position has {} ordinate(s), expected at least 2", position.len()),
        }));
    }
    Ok(crate::transform::GeoPoint::new(position[0], position[1]))
}

fn encode_geometry(shape: &GeometryShape) -> Value {
    match shape {
        GeometryShape::Point(p) => Value::Point(vec![p.lng, p.lat]),
        GeometryShape::Multipoint(parts) => Value::MultiPoint(
            parts
                .iter()
                .flat_map(|part| part.points())
                .map(|p| vec![p.lng, p.lat])
                .collect(),
        ),
        GeometryShape::Polyline(parts) => {
            let mut lines: Vec<Vec<Vec<f64>>> = parts.iter().map(encode_part).collect();
            if lines.len() == 1 {
                Value::LineString(lines.remove(0))
            } else {
                Value::MultiLineString(lines)
            }
        },
        GeometryShape::Polygon(parts) => Value::Polygon(parts.iter().map(encode_part).collect()),
    }
}

fn encode_part(part: &Part) -> Vec<Vec<f64>> {
    part.points().map(|p| vec![p.lng, p.lat]).collect()
}
