//! Dataset conversion pipeline.
//!
//! [`transform_geometry`] walks a shape structurally and applies a
//! coordinate function to every vertex; [`convert_dataset`] drives the
//! per-record loop over a source/sink pair with fault isolation: a record
//! that fails to decode, transform, or write is skipped with a warning and
//! never aborts the batch. [`convert_dataset_files`] is the path-level
//! orchestration the CLI uses.
//!
//! Everything here is single-threaded and synchronous; at most one record
//! is resident at a time, and output order equals input order restricted to
//! the successfully converted records.

use std::path::Path;

use log::{info, warn};

use crate::error::{FormatError, MarsconvError, Result};
use crate::geometry::{GeometryShape, Part};
use crate::schema::FeatureRecord;
use crate::store::geojson::{GeoJsonSink, GeoJsonSource};
use crate::store::{FeatureSink, FeatureSource, SpatialRef};
use crate::transform::{Direction, GeoPoint};

/// Records between progress log lines.
const PROGRESS_INTERVAL: u64 = 1000;

/// Warning messages retained in a [`ConversionReport`]; skips beyond this
/// are still counted and logged.
pub const MAX_REPORT_WARNINGS: usize = 10;

/// Outcome of a dataset conversion.
#[derive(Debug, Clone, Default)]
pub struct ConversionReport {
    /// Records read from the source, including skipped ones.
    pub read: u64,
    /// Records written to the sink.
    pub written: u64,
    /// Records skipped after a per-record failure.
    pub skipped: u64,
    /// The first [`MAX_REPORT_WARNINGS`] warning messages, in order.
    pub warnings: Vec<String>,
}

impl ConversionReport {
    fn record_skip(&mut self, position: u64, cause: &MarsconvError) {
        self.skipped += 1;
        let message = format!("record #{position}: {cause}, skipping");
        warn!("{message}");
        if self.warnings.len() < MAX_REPORT_WARNINGS {
            self.warnings.push(message);
        }
    }
}

fn apply_vertex(point: GeoPoint, f: &dyn Fn(GeoPoint) -> GeoPoint) -> Result<GeoPoint> {
    if !point.is_finite() {
        return Err(MarsconvError::Format(FormatError::InvalidGeometry {
            message: format!("non-finite vertex {point}"),
        }));
    }
    let out = f(point);
    if !out.is_finite() {
        return Err(MarsconvError::Format(FormatError::InvalidGeometry {
            message: format!("transform produced a non-finite vertex from {point}"),
        }));
    }
    Ok(out)
}

fn transform_part(part: &Part, f: &dyn Fn(GeoPoint) -> GeoPoint) -> Result<Part> {
    // Null placeholders are dropped, not preserved; empty parts survive.
    let mut vertices = Vec::with_capacity(part.len());
    for vertex in part.vertices.iter().flatten() {
        vertices.push(Some(apply_vertex(*vertex, f)?));
    }
    Ok(Part { vertices })
}

/// Applies a coordinate function to every vertex of a shape, rebuilding a
/// shape of the same variant with parts and vertices in the original order.
///
/// Null vertex placeholders inside a part are silently dropped (the part
/// shrinks); empty parts are preserved positionally. The asymmetry is
/// deliberate: empty parts carry positional meaning, null placeholders do
/// not.
///
/// # Errors
///
/// Returns [`FormatError::InvalidGeometry`] if any vertex is non-finite
/// before or after the transform. Callers treat this as a per-record
/// failure.
pub fn transform_geometry(
    shape: &GeometryShape,
    f: &dyn Fn(GeoPoint) -> GeoPoint,
) -> Result<GeometryShape> {
    match shape {
        GeometryShape::Point(point) => Ok(GeometryShape::Point(apply_vertex(*point, f)?)),
        GeometryShape::Multipoint(parts) => Ok(GeometryShape::Multipoint(transform_parts(parts, f)?)),
        GeometryShape::Polyline(parts) => Ok(GeometryShape::Polyline(transform_parts(parts, f)?)),
        GeometryShape::Polygon(parts) => Ok(GeometryShape::Polygon(transform_parts(parts, f)?)),
    }
}

fn transform_parts(parts: &[Part], f: &dyn Fn(GeoPoint) -> GeoPoint) -> Result<Vec<Part>> {
    parts.iter().map(|part| transform_part(part, f)).collect()
}

/// Streams every record of `source` through the coordinate transform for
/// `direction` and writes the successes to `sink`, in source order.
///
/// Per-record failures (decode errors, unsupported or malformed geometry, a
/// non-finite transform result, a single record's write failure) are
/// contained: the record is counted as skipped, a warning names its 1-based
/// position and cause, and the loop continues.
///
/// # Errors
///
/// Only fatal conditions propagate; the per-record class never does.
pub fn convert_dataset(
    source: &mut dyn FeatureSource,
    sink: &mut dyn FeatureSink,
    direction: Direction,
) -> Result<ConversionReport> {
    let transform = move |p: GeoPoint| direction.apply(p);
    let mut report = ConversionReport::default();

    while let Some(record) = source.next_record() {
        report.read += 1;
        let position = report.read;

        let record = match record {
            Ok(record) => record,
            Err(cause) => {
                report.record_skip(position, &cause);
                continue;
            },
        };

        let geometry = match transform_geometry(&record.geometry, &transform) {
            Ok(geometry) => geometry,
            Err(cause) => {
                report.record_skip(position, &cause);
                continue;
            },
        };

        let outgoing = FeatureRecord {
            values: record.values,
            geometry,
        };
        match sink.write(&outgoing) {
            Ok(()) => report.written += 1,
            Err(cause) => report.record_skip(position, &cause),
        }

        if position % PROGRESS_INTERVAL == 0 {
            info!("processed {position} records");
        }
    }

    info!(
        "conversion finished: {} read, {} written, {} skipped",
        report.read, report.written, report.skipped
    );
    Ok(report)
}

/// Converts one `GeoJSON` dataset file into another.
///
/// Parses the direction token before any I/O, opens the source, creates the
/// sink with an identical field list and the fixed WGS84 (EPSG:4326)
/// spatial reference, runs [`convert_dataset`], and persists the sink.
///
/// # Errors
///
/// Fatal conditions only: an invalid direction token, a missing or
/// unparseable source, or a sink that cannot be created or persisted.
pub fn convert_dataset_files(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    direction_token: &str,
) -> Result<ConversionReport> {
    let direction = Direction::from_token(direction_token)?;
    let input = input.as_ref();
    let output = output.as_ref();
    info!(
        "converting {} -> {} ({direction})",
        input.display(),
        output.display()
    );

    let mut source = GeoJsonSource::open(input)?;
    let mut sink = GeoJsonSink::create(
        output,
        source.geometry_kind(),
        SpatialRef::WGS84,
        source.schema(),
    )?;
    let report = convert_dataset(&mut source, &mut sink, direction)?;
    sink.finish()?;
    Ok(report)
}
