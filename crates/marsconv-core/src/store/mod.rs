//! Feature dataset sources and sinks.
//!
//! The conversion pipeline is format-agnostic: it consumes a
//! [`FeatureSource`] and produces into a [`FeatureSink`], both synchronous
//! and forward-only. The concrete backend shipped here is `GeoJSON`
//! ([`geojson::GeoJsonSource`] / [`geojson::GeoJsonSink`]); the
//! [`memory`] backend backs tests and embedding.
//!
//! Handle lifetimes are scoped: a source or sink owns its file handle and
//! releases it on drop, on every exit path. Sinks additionally persist
//! buffered output in [`FeatureSink::finish`].

pub mod geojson;
pub mod memory;

use std::fmt;
use std::path::PathBuf;

use crate::error::Result;
use crate::geometry::GeometryKind;
use crate::schema::{FeatureRecord, Schema};

/// Spatial reference identified by EPSG code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpatialRef {
    /// EPSG code.
    pub epsg: u32,
}

impl SpatialRef {
    /// WGS84 geographic coordinates (EPSG:4326). All output datasets are
    /// declared in this reference frame regardless of conversion direction.
    pub const WGS84: SpatialRef = SpatialRef { epsg: 4326 };

    /// URN form used when stamping output datasets.
    #[must_use]
    pub fn as_urn(self) -> String {
        format!("urn:ogc:def:crs:EPSG::{}", self.epsg)
    }
}

impl fmt::Display for SpatialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

/// Introspection summary of a dataset.
#[derive(Debug, Clone)]
pub struct DatasetInfo {
    /// Path to the dataset.
    pub path: PathBuf,
    /// Declared geometry kind.
    pub geometry_kind: GeometryKind,
    /// Number of features in the dataset.
    pub feature_count: usize,
    /// Ordered attribute field list, geometry excluded.
    pub schema: Schema,
}

/// A readable feature dataset.
///
/// Reading is forward-only and yields records in the dataset's stable
/// order. A record that cannot be decoded is yielded as an `Err` item --
/// the stream itself continues, so one malformed feature never hides the
/// rest of the dataset.
pub trait FeatureSource {
    /// The dataset's ordered attribute field list, geometry excluded.
    fn schema(&self) -> &Schema;

    /// The dataset's declared geometry kind.
    fn geometry_kind(&self) -> GeometryKind;

    /// Reads the next record, or `None` when the dataset is exhausted.
    fn next_record(&mut self) -> Option<Result<FeatureRecord>>;
}

/// A writable feature dataset.
pub trait FeatureSink {
    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be accepted; the conversion
    /// loop treats this as a per-record failure.
    fn write(&mut self, record: &FeatureRecord) -> Result<()>;

    /// Flushes and persists the dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset cannot be persisted.
    fn finish(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wgs84_urn_and_display() {
        assert_eq!(SpatialRef::WGS84.as_urn(), "urn:ogc:def:crs:EPSG::4326");
        assert_eq!(SpatialRef::WGS84.to_string(), "EPSG:4326");
    }
}
