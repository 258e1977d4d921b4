//! Geometry model for the conversion pipeline.
//!
//! [`GeometryShape`] is a closed sum type over the four feature geometries
//! the tool converts. Composite shapes are ordered sequences of [`Part`]s;
//! a part is an ordered sequence of vertices in which a vertex may be a
//! null placeholder (legacy feature classes use them to separate sub-rings
//! inside one part). Part order and vertex order are identity-relevant and
//! are preserved by every operation in this crate.

use std::fmt;

use crate::transform::GeoPoint;

/// One ring / segment chain / point group within a composite geometry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Part {
    /// Ordered vertices; `None` is a null placeholder.
    pub vertices: Vec<Option<GeoPoint>>,
}

impl Part {
    /// Builds a part from concrete points, no placeholders.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = GeoPoint>) -> Self {
        Self {
            vertices: points.into_iter().map(Some).collect(),
        }
    }

    /// Number of vertex slots, placeholders included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// `true` if the part has no vertex slots at all.
    ///
    /// Empty parts are legal and are preserved positionally by the
    /// transform.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterates the concrete (non-placeholder) vertices in order.
    pub fn points(&self) -> impl Iterator<Item = GeoPoint> + '_ {
        self.vertices.iter().copied().flatten()
    }
}

/// Geometry kind tag, used for dataset-level declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    /// Single point.
    Point,
    /// Unordered-looking but order-preserving point set.
    Multipoint,
    /// One or more segment chains.
    Polyline,
    /// One or more rings.
    Polygon,
}

impl GeometryKind {
    /// Returns the kind's display name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::Multipoint => "Multipoint",
            GeometryKind::Polyline => "Polyline",
            GeometryKind::Polygon => "Polygon",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A feature geometry.
///
/// The variant set is closed: anything a dataset holds that does not map
/// onto one of these four shapes is rejected at the store boundary as an
/// unsupported geometry type, which the conversion loop treats as a
/// per-record failure.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryShape {
    /// Exactly one point.
    Point(GeoPoint),
    /// A group of points, one or more parts.
    Multipoint(Vec<Part>),
    /// One or more segment chains.
    Polyline(Vec<Part>),
    /// One or more rings.
    Polygon(Vec<Part>),
}

impl GeometryShape {
    /// Projects the kind tag of this shape.
    #[must_use]
    pub fn kind(&self) -> GeometryKind {
        match self {
            GeometryShape::Point(_) => GeometryKind::Point,
            GeometryShape::Multipoint(_) => GeometryKind::Multipoint,
            GeometryShape::Polyline(_) => GeometryKind::Polyline,
            GeometryShape::Polygon(_) => GeometryKind::Polygon,
        }
    }

    /// The shape's parts; a point has none.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        match self {
            GeometryShape::Point(_) => &[],
            GeometryShape::Multipoint(parts)
            | GeometryShape::Polyline(parts)
            | GeometryShape::Polygon(parts) => parts,
        }
    }

    /// Total count of concrete vertices across all parts.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        match self {
            GeometryShape::Point(_) => 1,
            _ => self.parts().iter().map(|p| p.points().count()).sum(),
        }
    }
}
