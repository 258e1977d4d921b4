//! WGS84 <-> GCJ-02 coordinate correction.
//!
//! GCJ-02 ("Mars coordinates") is derived from WGS84 by a nonlinear,
//! position-dependent offset that is only applied inside mainland China.
//! The forward direction is closed-form; the reverse direction is the
//! customary first-order approximation (`2p - forward(p)`), which leaves a
//! residual on the order of the correction's nonlinearity -- typically
//! sub-meter, but not bounded. It must not be replaced with an iterative
//! exact inverse: that would change output values for existing datasets.
//!
//! All functions here are pure, O(1) per point, and perform no I/O.

use std::f64::consts::PI;
use std::fmt;

use crate::error::{ConfigError, MarsconvError};

/// Semi-major axis of the Krasovsky 1940 ellipsoid, meters.
const AXIS: f64 = 6_378_245.0;
/// Squared eccentricity of the Krasovsky 1940 ellipsoid.
const EE: f64 = 0.006_693_421_622_965_943;

/// A longitude/latitude pair in decimal degrees.
///
/// Immutable value type; construction is free-form and no range clamping is
/// performed (out-of-range points simply fall outside the correction region).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Latitude in decimal degrees.
    pub lat: f64,
}

impl GeoPoint {
    /// Creates a point from longitude and latitude in decimal degrees.
    #[must_use]
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Returns `true` if both ordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lng, self.lat)
    }
}

/// Returns `true` when the point lies outside the rectangular region where
/// the GCJ-02 obfuscation applies.
///
/// Outside this box both conversion directions are the identity. The bounds
/// are the ones every known implementation of the algorithm uses, hence the
/// corpus-wide name.
#[must_use]
pub fn out_of_china(point: GeoPoint) -> bool {
    !(72.004..=137.8347).contains(&point.lng) || !(0.8293..=55.8271).contains(&point.lat)
}

fn offset_lat(x: f64, y: f64) -> f64 {
    let mut ret = -100.0 + 2.0 * x + 3.0 * y + 0.2 * y * y + 0.1 * x * y + 0.2 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (y * PI).sin() + 40.0 * (y / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (160.0 * (y / 12.0 * PI).sin() + 320.0 * (y * PI / 30.0).sin()) * 2.0 / 3.0;
    ret
}

fn offset_lng(x: f64, y: f64) -> f64 {
    let mut ret = 300.0 + x + 2.0 * y + 0.1 * x * x + 0.1 * x * y + 0.1 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (x * PI).sin() + 40.0 * (x / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (150.0 * (x / 12.0 * PI).sin() + 300.0 * (x / 30.0 * PI).sin()) * 2.0 / 3.0;
    ret
}

/// Converts a WGS84 point to GCJ-02.
///
/// Identity for points outside the correction region. Inside it, the offset
/// series are evaluated at the point shifted by the region's approximate
/// center `(105.0, 35.0)` and scaled into degrees by the ellipsoidal radii
/// of curvature at the point's latitude.
#[must_use]
pub fn wgs84_to_gcj02(point: GeoPoint) -> GeoPoint {
    if out_of_china(point) {
        return point;
    }
    let dlat = offset_lat(point.lng - 105.0, point.lat - 35.0);
    let dlng = offset_lng(point.lng - 105.0, point.lat - 35.0);
    let radlat = point.lat / 180.0 * PI;
    let magic = radlat.sin();
    let magic = 1.0 - EE * magic * magic;
    let sqrtmagic = magic.sqrt();
    let dlat = (dlat * 180.0) / ((AXIS * (1.0 - EE)) / (magic * sqrtmagic) * PI);
    let dlng = (dlng * 180.0) / (AXIS / sqrtmagic * radlat.cos() * PI);
    GeoPoint::new(point.lng + dlng, point.lat + dlat)
}

/// Converts a GCJ-02 point back to WGS84 (approximate).
///
/// Identity outside the correction region. Inside it, applies the forward
/// correction at the GCJ-02 point and reflects: `2p - forward(p)`. Because
/// the offset is evaluated at the obfuscated position rather than the true
/// one, the result carries a small residual; see the module docs.
#[must_use]
pub fn gcj02_to_wgs84(point: GeoPoint) -> GeoPoint {
    if out_of_china(point) {
        return point;
    }
    let p2 = wgs84_to_gcj02(point);
    GeoPoint::new(2.0 * point.lng - p2.lng, 2.0 * point.lat - p2.lat)
}

/// Conversion direction between the two supported datums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// WGS84 -> GCJ-02 (apply the obfuscation).
    Wgs84ToGcj02,
    /// GCJ-02 -> WGS84 (approximate de-obfuscation).
    Gcj02ToWgs84,
}

impl Direction {
    /// Parses one of the two literal direction tokens.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] for any other input. Callers
    /// are expected to parse the token before touching any dataset, so a bad
    /// token fails the run before I/O starts.
    pub fn from_token(token: &str) -> Result<Self, MarsconvError> {
        match token {
            "WGS84_TO_GCJ02" => Ok(Direction::Wgs84ToGcj02),
            "GCJ02_TO_WGS84" => Ok(Direction::Gcj02ToWgs84),
            other => Err(MarsconvError::Config(ConfigError::InvalidOption {
                option: "direction".to_string(),
                message: format!(
                    "'{other}' is not a conversion direction (expected WGS84_TO_GCJ02 or GCJ02_TO_WGS84)"
                ),
            })),
        }
    }

    /// Applies this direction's coordinate transform to a single point.
    #[must_use]
    pub fn apply(self, point: GeoPoint) -> GeoPoint {
        match self {
            Direction::Wgs84ToGcj02 => wgs84_to_gcj02(point),
            Direction::Gcj02ToWgs84 => gcj02_to_wgs84(point),
        }
    }

    /// The literal token this direction parses from.
    #[must_use]
    pub fn as_token(self) -> &'static str {
        match self {
            Direction::Wgs84ToGcj02 => "WGS84_TO_GCJ02",
            Direction::Gcj02ToWgs84 => "GCJ02_TO_WGS84",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}
