//! Location related module
//!
//! A `Coordinate` is a plain (latitude, longitude) pair in degrees.  Comparison is exact on
//! purpose: two samples are the same when the tracker sends back the very same numbers.
//!
//! Distances are computed on the WGS84 ellipsoid with the geodesic algorithm from `geo`
//! (Karney), not with the spherical haversine approximation.
//!
use std::fmt::{Display, Formatter};

use geo::{point, GeodesicDistance};
use serde::{Deserialize, Serialize};

/// Actual location
///
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Coordinate {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
}

impl Coordinate {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Distance to `other` in kilometres.
    ///
    #[inline]
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance(*self, *other)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from(value: (f64, f64)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Geodesic distance between `a` and `b`, in kilometres.
///
/// NOTE: `geo` wants (x, y), that is (lon, lat).
///
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let a = point!(x: a.lon, y: a.lat);
    let b = point!(x: b.lon, y: b.lat);
    a.geodesic_distance(&b) / 1_000.
}
