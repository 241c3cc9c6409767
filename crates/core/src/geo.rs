//! Coordinate validation, great-circle distance, and bounding-box pre-filter.
//!
//! All distance math uses the haversine formula with the mean Earth radius.
//! The bounding box is a cheap rectangular pre-filter; callers must still
//! apply the exact haversine check to candidates inside the box.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Minimum accepted query/visibility radius in meters.
pub const MIN_RADIUS_M: i32 = 100;

/// Maximum accepted query/visibility radius in meters.
pub const MAX_RADIUS_M: i32 = 10_000;

/// Default query/visibility radius in meters.
pub const DEFAULT_RADIUS_M: i32 = 1_000;

/// A WGS84 coordinate pair, degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Validate a coordinate pair at the boundary.
///
/// Rejects out-of-range and non-finite values with a validation error.
/// Never clamps — a claimed position of (91, 0) is a client bug, not a
/// position near the pole.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), CoreError> {
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(CoreError::Validation(
            "Coordinates must be finite numbers".to_string(),
        ));
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(CoreError::Validation(format!(
            "Latitude must be between -90 and 90, got {latitude}"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(CoreError::Validation(format!(
            "Longitude must be between -180 and 180, got {longitude}"
        )));
    }
    Ok(())
}

/// Validate a query/visibility radius against [`MIN_RADIUS_M`]..=[`MAX_RADIUS_M`].
pub fn validate_radius(radius_m: i32) -> Result<(), CoreError> {
    if !(MIN_RADIUS_M..=MAX_RADIUS_M).contains(&radius_m) {
        return Err(CoreError::Validation(format!(
            "Radius must be between {MIN_RADIUS_M} and {MAX_RADIUS_M} meters, got {radius_m}"
        )));
    }
    Ok(())
}

/// Great-circle distance between two points in meters (haversine formula).
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlng = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Great-circle distance in kilometers.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    haversine_m(a, b) / 1000.0
}

/// Rectangular lat/lng window used to pre-filter candidates before the exact
/// haversine check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Build a box around `center` that fully contains the circle of
    /// `radius_m` meters.
    ///
    /// The longitude delta widens with latitude (degrees shrink toward the
    /// poles); the cosine is floored so the box stays finite at high
    /// latitudes. Edges are clamped to valid coordinate ranges — the box
    /// does not wrap the antimeridian, it is a pre-filter only.
    pub fn around(center: GeoPoint, radius_m: f64) -> Self {
        let lat_delta = radius_m / METERS_PER_DEGREE;
        let lat_cos = center.latitude.to_radians().cos().max(0.01);
        let lng_delta = radius_m / (METERS_PER_DEGREE * lat_cos);

        Self {
            min_lat: (center.latitude - lat_delta).max(-90.0),
            max_lat: (center.latitude + lat_delta).min(90.0),
            min_lng: (center.longitude - lng_delta).max(-180.0),
            max_lng: (center.longitude + lng_delta).min(180.0),
        }
    }

    pub fn contains(&self, p: GeoPoint) -> bool {
        p.latitude >= self.min_lat
            && p.latitude <= self.max_lat
            && p.longitude >= self.min_lng
            && p.longitude <= self.max_lng
    }
}
