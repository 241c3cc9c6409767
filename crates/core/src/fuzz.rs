//! Deterministic coordinate fuzzing for client-facing artifact positions.
//!
//! Exact drop points are never exposed: responses carry a jittered position
//! within [`FUZZ_RADIUS_M`] of the true one. The jitter is derived from the
//! artifact id, so the same artifact always renders at the same fuzzed spot —
//! repeated queries cannot be averaged to recover the true location. Stored
//! rows and distance math always use the true coordinates.

use sha2::{Digest, Sha256};

use crate::geo::{GeoPoint, METERS_PER_DEGREE};
use crate::types::DbId;

/// Maximum jitter applied per axis, meters.
pub const FUZZ_RADIUS_M: f64 = 75.0;

/// Return a jittered copy of `point`, offset deterministically by `id`.
pub fn fuzz_location(id: DbId, point: GeoPoint) -> GeoPoint {
    let digest = Sha256::digest(id.to_be_bytes());

    // Two independent offsets in [-1.0, 1.0), one per axis.
    let lat_unit = unit_offset(&digest[0..8]);
    let lng_unit = unit_offset(&digest[8..16]);

    let lat_delta = lat_unit * FUZZ_RADIUS_M / METERS_PER_DEGREE;
    let lat_cos = point.latitude.to_radians().cos().max(0.01);
    let lng_delta = lng_unit * FUZZ_RADIUS_M / (METERS_PER_DEGREE * lat_cos);

    GeoPoint {
        latitude: (point.latitude + lat_delta).clamp(-90.0, 90.0),
        longitude: (point.longitude + lng_delta).clamp(-180.0, 180.0),
    }
}

/// Map 8 digest bytes to [-1.0, 1.0).
fn unit_offset(bytes: &[u8]) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    let raw = u64::from_be_bytes(buf);
    (raw as f64 / u64::MAX as f64) * 2.0 - 1.0
}
