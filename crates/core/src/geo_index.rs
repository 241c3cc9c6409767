//! Pluggable geo index: bounding-box pre-filter plus exact haversine check.
//!
//! The engine has no hard dependency on a database spatial extension. The
//! Postgres repositories run the same bounding-box pre-filter in SQL and
//! refine with [`refine_and_sort`]; [`MemoryGeoIndex`] is the DB-free
//! fallback used by tests and embedded callers.

use crate::geo::{haversine_m, BoundingBox, GeoPoint};
use crate::types::Timestamp;

/// An entity that can be placed in a geo index.
pub trait Locatable {
    fn location(&self) -> GeoPoint;
    fn created_at(&self) -> Timestamp;
}

/// A radius query over located entities.
///
/// Results are sorted by distance ascending; ties broken by `created_at`
/// descending (newest first). An empty index yields an empty list, never an
/// error.
pub trait GeoIndex<T: Locatable> {
    fn nearby(&self, center: GeoPoint, radius_m: f64) -> Vec<(T, f64)>;
}

/// Exact-distance refinement over a candidate set that already passed a
/// bounding-box pre-filter (in SQL or in memory).
///
/// Drops candidates outside `radius_m` and returns the survivors paired with
/// their distance, in query order: distance ascending, ties newest-first.
pub fn refine_and_sort<T: Locatable>(
    candidates: Vec<T>,
    center: GeoPoint,
    radius_m: f64,
) -> Vec<(T, f64)> {
    let mut results: Vec<(T, f64)> = candidates
        .into_iter()
        .map(|c| {
            let d = haversine_m(center, c.location());
            (c, d)
        })
        .filter(|(_, d)| *d <= radius_m)
        .collect();

    sort_by_distance(&mut results);
    results
}

/// Sort `(entity, distance)` pairs: distance ascending, ties newest-first.
pub fn sort_by_distance<T: Locatable>(results: &mut [(T, f64)]) {
    results.sort_by(|(a, da), (b, db)| {
        da.partial_cmp(db)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.created_at().cmp(&a.created_at()))
    });
}

/// Naive in-memory geo index: linear scan with bounding-box pre-filter.
#[derive(Debug, Default)]
pub struct MemoryGeoIndex<T> {
    entries: Vec<T>,
}

impl<T: Locatable + Clone> MemoryGeoIndex<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn insert(&mut self, entry: T) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Radius query with an additional entity predicate (e.g. kind filter).
    pub fn nearby_filtered<F>(&self, center: GeoPoint, radius_m: f64, pred: F) -> Vec<(T, f64)>
    where
        F: Fn(&T) -> bool,
    {
        let bbox = BoundingBox::around(center, radius_m);
        let candidates: Vec<T> = self
            .entries
            .iter()
            .filter(|e| bbox.contains(e.location()) && pred(e))
            .cloned()
            .collect();
        refine_and_sort(candidates, center, radius_m)
    }
}

impl<T: Locatable + Clone> GeoIndex<T> for MemoryGeoIndex<T> {
    fn nearby(&self, center: GeoPoint, radius_m: f64) -> Vec<(T, f64)> {
        self.nearby_filtered(center, radius_m, |_| true)
    }
}
