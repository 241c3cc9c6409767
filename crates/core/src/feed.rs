//! Feed ranking and pagination.
//!
//! Ranking key is *effective distance*: real distance minus a recency boost.
//! Fresh content earns up to [`RECENCY_BOOST_CAP_M`] virtual meters, so a
//! just-dropped artifact 400m away can outrank a day-old one 50m away. This
//! is a product tradeoff (freshness over strict proximity), not a law of
//! physics; tune the constants, not the mechanism.

use serde::Serialize;

use crate::types::Timestamp;

/// Virtual meters subtracted per hour since creation.
pub const RECENCY_BOOST_M_PER_HOUR: f64 = 100.0;

/// Maximum recency boost, meters.
pub const RECENCY_BOOST_CAP_M: f64 = 500.0;

/// Default feed page size.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum feed page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// An item that can be ranked into the feed.
pub trait Rankable {
    fn distance_m(&self) -> f64;
    fn created_at(&self) -> Timestamp;
}

/// Recency boost for an item created at `created_at`, observed at `now`.
///
/// Starts at the full [`RECENCY_BOOST_CAP_M`] for a brand-new item and decays
/// by [`RECENCY_BOOST_M_PER_HOUR`] per hour of age, reaching zero at five
/// hours.
pub fn recency_boost_m(created_at: Timestamp, now: Timestamp) -> f64 {
    let age_hours = (now - created_at).num_seconds().max(0) as f64 / 3600.0;
    (RECENCY_BOOST_CAP_M - age_hours * RECENCY_BOOST_M_PER_HOUR).max(0.0)
}

/// Effective distance used as the primary ranking key.
///
/// Never negative; items inside their boost radius all rank at zero and fall
/// back to the newest-first tie break.
pub fn effective_distance_m(distance_m: f64, created_at: Timestamp, now: Timestamp) -> f64 {
    (distance_m - recency_boost_m(created_at, now)).max(0.0)
}

/// Sort items by effective distance ascending, ties newest-first.
pub fn rank<T: Rankable>(items: &mut [T], now: Timestamp) {
    items.sort_by(|a, b| {
        let ea = effective_distance_m(a.distance_m(), a.created_at(), now);
        let eb = effective_distance_m(b.distance_m(), b.created_at(), now);
        ea.partial_cmp(&eb)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.created_at().cmp(&a.created_at()))
    });
}

/// One page of ranked results.
///
/// `total` counts items *after* moderation filtering — computing it before
/// would leak how many suppressed items exist.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
}

/// Clamp a requested page size to 1..=[`MAX_PAGE_SIZE`].
pub fn clamp_page_size(page_size: Option<i64>) -> i64 {
    page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Offset-paginate an already-ranked, already-filtered item list.
///
/// Pages are 1-based; out-of-range pages yield empty items with the true
/// total intact.
pub fn paginate<T>(items: Vec<T>, page: i64, page_size: i64) -> Page<T> {
    let total = items.len() as i64;
    let page = page.max(1);
    let offset = (page - 1).saturating_mul(page_size);

    let items = if offset >= total {
        Vec::new()
    } else {
        items
            .into_iter()
            .skip(offset as usize)
            .take(page_size as usize)
            .collect()
    };

    Page { items, page, page_size, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ts(secs_ago: i64) -> Timestamp {
        now() - chrono::Duration::seconds(secs_ago)
    }

    fn now() -> Timestamp {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[derive(Debug, PartialEq)]
    struct Item {
        id: i64,
        distance_m: f64,
        created_at: Timestamp,
    }

    impl Rankable for Item {
        fn distance_m(&self) -> f64 {
            self.distance_m
        }
        fn created_at(&self) -> Timestamp {
            self.created_at
        }
    }

    // -- Recency boost --------------------------------------------------------

    #[test]
    fn fresh_item_gets_full_boost() {
        assert_eq!(recency_boost_m(now(), now()), RECENCY_BOOST_CAP_M);
    }

    #[test]
    fn boost_decays_with_age() {
        // 2 hours old: 500 - 200 = 300.
        assert_eq!(recency_boost_m(ts(7200), now()), 300.0);
        // 5 hours old: fully decayed.
        assert_eq!(recency_boost_m(ts(5 * 3600), now()), 0.0);
        // Older still: never negative.
        assert_eq!(recency_boost_m(ts(48 * 3600), now()), 0.0);
    }

    #[test]
    fn effective_distance_clamps_at_zero() {
        assert_eq!(effective_distance_m(22.0, now(), now()), 0.0);
        assert_eq!(effective_distance_m(700.0, now(), now()), 200.0);
    }

    // -- Ranking --------------------------------------------------------------

    #[test]
    fn fresh_but_farther_outranks_stale_but_closer() {
        let mut items = vec![
            // 50m away, a day old: effective 50.
            Item { id: 1, distance_m: 50.0, created_at: ts(24 * 3600) },
            // 400m away, brand new: effective 0.
            Item { id: 2, distance_m: 400.0, created_at: ts(0) },
        ];
        rank(&mut items, now());
        assert_eq!(items[0].id, 2);
    }

    #[test]
    fn distance_dominates_beyond_boost_range() {
        let mut items = vec![
            Item { id: 1, distance_m: 3_000.0, created_at: ts(0) },
            Item { id: 2, distance_m: 900.0, created_at: ts(24 * 3600) },
        ];
        rank(&mut items, now());
        assert_eq!(items[0].id, 2);
    }

    #[test]
    fn equal_effective_distance_ties_break_newest_first() {
        let mut items = vec![
            Item { id: 1, distance_m: 10.0, created_at: ts(600) },
            Item { id: 2, distance_m: 20.0, created_at: ts(60) },
            Item { id: 3, distance_m: 30.0, created_at: ts(300) },
        ];
        // All within the boost radius: every effective distance is 0.
        rank(&mut items, now());
        assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![2, 3, 1]);
    }

    // -- Pagination -----------------------------------------------------------

    #[test]
    fn paginate_splits_and_reports_total() {
        let items: Vec<i64> = (0..45).collect();
        let page = paginate(items, 2, 20);
        assert_eq!(page.total, 45);
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.items[0], 20);
    }

    #[test]
    fn paginate_last_page_is_short() {
        let items: Vec<i64> = (0..45).collect();
        let page = paginate(items, 3, 20);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0], 40);
    }

    #[test]
    fn paginate_out_of_range_page_is_empty_with_total() {
        let items: Vec<i64> = (0..5).collect();
        let page = paginate(items, 4, 20);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
    }

    #[test]
    fn paginate_clamps_page_to_one() {
        let items: Vec<i64> = (0..5).collect();
        let page = paginate(items, 0, 20);
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 5);
    }

    #[test]
    fn page_size_clamping() {
        assert_eq!(clamp_page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_page_size(Some(0)), 1);
        assert_eq!(clamp_page_size(Some(1_000)), MAX_PAGE_SIZE);
        assert_eq!(clamp_page_size(Some(50)), 50);
    }
}
