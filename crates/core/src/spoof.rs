//! Geo-spoof scoring: weighted suspicion signals over a location update.
//!
//! Three signals feed the score: claimed-vs-IP distance (weight 0.4),
//! implausible travel velocity (weight 0.4), and a repeated-pattern flag over
//! recent detections (weight 0.2). Weights renormalize over the signals that
//! are actually available — a missing IP lookup or a first-ever location
//! update narrows the basis instead of diluting the score.
//!
//! Scoring never throttles anyone. A score at or above
//! [`REVIEW_THRESHOLD`] creates a pending detection for a human moderator;
//! travelers trip these signals legitimately and must not be auto-punished.

use serde::Serialize;

use crate::geo::{haversine_km, GeoPoint};
use crate::types::Timestamp;

/// Weight of the claimed-vs-IP-location distance signal.
pub const IP_MISMATCH_WEIGHT: f64 = 0.4;

/// Weight of the travel-velocity signal.
pub const VELOCITY_WEIGHT: f64 = 0.4;

/// Weight of the repeated-pattern signal.
pub const REPEAT_PATTERN_WEIGHT: f64 = 0.2;

/// Velocity above which travel is implausible outside an airliner, km/h.
pub const COMMERCIAL_FLIGHT_KMH: f64 = 900.0;

/// Elapsed-time floor when computing velocity, hours. Updates closer together
/// than 60 seconds use this floor so rapid successive updates cannot
/// manufacture absurd velocity spikes.
pub const MIN_ELAPSED_HOURS: f64 = 1.0 / 60.0;

/// Prior detections within the window that raise the repeated-pattern flag.
pub const REPEAT_PATTERN_THRESHOLD: i64 = 3;

/// Lookback window for the repeated-pattern flag, hours.
pub const REPEAT_PATTERN_WINDOW_HOURS: i64 = 24;

/// Scores at or above this create a pending detection for moderator review.
pub const REVIEW_THRESHOLD: i16 = 80;

/// Individual suspicion signals raised during an evaluation. Persisted with
/// the detection so moderators see *why* a score is high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpoofSignal {
    IpDistanceExtreme,
    IpDistanceHigh,
    IpDistanceModerate,
    ImpossibleVelocity,
    SuspiciousVelocity,
    HighVelocity,
    RepeatedPattern,
}

impl SpoofSignal {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IpDistanceExtreme => "ip_distance_extreme",
            Self::IpDistanceHigh => "ip_distance_high",
            Self::IpDistanceModerate => "ip_distance_moderate",
            Self::ImpossibleVelocity => "impossible_velocity",
            Self::SuspiciousVelocity => "suspicious_velocity",
            Self::HighVelocity => "high_velocity",
            Self::RepeatedPattern => "repeated_pattern",
        }
    }
}

/// The user's previous claimed location, read under the per-user update lock.
#[derive(Debug, Clone, Copy)]
pub struct PreviousPoint {
    pub location: GeoPoint,
    pub recorded_at: Timestamp,
}

/// Everything the detector needs about one location update.
#[derive(Debug, Clone, Copy)]
pub struct SpoofContext {
    pub claimed: GeoPoint,
    /// Best-effort IP-derived location; `None` when the lookup failed or the
    /// address is private.
    pub ip_location: Option<GeoPoint>,
    /// `None` on the user's first location update.
    pub previous: Option<PreviousPoint>,
    /// Detections recorded for this user within the lookback window.
    pub recent_detections: i64,
}

/// Outcome of one evaluation.
#[derive(Debug, Clone)]
pub struct SpoofEvaluation {
    /// 0..=100.
    pub suspicion_score: i16,
    /// Claimed-vs-IP distance, km. `None` when the IP signal was skipped.
    pub ip_distance_km: Option<f64>,
    /// Travel velocity since the previous update, km/h. `None` on first update.
    pub velocity_kmh: Option<f64>,
    pub signals: Vec<SpoofSignal>,
}

impl SpoofEvaluation {
    /// Whether this evaluation warrants a pending detection record.
    pub fn needs_review(&self) -> bool {
        self.suspicion_score >= REVIEW_THRESHOLD
    }
}

/// Score one location update.
///
/// Each available signal contributes a sub-score in 0..=100; the final score
/// is the weighted mean over available signals only. With no signals
/// available at all (first update, no IP, no history) the score is 0.
pub fn evaluate(ctx: &SpoofContext, now: Timestamp) -> SpoofEvaluation {
    let mut signals = Vec::new();
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    // -- IP mismatch --------------------------------------------------------
    let ip_distance_km = ctx.ip_location.map(|ip| haversine_km(ctx.claimed, ip));
    if let Some(d) = ip_distance_km {
        let sub = if d > 500.0 {
            signals.push(SpoofSignal::IpDistanceExtreme);
            100.0
        } else if d > 200.0 {
            signals.push(SpoofSignal::IpDistanceHigh);
            60.0
        } else if d > 100.0 {
            signals.push(SpoofSignal::IpDistanceModerate);
            40.0
        } else {
            0.0
        };
        weighted_sum += IP_MISMATCH_WEIGHT * sub;
        weight_total += IP_MISMATCH_WEIGHT;
    }

    // -- Velocity -----------------------------------------------------------
    let velocity_kmh = ctx.previous.map(|prev| {
        let distance_km = haversine_km(prev.location, ctx.claimed);
        let elapsed_hours =
            ((now - prev.recorded_at).num_seconds().max(0) as f64 / 3600.0).max(MIN_ELAPSED_HOURS);
        distance_km / elapsed_hours
    });
    if let Some(v) = velocity_kmh {
        let sub = if v > COMMERCIAL_FLIGHT_KMH {
            signals.push(SpoofSignal::ImpossibleVelocity);
            100.0
        } else if v > 500.0 {
            signals.push(SpoofSignal::SuspiciousVelocity);
            75.0
        } else if v > 200.0 {
            signals.push(SpoofSignal::HighVelocity);
            40.0
        } else {
            0.0
        };
        weighted_sum += VELOCITY_WEIGHT * sub;
        weight_total += VELOCITY_WEIGHT;
    }

    // -- Repeated pattern ---------------------------------------------------
    // A flag, not a measurement: it only enters the weighting when raised.
    if ctx.recent_detections >= REPEAT_PATTERN_THRESHOLD {
        signals.push(SpoofSignal::RepeatedPattern);
        weighted_sum += REPEAT_PATTERN_WEIGHT * 100.0;
        weight_total += REPEAT_PATTERN_WEIGHT;
    }

    let suspicion_score = if weight_total > 0.0 {
        (weighted_sum / weight_total).round().clamp(0.0, 100.0) as i16
    } else {
        0
    };

    SpoofEvaluation { suspicion_score, ip_distance_km, velocity_kmh, signals }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn minutes_ago(mins: i64) -> Timestamp {
        now() - chrono::Duration::minutes(mins)
    }

    const PARIS: GeoPoint = GeoPoint { latitude: 48.8566, longitude: 2.3522 };
    const LYON: GeoPoint = GeoPoint { latitude: 45.7640, longitude: 4.8357 };

    // -- Velocity scenarios ---------------------------------------------------

    #[test]
    fn teleport_jump_scores_for_review() {
        // ~390km Paris -> Lyon in 3 minutes: velocity in the thousands.
        let ctx = SpoofContext {
            claimed: LYON,
            ip_location: None,
            previous: Some(PreviousPoint { location: PARIS, recorded_at: minutes_ago(3) }),
            recent_detections: 0,
        };
        let eval = evaluate(&ctx, now());

        assert!(eval.velocity_kmh.unwrap() > COMMERCIAL_FLIGHT_KMH);
        assert!(eval.suspicion_score >= REVIEW_THRESHOLD);
        assert!(eval.needs_review());
        assert!(eval.signals.contains(&SpoofSignal::ImpossibleVelocity));
    }

    #[test]
    fn rapid_updates_use_elapsed_floor() {
        // Two updates 5 seconds apart, 1km of movement. Without the floor the
        // velocity would be 720 km/h; with it, 60 km/h.
        let near = GeoPoint::new(PARIS.latitude + 0.009, PARIS.longitude);
        let ctx = SpoofContext {
            claimed: near,
            ip_location: None,
            previous: Some(PreviousPoint {
                location: PARIS,
                recorded_at: now() - chrono::Duration::seconds(5),
            }),
            recent_detections: 0,
        };
        let eval = evaluate(&ctx, now());

        assert!(eval.velocity_kmh.unwrap() < 100.0);
        assert_eq!(eval.suspicion_score, 0);
    }

    #[test]
    fn ordinary_travel_scores_zero() {
        // Paris -> Lyon in 2 hours: TGV pace, ~195 km/h.
        let ctx = SpoofContext {
            claimed: LYON,
            ip_location: None,
            previous: Some(PreviousPoint { location: PARIS, recorded_at: minutes_ago(120) }),
            recent_detections: 0,
        };
        let eval = evaluate(&ctx, now());
        assert_eq!(eval.suspicion_score, 0);
        assert!(eval.signals.is_empty());
    }

    // -- IP mismatch scenarios ------------------------------------------------

    #[test]
    fn extreme_ip_mismatch_alone_scores_full_basis() {
        // Claimed Paris, IP says Lyon-and-then-some. No history.
        let ctx = SpoofContext {
            claimed: PARIS,
            ip_location: Some(GeoPoint::new(40.7128, -74.0060)), // NYC
            previous: None,
            recent_detections: 0,
        };
        let eval = evaluate(&ctx, now());

        assert!(eval.ip_distance_km.unwrap() > 500.0);
        assert_eq!(eval.suspicion_score, 100);
        assert!(eval.signals.contains(&SpoofSignal::IpDistanceExtreme));
        // Velocity signal skipped entirely on a first update.
        assert!(eval.velocity_kmh.is_none());
    }

    #[test]
    fn moderate_ip_mismatch_with_clean_velocity_stays_below_review() {
        // IP 150km off (VPN exit node nearby) but locally plausible movement.
        let ctx = SpoofContext {
            claimed: PARIS,
            ip_location: Some(GeoPoint::new(50.0, 3.5)), // ~150km away
            previous: Some(PreviousPoint {
                location: GeoPoint::new(48.85, 2.34),
                recorded_at: minutes_ago(30),
            }),
            recent_detections: 0,
        };
        let eval = evaluate(&ctx, now());

        assert!(eval.signals.contains(&SpoofSignal::IpDistanceModerate));
        assert!(eval.suspicion_score < REVIEW_THRESHOLD);
    }

    // -- Missing-signal handling ----------------------------------------------

    #[test]
    fn no_signals_available_scores_zero() {
        let ctx = SpoofContext {
            claimed: PARIS,
            ip_location: None,
            previous: None,
            recent_detections: 0,
        };
        let eval = evaluate(&ctx, now());
        assert_eq!(eval.suspicion_score, 0);
        assert!(!eval.needs_review());
        assert!(eval.ip_distance_km.is_none());
        assert!(eval.velocity_kmh.is_none());
    }

    #[test]
    fn missing_ip_skips_only_that_signal() {
        let ctx = SpoofContext {
            claimed: LYON,
            ip_location: None,
            previous: Some(PreviousPoint { location: PARIS, recorded_at: minutes_ago(3) }),
            recent_detections: 0,
        };
        let eval = evaluate(&ctx, now());
        assert!(eval.ip_distance_km.is_none());
        assert!(eval.velocity_kmh.is_some());
        assert!(eval.needs_review());
    }

    // -- Repeated pattern -----------------------------------------------------

    #[test]
    fn repeat_pattern_raises_borderline_scores() {
        // High-tier IP mismatch (sub-score 60) alone: 60, below review.
        let base = SpoofContext {
            claimed: PARIS,
            ip_location: Some(GeoPoint::new(51.05, 3.72)), // ~260km away
            previous: None,
            recent_detections: 0,
        };
        let eval = evaluate(&base, now());
        assert!(eval.signals.contains(&SpoofSignal::IpDistanceHigh));
        assert!(eval.suspicion_score < REVIEW_THRESHOLD);

        // Same update from a serial offender: (0.4*60 + 0.2*100) / 0.6 ≈ 73.
        let repeat = SpoofContext { recent_detections: 3, ..base };
        let eval = evaluate(&repeat, now());
        assert!(eval.signals.contains(&SpoofSignal::RepeatedPattern));
        assert!(eval.suspicion_score > 60);
    }

    #[test]
    fn repeat_pattern_below_threshold_is_ignored() {
        let ctx = SpoofContext {
            claimed: PARIS,
            ip_location: None,
            previous: None,
            recent_detections: 2,
        };
        let eval = evaluate(&ctx, now());
        assert_eq!(eval.suspicion_score, 0);
        assert!(eval.signals.is_empty());
    }

    // -- Score bounds ---------------------------------------------------------

    #[test]
    fn score_never_exceeds_100() {
        let ctx = SpoofContext {
            claimed: GeoPoint::new(40.7128, -74.0060),
            ip_location: Some(PARIS),
            previous: Some(PreviousPoint { location: PARIS, recorded_at: minutes_ago(1) }),
            recent_detections: 10,
        };
        let eval = evaluate(&ctx, now());
        assert_eq!(eval.suspicion_score, 100);
    }
}
