//! Shadow-throttle policy: severity mapping, active-window predicate, and
//! auto-throttle escalation tiers.
//!
//! A shadow throttle is a soft visibility penalty applied to a user's content
//! without notifying them. Multiple throttles may exist per user; the
//! effective reduction at query time is the maximum across active records.

use crate::error::CoreError;
use crate::status::ThrottleReason;
use crate::types::Timestamp;

/// Minimum throttle severity.
pub const MIN_SEVERITY: i16 = 1;

/// Maximum throttle severity.
pub const MAX_SEVERITY: i16 = 5;

/// Reduction forced by an artifact-level `ShadowThrottled` status, regardless
/// of the owner's throttle records.
pub const SHADOW_STATUS_REDUCTION: f64 = 0.9;

/// Visibility reduction for each severity level.
///
/// Severity 1 suppresses ~30% of impressions; severity 5 suppresses ~95%.
pub fn reduction_for_severity(severity: i16) -> Result<f64, CoreError> {
    match severity {
        1 => Ok(0.30),
        2 => Ok(0.50),
        3 => Ok(0.70),
        4 => Ok(0.85),
        5 => Ok(0.95),
        _ => Err(CoreError::Validation(format!(
            "Severity must be between {MIN_SEVERITY} and {MAX_SEVERITY}, got {severity}"
        ))),
    }
}

/// An active-window view of a throttle record, decoupled from storage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottleWindow {
    pub started_at: Timestamp,
    /// `None` means permanent until manually lifted.
    pub expires_at: Option<Timestamp>,
    pub reduction: f64,
}

/// A throttle is active once started and until (exclusive) its expiry.
pub fn is_active(window: &ThrottleWindow, now: Timestamp) -> bool {
    window.started_at <= now && window.expires_at.map_or(true, |exp| exp > now)
}

/// Effective reduction for a user: the maximum across active throttles,
/// `0.0` if none are active.
pub fn effective_reduction<'a, I>(throttles: I, now: Timestamp) -> f64
where
    I: IntoIterator<Item = &'a ThrottleWindow>,
{
    throttles
        .into_iter()
        .filter(|w| is_active(w, now))
        .map(|w| w.reduction)
        .fold(0.0, f64::max)
}

/// One rung of the automatic flag-driven escalation ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoThrottleTier {
    /// Flag total (across the owner's artifacts, recent window) that
    /// activates this tier.
    pub min_flags: i64,
    pub severity: i16,
    pub duration_hours: i64,
}

/// Escalation ladder, strictest first. All auto-throttles use reason
/// [`ThrottleReason::FlaggedContent`].
pub const AUTO_THROTTLE_TIERS: [AutoThrottleTier; 3] = [
    AutoThrottleTier { min_flags: 10, severity: 4, duration_hours: 168 },
    AutoThrottleTier { min_flags: 5, severity: 3, duration_hours: 72 },
    AutoThrottleTier { min_flags: 3, severity: 2, duration_hours: 24 },
];

/// The tier (if any) a given flag total lands in.
pub fn auto_throttle_tier(flag_total: i64) -> Option<AutoThrottleTier> {
    AUTO_THROTTLE_TIERS
        .iter()
        .find(|tier| flag_total >= tier.min_flags)
        .copied()
}

/// Reason used for every flag-driven auto-throttle.
pub const AUTO_THROTTLE_REASON: ThrottleReason = ThrottleReason::FlaggedContent;
