//! Visibility filtering: moderation-status rules plus deterministic
//! hash-based suppression for shadow-throttled owners.
//!
//! Suppression must be stable per (viewer, entity) pair — a throttled user's
//! post either exists or doesn't from a given viewer's perspective, it never
//! flickers between requests. A stable SHA-256 hash mapped to [0, 1) replaces
//! per-request randomness.

use sha2::{Digest, Sha256};

use crate::status::ModerationStatus;
use crate::throttle::SHADOW_STATUS_REDUCTION;
use crate::types::DbId;

/// The requesting user, as resolved by the auth collaborator.
#[derive(Debug, Clone, Copy)]
pub struct Viewer {
    pub user_id: DbId,
    pub is_moderator: bool,
}

/// Map a (viewer, entity) pair to a stable value in [0, 1).
pub fn visibility_hash(viewer_id: DbId, entity_id: DbId) -> f64 {
    let digest = Sha256::digest(format!("{viewer_id}:{entity_id}").as_bytes());
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&digest[0..8]);
    // u64::MAX + 1 keeps the result strictly below 1.0.
    u64::from_be_bytes(buf) as f64 / (u64::MAX as f64 + 1.0)
}

/// Whether `entity_id` is suppressed for `viewer_id` at the given reduction.
///
/// A reduction of 0.0 never suppresses; 1.0 always does.
pub fn should_suppress(viewer_id: DbId, entity_id: DbId, reduction: f64) -> bool {
    if reduction <= 0.0 {
        return false;
    }
    if reduction >= 1.0 {
        return true;
    }
    visibility_hash(viewer_id, entity_id) < reduction
}

/// An artifact's effective broadcast radius: base radius scaled by
/// `(1 - reduction)`. A throttled owner's drops reach fewer people both by
/// shrinking reach and by per-viewer suppression.
pub fn effective_radius_m(visibility_radius_m: i32, reduction: f64) -> f64 {
    (visibility_radius_m as f64) * (1.0 - reduction.clamp(0.0, 1.0))
}

/// Decide whether an artifact appears in a query result for `viewer`, seen
/// from `distance_m` away.
///
/// Rules, in order:
/// - `Removed` and `Expired` are visible to no one.
/// - Owners always see their own surviving artifacts.
/// - `Flagged` is visible only to the owner and moderators.
/// - Moderators bypass throttle suppression (they review, they don't browse).
/// - `ShadowThrottled` status forces a fixed reduction of
///   [`SHADOW_STATUS_REDUCTION`] regardless of the owner's throttle records;
///   otherwise the owner's effective reduction applies. The reduction both
///   shrinks the artifact's broadcast radius ([`effective_radius_m`]) and
///   deterministically suppresses a matching fraction of viewers.
pub fn artifact_visible(
    status: ModerationStatus,
    owner_id: DbId,
    artifact_id: DbId,
    viewer: &Viewer,
    owner_reduction: f64,
    distance_m: f64,
    visibility_radius_m: i32,
) -> bool {
    if status.is_terminal() {
        return false;
    }
    if viewer.user_id == owner_id {
        return true;
    }
    match status {
        ModerationStatus::Flagged => viewer.is_moderator,
        ModerationStatus::Clean | ModerationStatus::ShadowThrottled => {
            if viewer.is_moderator {
                return true;
            }
            let reduction = if status == ModerationStatus::ShadowThrottled {
                SHADOW_STATUS_REDUCTION
            } else {
                owner_reduction
            };
            distance_m <= effective_radius_m(visibility_radius_m, reduction)
                && !should_suppress(viewer.user_id, artifact_id, reduction)
        }
        // Terminal statuses already handled above.
        ModerationStatus::Removed | ModerationStatus::Expired => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: Viewer = Viewer { user_id: 1, is_moderator: false };
    const STRANGER: Viewer = Viewer { user_id: 2, is_moderator: false };
    const MODERATOR: Viewer = Viewer { user_id: 3, is_moderator: true };

    // -- Hash ----------------------------------------------------------------

    #[test]
    fn hash_is_stable() {
        assert_eq!(visibility_hash(7, 99), visibility_hash(7, 99));
    }

    #[test]
    fn hash_is_in_unit_interval() {
        for viewer in 0..20 {
            for entity in 0..20 {
                let h = visibility_hash(viewer, entity);
                assert!((0.0..1.0).contains(&h));
            }
        }
    }

    #[test]
    fn hash_varies_across_pairs() {
        // Not a uniformity test; just make sure the pair actually matters.
        assert_ne!(visibility_hash(1, 2), visibility_hash(2, 1));
        assert_ne!(visibility_hash(1, 2), visibility_hash(1, 3));
    }

    // -- Suppression ----------------------------------------------------------

    #[test]
    fn zero_reduction_never_suppresses() {
        for entity in 0..100 {
            assert!(!should_suppress(42, entity, 0.0));
        }
    }

    #[test]
    fn full_reduction_always_suppresses() {
        for entity in 0..100 {
            assert!(should_suppress(42, entity, 1.0));
        }
    }

    #[test]
    fn partial_reduction_suppresses_a_fraction() {
        let suppressed = (0..1000)
            .filter(|entity| should_suppress(42, *entity, 0.5))
            .count();
        // Rough bounds; the hash is deterministic so this cannot flake.
        assert!((350..=650).contains(&suppressed), "got {suppressed}");
    }

    #[test]
    fn suppression_is_consistent_per_pair() {
        for entity in 0..50 {
            let first = should_suppress(9, entity, 0.7);
            let second = should_suppress(9, entity, 0.7);
            assert_eq!(first, second);
        }
    }

    // -- Effective radius -----------------------------------------------------

    #[test]
    fn effective_radius_scales_with_reduction() {
        assert_eq!(effective_radius_m(1000, 0.0), 1000.0);
        assert_eq!(effective_radius_m(1000, 0.3), 700.0);
        assert_eq!(effective_radius_m(1000, 1.0), 0.0);
    }

    #[test]
    fn effective_radius_clamps_bad_reductions() {
        assert_eq!(effective_radius_m(1000, -0.5), 1000.0);
        assert_eq!(effective_radius_m(1000, 1.5), 0.0);
    }

    // -- Artifact visibility rules --------------------------------------------

    /// Visibility at a nominal 100m distance with a 1000m broadcast radius.
    fn visible(status: ModerationStatus, viewer: &Viewer, reduction: f64) -> bool {
        artifact_visible(status, 1, 10, viewer, reduction, 100.0, 1000)
    }

    #[test]
    fn removed_is_visible_to_no_one() {
        for viewer in [OWNER, STRANGER, MODERATOR] {
            assert!(!visible(ModerationStatus::Removed, &viewer, 0.0));
        }
    }

    #[test]
    fn expired_never_appears() {
        for viewer in [OWNER, STRANGER, MODERATOR] {
            assert!(!visible(ModerationStatus::Expired, &viewer, 0.0));
        }
    }

    #[test]
    fn flagged_visible_to_owner_and_moderators_only() {
        assert!(visible(ModerationStatus::Flagged, &OWNER, 0.0));
        assert!(visible(ModerationStatus::Flagged, &MODERATOR, 0.0));
        assert!(!visible(ModerationStatus::Flagged, &STRANGER, 0.0));
    }

    #[test]
    fn clean_with_no_reduction_visible_to_all() {
        for viewer in [OWNER, STRANGER, MODERATOR] {
            assert!(visible(ModerationStatus::Clean, &viewer, 0.0));
        }
    }

    #[test]
    fn owner_sees_own_content_despite_full_reduction() {
        assert!(visible(ModerationStatus::Clean, &OWNER, 1.0));
        assert!(visible(ModerationStatus::ShadowThrottled, &OWNER, 1.0));
    }

    #[test]
    fn full_reduction_hides_from_strangers() {
        for artifact_id in 0..50 {
            assert!(!artifact_visible(
                ModerationStatus::Clean,
                1,
                artifact_id,
                &STRANGER,
                1.0,
                100.0,
                1000
            ));
        }
    }

    #[test]
    fn reduction_shrinks_broadcast_radius() {
        // 0.3 reduction: 1000m radius reaches only 700m. A viewer at 800m
        // is outside the effective radius no matter what the hash says.
        for artifact_id in 0..50 {
            assert!(!artifact_visible(
                ModerationStatus::Clean,
                1,
                artifact_id,
                &STRANGER,
                0.3,
                800.0,
                1000
            ));
        }
        // The owner still sees it at any distance.
        assert!(artifact_visible(ModerationStatus::Clean, 1, 10, &OWNER, 0.3, 800.0, 1000));
    }

    #[test]
    fn moderators_bypass_suppression() {
        for artifact_id in 0..50 {
            assert!(artifact_visible(
                ModerationStatus::ShadowThrottled,
                1,
                artifact_id,
                &MODERATOR,
                1.0,
                100.0,
                1000
            ));
        }
    }

    #[test]
    fn shadow_throttled_status_suppresses_most_impressions() {
        // Within the shrunken radius (0.9 reduction leaves 100m of reach),
        // the hash still drops ~90% of viewers.
        let visible = (0..1000)
            .filter(|id| {
                artifact_visible(ModerationStatus::ShadowThrottled, 1, *id, &STRANGER, 0.0, 50.0, 1000)
            })
            .count();
        assert!((40..=200).contains(&visible), "got {visible}");
    }
}
