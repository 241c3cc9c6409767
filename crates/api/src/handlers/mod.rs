//! HTTP handlers for the proximity content engine.

pub mod artifacts;
pub mod feed;
pub mod location;
pub mod moderation;
pub mod nearby;

use pulse_core::fuzz::fuzz_location;
use pulse_core::geo::GeoPoint;
use pulse_core::visibility::Viewer;
use pulse_db::models::artifact::Artifact;
use pulse_db::models::feed::ArtifactPreview;

/// Build the client-facing artifact projection.
///
/// Owners and moderators see true coordinates; everyone else gets the
/// deterministically fuzzed position.
pub(crate) fn artifact_preview(
    artifact: &Artifact,
    distance_m: f64,
    viewer: &Viewer,
) -> ArtifactPreview {
    let exact = viewer.is_moderator || viewer.user_id == artifact.owner_id;
    let GeoPoint { latitude, longitude } = if exact {
        artifact.location()
    } else {
        fuzz_location(artifact.id, artifact.location())
    };

    ArtifactPreview {
        id: artifact.id,
        owner_id: artifact.owner_id,
        kind: artifact.kind().map(|k| k.label()).unwrap_or("unknown"),
        content: artifact.content.clone(),
        latitude,
        longitude,
        visibility_radius_m: artifact.visibility_radius_m,
        moderation_status: artifact.status().label(),
        distance_m,
        expires_at: artifact.expires_at,
        created_at: artifact.created_at,
    }
}
