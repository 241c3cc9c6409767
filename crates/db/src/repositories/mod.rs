//! Repository structs: stateless query providers, one per table.
//!
//! Geo queries follow the same two-step shape everywhere: a rectangular
//! bounding-box pre-filter in SQL (plain BTREE-indexable comparisons, no
//! spatial extension required) followed by exact haversine refinement and
//! sorting in process via `pulse_core::geo_index::refine_and_sort`.

pub mod artifact_repo;
pub mod chatroom_repo;
pub mod location_repo;
pub mod match_repo;
pub mod spoof_repo;
pub mod throttle_repo;

pub use artifact_repo::ArtifactRepo;
pub use chatroom_repo::ChatroomRepo;
pub use location_repo::LocationRepo;
pub use match_repo::MatchRepo;
pub use spoof_repo::SpoofRepo;
pub use throttle_repo::ThrottleRepo;
