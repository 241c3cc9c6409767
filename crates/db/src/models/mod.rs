//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Typed accessors converting raw `*_id` columns to the closed enums in
//!   `pulse_core::status`

pub mod artifact;
pub mod chatroom;
pub mod feed;
pub mod location;
pub mod spoof;
pub mod throttle;
