use std::sync::Arc;

use crate::config::ServerConfig;
use crate::geoip::IpGeolocator;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: pulse_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Best-effort IP geolocation provider feeding the spoof detector.
    pub geolocator: Arc<dyn IpGeolocator>,
}
