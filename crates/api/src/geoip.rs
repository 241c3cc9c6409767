//! Best-effort IP geolocation for the spoof detector.
//!
//! The lookup is strictly fail-open: a timeout, provider error, or private
//! address yields `None`, which drops the IP-mismatch signal from the
//! evaluation without failing the location update.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use pulse_core::geo::GeoPoint;
use serde::Deserialize;

/// Pluggable IP-to-location provider.
#[async_trait]
pub trait IpGeolocator: Send + Sync {
    /// Resolve an address to an approximate location, or `None` on any
    /// failure.
    async fn locate(&self, ip: IpAddr) -> Option<GeoPoint>;
}

/// Provider that never resolves. Used when lookups are disabled and in
/// tests.
pub struct NoopGeolocator;

#[async_trait]
impl IpGeolocator for NoopGeolocator {
    async fn locate(&self, _ip: IpAddr) -> Option<GeoPoint> {
        None
    }
}

/// ip-api.com response body (only the fields we read).
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// ip-api.com backed provider.
pub struct IpApiGeolocator {
    client: reqwest::Client,
    base_url: String,
}

impl IpApiGeolocator {
    /// Build a provider with a hard per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client must build");
        Self { client, base_url: base_url.trim_end_matches('/').to_string() }
    }
}

#[async_trait]
impl IpGeolocator for IpApiGeolocator {
    async fn locate(&self, ip: IpAddr) -> Option<GeoPoint> {
        // Private and loopback addresses carry no location signal.
        if !is_public(ip) {
            return None;
        }

        let url = format!("{}/json/{}?fields=status,lat,lon", self.base_url, ip);
        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, %ip, "IP geolocation request failed");
                return None;
            }
        };

        let body: IpApiResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = %e, %ip, "IP geolocation response unparsable");
                return None;
            }
        };

        if body.status != "success" {
            return None;
        }
        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }
}

/// Whether an address can plausibly be geolocated.
fn is_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_unspecified())
        }
        IpAddr::V6(v6) => !(v6.is_loopback() || v6.is_unspecified()),
    }
}
