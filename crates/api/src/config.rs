use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Expiry sweep interval in seconds (default: `60`).
    pub sweep_interval_secs: u64,
    /// Days a tombstoned artifact survives before hard deletion (default: `30`).
    pub tombstone_grace_days: i64,
    /// Base URL of the IP geolocation provider (default: `http://ip-api.com`).
    /// Empty string disables the lookup entirely.
    pub ipgeo_base_url: String,
    /// IP geolocation request timeout in seconds (default: `2`).
    pub ipgeo_timeout_secs: u64,
    /// How long a candidate's latest location counts as "nearby", in hours
    /// (default: `24`).
    pub candidate_freshness_hours: i64,
    /// JWT token configuration (secret, expiry duration).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                    |
    /// |-----------------------------|----------------------------|
    /// | `HOST`                      | `0.0.0.0`                  |
    /// | `PORT`                      | `3000`                     |
    /// | `CORS_ORIGINS`              | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                       |
    /// | `SWEEP_INTERVAL_SECS`       | `60`                       |
    /// | `TOMBSTONE_GRACE_DAYS`      | `30`                       |
    /// | `IPGEO_BASE_URL`            | `http://ip-api.com`        |
    /// | `IPGEO_TIMEOUT_SECS`        | `2`                        |
    /// | `CANDIDATE_FRESHNESS_HOURS` | `24`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let sweep_interval_secs: u64 = std::env::var("SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("SWEEP_INTERVAL_SECS must be a valid u64");

        let tombstone_grace_days: i64 = std::env::var("TOMBSTONE_GRACE_DAYS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("TOMBSTONE_GRACE_DAYS must be a valid i64");

        let ipgeo_base_url =
            std::env::var("IPGEO_BASE_URL").unwrap_or_else(|_| "http://ip-api.com".into());

        let ipgeo_timeout_secs: u64 = std::env::var("IPGEO_TIMEOUT_SECS")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("IPGEO_TIMEOUT_SECS must be a valid u64");

        let candidate_freshness_hours: i64 = std::env::var("CANDIDATE_FRESHNESS_HOURS")
            .unwrap_or_else(|_| "24".into())
            .parse()
            .expect("CANDIDATE_FRESHNESS_HOURS must be a valid i64");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            sweep_interval_secs,
            tombstone_grace_days,
            ipgeo_base_url,
            ipgeo_timeout_secs,
            candidate_freshness_hours,
            jwt,
        }
    }
}
