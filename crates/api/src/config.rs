use std::time::Duration;

use rankbag_core::issuance::RetryPolicy;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
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
    /// How long shutdown waits for background workers to drain (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Origin the redemption URL inside each QR code points at.
    pub public_origin: String,
    /// Base URL of the third-party QR image service.
    pub qr_service_url: String,
    /// Length of the redemption "verifying" pause in milliseconds.
    pub redeem_verify_delay_ms: u64,
    /// Idle time after which a tab's session relay is discarded.
    pub session_ttl_secs: u64,
    /// Backoff between coupon persistence attempts, in milliseconds.
    pub coupon_persist_retry_delays_ms: Vec<u64>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                                       |
    /// |----------------------------------|-----------------------------------------------|
    /// | `HOST`                           | `0.0.0.0`                                     |
    /// | `PORT`                           | `3000`                                        |
    /// | `CORS_ORIGINS`                   | `http://localhost:5173`                       |
    /// | `REQUEST_TIMEOUT_SECS`           | `30`                                          |
    /// | `SHUTDOWN_TIMEOUT_SECS`          | `30`                                          |
    /// | `PUBLIC_ORIGIN`                  | `http://localhost:5173`                       |
    /// | `QR_SERVICE_URL`                 | `https://api.qrserver.com/v1/create-qr-code/` |
    /// | `REDEEM_VERIFY_DELAY_MS`         | `1500`                                        |
    /// | `SESSION_TTL_SECS`               | `3600`                                        |
    /// | `COUPON_PERSIST_RETRY_DELAYS_MS` | `1000,2000,4000`                              |
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

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let public_origin =
            std::env::var("PUBLIC_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".into());

        let qr_service_url = std::env::var("QR_SERVICE_URL")
            .unwrap_or_else(|_| "https://api.qrserver.com/v1/create-qr-code/".into());

        let redeem_verify_delay_ms: u64 = std::env::var("REDEEM_VERIFY_DELAY_MS")
            .unwrap_or_else(|_| "1500".into())
            .parse()
            .expect("REDEEM_VERIFY_DELAY_MS must be a valid u64");

        let session_ttl_secs: u64 = std::env::var("SESSION_TTL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("SESSION_TTL_SECS must be a valid u64");

        let coupon_persist_retry_delays_ms = parse_delay_list(
            &std::env::var("COUPON_PERSIST_RETRY_DELAYS_MS")
                .unwrap_or_else(|_| "1000,2000,4000".into()),
        )
        .expect("COUPON_PERSIST_RETRY_DELAYS_MS must be a comma-separated list of u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            public_origin,
            qr_service_url,
            redeem_verify_delay_ms,
            session_ttl_secs,
            coupon_persist_retry_delays_ms,
        }
    }

    pub fn redeem_verify_delay(&self) -> Duration {
        Duration::from_millis(self.redeem_verify_delay_ms)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn persist_retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            delays: self
                .coupon_persist_retry_delays_ms
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
        }
    }
}

/// Parse `"1000, 2000,4000"` into millisecond values. An empty string
/// means no retries.
fn parse_delay_list(raw: &str) -> Result<Vec<u64>, std::num::ParseIntError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}
