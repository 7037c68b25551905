use std::time::Duration;

/// Thresholds for the two rate-limited auth paths.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub login_max: u32,
    pub login_window: Duration,
    pub signup_max: u32,
    pub signup_window: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub session_secret: String,
    /// Honor `X-Forwarded-For` for rate-limit keys. Only safe behind a
    /// proxy that overwrites the header.
    pub trust_proxy: bool,
    pub rate_limits: RateLimitConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(3000);
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL is not set"))?;
        let session_secret = std::env::var("SESSION_SECRET")
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET is not set"))?;
        // The cookie signing key is derived from the secret, which needs
        // at least 32 bytes of material.
        anyhow::ensure!(
            session_secret.len() >= 32,
            "SESSION_SECRET must be at least 32 bytes"
        );

        let trust_proxy = std::env::var("TRUST_PROXY")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let rate_limits = RateLimitConfig {
            login_max: std::env::var("LOGIN_RATE_MAX")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(1000),
            login_window: Duration::from_secs(60 * 5),
            signup_max: std::env::var("SIGNUP_RATE_MAX")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(1000),
            signup_window: Duration::from_secs(60 * 60),
        };

        Ok(Self {
            port,
            database_url,
            session_secret,
            trust_proxy,
            rate_limits,
        })
    }
}
