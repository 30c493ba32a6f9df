use std::env;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_token";

#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Session lifetime in seconds.
    pub ttl_seconds: i64,
}

impl SessionConfig {
    pub fn from_env() -> Self {
        Self {
            ttl_seconds: env::var("SESSION_TTL_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(7200), // 2 hours
        }
    }
}
