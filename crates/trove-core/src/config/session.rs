//! Session cookie configuration.

use serde::{Deserialize, Serialize};

/// Settings for the signed session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// HMAC signing key for session claims.
    pub signing_key: String,
    /// Session lifetime in minutes.
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: u64,
    /// Cookie name.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

fn default_ttl_minutes() -> u64 {
    480
}

fn default_cookie_name() -> String {
    "trove_session".to_string()
}
