//! Authorization service configuration.

use serde::{Deserialize, Serialize};

/// Settings for the external relationship-tuple authorization service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthzConfig {
    /// Backend to use: `"http"` (external service) or `"memory"`
    /// (embedded evaluator, development and tests).
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Base URL of the authorization service API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Tuple store identifier.
    #[serde(default)]
    pub store_id: String,
    /// Authorization model identifier (empty = latest model).
    #[serde(default)]
    pub model_id: String,
    /// Per-call timeout in milliseconds. Every gateway call is bounded so
    /// an unreachable service surfaces as unavailable instead of hanging
    /// the request.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            api_url: default_api_url(),
            store_id: String::new(),
            model_id: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_backend() -> String {
    "http".to_string()
}

fn default_api_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_timeout_ms() -> u64 {
    3000
}
