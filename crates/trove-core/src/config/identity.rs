//! Identity provider configuration.

use serde::{Deserialize, Serialize};

/// Third-party identity provider (OIDC) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Provider domain, e.g. `my-tenant.example-idp.com`.
    pub domain: String,
    /// OAuth client identifier.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Scopes requested at login.
    #[serde(default = "default_scope")]
    pub scope: String,
}

fn default_scope() -> String {
    "openid profile email".to_string()
}
