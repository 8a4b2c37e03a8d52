//! Identity provider client (OIDC authorization-code flow).

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use tracing::debug;

use trove_core::config::identity::IdentityConfig;
use trove_core::error::{AppError, ErrorKind};
use trove_core::result::AppResult;
use trove_service::IdentityProfile;

/// Client against the third-party identity provider.
#[derive(Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    domain: String,
    client_id: String,
    client_secret: String,
    scope: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: String,
    name: String,
    picture: Option<String>,
}

impl IdentityClient {
    /// Build a client from configuration.
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            domain: config.domain.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope: config.scope.clone(),
        }
    }

    /// The URL to send a browser to for login.
    pub fn authorize_url(&self, redirect_uri: &str) -> String {
        format!(
            "https://{}/authorize?response_type=code&client_id={}&redirect_uri={}&scope={}",
            self.domain,
            urlencode(&self.client_id),
            urlencode(redirect_uri),
            urlencode(&self.scope),
        )
    }

    /// The provider logout URL, returning the browser to `return_to`.
    pub fn logout_url(&self, return_to: &str) -> String {
        format!(
            "https://{}/v2/logout?returnTo={}&client_id={}",
            self.domain,
            urlencode(return_to),
            urlencode(&self.client_id),
        )
    }

    /// Exchange an authorization code for the user's profile.
    pub async fn fetch_profile(&self, code: &str, redirect_uri: &str) -> AppResult<IdentityProfile> {
        let token: TokenResponse = self
            .client
            .post(format!("https://{}/oauth/token", self.domain))
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| identity_error("Token exchange failed", e))?
            .error_for_status()
            .map_err(|e| identity_error("Token exchange rejected", e))?
            .json()
            .await
            .map_err(|e| identity_error("Malformed token response", e))?;

        let info: UserInfo = self
            .client
            .get(format!("https://{}/userinfo", self.domain))
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| identity_error("Userinfo request failed", e))?
            .error_for_status()
            .map_err(|e| identity_error("Userinfo request rejected", e))?
            .json()
            .await
            .map_err(|e| identity_error("Malformed userinfo response", e))?;

        debug!(email = %info.email, "Identity profile fetched");
        Ok(IdentityProfile {
            email: info.email,
            display_name: info.name,
            avatar_url: info.picture,
        })
    }
}

fn identity_error(message: &str, err: reqwest::Error) -> AppError {
    AppError::with_source(ErrorKind::Authentication, message, err)
}

/// Everything outside the RFC 3986 unreserved set gets escaped.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn urlencode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_COMPONENT).to_string()
}
