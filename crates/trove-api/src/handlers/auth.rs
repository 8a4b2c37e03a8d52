//! Login, callback, and logout.

use axum::extract::{Query, State};
use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::info;

use trove_core::error::AppError;

use crate::state::AppState;

/// Query parameters delivered to the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code, absent when the provider reports an error.
    pub code: Option<String>,
}

/// `GET /login` — bounce the browser to the identity provider.
pub async fn login(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.identity.authorize_url(&state.callback_url()))
}

/// `GET /callback` — complete the login and set the session cookie.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<(CookieJar, Redirect), AppError> {
    let code = query
        .code
        .ok_or_else(|| AppError::authentication("Login was not completed"))?;

    let profile = state
        .identity
        .fetch_profile(&code, &state.callback_url())
        .await?;
    let ctx = state.user_service.login_or_register(&profile).await?;
    let token = state.sessions.issue(&ctx)?;

    info!(user = %ctx.user_uuid, "Session established");
    let cookie = Cookie::build((state.sessions.cookie_name().to_string(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    Ok((jar.add(cookie), Redirect::to("/")))
}

/// `GET /logout` — drop the cookie and log out at the provider.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let return_to = format!("{}/", state.config.server.public_url.trim_end_matches('/'));
    let jar = jar.remove(Cookie::from(state.sessions.cookie_name().to_string()));
    (jar, Redirect::to(&state.identity.logout_url(&return_to)))
}
