//! Session extractors.
//!
//! Both guards read the same signed cookie and differ only in how they
//! reject: API routes answer 403 JSON, page routes bounce the browser
//! to the landing page. Neither consults the authorization layer; a
//! session only says who is asking.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

use trove_core::error::AppError;
use trove_service::SessionContext;

use crate::state::AppState;

fn session_from_parts(parts: &Parts, state: &AppState) -> Option<SessionContext> {
    let jar = CookieJar::from_headers(&parts.headers);
    let cookie = jar.get(state.sessions.cookie_name())?;
    state.sessions.verify(cookie.value()).ok()
}

/// Identity guard for `/api` routes: 403 JSON without a valid session.
#[derive(Debug, Clone)]
pub struct ApiIdentity(pub SessionContext);

impl std::ops::Deref for ApiIdentity {
    type Target = SessionContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for ApiIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        session_from_parts(parts, state)
            .map(ApiIdentity)
            .ok_or_else(|| AppError::authentication("No valid session"))
    }
}

/// Identity guard for page routes: redirects to `/` without a session.
#[derive(Debug, Clone)]
pub struct PageIdentity(pub SessionContext);

impl std::ops::Deref for PageIdentity {
    type Target = SessionContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for PageIdentity {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        session_from_parts(parts, state)
            .map(PageIdentity)
            .ok_or_else(|| Redirect::to("/").into_response())
    }
}

/// Optional session, for pages rendered both ways.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<SessionContext>);

impl FromRequestParts<AppState> for MaybeIdentity {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeIdentity(session_from_parts(parts, state)))
    }
}
