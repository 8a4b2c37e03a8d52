//! Session guard and browser flow tests.

mod helpers;

use axum::http::StatusCode;
use uuid::Uuid;

use helpers::TestApp;

#[tokio::test]
async fn test_api_rejects_missing_session() {
    let app = TestApp::new().await;

    let response = app
        .get(&format!("/api/list/{}", Uuid::new_v4()), None)
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "NOT_AUTHENTICATED");
}

#[tokio::test]
async fn test_api_rejects_garbage_cookie() {
    let app = TestApp::new().await;

    let response = app
        .get(
            &format!("/api/list/{}", Uuid::new_v4()),
            Some("trove_session=not-a-token"),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "NOT_AUTHENTICATED");
}

#[tokio::test]
async fn test_landing_points_anonymous_visitors_at_login() {
    let app = TestApp::new().await;

    let response = app.get("/", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["authenticated"], false);
    assert_eq!(response.body["login_url"], "/login");
}

#[tokio::test]
async fn test_landing_reports_bound_session() {
    let app = TestApp::new().await;
    let (ctx, cookie) = app.login("alice").await;

    let response = app.get("/", Some(&cookie)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["authenticated"], true);
    assert_eq!(response.body["display_name"], "alice");
    assert_eq!(
        response.body["default_folder_uuid"],
        ctx.default_folder_uuid.to_string()
    );
}

#[tokio::test]
async fn test_login_redirects_to_identity_provider() {
    let app = TestApp::new().await;

    let response = app.get("/login", None).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_health_reports_degraded_database() {
    let app = TestApp::new().await;

    let response = app.get("/api/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["database"], false);
    assert_eq!(response.body["status"], "degraded");
}
