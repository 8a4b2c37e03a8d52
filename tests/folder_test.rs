//! Folder operations over the HTTP surface.

mod helpers;

use axum::http::StatusCode;

use helpers::TestApp;

#[tokio::test]
async fn test_create_and_list_folder() {
    let app = TestApp::new().await;
    let (ctx, cookie) = app.login("alice").await;
    let default = ctx.default_folder_uuid;

    let created = app
        .post(
            &format!("/api/create_folder/{default}"),
            &[("name", "Notes")],
            Some(&cookie),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.body["name"], "Notes");
    let notes_uuid = created.uuid("uuid");

    let listing = app
        .get(&format!("/api/list/{default}"), Some(&cookie))
        .await;
    assert_eq!(listing.status, StatusCode::OK);

    let entries = listing.body["entries"].as_array().expect("entries");
    assert!(entries
        .iter()
        .any(|e| e["kind"] == "folder" && e["uuid"] == notes_uuid.to_string()));
    // The seed Readme is part of every fresh workspace.
    assert!(entries
        .iter()
        .any(|e| e["kind"] == "file" && e["name"] == "Readme"));
    // The default folder is a root: no parent entry.
    assert!(entries.iter().all(|e| e["kind"] != "parent"));
}

#[tokio::test]
async fn test_listing_requires_read_access() {
    let app = TestApp::new().await;
    let (alice, _) = app.login("alice").await;
    let (_, bob_cookie) = app.login("bob").await;

    let response = app
        .get(
            &format!("/api/list/{}", alice.default_folder_uuid),
            Some(&bob_cookie),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_default_folder_cannot_be_deleted() {
    let app = TestApp::new().await;
    let (ctx, cookie) = app.login("alice").await;

    let response = app
        .post(
            &format!("/api/delete_folder/{}", ctx.default_folder_uuid),
            &[],
            Some(&cookie),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_delete_folder_removes_subtree() {
    let app = TestApp::new().await;
    let (ctx, cookie) = app.login("alice").await;

    let scratch = app
        .post(
            &format!("/api/create_folder/{}", ctx.default_folder_uuid),
            &[("name", "Scratch")],
            Some(&cookie),
        )
        .await
        .uuid("uuid");
    app.post(
        &format!("/api/create_file/{scratch}"),
        &[("name", "draft"), ("content", "wip")],
        Some(&cookie),
    )
    .await;

    let deleted = app
        .post(
            &format!("/api/delete_folder/{scratch}"),
            &[],
            Some(&cookie),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["folders_removed"], 1);
    assert_eq!(deleted.body["files_removed"], 1);

    let gone = app
        .get(&format!("/api/list/{scratch}"), Some(&cookie))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_owner_deletes_a_folder() {
    let app = TestApp::new().await;
    let (ctx, alice_cookie) = app.login("alice").await;
    let (_, bob_cookie) = app.login("bob").await;

    let notes = app
        .post(
            &format!("/api/create_folder/{}", ctx.default_folder_uuid),
            &[("name", "Notes")],
            Some(&alice_cookie),
        )
        .await
        .uuid("uuid");

    let response = app
        .post(&format!("/api/delete_folder/{notes}"), &[], Some(&bob_cookie))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
