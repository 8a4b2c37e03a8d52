//! Sharing over the HTTP surface.

mod helpers;

use axum::http::StatusCode;

use helpers::TestApp;

#[tokio::test]
async fn test_read_only_share_grants_read_not_write() {
    let app = TestApp::new().await;
    let (alice, alice_cookie) = app.login("alice").await;
    let (bob, bob_cookie) = app.login("bob").await;

    let notes = app
        .post(
            &format!("/api/create_folder/{}", alice.default_folder_uuid),
            &[("name", "Notes")],
            Some(&alice_cookie),
        )
        .await
        .uuid("uuid");
    let file_uuid = app
        .post(
            &format!("/api/create_file/{notes}"),
            &[("name", "agenda"), ("content", "v1")],
            Some(&alice_cookie),
        )
        .await
        .uuid("uuid");

    let shared = app
        .post(
            &format!("/api/share/folder/{notes}"),
            &[
                ("target_kind", "user"),
                ("target_uuid", &bob.user_uuid.to_string()),
            ],
            Some(&alice_cookie),
        )
        .await;
    assert_eq!(shared.status, StatusCode::CREATED);

    // Read access propagates down the parent edge to the file.
    let listing = app.get(&format!("/api/list/{notes}"), Some(&bob_cookie)).await;
    assert_eq!(listing.status, StatusCode::OK);
    let loaded = app
        .get(&format!("/api/load_file/{file_uuid}"), Some(&bob_cookie))
        .await;
    assert_eq!(loaded.status, StatusCode::OK);

    // Write access does not.
    let saved = app
        .post(
            &format!("/api/save_file/{file_uuid}"),
            &[("content", "v2")],
            Some(&bob_cookie),
        )
        .await;
    assert_eq!(saved.status, StatusCode::FORBIDDEN);
    let created = app
        .post(
            &format!("/api/create_file/{notes}"),
            &[("name", "intruder")],
            Some(&bob_cookie),
        )
        .await;
    assert_eq!(created.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_writable_share_allows_saving() {
    let app = TestApp::new().await;
    let (alice, alice_cookie) = app.login("alice").await;
    let (bob, bob_cookie) = app.login("bob").await;

    let file_uuid = app
        .post(
            &format!("/api/create_file/{}", alice.default_folder_uuid),
            &[("name", "shared"), ("content", "v1")],
            Some(&alice_cookie),
        )
        .await
        .uuid("uuid");

    app.post(
        &format!("/api/share/file/{file_uuid}"),
        &[
            ("target_kind", "user"),
            ("target_uuid", &bob.user_uuid.to_string()),
            ("allow_write", "true"),
        ],
        Some(&alice_cookie),
    )
    .await;

    let saved = app
        .post(
            &format!("/api/save_file/{file_uuid}"),
            &[("content", "v2")],
            Some(&bob_cookie),
        )
        .await;
    assert_eq!(saved.status, StatusCode::OK);
    assert_eq!(saved.body["text_content"], "v2");
}

#[tokio::test]
async fn test_group_share_covers_later_members() {
    let app = TestApp::new().await;
    let (alice, alice_cookie) = app.login("alice").await;
    let (bob, bob_cookie) = app.login("bob").await;
    let (_, carol_cookie) = app.login("carol").await;

    let group_uuid = app
        .post("/api/create_group", &[("name", "readers")], Some(&alice_cookie))
        .await
        .uuid("uuid");
    let notes = app
        .post(
            &format!("/api/create_folder/{}", alice.default_folder_uuid),
            &[("name", "Notes")],
            Some(&alice_cookie),
        )
        .await
        .uuid("uuid");

    // Share with the group before bob joins.
    app.post(
        &format!("/api/share/folder/{notes}"),
        &[
            ("target_kind", "group"),
            ("target_uuid", &group_uuid.to_string()),
        ],
        Some(&alice_cookie),
    )
    .await;
    app.post(
        &format!("/api/group/add/{group_uuid}"),
        &[("member_uuid", &bob.user_uuid.to_string())],
        Some(&alice_cookie),
    )
    .await;

    let listing = app.get(&format!("/api/list/{notes}"), Some(&bob_cookie)).await;
    assert_eq!(listing.status, StatusCode::OK);

    let outsider = app
        .get(&format!("/api/list/{notes}"), Some(&carol_cookie))
        .await;
    assert_eq!(outsider.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_only_owner_may_share() {
    let app = TestApp::new().await;
    let (alice, alice_cookie) = app.login("alice").await;
    let (bob, bob_cookie) = app.login("bob").await;
    let (carol, _) = app.login("carol").await;

    let notes = app
        .post(
            &format!("/api/create_folder/{}", alice.default_folder_uuid),
            &[("name", "Notes")],
            Some(&alice_cookie),
        )
        .await
        .uuid("uuid");
    app.post(
        &format!("/api/share/folder/{notes}"),
        &[
            ("target_kind", "user"),
            ("target_uuid", &bob.user_uuid.to_string()),
            ("allow_write", "true"),
        ],
        Some(&alice_cookie),
    )
    .await;

    // A writer still cannot re-share.
    let response = app
        .post(
            &format!("/api/share/folder/{notes}"),
            &[
                ("target_kind", "user"),
                ("target_uuid", &carol.user_uuid.to_string()),
            ],
            Some(&bob_cookie),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_target_kind_is_rejected() {
    let app = TestApp::new().await;
    let (alice, alice_cookie) = app.login("alice").await;

    let response = app
        .post(
            &format!("/api/share/folder/{}", alice.default_folder_uuid),
            &[
                ("target_kind", "robot"),
                ("target_uuid", &alice.user_uuid.to_string()),
            ],
            Some(&alice_cookie),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}
