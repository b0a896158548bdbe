mod common;

use axum::http::StatusCode;
use common::{create_test_user, get, json_request, setup_test_app};
use serde_json::json;

#[tokio::test]
async fn create_user_returns_created_record() -> anyhow::Result<()> {
    let app = setup_test_app().await?;

    let (status, body) = json_request(
        &app,
        "POST",
        "/api/v1/users/",
        json!({ "username": "testuser", "email": "test@example.com" }),
    )
    .await?;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "testuser");
    assert_eq!(body["email"], "test@example.com");
    assert!(body["id"].as_i64().is_some(), "id should be generated");

    let (status, users) = get(&app, "/api/v1/users/").await?;
    assert_eq!(status, StatusCode::OK);
    let users = users.as_array().expect("users array");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"], body["id"]);

    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected() -> anyhow::Result<()> {
    let app = setup_test_app().await?;
    create_test_user(&app, "first", "shared@example.com").await?;

    let (status, _) = json_request(
        &app,
        "POST",
        "/api/v1/users/",
        json!({ "username": "second", "email": "shared@example.com" }),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, users) = get(&app, "/api/v1/users/").await?;
    assert_eq!(users.as_array().map(Vec::len), Some(1));

    Ok(())
}

#[tokio::test]
async fn usernames_need_not_be_unique() -> anyhow::Result<()> {
    let app = setup_test_app().await?;
    create_test_user(&app, "sam", "sam1@example.com").await?;

    let (status, _) = json_request(
        &app,
        "POST",
        "/api/v1/users/",
        json!({ "username": "sam", "email": "sam2@example.com" }),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    Ok(())
}

#[tokio::test]
async fn missing_or_malformed_email_is_rejected() -> anyhow::Result<()> {
    let app = setup_test_app().await?;

    for payload in [
        json!({ "username": "nomail" }),
        json!({ "username": "badmail", "email": "not-an-email" }),
        json!({ "username": "blank", "email": "" }),
        json!({ "email": "nouser@example.com" }),
        json!({ "username": "x".repeat(51), "email": "long@example.com" }),
    ] {
        let (status, _) = json_request(&app, "POST", "/api/v1/users/", payload.clone()).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
    }

    let (_, users) = get(&app, "/api/v1/users/").await?;
    assert_eq!(users.as_array().map(Vec::len), Some(0));

    Ok(())
}

#[tokio::test]
async fn malformed_json_body_is_a_validation_error() -> anyhow::Result<()> {
    let app = setup_test_app().await?;

    let (status, _) = json_request(
        &app,
        "POST",
        "/api/v1/users/",
        json!({ "username": 42, "email": "typed@example.com" }),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn list_users_returns_every_user() -> anyhow::Result<()> {
    let app = setup_test_app().await?;
    let first = create_test_user(&app, "testuser1", "test1@example.com").await?;
    let second = create_test_user(&app, "testuser2", "test2@example.com").await?;

    let (status, body) = get(&app, "/api/v1/users/").await?;
    assert_eq!(status, StatusCode::OK);

    let users = body.as_array().expect("users array");
    assert_eq!(users.len(), 2);
    assert_eq!(users[0], json!({ "id": first, "username": "testuser1", "email": "test1@example.com" }));
    assert_eq!(users[1]["id"], second);

    Ok(())
}
