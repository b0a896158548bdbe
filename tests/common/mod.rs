#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use expense_tracker_server::{AppState, app, database};
use serde_json::Value;
use time::OffsetDateTime;
use tower::util::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub async fn setup_test_app() -> anyhow::Result<TestApp> {
    let temp_dir = tempfile::tempdir()?;
    let data_path = temp_dir.path().to_string_lossy().to_string();
    // Keep the directory alive for the whole test process
    std::mem::forget(temp_dir);

    let db = database::init_db(&data_path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize database: {}", e))?;

    let state = AppState { db };
    let router = app(state.clone());

    Ok(TestApp { router, state })
}

fn parse_body_as_json_or_string(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => value,
        Err(_) => Value::String(String::from_utf8_lossy(bytes).to_string()),
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let response = app
        .router
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to execute request: {}", e))?;

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, parse_body_as_json_or_string(&body)))
}

pub async fn json_request(
    app: &TestApp,
    method: &str,
    uri: &str,
    payload: Value,
) -> anyhow::Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))?;
    send(app, request).await
}

pub async fn get(app: &TestApp, uri: &str) -> anyhow::Result<(StatusCode, Value)> {
    let request = Request::builder().method("GET").uri(uri).body(Body::empty())?;
    send(app, request).await
}

pub async fn delete(app: &TestApp, uri: &str) -> anyhow::Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())?;
    send(app, request).await
}

pub async fn create_test_user(app: &TestApp, username: &str, email: &str) -> anyhow::Result<i64> {
    let conn = app.state.db.write().await;
    conn.execute(
        "INSERT INTO users (username, email) VALUES (?, ?)",
        (username, email),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create test user: {}", e))?;
    Ok(conn.last_insert_rowid())
}

/// Insert an expense row directly, bypassing request validation
pub async fn create_test_expense(
    app: &TestApp,
    user_id: i64,
    title: &str,
    amount_cents: i64,
    category: i64,
    date: OffsetDateTime,
) -> anyhow::Result<i64> {
    let stored_date = database::format_timestamp(date)?;
    let conn = app.state.db.write().await;
    conn.execute(
        "INSERT INTO expenses (user_id, title, amount_cents, date, category) VALUES (?, ?, ?, ?, ?)",
        (user_id, title, amount_cents, stored_date.as_str(), category),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create test expense: {}", e))?;
    Ok(conn.last_insert_rowid())
}

pub async fn set_expense_date(
    app: &TestApp,
    expense_id: i64,
    date: OffsetDateTime,
) -> anyhow::Result<()> {
    let stored_date = database::format_timestamp(date)?;
    let conn = app.state.db.write().await;
    conn.execute(
        "UPDATE expenses SET date = ? WHERE id = ?",
        (stored_date.as_str(), expense_id),
    )
    .await?;
    Ok(())
}

pub async fn expense_exists(app: &TestApp, expense_id: i64) -> anyhow::Result<bool> {
    let conn = app.state.db.read().await;
    let mut rows = conn
        .query("SELECT 1 FROM expenses WHERE id = ?", [expense_id])
        .await?;
    Ok(rows.next().await?.is_some())
}
