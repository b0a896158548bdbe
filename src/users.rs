use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::constants::*;
use crate::models::{CreateUserPayload, User};
use crate::utils::{
    db_error, db_error_with_context, is_unique_violation, json_rejection, required,
    validate_email, validate_string_length,
};
use crate::{AppState, TransactionError, with_transaction};

pub fn validate_username(username: &str) -> Result<(), (StatusCode, String)> {
    validate_string_length(username, "Username", MAX_USERNAME_LENGTH)
}

pub fn extract_user_from_row(row: libsql::Row) -> Result<User, (StatusCode, String)> {
    let id: i64 = row
        .get(0)
        .map_err(|_| db_error_with_context("invalid user data"))?;
    let username: String = row
        .get(1)
        .map_err(|_| db_error_with_context("invalid user data"))?;
    let email: String = row
        .get(2)
        .map_err(|_| db_error_with_context("invalid user data"))?;

    Ok(User {
        id,
        username,
        email,
    })
}

/// Whether a user row with this id exists, using an already-held connection
pub async fn user_exists(conn: &libsql::Connection, user_id: i64) -> Result<bool, libsql::Error> {
    let mut rows = conn
        .query("SELECT 1 FROM users WHERE id = ?", [user_id])
        .await?;
    Ok(rows.next().await?.is_some())
}

#[utoipa::path(
    get,
    path = "/api/v1/users/",
    responses(
        (status = 200, description = "All users in creation order", body = [User]),
        (status = 500, description = "Internal server error")
    ),
    tag = "users"
)]
pub async fn list_users(
    State(app_state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<User>>), (StatusCode, String)> {
    let conn = app_state.db.read().await;

    let mut rows = conn
        .query("SELECT id, username, email FROM users ORDER BY id ASC", ())
        .await
        .map_err(|_| db_error_with_context("failed to query users"))?;

    let mut users = Vec::new();
    while let Some(row) = rows.next().await.map_err(|_| db_error())? {
        users.push(extract_user_from_row(row)?);
    }

    Ok((StatusCode::OK, Json(users)))
}

enum CreateUserError {
    Transaction(TransactionError),
    DbCheck(libsql::Error),
    DbInsert(libsql::Error),
    DuplicateEmail,
}

impl From<TransactionError> for CreateUserError {
    fn from(e: TransactionError) -> Self {
        CreateUserError::Transaction(e)
    }
}

impl From<CreateUserError> for (StatusCode, String) {
    fn from(e: CreateUserError) -> Self {
        match e {
            CreateUserError::Transaction(e) => {
                tracing::error!("create user: {}", e);
                db_error()
            }
            CreateUserError::DbCheck(e) => {
                tracing::error!("create user: email lookup failed: {}", e);
                db_error_with_context("failed to check existing email")
            }
            CreateUserError::DbInsert(e) => {
                tracing::error!("create user: insert failed: {}", e);
                db_error_with_context("user creation failed")
            }
            CreateUserError::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                "user with this email already exists.".to_string(),
            ),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users/",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Missing field, invalid email or duplicate email", body = String, content_type = "text/plain"),
        (status = 500, description = "Internal server error")
    ),
    tag = "users"
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    payload: Result<Json<CreateUserPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), (StatusCode, String)> {
    let Json(payload) = payload.map_err(json_rejection)?;

    let username = required(payload.username, "username")?;
    let email = required(payload.email, "email")?;
    validate_username(&username)?;
    validate_email(&email)?;

    let username = username.trim().to_string();
    let email = email.trim().to_string();

    let user = with_transaction(&app_state.db, move |conn| {
        Box::pin(async move {
            let mut existing_rows = conn
                .query("SELECT id FROM users WHERE email = ?", [email.as_str()])
                .await
                .map_err(CreateUserError::DbCheck)?;

            if existing_rows
                .next()
                .await
                .map_err(CreateUserError::DbCheck)?
                .is_some()
            {
                return Err(CreateUserError::DuplicateEmail);
            }

            conn.execute(
                "INSERT INTO users (username, email) VALUES (?, ?)",
                (username.as_str(), email.as_str()),
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    CreateUserError::DuplicateEmail
                } else {
                    CreateUserError::DbInsert(e)
                }
            })?;

            Ok(User {
                id: conn.last_insert_rowid(),
                username,
                email,
            })
        })
    })
    .await
    .map_err(|e: CreateUserError| -> (StatusCode, String) { e.into() })?;

    tracing::info!(user_id = user.id, "user created");

    Ok((StatusCode::CREATED, Json(user)))
}
