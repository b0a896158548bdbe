use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use libsql::Connection;

use crate::category::Category;
use crate::constants::*;
use crate::database::{format_timestamp, now_timestamp, parse_timestamp};
use crate::extract::RoutePath;
use crate::models::{
    CreateExpensePayload, Expense, ExpenseFields, ExpenseView, UpdateExpensePayload,
};
use crate::users::user_exists;
use crate::utils::{
    amount_to_cents, bad_request, db_error, db_error_with_context, field_required, json_rejection,
    required, validate_string_length,
};
use crate::{AppState, TransactionError, with_transaction};

pub const EXPENSE_COLUMNS: &str = "id, user_id, title, amount_cents, date, category";

pub fn validate_expense_title(title: &str) -> Result<(), (StatusCode, String)> {
    validate_string_length(title, "Title", MAX_EXPENSE_TITLE_LENGTH)
}

fn unknown_user(user_id: i64) -> (StatusCode, String) {
    bad_request(format!(
        "Invalid pk \"{}\" - user does not exist.",
        user_id
    ))
}

/// Read a row selected with `EXPENSE_COLUMNS`
pub fn read_expense(row: &libsql::Row) -> anyhow::Result<Expense> {
    let date: String = row.get(4)?;
    let category: i64 = row.get(5)?;

    Ok(Expense {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        amount_cents: row.get(3)?,
        date: parse_timestamp(&date)?,
        category: Category::try_from(category).map_err(anyhow::Error::msg)?,
    })
}

pub fn extract_expense_from_row(row: libsql::Row) -> Result<Expense, (StatusCode, String)> {
    read_expense(&row).map_err(|e| {
        tracing::error!("invalid expense row: {:#}", e);
        db_error_with_context("invalid expense data")
    })
}

pub async fn find_expense(conn: &Connection, expense_id: i64) -> anyhow::Result<Option<Expense>> {
    let mut rows = conn
        .query(
            &format!("SELECT {} FROM expenses WHERE id = ?", EXPENSE_COLUMNS),
            [expense_id],
        )
        .await?;

    match rows.next().await? {
        Some(row) => Ok(Some(read_expense(&row)?)),
        None => Ok(None),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/expenses/",
    responses(
        (status = 200, description = "All expenses, newest first", body = [ExpenseView]),
        (status = 500, description = "Internal server error")
    ),
    tag = "expenses"
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<ExpenseView>>), (StatusCode, String)> {
    let conn = app_state.db.read().await;

    let mut rows = conn
        .query(
            &format!(
                "SELECT {} FROM expenses ORDER BY date DESC, id DESC",
                EXPENSE_COLUMNS
            ),
            (),
        )
        .await
        .map_err(|_| db_error_with_context("failed to query expenses"))?;

    let mut expenses = Vec::new();
    while let Some(row) = rows.next().await.map_err(|_| db_error())? {
        expenses.push(extract_expense_from_row(row)?.view(ExpenseFields::All));
    }

    Ok((StatusCode::OK, Json(expenses)))
}

enum CreateExpenseError {
    Transaction(TransactionError),
    Db(libsql::Error),
    UnknownUser(i64),
}

impl From<TransactionError> for CreateExpenseError {
    fn from(e: TransactionError) -> Self {
        CreateExpenseError::Transaction(e)
    }
}

impl From<CreateExpenseError> for (StatusCode, String) {
    fn from(e: CreateExpenseError) -> Self {
        match e {
            CreateExpenseError::Transaction(e) => {
                tracing::error!("create expense: {}", e);
                db_error()
            }
            CreateExpenseError::Db(e) => {
                tracing::error!("create expense: {}", e);
                db_error_with_context("expense creation failed")
            }
            CreateExpenseError::UnknownUser(user_id) => unknown_user(user_id),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/expenses/",
    request_body = CreateExpensePayload,
    responses(
        (status = 201, description = "Expense created", body = ExpenseView),
        (status = 400, description = "Missing field, unknown user or invalid amount", body = String, content_type = "text/plain"),
        (status = 500, description = "Internal server error")
    ),
    tag = "expenses"
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    payload: Result<Json<CreateExpensePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<ExpenseView>), (StatusCode, String)> {
    let Json(payload) = payload.map_err(json_rejection)?;

    let user_id = required(payload.user, "user")?;
    let title = required(payload.title, "title")?;
    let amount = required(payload.amount, "amount")?;
    validate_expense_title(&title)?;
    let amount_cents = amount_to_cents(amount)?;
    let category = payload.category.unwrap_or_default();
    let title = title.trim().to_string();

    let date = now_timestamp();
    let stored_date = format_timestamp(date).map_err(|e| {
        tracing::error!("failed to format expense date: {}", e);
        db_error()
    })?;

    let expense = with_transaction(&app_state.db, move |conn| {
        Box::pin(async move {
            if !user_exists(conn, user_id)
                .await
                .map_err(CreateExpenseError::Db)?
            {
                return Err(CreateExpenseError::UnknownUser(user_id));
            }

            conn.execute(
                "INSERT INTO expenses (user_id, title, amount_cents, date, category) VALUES (?, ?, ?, ?, ?)",
                (
                    user_id,
                    title.as_str(),
                    amount_cents,
                    stored_date.as_str(),
                    category.value(),
                ),
            )
            .await
            .map_err(CreateExpenseError::Db)?;

            Ok(Expense {
                id: conn.last_insert_rowid(),
                user_id,
                title,
                amount_cents,
                date,
                category,
            })
        })
    })
    .await
    .map_err(|e: CreateExpenseError| -> (StatusCode, String) { e.into() })?;

    tracing::info!(expense_id = expense.id, user_id, "expense created");

    Ok((StatusCode::CREATED, Json(expense.view(ExpenseFields::All))))
}

#[utoipa::path(
    get,
    path = "/api/v1/expenses/{id}/",
    params(("id" = i64, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "The expense", body = ExpenseView),
        (status = 404, description = "No expense with this id", body = String, content_type = "text/plain")
    ),
    tag = "expenses"
)]
pub async fn get_expense(
    State(app_state): State<AppState>,
    RoutePath(expense_id): RoutePath<i64>,
) -> Result<(StatusCode, Json<ExpenseView>), (StatusCode, String)> {
    let conn = app_state.db.read().await;

    let expense = find_expense(&conn, expense_id)
        .await
        .map_err(|e| {
            tracing::error!(expense_id, "failed to load expense: {:#}", e);
            db_error_with_context("failed to query expense")
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, ERR_EXPENSE_NOT_FOUND.to_string()))?;

    Ok((StatusCode::OK, Json(expense.view(ExpenseFields::All))))
}

enum UpdateExpenseError {
    Transaction(TransactionError),
    Db(anyhow::Error),
    NotFound,
    Invalid((StatusCode, String)),
}

impl From<TransactionError> for UpdateExpenseError {
    fn from(e: TransactionError) -> Self {
        UpdateExpenseError::Transaction(e)
    }
}

impl From<UpdateExpenseError> for (StatusCode, String) {
    fn from(e: UpdateExpenseError) -> Self {
        match e {
            UpdateExpenseError::Transaction(e) => {
                tracing::error!("update expense: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ERR_UPDATE_FAILED.to_string(),
                )
            }
            UpdateExpenseError::Db(e) => {
                tracing::error!("update expense: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ERR_UPDATE_FAILED.to_string(),
                )
            }
            UpdateExpenseError::NotFound => {
                (StatusCode::NOT_FOUND, ERR_EXPENSE_NOT_FOUND.to_string())
            }
            UpdateExpenseError::Invalid(response) => response,
        }
    }
}

/// Apply an update inside one transaction. With `partial` unset every
/// required field must be present, as for a full replacement.
async fn apply_update(
    app_state: &AppState,
    expense_id: i64,
    payload: UpdateExpensePayload,
    partial: bool,
) -> Result<Expense, (StatusCode, String)> {
    let expense = with_transaction(&app_state.db, move |conn| {
        Box::pin(async move {
            let existing = find_expense(conn, expense_id)
                .await
                .map_err(UpdateExpenseError::Db)?
                .ok_or(UpdateExpenseError::NotFound)?;

            let missing = |field: &str| UpdateExpenseError::Invalid(field_required(field));

            let user_id = match payload.user {
                Some(user_id) => user_id,
                None if partial => existing.user_id,
                None => return Err(missing("user")),
            };
            if user_id != existing.user_id
                && !user_exists(conn, user_id)
                    .await
                    .map_err(|e| UpdateExpenseError::Db(e.into()))?
            {
                return Err(UpdateExpenseError::Invalid(unknown_user(user_id)));
            }

            let title = match payload.title {
                Some(title) => {
                    validate_expense_title(&title).map_err(UpdateExpenseError::Invalid)?;
                    title.trim().to_string()
                }
                None if partial => existing.title,
                None => return Err(missing("title")),
            };

            let amount_cents = match payload.amount {
                Some(amount) => amount_to_cents(amount).map_err(UpdateExpenseError::Invalid)?,
                None if partial => existing.amount_cents,
                None => return Err(missing("amount")),
            };

            let category = payload.category.unwrap_or(existing.category);

            let affected_rows = conn
                .execute(
                    "UPDATE expenses SET user_id = ?, title = ?, amount_cents = ?, category = ? WHERE id = ?",
                    (
                        user_id,
                        title.as_str(),
                        amount_cents,
                        category.value(),
                        expense_id,
                    ),
                )
                .await
                .map_err(|e| UpdateExpenseError::Db(e.into()))?;

            if affected_rows == 0 {
                return Err(UpdateExpenseError::NotFound);
            }

            Ok(Expense {
                id: expense_id,
                user_id,
                title,
                amount_cents,
                date: existing.date,
                category,
            })
        })
    })
    .await
    .map_err(|e: UpdateExpenseError| -> (StatusCode, String) { e.into() })?;

    tracing::info!(expense_id, partial, "expense updated");

    Ok(expense)
}

#[utoipa::path(
    put,
    path = "/api/v1/expenses/{id}/",
    params(("id" = i64, Path, description = "Expense ID")),
    request_body = UpdateExpensePayload,
    description = "Replace an expense. `user`, `title` and `amount` are required; an omitted `category` keeps its stored value.",
    responses(
        (status = 200, description = "Updated expense", body = ExpenseView),
        (status = 400, description = "Invalid or missing field", body = String, content_type = "text/plain"),
        (status = 404, description = "No expense with this id", body = String, content_type = "text/plain"),
        (status = 500, description = "An error occurred during the update", body = String, content_type = "text/plain")
    ),
    tag = "expenses"
)]
pub async fn update_expense(
    State(app_state): State<AppState>,
    RoutePath(expense_id): RoutePath<i64>,
    payload: Result<Json<UpdateExpensePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<ExpenseView>), (StatusCode, String)> {
    let Json(payload) = payload.map_err(json_rejection)?;
    let expense = apply_update(&app_state, expense_id, payload, false).await?;
    Ok((StatusCode::OK, Json(expense.view(ExpenseFields::All))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/expenses/{id}/",
    params(("id" = i64, Path, description = "Expense ID")),
    request_body = UpdateExpensePayload,
    description = "Update only the fields present in the body.",
    responses(
        (status = 200, description = "Updated expense", body = ExpenseView),
        (status = 400, description = "Invalid field", body = String, content_type = "text/plain"),
        (status = 404, description = "No expense with this id", body = String, content_type = "text/plain"),
        (status = 500, description = "An error occurred during the update", body = String, content_type = "text/plain")
    ),
    tag = "expenses"
)]
pub async fn partial_update_expense(
    State(app_state): State<AppState>,
    RoutePath(expense_id): RoutePath<i64>,
    payload: Result<Json<UpdateExpensePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<ExpenseView>), (StatusCode, String)> {
    let Json(payload) = payload.map_err(json_rejection)?;
    let expense = apply_update(&app_state, expense_id, payload, true).await?;
    Ok((StatusCode::OK, Json(expense.view(ExpenseFields::All))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/expenses/{id}/",
    params(("id" = i64, Path, description = "Expense ID")),
    responses(
        (status = 204, description = "Expense deleted"),
        (status = 404, description = "No expense with this id", body = String, content_type = "text/plain")
    ),
    tag = "expenses"
)]
pub async fn delete_expense(
    State(app_state): State<AppState>,
    RoutePath(expense_id): RoutePath<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    let conn = app_state.db.write().await;

    let affected_rows = conn
        .execute("DELETE FROM expenses WHERE id = ?", [expense_id])
        .await
        .map_err(|_| db_error_with_context("failed to delete expense"))?;

    if affected_rows == 0 {
        return Err((StatusCode::NOT_FOUND, ERR_EXPENSE_NOT_FOUND.to_string()));
    }

    tracing::info!(expense_id, "expense deleted");

    Ok(StatusCode::NO_CONTENT)
}
