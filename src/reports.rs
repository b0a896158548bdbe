use axum::{Json, extract::State, http::StatusCode};

use crate::category::Category;
use crate::database::format_date;
use crate::expenses::{EXPENSE_COLUMNS, extract_expense_from_row};
use crate::extract::{CalendarDate, RoutePath};
use crate::models::{CategorySummary, ExpenseFields, ExpenseView};
use crate::utils::{cents_to_amount, db_error, db_error_with_context};
use crate::AppState;

/// Expenses of one user whose UTC calendar date lies in `[start_date, end_date]`,
/// newest first. Unknown users and empty ranges yield an empty list.
#[utoipa::path(
    get,
    path = "/api/v1/expenses/{user_id}/{start_date}/{end_date}/",
    operation_id = "retrieve_expenses_by_date_range",
    description = "Retrieve all expenses for a user within a specific date range.",
    params(
        ("user_id" = i64, Path, description = "User ID"),
        ("start_date" = String, Path, description = "Date (YYYY-MM-DD format)"),
        ("end_date" = String, Path, description = "Date (YYYY-MM-DD format)")
    ),
    responses(
        (status = 200, description = "Expenses in the range, newest first", body = [ExpenseView]),
        (status = 404, description = "Malformed user id or date")
    ),
    tag = "reports"
)]
pub async fn expenses_by_date_range(
    State(app_state): State<AppState>,
    RoutePath((user_id, start_date, end_date)): RoutePath<(i64, CalendarDate, CalendarDate)>,
) -> Result<(StatusCode, Json<Vec<ExpenseView>>), (StatusCode, String)> {
    let date_error = |e: time::error::Format| {
        tracing::error!("failed to format date range: {}", e);
        db_error()
    };
    let start = format_date(start_date.0).map_err(date_error)?;
    let end = format_date(end_date.0).map_err(date_error)?;

    let conn = app_state.db.read().await;

    // Stored timestamps start with the date, so the lower bound compares
    // directly and the upper bound compares on the date prefix.
    let mut rows = conn
        .query(
            &format!(
                "SELECT {} FROM expenses WHERE user_id = ? AND date >= ? AND substr(date, 1, 10) <= ? ORDER BY date DESC, id DESC",
                EXPENSE_COLUMNS
            ),
            (user_id, start.as_str(), end.as_str()),
        )
        .await
        .map_err(|_| db_error_with_context("failed to query expenses by date"))?;

    let mut expenses = Vec::new();
    while let Some(row) = rows.next().await.map_err(|_| db_error())? {
        expenses.push(extract_expense_from_row(row)?.view(ExpenseFields::WithoutUser));
    }

    Ok((StatusCode::OK, Json(expenses)))
}

/// `YYYY-MM` prefix of timestamps in the given month, if the month can occur
fn month_prefix(year: i32, month: u32) -> Option<String> {
    if !(0..=9999).contains(&year) || !(1..=12).contains(&month) {
        return None;
    }
    Some(format!("{:04}-{:02}", year, month))
}

/// Per-category totals of one user's expenses in a calendar month.
/// Categories without expenses are left out; the rest come in category order.
#[utoipa::path(
    get,
    path = "/api/v1/expenses/{user_id}/summary/{year}/{month}/",
    description = "Retrieve total expenses per category for a given month for a user.",
    params(
        ("user_id" = i64, Path, description = "User ID"),
        ("year" = i32, Path, description = "Year (YYYY format)"),
        ("month" = u32, Path, description = "Month (1-12)")
    ),
    responses(
        (status = 200, description = "Totals per category", body = [CategorySummary]),
        (status = 404, description = "Malformed path segment")
    ),
    tag = "reports"
)]
pub async fn category_summary(
    State(app_state): State<AppState>,
    RoutePath((user_id, year, month)): RoutePath<(i64, i32, u32)>,
) -> Result<(StatusCode, Json<Vec<CategorySummary>>), (StatusCode, String)> {
    let Some(prefix) = month_prefix(year, month) else {
        tracing::debug!(year, month, "summary requested for a month that cannot occur");
        return Ok((StatusCode::OK, Json(Vec::new())));
    };

    let conn = app_state.db.read().await;

    let mut rows = conn
        .query(
            "SELECT category, SUM(amount_cents) FROM expenses WHERE user_id = ? AND substr(date, 1, 7) = ? GROUP BY category ORDER BY category ASC",
            (user_id, prefix.as_str()),
        )
        .await
        .map_err(|_| db_error_with_context("failed to summarize expenses"))?;

    let mut summary = Vec::new();
    while let Some(row) = rows.next().await.map_err(|_| db_error())? {
        let category: i64 = row
            .get(0)
            .map_err(|_| db_error_with_context("invalid summary data"))?;
        let total_cents: i64 = row
            .get(1)
            .map_err(|_| db_error_with_context("invalid summary data"))?;
        let category = Category::try_from(category).map_err(|e| {
            tracing::error!("invalid category in summary: {}", e);
            db_error_with_context("invalid summary data")
        })?;

        summary.push(CategorySummary {
            category: category.label().to_string(),
            total: cents_to_amount(total_cents),
        });
    }

    Ok((StatusCode::OK, Json(summary)))
}
