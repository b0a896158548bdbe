use std::sync::LazyLock;

use axum::{extract::rejection::JsonRejection, http::StatusCode};
use regex::Regex;
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::constants::*;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("email pattern is valid")
});

pub fn db_error() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ERR_DATABASE_OPERATION.to_string(),
    )
}

pub fn db_error_with_context(context: &str) -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Database error: {}", context),
    )
}

/// Extended result code SQLite reports for a failed UNIQUE constraint
const SQLITE_CONSTRAINT_UNIQUE: std::ffi::c_int = 2067;

pub fn is_unique_violation(error: &libsql::Error) -> bool {
    matches!(error, libsql::Error::SqliteFailure(code, _) if *code == SQLITE_CONSTRAINT_UNIQUE)
}

pub fn bad_request(message: impl Into<String>) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, message.into())
}

/// Malformed or mistyped JSON bodies are validation failures, not 422s
pub fn json_rejection(rejection: JsonRejection) -> (StatusCode, String) {
    bad_request(rejection.body_text())
}

pub fn field_required(field_name: &str) -> (StatusCode, String) {
    bad_request(format!("{}: {}", field_name, ERR_FIELD_REQUIRED))
}

pub fn required<T>(value: Option<T>, field_name: &str) -> Result<T, (StatusCode, String)> {
    value.ok_or_else(|| field_required(field_name))
}

pub fn validate_string_length(
    value: &str,
    field_name: &str,
    max_length: usize,
) -> Result<(), (StatusCode, String)> {
    if value.trim().is_empty() {
        return Err(bad_request(format!("{} cannot be empty", field_name)));
    }
    if value.chars().count() > max_length {
        return Err(bad_request(format!(
            "{} must be at most {} characters",
            field_name, max_length
        )));
    }
    Ok(())
}

pub fn validate_email(value: &str) -> Result<(), (StatusCode, String)> {
    validate_string_length(value, "Email", MAX_EMAIL_LENGTH)?;
    if !EMAIL_REGEX.is_match(value.trim()) {
        return Err(bad_request("Enter a valid email address."));
    }
    Ok(())
}

/// Validate a currency amount and convert it to integer cents.
///
/// The amount must be strictly positive, carry at most two fractional digits
/// and fit in ten digits overall. Nothing is rounded.
pub fn amount_to_cents(amount: Decimal) -> Result<i64, (StatusCode, String)> {
    if amount <= Decimal::ZERO {
        return Err(bad_request("Expense amount must be positive."));
    }

    let normalized = amount.normalize();
    if normalized.scale() > AMOUNT_DECIMAL_PLACES {
        return Err(bad_request(format!(
            "Ensure that there are no more than {} decimal places.",
            AMOUNT_DECIMAL_PLACES
        )));
    }

    let max_whole_digits = AMOUNT_MAX_DIGITS - AMOUNT_DECIMAL_PLACES;
    if normalized.trunc() >= Decimal::from(10_i64.pow(max_whole_digits)) {
        return Err(bad_request(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            max_whole_digits
        )));
    }

    (normalized * Decimal::ONE_HUNDRED)
        .to_i64()
        .ok_or_else(|| bad_request("Expense amount is out of range."))
}

pub fn cents_to_amount(cents: i64) -> Decimal {
    Decimal::new(cents, AMOUNT_DECIMAL_PLACES)
}
