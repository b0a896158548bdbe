use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::category::Category;
use crate::utils::cents_to_amount;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct CreateUserPayload {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// An expense as stored
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub amount_cents: i64,
    pub date: OffsetDateTime,
    pub category: Category,
}

/// Which fields of an expense go on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseFields {
    All,
    /// Used where the owner is already part of the request path
    WithoutUser,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
#[schema(as = Expense)]
pub struct ExpenseView {
    pub id: i64,
    /// Owner id, left out when the owner is part of the request path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<i64>,
    pub title: String,
    #[schema(value_type = String, example = "50.00")]
    pub amount: Decimal,
    /// Set by the server on creation
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub date: OffsetDateTime,
    pub category: Category,
    #[schema(value_type = String, example = "Food")]
    pub readable_category: &'static str,
}

impl Expense {
    pub fn amount(&self) -> Decimal {
        cents_to_amount(self.amount_cents)
    }

    pub fn view(self, fields: ExpenseFields) -> ExpenseView {
        let user = match fields {
            ExpenseFields::All => Some(self.user_id),
            ExpenseFields::WithoutUser => None,
        };

        ExpenseView {
            id: self.id,
            user,
            amount: self.amount(),
            title: self.title,
            date: self.date,
            category: self.category,
            readable_category: self.category.label(),
        }
    }
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct CreateExpensePayload {
    pub user: Option<i64>,
    pub title: Option<String>,
    #[schema(value_type = Option<String>, example = "50.00")]
    pub amount: Option<Decimal>,
    pub category: Option<Category>,
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct UpdateExpensePayload {
    pub user: Option<i64>,
    pub title: Option<String>,
    #[schema(value_type = Option<String>, example = "50.00")]
    pub amount: Option<Decimal>,
    pub category: Option<Category>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct CategorySummary {
    /// Category label
    #[schema(example = "Food")]
    pub category: String,
    #[schema(value_type = String, example = "80.00")]
    pub total: Decimal,
}
