//! OpenAPI document for the REST API.
//!
//! Served as JSON at `/api/v1/openapi.json` with Swagger UI at `/api/v1/docs`.

use utoipa::OpenApi;

use crate::category::Category;
use crate::models::{
    CategorySummary, CreateExpensePayload, CreateUserPayload, ExpenseView, UpdateExpensePayload,
    User,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Expense tracker API",
        description = "Users, their expenses, date-range listings and monthly category totals."
    ),
    paths(
        crate::users::list_users,
        crate::users::create_user,
        crate::expenses::list_expenses,
        crate::expenses::create_expense,
        crate::expenses::get_expense,
        crate::expenses::update_expense,
        crate::expenses::partial_update_expense,
        crate::expenses::delete_expense,
        crate::reports::expenses_by_date_range,
        crate::reports::category_summary,
    ),
    components(schemas(
        User,
        CreateUserPayload,
        ExpenseView,
        CreateExpensePayload,
        UpdateExpensePayload,
        CategorySummary,
        Category,
    )),
    tags(
        (name = "users", description = "Create and list users"),
        (name = "expenses", description = "Expense CRUD"),
        (name = "reports", description = "Per-user date-range and monthly summaries")
    )
)]
pub struct ApiDoc;
