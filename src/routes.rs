use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::constants::{API_DOCS_PATH, API_PREFIX, OPENAPI_JSON_PATH};
use crate::doc::ApiDoc;
use crate::{AppState, expenses, reports, users};

/// Routes relative to the API prefix
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/users/", get(users::list_users).post(users::create_user))
        .route(
            "/expenses/",
            get(expenses::list_expenses).post(expenses::create_expense),
        )
        .route(
            "/expenses/{id}/",
            get(expenses::get_expense)
                .put(expenses::update_expense)
                .patch(expenses::partial_update_expense)
                .delete(expenses::delete_expense),
        )
        .route(
            "/expenses/{user_id}/{start_date}/{end_date}/",
            get(reports::expenses_by_date_range),
        )
        .route(
            "/expenses/{user_id}/summary/{year}/{month}/",
            get(reports::category_summary),
        )
}

/// Full application with the API and its documentation mounted under the versioned prefix
pub fn app(app_state: AppState) -> Router {
    Router::new()
        .nest(API_PREFIX, api_router())
        .merge(SwaggerUi::new(API_DOCS_PATH).url(OPENAPI_JSON_PATH, ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
