// Server configuration
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "3000";
pub const DEFAULT_DATA_PATH: &str = "data";
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:8080";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DATABASE_FILE_NAME: &str = "expenses.db";

// Routing
pub const API_PREFIX: &str = "/api/v1";
pub const OPENAPI_JSON_PATH: &str = "/api/v1/openapi.json";
pub const API_DOCS_PATH: &str = "/api/v1/docs";

// Validation limits
pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_EXPENSE_TITLE_LENGTH: usize = 100;
pub const AMOUNT_DECIMAL_PLACES: u32 = 2;
pub const AMOUNT_MAX_DIGITS: u32 = 10;

// Error messages
pub const ERR_DATABASE_OPERATION: &str = "Database operation failed";
pub const ERR_EXPENSE_NOT_FOUND: &str = "No Expense matches the given query.";
pub const ERR_UPDATE_FAILED: &str = "An error occurred during the update";
pub const ERR_FIELD_REQUIRED: &str = "This field is required.";
