pub mod category;
pub mod config;
pub mod constants;
pub mod database;
pub mod doc;
pub mod expenses;
pub mod extract;
pub mod logging;
pub mod models;
pub mod reports;
pub mod routes;
pub mod users;
pub mod utils;

// Re-export types at crate root for convenient importing
pub use crate::database::{Db, TransactionError, with_transaction};
pub use crate::routes::app;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
}
