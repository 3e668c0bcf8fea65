//! PostgreSQL implementations of the outbound repository ports.

mod area;
mod indicator;
mod macro_challenge;
mod report;

pub use area::PostgresAreaRepository;
pub use indicator::PostgresIndicatorRepository;
pub use macro_challenge::PostgresMacroRepository;
pub use report::PostgresReportRepository;

use crate::domain::TrackingError;

/// Map a database error onto the domain error the services understand.
fn db_error(err: sqlx::Error) -> TrackingError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => {
            TrackingError::Conflict("a record with the same key already exists".to_string())
        }
        Some(db_err) if db_err.is_foreign_key_violation() => {
            TrackingError::validation("referenced record does not exist")
        }
        _ => {
            tracing::error!("Database error: {:?}", err);
            TrackingError::storage(err.to_string())
        }
    }
}
