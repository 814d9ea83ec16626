// ================================================================
// File: cmdext-common/src/error.rs
// ================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found error: {0}")]
    NotFound(String),

    /// Missing or malformed request input. Never mutates the store.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A unique name collided on insert.
    #[error("Constraint error: {0}")]
    Constraint(String),

    /// The host runtime refused a command or job registration.
    #[error("Registration error: {0}")]
    Registration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        // Unique violations are a caller problem (duplicate name), not a storage failure.
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return Error::Constraint(db_err.message().to_string());
            }
        }
        Error::Database(err)
    }
}
