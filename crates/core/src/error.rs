//! Error types for the provider directory core crate.

use thiserror::Error;

/// Top-level error type for all directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("referential integrity error: {0}")]
    ReferentialIntegrity(String),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("authentication error: {0}")]
    Authentication(String),

    #[error("password is not a readable attribute")]
    PasswordNotReadable,

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DirectoryError {
    /// Short machine-readable name of the variant, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            DirectoryError::ConstraintViolation(_) => "constraint_violation",
            DirectoryError::ReferentialIntegrity(_) => "referential_integrity",
            DirectoryError::NotFound { .. } => "not_found",
            DirectoryError::Authentication(_) => "authentication",
            DirectoryError::PasswordNotReadable => "password_not_readable",
            DirectoryError::InvalidQuery(_) => "invalid_query",
            DirectoryError::Config(_) => "config",
            DirectoryError::Database(_) => "database",
            DirectoryError::Io(_) => "io",
        }
    }

    /// Translate a driver error into the directory taxonomy.
    ///
    /// Constraint failures that slipped past the store's own checks (for
    /// example a unique index hit by a concurrent writer) still surface as
    /// `ConstraintViolation` / `ReferentialIntegrity` instead of a raw
    /// database error.
    pub fn from_sqlx(err: sqlx::Error, table: &str) -> Self {
        if let Some(db_err) = err.as_database_error() {
            let message = db_err.message().to_string();
            match db_err.kind() {
                sqlx::error::ErrorKind::UniqueViolation
                | sqlx::error::ErrorKind::NotNullViolation
                | sqlx::error::ErrorKind::CheckViolation => {
                    return DirectoryError::ConstraintViolation(format!("{table}: {message}"));
                }
                sqlx::error::ErrorKind::ForeignKeyViolation => {
                    return DirectoryError::ReferentialIntegrity(format!("{table}: {message}"));
                }
                _ => {}
            }
        }
        DirectoryError::Database(err)
    }
}

/// A convenience Result alias that defaults to [`DirectoryError`].
pub type Result<T> = std::result::Result<T, DirectoryError>;
