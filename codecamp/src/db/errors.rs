use thiserror::Error;

/// Unified error type for repository operations.
///
/// Every variant is a persistence fault from the caller's point of view: the
/// repository never reports "not found" as an error (absent entities come back
/// as `None` or an empty collection). The categories exist so faults are
/// logged with useful detail.
#[derive(Error, Debug)]
pub enum DbError {
    /// Unique constraint violation
    #[error("Unique constraint violation: {message}")]
    UniqueViolation { constraint: Option<String>, message: String },

    /// Foreign key constraint violation
    #[error("Foreign key constraint violation: {message}")]
    ForeignKeyViolation { constraint: Option<String>, message: String },

    /// Check or not-null constraint violation
    #[error("Check constraint violation: {message}")]
    CheckViolation { constraint: Option<String>, message: String },

    /// Catch-all for non-recoverable errors (connection loss, pool closed, decode failures)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convert from sqlx::Error using sqlx's database error categorization
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                let constraint = db_err.constraint().map(|s| s.to_string());
                let message = db_err.message().to_string();

                if db_err.is_unique_violation() {
                    DbError::UniqueViolation { constraint, message }
                } else if db_err.is_foreign_key_violation() {
                    DbError::ForeignKeyViolation { constraint, message }
                } else if db_err.is_check_violation() {
                    DbError::CheckViolation { constraint, message }
                } else {
                    DbError::Other(anyhow::Error::from(err))
                }
            }
            _ => DbError::Other(anyhow::Error::from(err)),
        }
    }
}

/// Type alias for database operation results
pub type Result<T> = std::result::Result<T, DbError>;
