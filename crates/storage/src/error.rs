use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    fn sql_state(&self) -> Option<String> {
        match self {
            StorageError::Database(sqlx::Error::Database(e)) => e.code().map(|c| c.into_owned()),
            _ => None,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        self.sql_state().as_deref() == Some("23505")
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        self.sql_state().as_deref() == Some("23503")
    }

    pub fn is_check_violation(&self) -> bool {
        self.sql_state().as_deref() == Some("23514")
    }

    /// Serialization failures and deadlocks; the whole unit of work may be rerun.
    pub fn is_retryable(&self) -> bool {
        matches!(self.sql_state().as_deref(), Some("40001") | Some("40P01"))
    }

    /// Translate a unique violation into a readable constraint error, keeping
    /// every other error as-is.
    pub fn on_unique_violation(self, msg: &str) -> Self {
        if self.is_unique_violation() {
            StorageError::ConstraintViolation(msg.to_string())
        } else {
            self
        }
    }
}

impl From<crate::models::ParseEnumError> for StorageError {
    fn from(error: crate::models::ParseEnumError) -> Self {
        StorageError::Validation(error.to_string())
    }
}
