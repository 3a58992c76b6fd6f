use diesel::r2d2::PoolError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username is already registered")]
    DuplicateUsername,

    #[error("email is already registered")]
    DuplicateEmail,

    #[error("credential storage is unavailable")]
    Unavailable(#[source] BoxError),

    #[error("database schema version {found} is newer than supported version {supported}")]
    IncompatibleSchema { found: i32, supported: i32 },
}

impl StoreError {
    pub fn unavailable(err: impl Into<BoxError>) -> Self {
        StoreError::Unavailable(err.into())
    }

    /// Stable identifier for the error kind, used in API responses.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::DuplicateUsername => "DUPLICATE_USERNAME",
            StoreError::DuplicateEmail => "DUPLICATE_EMAIL",
            StoreError::Unavailable(_) => "UNAVAILABLE",
            StoreError::IncompatibleSchema { .. } => "INCOMPATIBLE_SCHEMA",
        }
    }

    /// Maps an insert failure onto the constraint that rejected it.
    ///
    /// SQLite reports unique violations as `UNIQUE constraint failed: <table>.<column>`.
    pub(crate) fn from_insert(err: DieselError) -> Self {
        if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &err {
            let message = info.message();
            if message.contains("accounts.username") {
                return StoreError::DuplicateUsername;
            }
            if message.contains("accounts.email") {
                return StoreError::DuplicateEmail;
            }
        }
        StoreError::from(err)
    }
}

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        StoreError::Unavailable(Box::new(err))
    }
}

impl From<PoolError> for StoreError {
    fn from(err: PoolError) -> Self {
        StoreError::Unavailable(Box::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
