//! The credential store: account registration, password verification and
//! identity availability checks over the `accounts` table.
//!
//! Every operation checks out one pooled connection and returns it before
//! the call ends. Uniqueness is enforced only by the table's UNIQUE
//! constraints, so two concurrent registrations for the same username
//! cannot both succeed.

mod db;

use diesel::SqliteConnection;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::db::{build_pool, ensure_schema, get_connection, DbPool};
use crate::error::{StoreError, StoreResult};
use crate::models::{Availability, NewAccount};
use crate::password;

#[derive(Clone)]
pub struct CredentialStore {
    pool: DbPool,
}

impl CredentialStore {
    /// Wraps an existing pool, bringing the schema up to date first.
    pub fn new(pool: DbPool) -> StoreResult<Self> {
        let mut conn = get_connection(&pool)?;
        let outcome = ensure_schema(&mut conn)?;
        debug!(?outcome, "credential store ready");
        Ok(Self { pool })
    }

    pub fn open(config: &Config) -> StoreResult<Self> {
        Self::new(build_pool(config)?)
    }

    /// Creates an account. Fails with `DuplicateUsername` or `DuplicateEmail`
    /// when the table's uniqueness constraints reject the row; nothing is
    /// written in that case.
    pub fn register(&self, username: &str, email: &str, password: &str) -> StoreResult<()> {
        let password_hash = password::sha256_hex(password);
        let account = NewAccount {
            username,
            email,
            password_hash: &password_hash,
        };

        let result = self.with_connection(|conn| {
            db::insert_account(conn, &account).map_err(StoreError::from_insert)
        });
        match &result {
            Ok(_) => info!(username, "account registered"),
            Err(err @ (StoreError::DuplicateUsername | StoreError::DuplicateEmail)) => {
                warn!(username, reason = err.code(), "registration rejected");
            }
            Err(_) => {}
        }
        result.map(|_| ())
    }

    /// Returns `Ok(true)` only when `username` exists and `password` hashes
    /// to its stored digest. An unknown username and a wrong password both
    /// yield `Ok(false)`.
    pub fn authenticate(&self, username: &str, password: &str) -> StoreResult<bool> {
        let stored = self.with_connection(|conn| Ok(db::find_password_hash(conn, username)?))?;

        let authenticated = match stored {
            Some(hash) => password::verify(password, &hash),
            None => false,
        };
        debug!(username, authenticated, "authentication attempt");
        Ok(authenticated)
    }

    /// Reports independently whether `username` and `email` are in use.
    pub fn exists(&self, username: &str, email: &str) -> StoreResult<Availability> {
        self.with_connection(|conn| {
            Ok(Availability {
                username_taken: db::count_by_username(conn, username)? > 0,
                email_taken: db::count_by_email(conn, email)? > 0,
            })
        })
    }

    pub fn account_count(&self) -> StoreResult<i64> {
        self.with_connection(|conn| Ok(db::count_all(conn)?))
    }

    /// Runs `op` on a connection checked out for this call only.
    fn with_connection<T>(
        &self,
        op: impl FnOnce(&mut SqliteConnection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let result = get_connection(&self.pool).and_then(|mut conn| op(&mut *conn));
        if let Err(StoreError::Unavailable(source)) = &result {
            error!(error = %source, "credential storage failure");
        }
        result
    }
}
