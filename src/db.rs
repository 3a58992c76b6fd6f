//! Connection pool and schema management for the `accounts` table.

use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, PooledConnection};
use diesel::sql_types::Integer;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{StoreError, StoreResult};

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Bumping this drops and recreates the table on the next start. There is no
/// data migration.
pub const SCHEMA_VERSION: i32 = 1;

const CREATE_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS accounts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_accounts_username ON accounts(username);
    CREATE INDEX IF NOT EXISTS idx_accounts_email ON accounts(email);
";

const DROP_SCHEMA: &str = "
    DROP INDEX IF EXISTS idx_accounts_username;
    DROP INDEX IF EXISTS idx_accounts_email;
    DROP TABLE IF EXISTS accounts;
";

#[derive(Debug)]
struct ConnectionOptions {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        ))
        .map_err(r2d2::Error::QueryError)
    }
}

pub fn build_pool(config: &Config) -> StoreResult<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(&config.database_url);
    let pool = r2d2::Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(config.connect_timeout)
        .connection_customizer(Box::new(ConnectionOptions {
            busy_timeout: config.busy_timeout,
        }))
        .build(manager)?;
    Ok(pool)
}

pub fn get_connection(pool: &DbPool) -> StoreResult<DbConnection> {
    Ok(pool.get()?)
}

/// What `ensure_schema` had to do to bring the database up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
    /// The database carried no version stamp; the table was created if absent.
    Initialized,
    /// Already at the current version.
    Current,
    /// An older layout was dropped and recreated. All accounts were lost.
    Rebuilt { previous: i32 },
}

#[derive(QueryableByName)]
struct UserVersion {
    #[diesel(sql_type = Integer)]
    user_version: i32,
}

pub fn ensure_schema(conn: &mut SqliteConnection) -> StoreResult<SchemaOutcome> {
    migrate_to(conn, SCHEMA_VERSION)
}

fn migrate_to(conn: &mut SqliteConnection, target: i32) -> StoreResult<SchemaOutcome> {
    conn.immediate_transaction(|conn| {
        let found = stored_version(conn)?;
        let outcome = match found {
            0 => SchemaOutcome::Initialized,
            v if v == target => SchemaOutcome::Current,
            v if v < target => {
                warn!(from = v, to = target, "schema version changed, dropping accounts table");
                conn.batch_execute(DROP_SCHEMA)?;
                SchemaOutcome::Rebuilt { previous: v }
            }
            v => {
                return Err(StoreError::IncompatibleSchema {
                    found: v,
                    supported: target,
                })
            }
        };

        conn.batch_execute(CREATE_SCHEMA)?;
        if found != target {
            // PRAGMA does not accept bound parameters.
            conn.batch_execute(&format!("PRAGMA user_version = {target};"))?;
            info!(version = target, ?outcome, "account schema ready");
        }
        Ok(outcome)
    })
}

fn stored_version(conn: &mut SqliteConnection) -> StoreResult<i32> {
    let row = diesel::sql_query("PRAGMA user_version").get_result::<UserVersion>(conn)?;
    Ok(row.user_version)
}
