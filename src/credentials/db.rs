use diesel::prelude::*;
use diesel::result::Error;

use crate::models::NewAccount;
use crate::schema::accounts::dsl::{self, accounts};

pub fn insert_account(conn: &mut SqliteConnection, account: &NewAccount<'_>) -> Result<usize, Error> {
    diesel::insert_into(accounts).values(account).execute(conn)
}

pub fn find_password_hash(
    conn: &mut SqliteConnection,
    username: &str,
) -> Result<Option<String>, Error> {
    accounts
        .filter(dsl::username.eq(username))
        .select(dsl::password_hash)
        .first::<String>(conn)
        .optional()
}

pub fn count_by_username(conn: &mut SqliteConnection, username: &str) -> Result<i64, Error> {
    accounts
        .filter(dsl::username.eq(username))
        .count()
        .get_result(conn)
}

pub fn count_by_email(conn: &mut SqliteConnection, email: &str) -> Result<i64, Error> {
    accounts.filter(dsl::email.eq(email)).count().get_result(conn)
}

pub fn count_all(conn: &mut SqliteConnection) -> Result<i64, Error> {
    accounts.count().get_result(conn)
}
