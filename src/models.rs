use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::accounts;

/// Row written by `register`. `id` is left to SQLite.
#[derive(Insertable)]
#[diesel(table_name = accounts)]
pub struct NewAccount<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Which of the two identity fields are already in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub username_taken: bool,
    pub email_taken: bool,
}
