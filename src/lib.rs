//! Durable account store with unique usernames and emails and one-way
//! password verification, plus a small JSON API over it.

pub mod account_requests;
pub mod config;
pub mod credentials;
pub mod db;
pub mod error;
pub mod models;
pub mod password;
pub mod schema;

pub use config::Config;
pub use credentials::CredentialStore;
pub use error::{StoreError, StoreResult};
pub use models::Availability;
