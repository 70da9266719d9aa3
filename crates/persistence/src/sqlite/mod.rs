//! SQLite-backed storage

mod connection;
mod credentials;

pub use connection::Database;
pub use credentials::*;
