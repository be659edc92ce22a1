//! Append-only SQLite persistence for inbound mail and extracted codes.

mod error;
mod sqlite;

pub use error::StoreError;
pub use sqlite::{CodeMail, SqliteStore};
