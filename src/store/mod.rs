//! Persistence layer — libSQL-backed durable slot and submission records.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{CreateOutcome, KeyValueSlot, RecordStore, SubmittedRecord};
