//! Profile Intake — multi-step profile wizard with validated, unique
//! submissions.

pub mod config;
pub mod error;
pub mod profile;
pub mod server;
pub mod store;
pub mod submission;
pub mod wizard;

pub use error::{Error, Result};
