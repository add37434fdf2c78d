//! Error types for the Promptly email marketing service.
//!
//! Each subsystem gets its own kind enum plus an error struct that records
//! the file and line where the error was raised via `#[track_caller]`.

mod billing;
mod config;
mod database;
mod generate;
mod transport;

pub use billing::{BillingError, BillingErrorKind};
pub use config::{ConfigError, ConfigErrorKind};
pub use database::{DatabaseError, DatabaseErrorKind};
pub use generate::{GenerateError, GenerateErrorKind};
pub use transport::{TransportError, TransportErrorKind};
