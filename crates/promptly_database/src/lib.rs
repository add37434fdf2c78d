//! Diesel persistence layer for the Promptly email marketing service.
//!
//! All state lives in PostgreSQL; the database is the sole synchronization
//! point between request handlers. The [`Store`] trait is the seam the HTTP
//! layer and the scheduler talk through.

mod campaign_models;
mod connection;
mod memory_store;
mod profile_models;
pub mod queries;
pub mod schema;
mod store;

pub use campaign_models::{
    DeliveryRow, DeliverySummary, DraftRow, EventRow, NewDeliveryRow, NewDraftRow, NewEventRow,
    NewWaitlistRow,
};
pub use connection::{MIGRATIONS, PgPool, create_pool, establish_connection, run_migrations};
pub use memory_store::InMemoryStore;
pub use profile_models::{NewProfileRow, ProfileRow};
pub use store::{PgStore, Store};

/// Result alias for database operations.
pub type DatabaseResult<T> = Result<T, promptly_error::DatabaseError>;
