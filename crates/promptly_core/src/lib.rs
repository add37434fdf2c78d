//! Core data types for the Promptly email marketing service.
//!
//! This crate provides the foundation data types used across all Promptly crates.

mod brief;
mod copy;
mod plan;
mod status;

pub use brief::{Brief, BriefBuilder, BriefBuilderError};
pub use copy::{CopySource, GeneratedCopy};
pub use plan::Plan;
pub use status::{DeliveryDisposition, DeliveryStatus, DispatchMode, DraftStatus, EventType};
