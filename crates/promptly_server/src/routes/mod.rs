//! HTTP request handlers, one module per API surface.

pub mod analytics;
pub mod billing;
pub mod drafts;
pub mod generate;
pub mod limits;
pub mod send;
pub mod track;
pub mod waitlist;
