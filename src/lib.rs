// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregator;
pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod metrics;
pub mod profile;
pub mod providers;
pub mod relevance;
pub mod session;
pub mod ticker;

pub use crate::api::{create_router, AppState};
pub use crate::profile::{AggregateRecord, Query};
