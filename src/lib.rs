// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod cache;
pub mod config;
pub mod export;
pub mod fetch;
pub mod metrics;
pub mod pipeline;
pub mod query;
pub mod schema;
pub mod service;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::schema::{Event, Fixture, Prediction, Sport};
pub use crate::service::{Aggregator, QueryError};
