// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod assemble;
pub mod cache;
pub mod config;
pub mod enrich;
pub mod metrics;
pub mod model;
pub mod refresh;
pub mod sources;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::assemble::{Assembler, Sources};
pub use crate::config::AppConfig;
pub use crate::model::Snapshot;
pub use crate::store::SnapshotStore;
