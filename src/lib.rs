// src/lib.rs
// Public library surface for integration tests (and the dashboard shell).

pub mod codec;
pub mod evaluate;
pub mod reconcile;
pub mod sources;
pub mod state;
pub mod stores;
pub mod window;

// ---- Re-exports for stable public API ----
pub use crate::codec::{parse_query, to_query_string, QueryParams, STORAGE_KEY};
pub use crate::evaluate::{filter_hazards, Filtered, FilterSummary};
pub use crate::reconcile::{resolve, FilterEngine};
pub use crate::sources::SourceClassifier;
pub use crate::state::{
    DateRange, FilterPatch, FilterState, HazardRecord, SourceCategory, TimeWindow,
};
pub use crate::stores::{LocationStore, MemoryLocation, MemoryStore, PersistedStore};
pub use crate::window::resolve_window;
