//! Store seams for the two shared mutable resources the engine writes to:
//! the navigable location (URL query parameters) and the persistent local
//! store. The dashboard injects adapters over the real browser surfaces;
//! tests and the demo binary use the in-memory implementations.

use crate::codec::QueryParams;

/// The navigable location. `write` replaces the current entry rather than
/// appending history, so filter adjustments never pollute back/forward
/// navigation.
pub trait LocationStore {
    fn read(&self) -> QueryParams;
    fn write(&mut self, params: QueryParams);
}

/// The persistent local store, holding at most one snapshot under the
/// engine's namespaced key.
pub trait PersistedStore {
    fn read(&self) -> Option<String>;
    fn write(&mut self, snapshot: &str);
    fn clear(&mut self);
}

/// In-memory location used by tests and the demo.
#[derive(Debug, Default, Clone)]
pub struct MemoryLocation {
    params: QueryParams,
}

impl MemoryLocation {
    pub fn with_params(params: QueryParams) -> Self {
        Self { params }
    }
}

impl LocationStore for MemoryLocation {
    fn read(&self) -> QueryParams {
        self.params.clone()
    }

    fn write(&mut self, params: QueryParams) {
        self.params = params;
    }
}

/// In-memory persisted store used by tests and the demo.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entry: Option<String>,
}

impl MemoryStore {
    pub fn with_entry(snapshot: impl Into<String>) -> Self {
        Self {
            entry: Some(snapshot.into()),
        }
    }
}

impl PersistedStore for MemoryStore {
    fn read(&self) -> Option<String> {
        self.entry.clone()
    }

    fn write(&mut self, snapshot: &str) {
        self.entry = Some(snapshot.to_string());
    }

    fn clear(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_location_replaces_on_write() {
        let mut loc = MemoryLocation::default();
        loc.write(QueryParams::from([("types".to_string(), "flood".to_string())]));
        loc.write(QueryParams::from([("window".to_string(), "7d".to_string())]));
        let params = loc.read();
        assert_eq!(params.len(), 1);
        assert!(params.contains_key("window"));
    }

    #[test]
    fn memory_store_clear_forgets_the_entry() {
        let mut store = MemoryStore::with_entry("{}");
        assert!(store.read().is_some());
        store.clear();
        assert_eq!(store.read(), None);
    }
}
