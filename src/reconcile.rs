//! # State Reconciler
//! Decides which store currently governs the filter state and mediates every
//! state transition.
//!
//! Authority precedence, re-evaluated on every resolve:
//! 1. Location parameters, when any recognized filter key is present
//!    (persisted state is ignored entirely in that case).
//! 2. The persisted snapshot.
//! 3. Built-in defaults.
//!
//! Whatever wins is layered over defaults for fields it omits, and the result
//! is mirrored back into the persisted store so a later session that starts
//! without location parameters picks it up.
//!
//! `resolve` is a pure function so the precedence rules unit-test without any
//! UI harness; `FilterEngine` adds the store side effects on top of it.

use chrono::Utc;

use crate::codec::{self, QueryParams};
use crate::evaluate::{self, Filtered};
use crate::sources::SourceClassifier;
use crate::state::{FilterPatch, FilterState, HazardRecord};
use crate::stores::{LocationStore, PersistedStore};

/// Pure authority-precedence resolution: location > persisted > defaults.
pub fn resolve(params: &QueryParams, persisted: Option<&str>) -> FilterState {
    if codec::has_filter_params(params) {
        return FilterState::default().with_patch(codec::decode_query(params));
    }
    match persisted {
        Some(raw) => FilterState::default().with_patch(codec::decode_snapshot(raw)),
        None => FilterState::default(),
    }
}

/// Entry point the UI layer talks to. Owns the two injected stores and the
/// source classifier; everything else is computed on demand.
#[derive(Debug)]
pub struct FilterEngine<L, P> {
    location: L,
    persisted: P,
    classifier: SourceClassifier,
}

impl<L: LocationStore, P: PersistedStore> FilterEngine<L, P> {
    /// Engine with the built-in outlet seed. Use
    /// [`SourceClassifier::from_env_or_default`] + [`Self::with_classifier`]
    /// when config files should be honored.
    pub fn new(location: L, persisted: P) -> Self {
        Self::with_classifier(location, persisted, SourceClassifier::default())
    }

    pub fn with_classifier(location: L, persisted: P, classifier: SourceClassifier) -> Self {
        Self {
            location,
            persisted,
            classifier,
        }
    }

    /// Compute the authoritative state and mirror it into the persisted
    /// store. Called fresh on every render; there is no cached state to go
    /// stale.
    pub fn resolved_state(&mut self) -> FilterState {
        let params = self.location.read();
        let snapshot = self.persisted.read();
        let state = resolve(&params, snapshot.as_deref());
        self.persisted.write(&codec::encode_snapshot(&state));
        tracing::debug!(
            location_authoritative = codec::has_filter_params(&params),
            active = state.active_filter_count(),
            "resolved filter state"
        );
        state
    }

    /// Merge a partial change over the current authority and write the result
    /// into both stores. The merge is read-modify-write against the freshly
    /// resolved state, so rapid successive updates never clobber each other.
    ///
    /// The one rejectable input is an inverted custom range; the rejection
    /// comes back as a diagnostic string (for the UI to display), and the
    /// authoritative state is left untouched.
    pub fn update(&mut self, mut patch: FilterPatch) -> Result<FilterState, String> {
        if let Some(range) = patch.custom_range {
            if !range.is_ordered() {
                return Err(format!(
                    "custom date range rejected: start {} is after end {}",
                    range.start.format("%Y-%m-%d"),
                    range.end.format("%Y-%m-%d"),
                ));
            }
        }
        patch.sanitize();

        let next = self.resolved_state().with_patch(patch);
        self.commit(&next);
        Ok(next)
    }

    /// Clear the persisted store and strip all filter parameters from the
    /// location, returning the engine to defaults. Foreign location
    /// parameters survive.
    pub fn reset(&mut self) -> FilterState {
        self.persisted.clear();
        let mut params = self.location.read();
        codec::strip_filter_params(&mut params);
        self.location.write(params);
        FilterState::default()
    }

    /// Filter a hazard collection through the current authoritative state,
    /// evaluated against the present instant.
    pub fn apply<'a>(&mut self, hazards: &'a [HazardRecord]) -> Filtered<'a> {
        let state = self.resolved_state();
        evaluate::filter_hazards(hazards, &state, &self.classifier, Utc::now())
    }

    pub fn active_filter_count(&mut self) -> usize {
        self.resolved_state().active_filter_count()
    }

    pub fn is_default(&mut self) -> bool {
        self.resolved_state().is_default()
    }

    /// Write a complete, self-consistent snapshot to both stores. The
    /// location write replaces the current entry (never appends history) and
    /// leaves foreign parameters in place.
    fn commit(&mut self, state: &FilterState) {
        let mut params = self.location.read();
        codec::strip_filter_params(&mut params);
        params.extend(codec::encode_query(state));
        self.location.write(params);
        self.persisted.write(&codec::encode_snapshot(state));
    }
}
