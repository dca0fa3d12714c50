//! # Filter Codec
//! Serializes the filter state into its two wire forms and back:
//!
//! - **Query parameters** — compact: a key is emitted only when the field
//!   carries a non-default opinion, so a pristine URL stays pristine.
//! - **Persisted snapshot** — a full structural JSON snapshot under a single
//!   namespaced storage key, instants as RFC 3339.
//!
//! Decoding is defensive in both directions: unknown or malformed values are
//! discarded field by field, and a corrupt snapshot decodes to an empty
//! partial state. Nothing in this module returns an error.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::state::{DateRange, FilterPatch, FilterState, SourceCategory, TimeWindow};

/// Namespaced entry the persisted store keeps the snapshot under.
pub const STORAGE_KEY: &str = "gaia.hazard-filters.v1";

/// Query keys this engine owns. Anything else in the location belongs to
/// other parts of the dashboard and is passed through untouched.
pub const FILTER_KEYS: &[&str] = &["types", "window", "from", "to", "sources", "severity"];

const DATE_FMT: &str = "%Y-%m-%d";

/// Location parameters as an ordered key/value map. `BTreeMap` keeps the
/// encoded form deterministic.
pub type QueryParams = BTreeMap<String, String>;

/// True when the location carries at least one recognized filter key, which
/// makes the location authoritative during reconciliation.
pub fn has_filter_params(params: &QueryParams) -> bool {
    FILTER_KEYS.iter().any(|k| params.contains_key(*k))
}

/// Remove every filter-owned key, leaving foreign params alone.
pub fn strip_filter_params(params: &mut QueryParams) {
    for key in FILTER_KEYS {
        params.remove(*key);
    }
}

/// Encode a state into query parameters, omitting defaults:
/// empty type/severity sets, the `all` window, and a source set that is
/// either empty or the full three categories.
pub fn encode_query(state: &FilterState) -> QueryParams {
    let mut params = QueryParams::new();

    if !state.hazard_types.is_empty() {
        params.insert("types".into(), join(state.hazard_types.iter()));
    }
    if state.time_window != TimeWindow::All {
        params.insert("window".into(), state.time_window.as_str().into());
    }
    if state.time_window == TimeWindow::Custom {
        if let Some(range) = state.custom_range.as_ref().filter(|r| r.is_ordered()) {
            params.insert("from".into(), range.start.format(DATE_FMT).to_string());
            params.insert("to".into(), range.end.format(DATE_FMT).to_string());
        }
    }
    if !state.source_types.is_empty() && state.source_types.len() < SourceCategory::ALL.len() {
        params.insert(
            "sources".into(),
            join(state.source_types.iter().map(|s| s.as_str())),
        );
    }
    if !state.severities.is_empty() {
        params.insert("severity".into(), join(state.severities.iter()));
    }

    params
}

/// Decode query parameters into a partial state. Each field is parsed
/// independently; a malformed field is dropped while the rest survive.
/// Absent keys stay `None` ("not specified"), distinct from an explicit
/// empty list.
pub fn decode_query(params: &QueryParams) -> FilterPatch {
    let mut patch = FilterPatch::default();

    if let Some(raw) = params.get("types") {
        patch.hazard_types = Some(split_list(raw));
    }
    if let Some(raw) = params.get("window") {
        patch.time_window = TimeWindow::parse(raw);
    }
    if let Some(raw) = params.get("sources") {
        patch.source_types = Some(
            raw.split(',')
                .filter_map(SourceCategory::parse)
                .collect(),
        );
    }
    if let Some(raw) = params.get("severity") {
        patch.severities = Some(split_list(raw));
    }

    let from = params.get("from").and_then(|s| parse_date(s));
    let to = params.get("to").and_then(|s| parse_date(s));
    if let (Some(from), Some(to)) = (from, to) {
        let range = DateRange::new(day_start(from), day_end(to));
        // An inverted range never enters authoritative state.
        if range.is_ordered() {
            patch.custom_range = Some(range);
        } else {
            tracing::debug!("dropped inverted custom range from query");
        }
    }

    patch.sanitize();
    patch
}

/// Render params as `k=v&k=v`. Values come from closed vocabularies and
/// calendar dates, so no percent-encoding is required.
pub fn to_query_string(params: &QueryParams) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Parse a `?k=v&k=v` string. Pairs without `=` are ignored.
pub fn parse_query(raw: &str) -> QueryParams {
    raw.trim_start_matches('?')
        .split('&')
        .filter(|p| !p.is_empty())
        .filter_map(|p| p.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// --- Persisted snapshot -----------------------------------------------------

/// On-disk shape of the snapshot. All fields optional so partially written
/// or older entries still decode field by field.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hazard_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_window: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_range: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    severities: Option<Vec<String>>,
}

/// Full structural snapshot of the state for the persisted store.
pub fn encode_snapshot(state: &FilterState) -> String {
    let repr = SnapshotRepr {
        hazard_types: Some(state.hazard_types.iter().cloned().collect()),
        time_window: Some(state.time_window.as_str().to_string()),
        custom_range: state.custom_range.filter(|r| r.is_ordered()),
        source_types: Some(
            state
                .source_types
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
        ),
        severities: Some(state.severities.iter().cloned().collect()),
    };
    serde_json::to_string(&repr).unwrap_or_else(|e| {
        tracing::warn!(error = ?e, "snapshot encode failed");
        "{}".to_string()
    })
}

/// Decode a persisted snapshot. A corrupt entry yields an empty partial
/// state; a readable entry with unknown identifiers drops them field by
/// field.
pub fn decode_snapshot(raw: &str) -> FilterPatch {
    let repr: SnapshotRepr = match serde_json::from_str(raw) {
        Ok(repr) => repr,
        Err(e) => {
            tracing::warn!(error = ?e, "corrupt persisted snapshot, ignoring");
            return FilterPatch::default();
        }
    };

    let mut patch = FilterPatch {
        hazard_types: repr.hazard_types.map(|v| v.into_iter().collect()),
        time_window: repr.time_window.as_deref().and_then(TimeWindow::parse),
        custom_range: repr.custom_range.filter(|r| r.is_ordered()),
        source_types: repr.source_types.map(|v| {
            v.iter()
                .filter_map(|s| SourceCategory::parse(s))
                .collect()
        }),
        severities: repr.severities.map(|v| v.into_iter().collect()),
    };
    patch.sanitize();
    patch
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FMT).ok()
}

fn day_start(d: NaiveDate) -> DateTime<Utc> {
    d.and_time(NaiveTime::MIN).and_utc()
}

/// Inclusive end of day, so `to=2025-06-10` still matches records created
/// that evening.
fn day_end(d: NaiveDate) -> DateTime<Utc> {
    day_start(d) + Duration::days(1) - Duration::seconds(1)
}

fn join<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn split_list(raw: &str) -> std::collections::BTreeSet<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
