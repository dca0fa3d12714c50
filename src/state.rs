//! # Filter State
//! The single mutable aggregate of the engine: the active filter criteria,
//! the fixed enumerations they draw from, the hazard-record input shape, and
//! the partial-update type used by decoding and `update()`.
//!
//! An empty `hazard_types`/`severities` set means "no restriction in this
//! dimension" (everything visible), while `source_types` carries a non-empty
//! default that deliberately hides unverified citizen reports. That asymmetry
//! is load-bearing for the UI and must not be "fixed" here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Hazard-type identifiers the dashboard knows about. Anything else is
/// dropped during decoding rather than rejected.
pub const KNOWN_HAZARD_TYPES: &[&str] = &["flood", "typhoon", "earthquake", "landslide", "fire"];

/// Severity identifiers the dashboard knows about.
pub const KNOWN_SEVERITIES: &[&str] = &["minor", "moderate", "severe", "critical"];

/// Symbolic time window restricting records by creation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeWindow {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "24h")]
    Last24h,
    #[serde(rename = "7d")]
    Last7d,
    #[serde(rename = "30d")]
    Last30d,
    #[serde(rename = "custom")]
    Custom,
}

impl TimeWindow {
    /// Wire token used in both the query string and the persisted snapshot.
    pub fn as_str(self) -> &'static str {
        match self {
            TimeWindow::All => "all",
            TimeWindow::Last24h => "24h",
            TimeWindow::Last7d => "7d",
            TimeWindow::Last30d => "30d",
            TimeWindow::Custom => "custom",
        }
    }

    /// Parse a wire token. Unknown tokens yield `None` (the field is dropped,
    /// never an error).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "all" => Some(TimeWindow::All),
            "24h" => Some(TimeWindow::Last24h),
            "7d" => Some(TimeWindow::Last7d),
            "30d" => Some(TimeWindow::Last30d),
            "custom" => Some(TimeWindow::Custom),
            _ => None,
        }
    }
}

/// Source category derived from a record's raw provenance label plus its
/// validated flag. Never stored on the record; re-derived at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    /// Verified news feed (RSS pipeline outlets).
    News,
    /// Citizen report that passed validation.
    CitizenVerified,
    /// Citizen report still awaiting validation.
    CitizenUnverified,
}

impl SourceCategory {
    pub const ALL: [SourceCategory; 3] = [
        SourceCategory::News,
        SourceCategory::CitizenVerified,
        SourceCategory::CitizenUnverified,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceCategory::News => "news",
            SourceCategory::CitizenVerified => "citizen_verified",
            SourceCategory::CitizenUnverified => "citizen_unverified",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "news" => Some(SourceCategory::News),
            "citizen_verified" => Some(SourceCategory::CitizenVerified),
            "citizen_unverified" => Some(SourceCategory::CitizenUnverified),
            _ => None,
        }
    }
}

/// Inclusive creation-instant range backing `TimeWindow::Custom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// An inverted range is never persisted or serialized; callers check this
    /// before committing.
    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }
}

/// The active filter criteria. Constructed fresh on every resolve; a pure
/// value with no identity of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// Empty set = no type restriction.
    pub hazard_types: BTreeSet<String>,
    pub time_window: TimeWindow,
    /// Meaningful only while `time_window` is `Custom`.
    pub custom_range: Option<DateRange>,
    /// Which source categories are visible. Defaults to news + verified
    /// citizen reports; unverified reports are opt-in.
    pub source_types: BTreeSet<SourceCategory>,
    /// Empty set = no severity restriction.
    pub severities: BTreeSet<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            hazard_types: BTreeSet::new(),
            time_window: TimeWindow::All,
            custom_range: None,
            source_types: BTreeSet::from([
                SourceCategory::News,
                SourceCategory::CitizenVerified,
            ]),
            severities: BTreeSet::new(),
        }
    }
}

impl FilterState {
    /// Layer a partial update over this state. Fields the patch leaves unset
    /// keep their current value.
    pub fn with_patch(mut self, patch: FilterPatch) -> Self {
        if let Some(types) = patch.hazard_types {
            self.hazard_types = types;
        }
        if let Some(window) = patch.time_window {
            self.time_window = window;
        }
        if let Some(range) = patch.custom_range {
            self.custom_range = Some(range);
        }
        if let Some(sources) = patch.source_types {
            self.source_types = sources;
        }
        if let Some(severities) = patch.severities {
            self.severities = severities;
        }
        self
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Number of filter dimensions that differ from their default, for the
    /// "N filters active" badge in the UI.
    pub fn active_filter_count(&self) -> usize {
        let defaults = Self::default();
        let mut n = 0;
        if !self.hazard_types.is_empty() {
            n += 1;
        }
        if self.time_window != TimeWindow::All {
            n += 1;
        }
        if self.source_types != defaults.source_types {
            n += 1;
        }
        if !self.severities.is_empty() {
            n += 1;
        }
        n
    }
}

/// Partial view of `FilterState`: the shape of a decoded query string, a
/// decoded persisted snapshot, or a caller-supplied update. `None` means
/// "no opinion on this field", distinct from an explicit empty set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPatch {
    pub hazard_types: Option<BTreeSet<String>>,
    pub time_window: Option<TimeWindow>,
    pub custom_range: Option<DateRange>,
    pub source_types: Option<BTreeSet<SourceCategory>>,
    pub severities: Option<BTreeSet<String>>,
}

impl FilterPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Drop identifiers outside the known enumerations. Silent by design:
    /// unknown values mean "no opinion", never an error.
    pub fn sanitize(&mut self) {
        if let Some(types) = self.hazard_types.as_mut() {
            retain_known(types, KNOWN_HAZARD_TYPES, "hazard_types");
        }
        if let Some(severities) = self.severities.as_mut() {
            retain_known(severities, KNOWN_SEVERITIES, "severities");
        }
    }
}

/// Keep only identifiers present in `known`, logging what was dropped.
fn retain_known(set: &mut BTreeSet<String>, known: &[&str], field: &str) {
    let before = set.len();
    set.retain(|v| known.contains(&v.as_str()));
    let dropped = before - set.len();
    if dropped > 0 {
        tracing::debug!(field, dropped, "dropped unknown filter identifiers");
    }
}

/// Read-only hazard record supplied by the data-fetch layer. The predicate
/// inspects type, severity, source, validated flag and creation instant; the
/// remaining fields are display-only and carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardRecord {
    pub id: String,
    pub hazard_type: String,
    pub severity: String,
    /// Raw provenance label, e.g. "gma_news" or "citizen_report".
    pub source: String,
    #[serde(default)]
    pub validated: bool,
    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}
