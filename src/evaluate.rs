//! # Predicate Evaluator
//! Pure application of a resolved filter state to a hazard collection:
//! logical AND across dimensions, OR within a dimension's set. No side
//! effects, no stored state.

use chrono::{DateTime, Utc};

use crate::sources::SourceClassifier;
use crate::state::{FilterState, HazardRecord};
use crate::window::resolve_window;

/// Matching subset plus the derived summary counts.
#[derive(Debug)]
pub struct Filtered<'a> {
    pub records: Vec<&'a HazardRecord>,
    pub summary: FilterSummary,
}

/// How many records matched and how many the filters hid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSummary {
    pub matched: usize,
    pub hidden: usize,
}

/// Apply `state` to `hazards` at instant `now`. The time window is resolved
/// here, freshly per call, so relative windows track real time.
pub fn filter_hazards<'a>(
    hazards: &'a [HazardRecord],
    state: &FilterState,
    classifier: &SourceClassifier,
    now: DateTime<Utc>,
) -> Filtered<'a> {
    let range = resolve_window(state.time_window, state.custom_range.as_ref(), now);

    let records: Vec<&HazardRecord> = hazards
        .iter()
        .filter(|h| matches(h, state, range, classifier))
        .collect();

    let summary = FilterSummary {
        matched: records.len(),
        hidden: hazards.len() - records.len(),
    };
    Filtered { records, summary }
}

fn matches(
    hazard: &HazardRecord,
    state: &FilterState,
    range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    classifier: &SourceClassifier,
) -> bool {
    if !state.hazard_types.is_empty() && !state.hazard_types.contains(&hazard.hazard_type) {
        return false;
    }
    if !state.severities.is_empty() && !state.severities.contains(&hazard.severity) {
        return false;
    }
    if let Some((start, end)) = range {
        if hazard.created_at < start || hazard.created_at > end {
            return false;
        }
    }
    // An empty source set widens to "show all", mirroring the type/severity
    // convention. Whether that is the intended UI meaning is an open product
    // question; the observed behavior is preserved.
    if !state.source_types.is_empty() {
        let category = classifier.classify(&hazard.source, hazard.validated);
        if !state.source_types.contains(&category) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{SourceCategory, TimeWindow};
    use chrono::{Duration, TimeZone};
    use std::collections::BTreeSet;

    fn hazard(id: &str, kind: &str, severity: &str, source: &str, validated: bool) -> HazardRecord {
        HazardRecord {
            id: id.to_string(),
            hazard_type: kind.to_string(),
            severity: severity.to_string(),
            source: source.to_string(),
            validated,
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
            location_name: None,
            latitude: None,
            longitude: None,
            confidence: None,
            snippet: None,
        }
    }

    fn clf() -> SourceClassifier {
        SourceClassifier::default()
    }

    #[test]
    fn default_state_narrows_only_on_source_category() {
        let hazards = vec![
            hazard("a", "flood", "severe", "gma_news", true),
            hazard("b", "fire", "minor", "citizen_report", true),
            hazard("c", "flood", "severe", "citizen_report", false),
        ];
        let out = filter_hazards(&hazards, &FilterState::default(), &clf(), Utc::now());
        // The unverified citizen report is the only record hidden by default.
        let ids: Vec<&str> = out.records.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(out.summary, FilterSummary { matched: 2, hidden: 1 });
    }

    #[test]
    fn dimensions_combine_with_logical_and() {
        let hazards = vec![
            hazard("a", "flood", "severe", "citizen_report", false),
            hazard("b", "fire", "minor", "gma_news", true),
        ];
        let state = FilterState {
            hazard_types: BTreeSet::from(["flood".to_string()]),
            source_types: BTreeSet::from([SourceCategory::CitizenUnverified]),
            ..FilterState::default()
        };
        let out = filter_hazards(&hazards, &state, &clf(), Utc::now());
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].id, "a");
    }

    #[test]
    fn empty_sets_widen_to_everything() {
        let hazards = vec![
            hazard("a", "flood", "severe", "citizen_report", false),
            hazard("b", "fire", "minor", "gma_news", true),
        ];
        let state = FilterState {
            source_types: BTreeSet::new(),
            ..FilterState::default()
        };
        let out = filter_hazards(&hazards, &state, &clf(), Utc::now());
        assert_eq!(out.summary.matched, 2);
        assert_eq!(out.summary.hidden, 0);
    }

    #[test]
    fn relative_window_is_evaluated_against_now() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let mut recent = hazard("recent", "flood", "severe", "gma_news", true);
        recent.created_at = now - Duration::hours(1);
        let mut stale = hazard("stale", "flood", "severe", "gma_news", true);
        stale.created_at = now - Duration::days(8);

        let state = FilterState {
            time_window: TimeWindow::Last7d,
            ..FilterState::default()
        };
        let hazards = [recent, stale];
        let out = filter_hazards(&hazards, &state, &clf(), now);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].id, "recent");
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let mut edge = hazard("edge", "flood", "severe", "gma_news", true);
        edge.created_at = now - Duration::days(7);

        let state = FilterState {
            time_window: TimeWindow::Last7d,
            ..FilterState::default()
        };
        let hazards = [edge];
        let out = filter_hazards(&hazards, &state, &clf(), now);
        assert_eq!(out.summary.matched, 1);
    }

    #[test]
    fn severity_set_restricts_matches() {
        let hazards = vec![
            hazard("a", "flood", "severe", "gma_news", true),
            hazard("b", "flood", "minor", "gma_news", true),
        ];
        let state = FilterState {
            severities: BTreeSet::from(["severe".to_string()]),
            ..FilterState::default()
        };
        let out = filter_hazards(&hazards, &state, &clf(), Utc::now());
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].id, "a");
    }
}
