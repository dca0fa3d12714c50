//! Demo that walks a filter engine over in-memory stores: update, apply,
//! reset, printing the resulting URL query and match counts.

use chrono::{Duration, Utc};
use gaia_hazard_filters::{
    to_query_string, FilterEngine, FilterPatch, HazardRecord, MemoryLocation, MemoryStore,
    SourceCategory, TimeWindow,
};
use std::collections::BTreeSet;

fn sample(id: &str, kind: &str, severity: &str, source: &str, validated: bool, age_hours: i64) -> HazardRecord {
    HazardRecord {
        id: id.to_string(),
        hazard_type: kind.to_string(),
        severity: severity.to_string(),
        source: source.to_string(),
        validated,
        created_at: Utc::now() - Duration::hours(age_hours),
        location_name: None,
        latitude: None,
        longitude: None,
        confidence: None,
        snippet: None,
    }
}

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let mut engine = FilterEngine::new(MemoryLocation::default(), MemoryStore::default());

    let feed = vec![
        sample("h1", "flood", "severe", "gma_news", true, 2),
        sample("h2", "typhoon", "moderate", "rappler", true, 30),
        sample("h3", "flood", "minor", "citizen_report", false, 5),
        sample("h4", "landslide", "critical", "citizen_report", true, 200),
    ];

    let out = engine.apply(&feed);
    println!(
        "default view: {} shown, {} hidden",
        out.summary.matched, out.summary.hidden
    );

    let state = engine
        .update(FilterPatch {
            hazard_types: Some(BTreeSet::from(["flood".to_string()])),
            time_window: Some(TimeWindow::Last24h),
            source_types: Some(SourceCategory::ALL.into_iter().collect()),
            ..Default::default()
        })
        .expect("valid update");
    println!("updated: {} active filters", state.active_filter_count());

    let out = engine.apply(&feed);
    for h in &out.records {
        println!("  match: {} ({}, {})", h.id, h.hazard_type, h.source);
    }

    // This is what the browser URL bar would show.
    let url = to_query_string(&gaia_hazard_filters::codec::encode_query(&state));
    println!("location: ?{url}");

    engine.reset();
    println!("after reset: default = {}", engine.is_default());
}
