//! # Time-Window Resolver
//! Turns a symbolic time window (or explicit custom range) into a concrete
//! inclusive `[start, end]` pair against a caller-supplied "now".
//!
//! `None` means "no time restriction". Relative windows are recomputed on
//! every call, so results advance as real time passes; nothing is cached.
//! Malformed or missing input degrades to "no restriction", never an error.

use chrono::{DateTime, Duration, Utc};

use crate::state::{DateRange, TimeWindow};

/// Resolve a window to a concrete range. `custom` is consulted only for
/// `TimeWindow::Custom`; a custom window without a complete, ordered range
/// is inert (accepts all instants).
pub fn resolve_window(
    window: TimeWindow,
    custom: Option<&DateRange>,
    now: DateTime<Utc>,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    match window {
        TimeWindow::All => None,
        TimeWindow::Last24h => Some((now - Duration::hours(24), now)),
        TimeWindow::Last7d => Some((now - Duration::days(7), now)),
        TimeWindow::Last30d => Some((now - Duration::days(30), now)),
        TimeWindow::Custom => custom
            .filter(|r| r.is_ordered())
            .map(|r| (r.start, r.end)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn all_means_no_restriction() {
        assert_eq!(resolve_window(TimeWindow::All, None, Utc::now()), None);
    }

    #[test]
    fn relative_windows_anchor_on_now() {
        let now = at(2025, 6, 15);
        let (start, end) = resolve_window(TimeWindow::Last7d, None, now).unwrap();
        assert_eq!(end, now);
        assert_eq!(start, now - Duration::days(7));

        let (start, _) = resolve_window(TimeWindow::Last24h, None, now).unwrap();
        assert_eq!(start, now - Duration::hours(24));
    }

    #[test]
    fn custom_passes_range_through_verbatim() {
        let range = DateRange::new(at(2025, 6, 1), at(2025, 6, 10));
        let resolved = resolve_window(TimeWindow::Custom, Some(&range), Utc::now());
        assert_eq!(resolved, Some((range.start, range.end)));
    }

    #[test]
    fn custom_without_range_is_inert() {
        assert_eq!(resolve_window(TimeWindow::Custom, None, Utc::now()), None);
    }

    #[test]
    fn inverted_custom_range_degrades_to_no_restriction() {
        let range = DateRange::new(at(2025, 6, 10), at(2025, 6, 1));
        assert_eq!(resolve_window(TimeWindow::Custom, Some(&range), Utc::now()), None);
    }
}
