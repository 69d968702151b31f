//! Analysis window resolution
//!
//! Every statistic covers a half-open date interval `[start, end)`. The
//! default report window is the trailing N complete days ending at, but
//! excluding, the as-of date. The as-of date is always an explicit parameter;
//! aggregation logic never consults the ambient clock, which keeps the
//! pipeline deterministic and re-runnable.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// A half-open calendar date interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisWindow {
    /// First day included
    pub start: NaiveDate,
    /// First day excluded
    pub end: NaiveDate,
}

impl AnalysisWindow {
    /// The trailing `days` complete days before `as_of`.
    ///
    /// The as-of day itself is excluded; it is presumed partial.
    pub fn trailing(as_of: NaiveDate, days: u32) -> Self {
        Self {
            start: as_of - Duration::days(days as i64),
            end: as_of,
        }
    }

    /// An explicit `[start, end)` interval.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether `day` falls inside the window.
    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day < self.end
    }

    /// Number of days covered, zero for inverted intervals.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days().max(0)
    }

    /// Iterate the days in the window in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.num_days()).map(move |offset| start + Duration::days(offset))
    }
}

impl std::fmt::Display for AnalysisWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_trailing_excludes_as_of_day() {
        let window = AnalysisWindow::trailing(d("2015-09-09"), 7);
        assert_eq!(window.start, d("2015-09-02"));
        assert_eq!(window.end, d("2015-09-09"));
        assert!(window.contains(d("2015-09-02")));
        assert!(window.contains(d("2015-09-08")));
        assert!(!window.contains(d("2015-09-09")));
        assert!(!window.contains(d("2015-09-01")));
        assert_eq!(window.num_days(), 7);
    }

    #[test]
    fn test_trailing_crosses_month_boundary() {
        let window = AnalysisWindow::trailing(d("2015-09-03"), 7);
        assert_eq!(window.start, d("2015-08-27"));
    }

    #[test]
    fn test_days_iterator_covers_window_in_order() {
        let window = AnalysisWindow::trailing(d("2015-09-05"), 3);
        let days: Vec<NaiveDate> = window.days().collect();
        assert_eq!(days, vec![d("2015-09-02"), d("2015-09-03"), d("2015-09-04")]);
    }

    #[test]
    fn test_display() {
        let window = AnalysisWindow::between(d("2015-09-02"), d("2015-09-09"));
        assert_eq!(window.to_string(), "[2015-09-02, 2015-09-09)");
    }
}
