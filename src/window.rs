//! Monday-to-Sunday reporting windows.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::fmt;

/// One reporting week, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportWindow {
    /// The week `weeks_back` weeks before the week containing `today`.
    ///
    /// Offset 0 is the (incomplete) current week, 1 the last complete week.
    pub fn weeks_before(today: NaiveDate, weeks_back: u32) -> Self {
        let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
        let start = monday - Duration::weeks(weeks_back as i64);
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for ReportWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start_str(), self.end_str())
    }
}

/// The two weeks compared by a report run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowPair {
    pub current: ReportWindow,
    pub prior: ReportWindow,
}

impl WindowPair {
    /// Last complete week against the week before it.
    pub fn for_run_date(today: NaiveDate) -> Self {
        Self {
            current: ReportWindow::weeks_before(today, 1),
            prior: ReportWindow::weeks_before(today, 2),
        }
    }
}
