//! Reporting date window substituted into `{since}` / `{until}`.

use chrono::{Days, NaiveDate};

use crate::ports::Clock;

/// Days covered by a digest when the catalog does not say otherwise.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// A closed range of calendar days ending today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    /// First day of the window.
    pub since: NaiveDate,
    /// Last day of the window.
    pub until: NaiveDate,
}

impl ReportWindow {
    /// The `days`-long window ending on `until`.
    #[must_use]
    pub fn ending(until: NaiveDate, days: u32) -> Self {
        let since = until.checked_sub_days(Days::new(u64::from(days))).unwrap_or(NaiveDate::MIN);
        Self { since, until }
    }

    /// The `days`-long window ending on the clock's current (UTC) date.
    #[must_use]
    pub fn from_clock(clock: &dyn Clock, days: u32) -> Self {
        Self::ending(clock.now().date_naive(), days)
    }
}
