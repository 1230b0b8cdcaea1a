use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// An inclusive date interval used to filter transactions.
///
/// Two windowing policies produce these and both are kept deliberately:
/// rolling windows computed backward from "now" ([`super::Period::rolling_window`])
/// and calendar windows aligned to month boundaries ([`DateWindow::calendar_month`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// Inclusive on both ends.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }

    /// The calendar window for one month: first instant of the month through
    /// the last day at 23:59:59 UTC. Returns `None` for an invalid year/month.
    pub fn calendar_month(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_month = first.checked_add_months(Months::new(1))?;
        let last = next_month.pred_opt()?;

        Some(Self {
            start: first.and_hms_opt(0, 0, 0)?.and_utc(),
            end: last.and_hms_opt(23, 59, 59)?.and_utc(),
        })
    }

    /// The calendar window for the month before the one containing `now`.
    /// Used by the monthly report sweep.
    pub fn previous_calendar_month(now: DateTime<Utc>) -> Self {
        let last_month = now
            .checked_sub_months(Months::new(1))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        // Always valid for an in-range year/month
        Self::calendar_month(last_month.year(), last_month.month())
            .expect("month arithmetic stays in range")
    }

    /// The rolling window covering the trailing `months` months, ending at `now`.
    /// Used by trend and suggestion reports.
    pub fn trailing_months(months: u32, now: DateTime<Utc>) -> Self {
        let start = now
            .checked_sub_months(Months::new(months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { start, end: now }
    }

    /// The trailing 7 days, ending at `now`.
    pub fn trailing_days(days: i64, now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::days(days),
            end: now,
        }
    }
}
