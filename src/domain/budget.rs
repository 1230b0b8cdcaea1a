use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, Cents, DateWindow, UserId};

pub type BudgetId = Uuid;

/// How far back a budget's spending window reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Weekly,
    Monthly,
    Yearly,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Yearly => "yearly",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "weekly" => Some(Period::Weekly),
            "monthly" => Some(Period::Monthly),
            "yearly" => Some(Period::Yearly),
            _ => None,
        }
    }

    /// The rolling window ending at `now`: the trailing 7 days, 1 month or
    /// 1 year. Not calendar-aligned; calendar windows are a separate policy
    /// (see [`DateWindow::calendar_month`]).
    pub fn rolling_window(&self, now: DateTime<Utc>) -> DateWindow {
        match self {
            Period::Weekly => DateWindow::trailing_days(7, now),
            Period::Monthly => DateWindow::trailing_months(1, now),
            Period::Yearly => DateWindow::trailing_months(12, now),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A spending cap for one expense category, owned by one user.
/// At most one budget exists per (user, category) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,
    pub user_id: UserId,
    pub category: Category,
    /// Cap in cents (always positive)
    pub amount_cents: Cents,
    pub period: Period,
    /// Whether threshold alerts should be dispatched for this budget
    pub notifications: bool,
    /// Percentage of the cap at which an alert becomes eligible
    pub threshold: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const DEFAULT_THRESHOLD: f64 = 80.0;

impl Budget {
    pub fn new(user_id: UserId, category: Category, amount_cents: Cents, period: Period) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            category,
            amount_cents,
            period,
            notifications: true,
            threshold: DEFAULT_THRESHOLD,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_notifications(mut self, notifications: bool) -> Self {
        self.notifications = notifications;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// The window this budget's spending is measured over, ending at `now`.
    pub fn current_window(&self, now: DateTime<Utc>) -> DateWindow {
        self.period.rolling_window(now)
    }
}
