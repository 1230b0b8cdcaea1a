use chrono::{DateTime, Datelike, Utc};
use tracing::{debug, info};

use crate::domain::{
    Budget, BudgetId, Category, Cents, DateWindow, Period, Transaction, TransactionId,
    TransactionType, User, UserId, DEFAULT_THRESHOLD,
};
use crate::io::export::{write_transactions_csv, CsvLayout};
use crate::storage::Repository;

use super::budgets::{alert_eligible, evaluate_budget, BudgetProgress};
use super::notify::Notifier;
use super::params::{
    parse_date_param, parse_month_param, parse_months_param, parse_year_param,
};
use super::reporting::{
    build_monthly_email_report, build_monthly_summary, build_saving_suggestions,
    build_spending_trend, MonthlySummary, SavingSuggestions, SpendingTrend, SuggestionCatalog,
};
use super::AppError;

/// Application service providing high-level operations for the tracker.
/// This is the primary interface for any client (CLI, API, scheduler, etc.).
pub struct TrackerService {
    repo: Repository,
}

/// Input for creating a transaction. The date defaults to now when omitted.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub amount_cents: Cents,
    pub kind: TransactionType,
    pub category: Category,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// Partial transaction update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub amount_cents: Option<Cents>,
    pub kind: Option<TransactionType>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// Filter for querying transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
    pub category: Option<Category>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

/// Input for creating or replacing a budget.
#[derive(Debug, Clone)]
pub struct BudgetDraft {
    pub category: Category,
    pub amount_cents: Cents,
    pub period: Period,
    pub notifications: bool,
    pub threshold: f64,
}

impl BudgetDraft {
    pub fn new(category: Category, amount_cents: Cents) -> Self {
        Self {
            category,
            amount_cents,
            period: Period::Monthly,
            notifications: true,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Partial budget update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct BudgetUpdate {
    pub amount_cents: Option<Cents>,
    pub period: Option<Period>,
    pub notifications: Option<bool>,
    pub threshold: Option<f64>,
}

/// A budget together with its consumption over its own rolling window.
#[derive(Debug, Clone)]
pub struct BudgetStatus {
    pub budget: Budget,
    pub progress: BudgetProgress,
}

/// Record of one alert dispatched by the threshold sweep.
#[derive(Debug, Clone)]
pub struct BudgetAlert {
    pub email: String,
    pub category: Category,
    pub percentage: f64,
}

impl TrackerService {
    /// Create a new tracker service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // User operations
    // ========================

    /// Register a new user.
    pub async fn create_user(&self, name: String, email: String) -> Result<User, AppError> {
        if self.repo.get_user_by_email(&email).await?.is_some() {
            return Err(AppError::UserAlreadyExists(email));
        }

        let user = User::new(name, email);
        self.repo.save_user(&user).await?;
        Ok(user)
    }

    /// Get a user by email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<User, AppError> {
        self.repo
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::UserNotFound(email.to_string()))
    }

    /// List all users.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.repo.list_users().await?)
    }

    // ========================
    // Transaction operations
    // ========================

    /// Record a new transaction.
    pub async fn add_transaction(
        &self,
        user_id: UserId,
        input: NewTransaction,
    ) -> Result<Transaction, AppError> {
        if input.amount_cents <= 0 {
            return Err(AppError::InvalidAmount(
                "Amount must be positive".to_string(),
            ));
        }
        if !input.category.valid_for(input.kind) {
            return Err(AppError::InvalidFilter(format!(
                "category '{}' is not valid for {} transactions",
                input.category, input.kind
            )));
        }

        let mut tx = Transaction::new(
            user_id,
            input.amount_cents,
            input.kind,
            input.category,
            input.date.unwrap_or_else(Utc::now),
        );
        if let Some(description) = input.description {
            tx = tx.with_description(description);
        }

        self.repo.save_transaction(&tx).await?;
        Ok(tx)
    }

    /// Get a transaction by id, scoped to its owner.
    pub async fn get_transaction(
        &self,
        user_id: UserId,
        id: TransactionId,
    ) -> Result<Transaction, AppError> {
        self.repo
            .get_transaction(id, user_id)
            .await?
            .ok_or(AppError::TransactionNotFound(id))
    }

    /// List transactions with filters, newest first.
    pub async fn list_transactions(
        &self,
        user_id: UserId,
        filter: TransactionFilter,
    ) -> Result<Vec<Transaction>, AppError> {
        Ok(self
            .repo
            .list_transactions_filtered(
                user_id,
                filter.kind,
                filter.category,
                filter.start,
                filter.end,
                filter.limit,
            )
            .await?)
    }

    /// Apply a partial update to a transaction.
    pub async fn update_transaction(
        &self,
        user_id: UserId,
        id: TransactionId,
        update: TransactionUpdate,
    ) -> Result<Transaction, AppError> {
        let mut tx = self.get_transaction(user_id, id).await?;

        if let Some(amount) = update.amount_cents {
            if amount <= 0 {
                return Err(AppError::InvalidAmount(
                    "Amount must be positive".to_string(),
                ));
            }
            tx.amount_cents = amount;
        }
        if let Some(kind) = update.kind {
            tx.kind = kind;
        }
        if let Some(category) = update.category {
            tx.category = category;
        }
        if let Some(description) = update.description {
            tx.description = Some(description);
        }
        if let Some(date) = update.date {
            tx.date = date;
        }

        if !tx.category.valid_for(tx.kind) {
            return Err(AppError::InvalidFilter(format!(
                "category '{}' is not valid for {} transactions",
                tx.category, tx.kind
            )));
        }

        self.repo.update_transaction(&tx).await?;
        Ok(tx)
    }

    /// Delete a transaction by id+owner match.
    pub async fn delete_transaction(
        &self,
        user_id: UserId,
        id: TransactionId,
    ) -> Result<(), AppError> {
        if !self.repo.delete_transaction(id, user_id).await? {
            return Err(AppError::TransactionNotFound(id));
        }
        Ok(())
    }

    // ========================
    // Budget operations
    // ========================

    /// Create a budget, or replace the existing one for the same category.
    /// At most one budget exists per (user, category) pair.
    pub async fn upsert_budget(
        &self,
        user_id: UserId,
        draft: BudgetDraft,
    ) -> Result<Budget, AppError> {
        if draft.amount_cents <= 0 {
            return Err(AppError::InvalidAmount(
                "Budget amount must be positive".to_string(),
            ));
        }
        if !draft.category.budgetable() {
            return Err(AppError::InvalidFilter(format!(
                "category '{}' cannot carry a budget",
                draft.category
            )));
        }

        let budget = match self
            .repo
            .get_budget_by_category(user_id, draft.category)
            .await?
        {
            Some(mut existing) => {
                existing.amount_cents = draft.amount_cents;
                existing.period = draft.period;
                existing.notifications = draft.notifications;
                existing.threshold = draft.threshold;
                existing.updated_at = Utc::now();
                self.repo.update_budget(&existing).await?;
                existing
            }
            None => {
                let budget = Budget::new(user_id, draft.category, draft.amount_cents, draft.period)
                    .with_notifications(draft.notifications)
                    .with_threshold(draft.threshold);
                self.repo.save_budget(&budget).await?;
                budget
            }
        };

        Ok(budget)
    }

    /// Get a budget by id, scoped to its owner.
    pub async fn get_budget(&self, user_id: UserId, id: BudgetId) -> Result<Budget, AppError> {
        self.repo
            .get_budget(id, user_id)
            .await?
            .ok_or(AppError::BudgetNotFound(id))
    }

    /// List a user's budgets.
    pub async fn list_budgets(&self, user_id: UserId) -> Result<Vec<Budget>, AppError> {
        Ok(self.repo.list_budgets(user_id).await?)
    }

    /// Apply a partial update to a budget.
    pub async fn update_budget(
        &self,
        user_id: UserId,
        id: BudgetId,
        update: BudgetUpdate,
    ) -> Result<Budget, AppError> {
        let mut budget = self.get_budget(user_id, id).await?;

        if let Some(amount) = update.amount_cents {
            if amount <= 0 {
                return Err(AppError::InvalidAmount(
                    "Budget amount must be positive".to_string(),
                ));
            }
            budget.amount_cents = amount;
        }
        if let Some(period) = update.period {
            budget.period = period;
        }
        if let Some(notifications) = update.notifications {
            budget.notifications = notifications;
        }
        if let Some(threshold) = update.threshold {
            budget.threshold = threshold;
        }
        budget.updated_at = Utc::now();

        self.repo.update_budget(&budget).await?;
        Ok(budget)
    }

    /// Delete a budget by id+owner match.
    pub async fn delete_budget(&self, user_id: UserId, id: BudgetId) -> Result<(), AppError> {
        if !self.repo.delete_budget(id, user_id).await? {
            return Err(AppError::BudgetNotFound(id));
        }
        Ok(())
    }

    /// Every budget of the user with its consumption, each measured over its
    /// own rolling window ending at `now`.
    pub async fn budgets_with_progress(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<BudgetStatus>, AppError> {
        let budgets = self.repo.list_budgets(user_id).await?;
        let mut statuses = Vec::with_capacity(budgets.len());

        for budget in budgets {
            let window = budget.current_window(now);
            let transactions = self.repo.find_by_user_and_window(user_id, &window).await?;
            let progress = evaluate_budget(&budget, &transactions, &window);
            statuses.push(BudgetStatus { budget, progress });
        }

        Ok(statuses)
    }

    // ========================
    // Report operations
    // ========================

    /// Totals and category breakdowns for one calendar month.
    /// `year`/`month` arrive as raw query strings; both default to the
    /// current month.
    pub async fn monthly_summary(
        &self,
        user_id: UserId,
        year: Option<&str>,
        month: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<MonthlySummary, AppError> {
        let year = match year {
            Some(raw) => parse_year_param(raw)?,
            None => now.year(),
        };
        let month = match month {
            Some(raw) => parse_month_param(raw)?,
            None => now.month(),
        };

        let window = DateWindow::calendar_month(year, month)
            .ok_or_else(|| AppError::InvalidDate(format!("{year}-{month}")))?;
        debug!(start = %window.start, end = %window.end, "querying monthly summary");

        let transactions = self.repo.find_by_user_and_window(user_id, &window).await?;
        Ok(build_monthly_summary(&transactions, window))
    }

    /// Monthly expense totals over the trailing `months` months (default 6).
    pub async fn spending_trends(
        &self,
        user_id: UserId,
        months: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<SpendingTrend, AppError> {
        let months = match months {
            Some(raw) => parse_months_param(raw)?,
            None => 6,
        };

        let window = DateWindow::trailing_months(months, now);
        let transactions = self.repo.find_by_user_and_window(user_id, &window).await?;
        Ok(build_spending_trend(&transactions, window))
    }

    /// Top spending categories over the trailing 3 months mapped to advice.
    pub async fn saving_suggestions(
        &self,
        user_id: UserId,
        catalog: &SuggestionCatalog,
        now: DateTime<Utc>,
    ) -> Result<SavingSuggestions, AppError> {
        let window = DateWindow::trailing_months(3, now);
        let transactions = self.repo.find_by_user_and_window(user_id, &window).await?;
        Ok(build_saving_suggestions(&transactions, window, catalog))
    }

    // ========================
    // Export
    // ========================

    /// Export a user's transactions as CSV, newest first. Either date bound
    /// may be omitted; an empty result is an error, not an empty file.
    pub async fn export_transactions_csv(
        &self,
        user_id: UserId,
        start: Option<&str>,
        end: Option<&str>,
        layout: CsvLayout,
    ) -> Result<String, AppError> {
        let start = start.map(parse_date_param).transpose()?;
        let end = end.map(parse_date_param).transpose()?;
        debug!(?start, ?end, ?layout, "export query");

        let transactions = self
            .repo
            .list_transactions_filtered(user_id, None, None, start, end, None)
            .await?;

        write_transactions_csv(&transactions, layout)
    }

    // ========================
    // Batch entry points (invoked by the external scheduler)
    // ========================

    /// Check every notification-enabled budget across all users and dispatch
    /// an alert for each one at or past its threshold. Returns the alerts
    /// dispatched. Repeated invocations within the same window re-alert; the
    /// caller owns idempotence.
    pub async fn check_budget_thresholds<N: Notifier>(
        &self,
        notifier: &N,
        now: DateTime<Utc>,
    ) -> Result<Vec<BudgetAlert>, AppError> {
        info!("running budget threshold checks");
        let budgets = self.repo.list_budgets_with_notifications().await?;
        let mut alerts = Vec::new();

        for budget in budgets {
            let window = budget.current_window(now);
            let transactions = self
                .repo
                .find_by_user_and_window(budget.user_id, &window)
                .await?;
            let progress = evaluate_budget(&budget, &transactions, &window);

            if !alert_eligible(&budget, &progress) {
                continue;
            }

            let Some(user) = self.repo.get_user(budget.user_id).await? else {
                continue;
            };

            notifier
                .budget_alert(
                    &user.email,
                    budget.category,
                    progress.percentage,
                    budget.amount_cents,
                    progress.spent,
                )
                .await
                .map_err(|e| AppError::Notification(e.to_string()))?;

            info!(
                email = %user.email,
                category = %budget.category,
                percentage = progress.percentage,
                "budget alert dispatched"
            );
            alerts.push(BudgetAlert {
                email: user.email,
                category: budget.category,
                percentage: progress.percentage,
            });
        }

        Ok(alerts)
    }

    /// Send every user their report for the previous calendar month, with the
    /// month's transactions attached as CSV. Users with no transactions in
    /// the window are skipped. Returns the emails reported to.
    pub async fn send_monthly_reports<N: Notifier>(
        &self,
        notifier: &N,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, AppError> {
        let window = DateWindow::previous_calendar_month(now);
        info!(start = %window.start, end = %window.end, "running monthly report generation");

        let mut reported = Vec::new();
        for user in self.repo.list_users().await? {
            let transactions = self.repo.find_by_user_and_window(user.id, &window).await?;
            if transactions.is_empty() {
                debug!(email = %user.email, "no transactions last month, skipping report");
                continue;
            }

            let budgets = self.repo.list_budgets(user.id).await?;
            let report = build_monthly_email_report(&transactions, &budgets, window);
            let csv = write_transactions_csv(&transactions, CsvLayout::Report)?;

            notifier
                .monthly_report(&user.email, &user.name, &report, &csv)
                .await
                .map_err(|e| AppError::Notification(e.to_string()))?;

            info!(email = %user.email, "monthly report dispatched");
            reported.push(user.email);
        }

        Ok(reported)
    }
}
