use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{
    Budget, BudgetId, Category, DateWindow, Period, Transaction, TransactionId, TransactionType,
    User, UserId,
};

use super::{MIGRATION_001_INITIAL, MIGRATION_002_BUDGETS};

const TRANSACTION_COLUMNS: &str =
    "id, user_id, amount_cents, kind, category, description, date, created_at";
const BUDGET_COLUMNS: &str =
    "id, user_id, category, amount_cents, period, notifications, threshold, created_at, updated_at";

/// Repository for persisting and querying users, transactions and budgets.
/// The aggregation core never writes through this type from its read paths.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        sqlx::query(MIGRATION_002_BUDGETS)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 002")?;

        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // User operations
    // ========================

    /// Save a new user.
    pub async fn save_user(&self, user: &User) -> Result<()> {
        sqlx::query("INSERT INTO users (id, name, email, created_at) VALUES (?, ?, ?, ?)")
            .bind(user.id.to_string())
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .context("Failed to save user")?;
        Ok(())
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, email, created_at FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// Get a user by email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, email, created_at FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user by email")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// List all users, ordered by email.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT id, name, email, created_at FROM users ORDER BY email")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list users")?;

        rows.iter().map(Self::row_to_user).collect()
    }

    // ========================
    // Transaction operations
    // ========================

    /// Save a new transaction.
    pub async fn save_transaction(&self, tx: &Transaction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, user_id, amount_cents, kind, category, description, date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(tx.id.to_string())
        .bind(tx.user_id.to_string())
        .bind(tx.amount_cents)
        .bind(tx.kind.as_str())
        .bind(tx.category.as_str())
        .bind(&tx.description)
        .bind(tx.date.to_rfc3339())
        .bind(tx.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save transaction")?;
        Ok(())
    }

    /// Get a transaction by ID, scoped to its owner.
    pub async fn get_transaction(
        &self,
        id: TransactionId,
        user_id: UserId,
    ) -> Result<Option<Transaction>> {
        let query = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ? AND user_id = ?"
        );
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch transaction")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_transaction(&row)?)),
            None => Ok(None),
        }
    }

    /// Rewrite an existing transaction.
    pub async fn update_transaction(&self, tx: &Transaction) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE transactions
            SET amount_cents = ?, kind = ?, category = ?, description = ?, date = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(tx.amount_cents)
        .bind(tx.kind.as_str())
        .bind(tx.category.as_str())
        .bind(&tx.description)
        .bind(tx.date.to_rfc3339())
        .bind(tx.id.to_string())
        .bind(tx.user_id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update transaction")?;
        Ok(())
    }

    /// Delete a transaction by ID+owner. Returns whether a row was removed.
    pub async fn delete_transaction(&self, id: TransactionId, user_id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete transaction")?;
        Ok(result.rows_affected() > 0)
    }

    /// List a user's transactions with optional filters, newest first.
    pub async fn list_transactions_filtered(
        &self,
        user_id: UserId,
        kind: Option<TransactionType>,
        category: Option<Category>,
        from_date: Option<DateTime<Utc>>,
        to_date: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<Transaction>> {
        // Build query dynamically based on filters
        let mut query =
            format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE user_id = ?");

        let from_date_str = from_date.map(|dt| dt.to_rfc3339());
        let to_date_str = to_date.map(|dt| dt.to_rfc3339());

        if kind.is_some() {
            query.push_str(" AND kind = ?");
        }
        if category.is_some() {
            query.push_str(" AND category = ?");
        }
        if from_date.is_some() {
            query.push_str(" AND date >= ?");
        }
        if to_date.is_some() {
            query.push_str(" AND date <= ?");
        }

        query.push_str(" ORDER BY date DESC");

        if let Some(lim) = limit {
            query.push_str(&format!(" LIMIT {}", lim));
        }

        let mut sql_query = sqlx::query(&query).bind(user_id.to_string());

        if let Some(kind) = kind {
            sql_query = sql_query.bind(kind.as_str());
        }
        if let Some(category) = category {
            sql_query = sql_query.bind(category.as_str());
        }
        if let Some(ref fd_str) = from_date_str {
            sql_query = sql_query.bind(fd_str);
        }
        if let Some(ref td_str) = to_date_str {
            sql_query = sql_query.bind(td_str);
        }

        let rows = sql_query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list filtered transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Fetch a user's transactions inside a window (inclusive both ends),
    /// oldest first. This is the query the aggregation core runs on.
    pub async fn find_by_user_and_window(
        &self,
        user_id: UserId,
        window: &DateWindow,
    ) -> Result<Vec<Transaction>> {
        let query = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions
             WHERE user_id = ? AND date >= ? AND date <= ?
             ORDER BY date"
        );
        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(window.start.to_rfc3339())
            .bind(window.end.to_rfc3339())
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch transactions for window")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    // ========================
    // Budget operations
    // ========================

    /// Save a new budget.
    pub async fn save_budget(&self, budget: &Budget) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO budgets (id, user_id, category, amount_cents, period, notifications, threshold, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(budget.id.to_string())
        .bind(budget.user_id.to_string())
        .bind(budget.category.as_str())
        .bind(budget.amount_cents)
        .bind(budget.period.as_str())
        .bind(budget.notifications)
        .bind(budget.threshold)
        .bind(budget.created_at.to_rfc3339())
        .bind(budget.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save budget")?;
        Ok(())
    }

    /// Rewrite an existing budget.
    pub async fn update_budget(&self, budget: &Budget) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE budgets
            SET amount_cents = ?, period = ?, notifications = ?, threshold = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(budget.amount_cents)
        .bind(budget.period.as_str())
        .bind(budget.notifications)
        .bind(budget.threshold)
        .bind(budget.updated_at.to_rfc3339())
        .bind(budget.id.to_string())
        .bind(budget.user_id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update budget")?;
        Ok(())
    }

    /// Get a budget by ID, scoped to its owner.
    pub async fn get_budget(&self, id: BudgetId, user_id: UserId) -> Result<Option<Budget>> {
        let query = format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE id = ? AND user_id = ?");
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch budget")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_budget(&row)?)),
            None => Ok(None),
        }
    }

    /// Get a user's budget for one category, if any.
    pub async fn get_budget_by_category(
        &self,
        user_id: UserId,
        category: Category,
    ) -> Result<Option<Budget>> {
        let query =
            format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE user_id = ? AND category = ?");
        let row = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(category.as_str())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch budget by category")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_budget(&row)?)),
            None => Ok(None),
        }
    }

    /// List a user's budgets, ordered by category.
    pub async fn list_budgets(&self, user_id: UserId) -> Result<Vec<Budget>> {
        let query = format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE user_id = ? ORDER BY category");
        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list budgets")?;

        rows.iter().map(Self::row_to_budget).collect()
    }

    /// List every notification-enabled budget across all users.
    /// Used by the threshold sweep.
    pub async fn list_budgets_with_notifications(&self) -> Result<Vec<Budget>> {
        let query = format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets WHERE notifications = 1 ORDER BY user_id, category"
        );
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list budgets with notifications")?;

        rows.iter().map(Self::row_to_budget).collect()
    }

    /// Delete a budget by ID+owner. Returns whether a row was removed.
    pub async fn delete_budget(&self, id: BudgetId, user_id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete budget")?;
        Ok(result.rows_affected() > 0)
    }

    // ========================
    // Row mappers
    // ========================

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
        let id_str: String = row.get("id");
        let created_at_str: String = row.get("created_at");

        Ok(User {
            id: Uuid::parse_str(&id_str).context("Invalid user ID")?,
            name: row.get("name"),
            email: row.get("email"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        let id_str: String = row.get("id");
        let user_id_str: String = row.get("user_id");
        let kind_str: String = row.get("kind");
        let category_str: String = row.get("category");
        let date_str: String = row.get("date");
        let created_at_str: String = row.get("created_at");

        Ok(Transaction {
            id: Uuid::parse_str(&id_str).context("Invalid transaction ID")?,
            user_id: Uuid::parse_str(&user_id_str).context("Invalid user ID")?,
            amount_cents: row.get("amount_cents"),
            kind: TransactionType::from_str(&kind_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid transaction type: {}", kind_str))?,
            category: Category::from_str(&category_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid category: {}", category_str))?,
            description: row.get("description"),
            date: DateTime::parse_from_rfc3339(&date_str)
                .context("Invalid date timestamp")?
                .with_timezone(&Utc),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    fn row_to_budget(row: &sqlx::sqlite::SqliteRow) -> Result<Budget> {
        let id_str: String = row.get("id");
        let user_id_str: String = row.get("user_id");
        let category_str: String = row.get("category");
        let period_str: String = row.get("period");
        let created_at_str: String = row.get("created_at");
        let updated_at_str: String = row.get("updated_at");

        Ok(Budget {
            id: Uuid::parse_str(&id_str).context("Invalid budget ID")?,
            user_id: Uuid::parse_str(&user_id_str).context("Invalid user ID")?,
            category: Category::from_str(&category_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid category: {}", category_str))?,
            amount_cents: row.get("amount_cents"),
            period: Period::from_str(&period_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid period: {}", period_str))?,
            notifications: row.get::<i32, _>("notifications") != 0,
            threshold: row.get("threshold"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
                .context("Invalid updated_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}
