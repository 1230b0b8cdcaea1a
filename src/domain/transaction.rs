use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, Cents, TransactionType, UserId};

pub type TransactionId = Uuid;

/// A single dated income or expense record owned by one user.
/// Amounts are always positive; the type carries the sign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Owning user
    pub user_id: UserId,
    /// Amount in cents (always positive)
    pub amount_cents: Cents,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Must be valid for `kind`
    pub category: Category,
    pub description: Option<String>,
    /// When the transaction occurred in the real world
    pub date: DateTime<Utc>,
    /// When we recorded it in the system
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction dated `date`.
    pub fn new(
        user_id: UserId,
        amount_cents: Cents,
        kind: TransactionType,
        category: Category,
        date: DateTime<Utc>,
    ) -> Self {
        assert!(amount_cents > 0, "Transaction amount must be positive");
        Self {
            id: Uuid::new_v4(),
            user_id,
            amount_cents,
            kind,
            category,
            description: None,
            date,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
