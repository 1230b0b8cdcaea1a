use thiserror::Error;

use crate::domain::{BudgetId, TransactionId};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("No transactions found for the specified criteria")]
    EmptyExport,

    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    #[error("Budget not found: {0}")]
    BudgetNotFound(BudgetId),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
