//! Report shapes and their builders: monthly summary, spending trend,
//! saving suggestions, and the monthly email payload.
//!
//! All builders are pure functions of a transaction/budget collection and a
//! window. JSON field names follow the wire shape the HTTP layer exposes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Budget, Category, Cents, DateWindow, Transaction, TransactionType};

use super::aggregate::{self, AggregateBucket, GroupBy, MonthlyBucket};
use super::budgets::{evaluate_budget, BudgetProgress};

/// Income and expense totals for one window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeTotals {
    pub income: Cents,
    pub expense: Cents,
}

/// Totals by type plus per-category breakdowns for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub totals: TypeTotals,
    /// Expense categories, largest first
    pub expenses_by_category: Vec<AggregateBucket>,
    /// Income categories, largest first
    pub income_by_category: Vec<AggregateBucket>,
}

pub fn build_monthly_summary(transactions: &[Transaction], window: DateWindow) -> MonthlySummary {
    let mut totals = TypeTotals::default();
    for bucket in aggregate::aggregate(transactions, &window, GroupBy::Type, None, None) {
        match bucket.key.as_str() {
            "income" => totals.income = bucket.total,
            _ => totals.expense = bucket.total,
        }
    }

    MonthlySummary {
        start_date: window.start,
        end_date: window.end,
        totals,
        expenses_by_category: aggregate::aggregate(
            transactions,
            &window,
            GroupBy::Category,
            Some(TransactionType::Expense),
            None,
        ),
        income_by_category: aggregate::aggregate(
            transactions,
            &window,
            GroupBy::Category,
            Some(TransactionType::Income),
            None,
        ),
    }
}

pub const NO_SPENDING_DATA: &str = "No spending data found for this period";

/// Either the monthly series or the fixed no-data message. The sentinel is
/// deliberately distinct from an empty series so clients keep their
/// human-readable fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrendData {
    Series(Vec<MonthlyBucket>),
    NoData(String),
}

impl TrendData {
    pub fn no_data() -> Self {
        TrendData::NoData(NO_SPENDING_DATA.to_string())
    }
}

/// Monthly expense totals over the trailing N months.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingTrend {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub trends: TrendData,
}

pub fn build_spending_trend(transactions: &[Transaction], window: DateWindow) -> SpendingTrend {
    let series = aggregate::monthly_totals(transactions, &window, Some(TransactionType::Expense));
    SpendingTrend {
        start_date: window.start,
        end_date: window.end,
        trends: if series.is_empty() {
            TrendData::no_data()
        } else {
            TrendData::Series(series)
        },
    }
}

/// Advice and expected savings fraction for one category.
#[derive(Debug, Clone)]
pub struct SuggestionRule {
    pub advice: String,
    pub savings_rate: f64,
}

impl SuggestionRule {
    pub fn new(advice: impl Into<String>, savings_rate: f64) -> Self {
        Self {
            advice: advice.into(),
            savings_rate,
        }
    }
}

/// The category -> advice mapping behind saving suggestions. Swappable so the
/// heuristics can change without touching aggregation logic; unmapped
/// categories get a generic message at [`SuggestionCatalog::FALLBACK_RATE`].
#[derive(Debug, Clone)]
pub struct SuggestionCatalog {
    rules: HashMap<Category, SuggestionRule>,
}

impl SuggestionCatalog {
    pub const FALLBACK_RATE: f64 = 0.15;

    pub fn new(rules: HashMap<Category, SuggestionRule>) -> Self {
        Self { rules }
    }

    pub fn advice_for(&self, category: Category) -> (String, f64) {
        match self.rules.get(&category) {
            Some(rule) => (rule.advice.clone(), rule.savings_rate),
            None => (
                format!("Review your {category} expenses for potential savings"),
                Self::FALLBACK_RATE,
            ),
        }
    }
}

impl Default for SuggestionCatalog {
    fn default() -> Self {
        Self::new(HashMap::from([
            (
                Category::Food,
                SuggestionRule::new("Meal planning and cooking at home could save you 20-30%", 0.25),
            ),
            (
                Category::Entertainment,
                SuggestionRule::new("Reducing paid entertainment by 25% could save money", 0.25),
            ),
            (
                Category::Shopping,
                SuggestionRule::new("Implement a 24-hour waiting period before purchases", 0.3),
            ),
            (
                Category::Transportation,
                SuggestionRule::new("Carpooling or public transit could reduce costs", 0.2),
            ),
        ]))
    }
}

pub const SUGGESTION_TIMEFRAME: &str = "3 months";
pub const NO_EXPENSE_DATA: &str = "No expense data found to generate suggestions";

/// One actionable suggestion for a top spending category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingSuggestion {
    pub category: Category,
    pub total_spent: Cents,
    pub average_per_transaction: Cents,
    pub transaction_count: i64,
    pub suggestion: String,
    pub potential_savings: Cents,
    pub timeframe: String,
}

/// Generic fallback entry returned when the user has no expense history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultSuggestion {
    pub category: Category,
    pub suggestion: String,
    pub potential_savings: Cents,
}

/// Ranked suggestions, or the fixed fallback pair when no expense data exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SavingSuggestions {
    Ranked(Vec<SavingSuggestion>),
    #[serde(rename_all = "camelCase")]
    NoData {
        message: String,
        default_suggestions: Vec<DefaultSuggestion>,
    },
}

impl SavingSuggestions {
    fn fallback() -> Self {
        SavingSuggestions::NoData {
            message: NO_EXPENSE_DATA.to_string(),
            default_suggestions: vec![
                DefaultSuggestion {
                    category: Category::Food,
                    suggestion: "Consider meal planning to reduce food expenses".to_string(),
                    potential_savings: 20000,
                },
                DefaultSuggestion {
                    category: Category::Entertainment,
                    suggestion: "Look for free community events instead of paid entertainment"
                        .to_string(),
                    potential_savings: 15000,
                },
            ],
        }
    }
}

/// Top 3 expense categories inside `window`, each mapped through the catalog.
pub fn build_saving_suggestions(
    transactions: &[Transaction],
    window: DateWindow,
    catalog: &SuggestionCatalog,
) -> SavingSuggestions {
    let top = aggregate::aggregate(
        transactions,
        &window,
        GroupBy::Category,
        Some(TransactionType::Expense),
        Some(3),
    );

    if top.is_empty() {
        return SavingSuggestions::fallback();
    }

    let suggestions = top
        .into_iter()
        .map(|bucket| {
            // Category grouping only emits valid category keys
            let category = Category::from_str(&bucket.key).unwrap_or(Category::Other);
            let (suggestion, rate) = catalog.advice_for(category);
            SavingSuggestion {
                category,
                total_spent: bucket.total,
                average_per_transaction: bucket.average,
                transaction_count: bucket.count,
                suggestion,
                potential_savings: (bucket.total as f64 * rate).round() as Cents,
                timeframe: SUGGESTION_TIMEFRAME.to_string(),
            }
        })
        .collect();

    SavingSuggestions::Ranked(suggestions)
}

/// One entry of the email report's top-expense list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: Cents,
}

/// The payload attached to the monthly report email: last month's totals,
/// top expenses, and budget progress measured over the same calendar window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEmailReport {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_income: Cents,
    pub total_expenses: Cents,
    pub net_savings: Cents,
    pub top_expenses: Vec<CategoryAmount>,
    pub budgets: Vec<BudgetProgress>,
}

pub fn build_monthly_email_report(
    transactions: &[Transaction],
    budgets: &[Budget],
    window: DateWindow,
) -> MonthlyEmailReport {
    let mut totals = TypeTotals::default();
    for bucket in aggregate::aggregate(transactions, &window, GroupBy::Type, None, None) {
        match bucket.key.as_str() {
            "income" => totals.income = bucket.total,
            _ => totals.expense = bucket.total,
        }
    }

    let top_expenses = aggregate::aggregate(
        transactions,
        &window,
        GroupBy::Category,
        Some(TransactionType::Expense),
        Some(3),
    )
    .into_iter()
    .map(|bucket| CategoryAmount {
        category: bucket.key,
        amount: bucket.total,
    })
    .collect();

    // The email sweep measures every budget over the report's calendar month,
    // not the budget's own rolling period.
    let budgets = budgets
        .iter()
        .map(|budget| evaluate_budget(budget, transactions, &window))
        .collect();

    MonthlyEmailReport {
        start_date: window.start,
        end_date: window.end,
        total_income: totals.income,
        total_expenses: totals.expense,
        net_savings: totals.income - totals.expense,
        top_expenses,
        budgets,
    }
}
