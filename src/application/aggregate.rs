//! Grouped sums, counts and averages over transaction collections.
//!
//! Everything here is a pure function of its inputs: callers fetch the
//! owner-filtered transactions from the store and hand them in together with
//! the window. Empty input yields empty output, never an error.

use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::domain::{Category, Cents, DateWindow, Transaction, TransactionType};

/// One grouped aggregation result. The key is a type name, a category name,
/// or a `"YYYY-MM"` label depending on the grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateBucket {
    pub key: String,
    pub total: Cents,
    pub count: i64,
    pub average: Cents,
}

/// Grouping key for [`aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Type,
    Category,
}

/// Group the transactions falling inside `window` (inclusive both ends),
/// optionally restricted to one transaction type, and sum per group.
///
/// Category buckets are ranked by total descending; ties keep first-seen
/// input order. `limit` truncates the ranked sequence. Type buckets stay in
/// first-seen order.
pub fn aggregate(
    transactions: &[Transaction],
    window: &DateWindow,
    group_by: GroupBy,
    kind: Option<TransactionType>,
    limit: Option<usize>,
) -> Vec<AggregateBucket> {
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, (Cents, i64)> = HashMap::new();

    for tx in transactions {
        if !window.contains(tx.date) {
            continue;
        }
        if kind.is_some_and(|k| tx.kind != k) {
            continue;
        }

        let key = match group_by {
            GroupBy::Type => tx.kind.as_str().to_string(),
            GroupBy::Category => tx.category.as_str().to_string(),
        };

        let entry = sums.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            (0, 0)
        });
        entry.0 += tx.amount_cents;
        entry.1 += 1;
    }

    let mut buckets: Vec<AggregateBucket> = order
        .into_iter()
        .map(|key| {
            let (total, count) = sums[&key];
            AggregateBucket {
                key,
                total,
                count,
                average: total / count,
            }
        })
        .collect();

    if group_by == GroupBy::Category {
        // Vec::sort_by is stable, so ties keep input order
        buckets.sort_by(|a, b| b.total.cmp(&a.total));
    }

    if let Some(limit) = limit {
        buckets.truncate(limit);
    }

    buckets
}

/// One month of the trend series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    /// Canonical `"YYYY-MM"` label
    pub period: String,
    pub total: Cents,
    pub count: i64,
}

/// Group the transactions inside `window` by the (year, month) of their date,
/// ascending. Used for trend series.
pub fn monthly_totals(
    transactions: &[Transaction],
    window: &DateWindow,
    kind: Option<TransactionType>,
) -> Vec<MonthlyBucket> {
    let mut months: BTreeMap<(i32, u32), (Cents, i64)> = BTreeMap::new();

    for tx in transactions {
        if !window.contains(tx.date) {
            continue;
        }
        if kind.is_some_and(|k| tx.kind != k) {
            continue;
        }

        let entry = months.entry((tx.date.year(), tx.date.month())).or_insert((0, 0));
        entry.0 += tx.amount_cents;
        entry.1 += 1;
    }

    months
        .into_iter()
        .map(|((year, month), (total, count))| MonthlyBucket {
            period: format!("{year:04}-{month:02}"),
            total,
            count,
        })
        .collect()
}

/// Sum of expense transactions for one category inside `window`.
pub fn category_spend(
    transactions: &[Transaction],
    category: Category,
    window: &DateWindow,
) -> Cents {
    transactions
        .iter()
        .filter(|tx| {
            tx.kind == TransactionType::Expense
                && tx.category == category
                && window.contains(tx.date)
        })
        .map(|tx| tx.amount_cents)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn tx(amount: Cents, kind: TransactionType, category: Category, day: u32) -> Transaction {
        Transaction::new(
            Uuid::nil(),
            amount,
            kind,
            category,
            Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
        )
    }

    fn march() -> DateWindow {
        DateWindow::calendar_month(2024, 3).unwrap()
    }

    #[test]
    fn test_aggregate_by_type() {
        let txs = vec![
            tx(10000, TransactionType::Income, Category::Salary, 5),
            tx(4000, TransactionType::Expense, Category::Food, 10),
            tx(2000, TransactionType::Expense, Category::Food, 12),
        ];

        let buckets = aggregate(&txs, &march(), GroupBy::Type, None, None);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].key, "income");
        assert_eq!(buckets[0].total, 10000);
        assert_eq!(buckets[1].key, "expense");
        assert_eq!(buckets[1].total, 6000);
        assert_eq!(buckets[1].count, 2);
        assert_eq!(buckets[1].average, 3000);
    }

    #[test]
    fn test_aggregate_by_category_ranks_descending() {
        let txs = vec![
            tx(1000, TransactionType::Expense, Category::Food, 1),
            tx(9000, TransactionType::Expense, Category::Shopping, 2),
            tx(5000, TransactionType::Expense, Category::Transportation, 3),
        ];

        let buckets = aggregate(
            &txs,
            &march(),
            GroupBy::Category,
            Some(TransactionType::Expense),
            None,
        );
        let keys: Vec<&str> = buckets.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, ["shopping", "transportation", "food"]);
    }

    #[test]
    fn test_aggregate_limit_truncates() {
        let txs = vec![
            tx(1000, TransactionType::Expense, Category::Food, 1),
            tx(9000, TransactionType::Expense, Category::Shopping, 2),
            tx(5000, TransactionType::Expense, Category::Transportation, 3),
        ];

        let buckets = aggregate(
            &txs,
            &march(),
            GroupBy::Category,
            Some(TransactionType::Expense),
            Some(2),
        );
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].key, "shopping");
    }

    #[test]
    fn test_aggregate_ties_keep_input_order() {
        let txs = vec![
            tx(5000, TransactionType::Expense, Category::Utilities, 1),
            tx(5000, TransactionType::Expense, Category::Food, 2),
        ];

        let buckets = aggregate(
            &txs,
            &march(),
            GroupBy::Category,
            Some(TransactionType::Expense),
            None,
        );
        assert_eq!(buckets[0].key, "utilities");
        assert_eq!(buckets[1].key, "food");
    }

    #[test]
    fn test_aggregate_empty_is_empty() {
        let buckets = aggregate(&[], &march(), GroupBy::Category, None, None);
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_aggregate_window_is_inclusive() {
        let window = march();
        let mut on_start = tx(100, TransactionType::Expense, Category::Food, 1);
        on_start.date = window.start;
        let mut on_end = tx(200, TransactionType::Expense, Category::Food, 1);
        on_end.date = window.end;
        let mut outside = tx(400, TransactionType::Expense, Category::Food, 1);
        outside.date = window.end + chrono::Duration::seconds(1);

        let buckets = aggregate(
            &[on_start, on_end, outside],
            &window,
            GroupBy::Category,
            None,
            None,
        );
        assert_eq!(buckets[0].total, 300);
    }

    #[test]
    fn test_monthly_totals_ascending_labels() {
        let jan = Transaction::new(
            Uuid::nil(),
            3000,
            TransactionType::Expense,
            Category::Food,
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
        );
        let mar_a = tx(1000, TransactionType::Expense, Category::Food, 2);
        let mar_b = tx(2000, TransactionType::Expense, Category::Shopping, 20);

        let window = DateWindow {
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap(),
        };
        let series = monthly_totals(&[mar_a, jan, mar_b], &window, Some(TransactionType::Expense));

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].period, "2024-01");
        assert_eq!(series[0].total, 3000);
        assert_eq!(series[1].period, "2024-03");
        assert_eq!(series[1].total, 3000);
        assert_eq!(series[1].count, 2);
    }

    #[test]
    fn test_category_spend_ignores_income_and_other_categories() {
        let txs = vec![
            tx(4000, TransactionType::Expense, Category::Food, 10),
            tx(2500, TransactionType::Expense, Category::Shopping, 11),
            tx(10000, TransactionType::Income, Category::Salary, 12),
        ];
        assert_eq!(category_spend(&txs, Category::Food, &march()), 4000);
    }
}
