//! Budget evaluation: spent/remaining/percentage per budget, and the
//! threshold predicate used by the alert sweep.

use serde::{Deserialize, Serialize};

use crate::domain::{Budget, Category, Cents, DateWindow, Transaction};

use super::aggregate::category_spend;

/// Consumption of one budget inside its window. `remaining` goes negative on
/// overspend; that is valid data, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetProgress {
    pub category: Category,
    pub budget_amount: Cents,
    pub spent: Cents,
    pub remaining: Cents,
    /// Percentage of the cap consumed, rounded to 2 decimal places
    pub percentage: f64,
}

/// Percentage of `amount` consumed by `spent`, rounded to 2 decimal places.
/// A non-positive amount yields 0.0; budget creation rejects such amounts,
/// so this only guards against data written outside the service.
pub fn budget_percentage(spent: Cents, amount: Cents) -> f64 {
    if amount <= 0 {
        return 0.0;
    }
    let raw = spent as f64 / amount as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Measure one budget against the expense transactions inside `window`.
pub fn evaluate_budget(
    budget: &Budget,
    transactions: &[Transaction],
    window: &DateWindow,
) -> BudgetProgress {
    let spent = category_spend(transactions, budget.category, window);
    BudgetProgress {
        category: budget.category,
        budget_amount: budget.amount_cents,
        spent,
        remaining: budget.amount_cents - spent,
        percentage: budget_percentage(spent, budget.amount_cents),
    }
}

/// Whether this budget's consumption makes it eligible for an alert.
/// Dispatch is the notifier's job; nothing here suppresses repeats.
pub fn alert_eligible(budget: &Budget, progress: &BudgetProgress) -> bool {
    budget.notifications && progress.percentage >= budget.threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Period, TransactionType};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn march() -> DateWindow {
        DateWindow::calendar_month(2024, 3).unwrap()
    }

    fn expense(amount: Cents, category: Category, day: u32) -> Transaction {
        Transaction::new(
            Uuid::nil(),
            amount,
            TransactionType::Expense,
            category,
            Utc.with_ymd_and_hms(2024, 3, day, 10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_percentage_rounds_to_two_places() {
        assert_eq!(budget_percentage(4500, 5000), 90.0);
        assert_eq!(budget_percentage(1000, 30000), 3.33);
        assert_eq!(budget_percentage(2000, 30000), 6.67);
    }

    #[test]
    fn test_percentage_guards_zero_amount() {
        assert_eq!(budget_percentage(4500, 0), 0.0);
        assert_eq!(budget_percentage(4500, -100), 0.0);
    }

    #[test]
    fn test_percentage_monotone_in_spent() {
        let mut last = 0.0;
        for spent in (0..=10000).step_by(250) {
            let pct = budget_percentage(spent, 7300);
            assert!(pct >= last);
            last = pct;
        }
    }

    #[test]
    fn test_evaluate_budget_threshold_scenario() {
        // budget {food, 50.00, threshold 80}, spent 45.00 -> 90.00%, eligible
        let budget = Budget::new(Uuid::nil(), Category::Food, 5000, Period::Monthly);
        let txs = vec![expense(4500, Category::Food, 10)];

        let progress = evaluate_budget(&budget, &txs, &march());
        assert_eq!(progress.spent, 4500);
        assert_eq!(progress.remaining, 500);
        assert_eq!(progress.percentage, 90.0);
        assert!(alert_eligible(&budget, &progress));
    }

    #[test]
    fn test_overspend_goes_negative() {
        let budget = Budget::new(Uuid::nil(), Category::Food, 5000, Period::Monthly);
        let txs = vec![expense(8000, Category::Food, 5)];

        let progress = evaluate_budget(&budget, &txs, &march());
        assert_eq!(progress.remaining, -3000);
        assert_eq!(progress.percentage, 160.0);
    }

    #[test]
    fn test_notifications_off_is_never_eligible() {
        let budget = Budget::new(Uuid::nil(), Category::Food, 5000, Period::Monthly)
            .with_notifications(false);
        let txs = vec![expense(5000, Category::Food, 5)];

        let progress = evaluate_budget(&budget, &txs, &march());
        assert_eq!(progress.percentage, 100.0);
        assert!(!alert_eligible(&budget, &progress));
    }

    #[test]
    fn test_below_threshold_not_eligible() {
        let budget = Budget::new(Uuid::nil(), Category::Food, 10000, Period::Monthly);
        let txs = vec![expense(4500, Category::Food, 5)];

        let progress = evaluate_budget(&budget, &txs, &march());
        assert_eq!(progress.percentage, 45.0);
        assert!(!alert_eligible(&budget, &progress));
    }
}
