mod common;

use anyhow::Result;
use chrono::{Duration, Utc};
use common::{record, test_service_with_user, RecordingNotifier};
use fintrackr::application::{AppError, BudgetDraft, BudgetUpdate, NewTransaction};
use fintrackr::domain::{Category, Period, TransactionType};

#[tokio::test]
async fn test_upsert_replaces_existing_category_budget() -> Result<()> {
    let (service, user, _temp) = test_service_with_user().await?;

    let first = service
        .upsert_budget(user.id, BudgetDraft::new(Category::Food, 50000))
        .await?;

    let mut draft = BudgetDraft::new(Category::Food, 60000);
    draft.period = Period::Weekly;
    draft.threshold = 90.0;
    let second = service.upsert_budget(user.id, draft).await?;

    // Same identity, new values
    assert_eq!(second.id, first.id);
    assert_eq!(second.amount_cents, 60000);
    assert_eq!(second.period, Period::Weekly);
    assert_eq!(second.threshold, 90.0);

    let budgets = service.list_budgets(user.id).await?;
    assert_eq!(budgets.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_budget_rejects_non_positive_amount() -> Result<()> {
    let (service, user, _temp) = test_service_with_user().await?;

    let result = service
        .upsert_budget(user.id, BudgetDraft::new(Category::Food, 0))
        .await;
    assert!(matches!(result, Err(AppError::InvalidAmount(_))));

    Ok(())
}

#[tokio::test]
async fn test_budget_rejects_non_budgetable_category() -> Result<()> {
    let (service, user, _temp) = test_service_with_user().await?;

    let result = service
        .upsert_budget(user.id, BudgetDraft::new(Category::Salary, 50000))
        .await;
    assert!(matches!(result, Err(AppError::InvalidFilter(_))));

    let result = service
        .upsert_budget(user.id, BudgetDraft::new(Category::Debt, 50000))
        .await;
    assert!(matches!(result, Err(AppError::InvalidFilter(_))));

    Ok(())
}

#[tokio::test]
async fn test_progress_uses_each_budgets_own_period() -> Result<()> {
    let (service, user, _temp) = test_service_with_user().await?;
    let now = Utc::now();

    // Food is capped weekly, shopping monthly
    let mut weekly = BudgetDraft::new(Category::Food, 10000);
    weekly.period = Period::Weekly;
    service.upsert_budget(user.id, weekly).await?;
    service
        .upsert_budget(user.id, BudgetDraft::new(Category::Shopping, 10000))
        .await?;

    // Twenty days ago: outside the weekly window, inside the monthly one
    let twenty_days_ago = now - Duration::days(20);
    for (category, amount) in [(Category::Food, 3000), (Category::Shopping, 4000)] {
        service
            .add_transaction(
                user.id,
                NewTransaction {
                    amount_cents: amount,
                    kind: TransactionType::Expense,
                    category,
                    description: None,
                    date: Some(twenty_days_ago),
                },
            )
            .await?;
    }

    let statuses = service.budgets_with_progress(user.id, now).await?;
    assert_eq!(statuses.len(), 2);

    let food = statuses
        .iter()
        .find(|s| s.budget.category == Category::Food)
        .unwrap();
    let shopping = statuses
        .iter()
        .find(|s| s.budget.category == Category::Shopping)
        .unwrap();

    assert_eq!(food.progress.spent, 0);
    assert_eq!(shopping.progress.spent, 4000);
    assert_eq!(shopping.progress.percentage, 40.0);
    assert_eq!(shopping.progress.remaining, 6000);

    Ok(())
}

#[tokio::test]
async fn test_threshold_sweep_dispatches_alerts() -> Result<()> {
    let (service, user, _temp) = test_service_with_user().await?;
    let now = Utc::now();

    // budget {food, 50.00, threshold 80}, spent 45.00 -> 90% -> alert
    service
        .upsert_budget(user.id, BudgetDraft::new(Category::Food, 5000))
        .await?;
    // shopping stays below its threshold -> no alert
    service
        .upsert_budget(user.id, BudgetDraft::new(Category::Shopping, 10000))
        .await?;

    let yesterday = now - Duration::days(1);
    for (category, amount) in [(Category::Food, 4500), (Category::Shopping, 1000)] {
        service
            .add_transaction(
                user.id,
                NewTransaction {
                    amount_cents: amount,
                    kind: TransactionType::Expense,
                    category,
                    description: None,
                    date: Some(yesterday),
                },
            )
            .await?;
    }

    let notifier = RecordingNotifier::default();
    let alerts = service.check_budget_thresholds(&notifier, now).await?;

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].category, Category::Food);
    assert_eq!(alerts[0].percentage, 90.0);
    assert_eq!(alerts[0].email, "ada@example.com");

    let dispatched = notifier.alerts.lock().unwrap();
    assert_eq!(dispatched.len(), 1);
    let (email, category, percentage, budget_amount, spent) = &dispatched[0];
    assert_eq!(email, "ada@example.com");
    assert_eq!(*category, Category::Food);
    assert_eq!(*percentage, 90.0);
    assert_eq!(*budget_amount, 5000);
    assert_eq!(*spent, 4500);

    Ok(())
}

#[tokio::test]
async fn test_threshold_sweep_skips_muted_budgets() -> Result<()> {
    let (service, user, _temp) = test_service_with_user().await?;
    let now = Utc::now();

    let mut draft = BudgetDraft::new(Category::Food, 5000);
    draft.notifications = false;
    service.upsert_budget(user.id, draft).await?;

    record(
        &service,
        &user,
        5000,
        TransactionType::Expense,
        Category::Food,
        &(now - Duration::days(1)).format("%Y-%m-%d").to_string(),
    )
    .await?;

    let notifier = RecordingNotifier::default();
    let alerts = service.check_budget_thresholds(&notifier, now).await?;
    assert!(alerts.is_empty());
    assert!(notifier.alerts.lock().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_sweep_repeats_without_suppression() -> Result<()> {
    let (service, user, _temp) = test_service_with_user().await?;
    let now = Utc::now();

    service
        .upsert_budget(user.id, BudgetDraft::new(Category::Food, 5000))
        .await?;
    service
        .add_transaction(
            user.id,
            NewTransaction {
                amount_cents: 4500,
                kind: TransactionType::Expense,
                category: Category::Food,
                description: None,
                date: Some(now - Duration::days(1)),
            },
        )
        .await?;

    let notifier = RecordingNotifier::default();
    service.check_budget_thresholds(&notifier, now).await?;
    service.check_budget_thresholds(&notifier, now).await?;

    // No duplicate suppression: the same alert fires on every sweep
    assert_eq!(notifier.alerts.lock().unwrap().len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_partial_budget_update() -> Result<()> {
    let (service, user, _temp) = test_service_with_user().await?;

    let budget = service
        .upsert_budget(user.id, BudgetDraft::new(Category::Food, 50000))
        .await?;

    // Turning notifications off must stick even though it is a "falsy" value
    let updated = service
        .update_budget(
            user.id,
            budget.id,
            BudgetUpdate {
                notifications: Some(false),
                threshold: Some(95.0),
                ..Default::default()
            },
        )
        .await?;

    assert!(!updated.notifications);
    assert_eq!(updated.threshold, 95.0);
    assert_eq!(updated.amount_cents, 50000);
    assert_eq!(updated.period, Period::Monthly);

    let fetched = service.get_budget(user.id, budget.id).await?;
    assert!(!fetched.notifications);

    let result = service
        .update_budget(
            user.id,
            budget.id,
            BudgetUpdate {
                amount_cents: Some(-5),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::InvalidAmount(_))));

    Ok(())
}

#[tokio::test]
async fn test_delete_budget_scoped_to_owner() -> Result<()> {
    let (service, user, _temp) = test_service_with_user().await?;
    let other = service
        .create_user("Grace".into(), "grace@example.com".into())
        .await?;

    let budget = service
        .upsert_budget(user.id, BudgetDraft::new(Category::Food, 5000))
        .await?;

    let result = service.delete_budget(other.id, budget.id).await;
    assert!(matches!(result, Err(AppError::BudgetNotFound(_))));

    service.delete_budget(user.id, budget.id).await?;
    assert!(service.list_budgets(user.id).await?.is_empty());

    Ok(())
}
