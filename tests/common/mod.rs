// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::sync::Mutex;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use fintrackr::application::notify::Notifier;
use fintrackr::application::reporting::MonthlyEmailReport;
use fintrackr::application::{NewTransaction, TrackerService};
use fintrackr::domain::{Category, Cents, TransactionType, User};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(TrackerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = TrackerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to create a test service with one registered user
pub async fn test_service_with_user() -> Result<(TrackerService, User, TempDir)> {
    let (service, temp_dir) = test_service().await?;
    let user = service
        .create_user("Ada".into(), "ada@example.com".into())
        .await?;
    Ok((service, user, temp_dir))
}

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

/// Helper to record a transaction on a fixed date
pub async fn record(
    service: &TrackerService,
    user: &User,
    amount_cents: Cents,
    kind: TransactionType,
    category: Category,
    date: &str,
) -> Result<()> {
    service
        .add_transaction(
            user.id,
            NewTransaction {
                amount_cents,
                kind,
                category,
                description: None,
                date: Some(parse_date(date)),
            },
        )
        .await?;
    Ok(())
}

/// Notifier that records every dispatch for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    pub alerts: Mutex<Vec<(String, Category, f64, Cents, Cents)>>,
    pub reports: Mutex<Vec<(String, String, String)>>,
}

impl Notifier for RecordingNotifier {
    async fn budget_alert(
        &self,
        email: &str,
        category: Category,
        percentage: f64,
        budget_amount: Cents,
        spent: Cents,
    ) -> Result<()> {
        self.alerts.lock().unwrap().push((
            email.to_string(),
            category,
            percentage,
            budget_amount,
            spent,
        ));
        Ok(())
    }

    async fn monthly_report(
        &self,
        email: &str,
        name: &str,
        _report: &MonthlyEmailReport,
        csv: &str,
    ) -> Result<()> {
        self.reports
            .lock()
            .unwrap()
            .push((email.to_string(), name.to_string(), csv.to_string()));
        Ok(())
    }
}
