//! The delivery collaborator boundary. The core decides *what* to send and
//! calls a [`Notifier`]; transport (email, webhook, console) lives outside.

use anyhow::Result;

use crate::domain::{Category, Cents};

use super::reporting::MonthlyEmailReport;

/// Dispatches budget alerts and monthly report emails.
///
/// Implementations must tolerate repeated calls for the same budget and
/// window: the threshold sweep performs no duplicate suppression.
pub trait Notifier {
    /// A budget crossed its alert threshold.
    fn budget_alert(
        &self,
        email: &str,
        category: Category,
        percentage: f64,
        budget_amount: Cents,
        spent: Cents,
    ) -> impl Future<Output = Result<()>> + Send;

    /// A user's monthly report, with the CSV attachment already rendered.
    fn monthly_report(
        &self,
        email: &str,
        name: &str,
        report: &MonthlyEmailReport,
        csv: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}
