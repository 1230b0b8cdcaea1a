//! CSV serialization of filtered transaction sets.

use crate::application::AppError;
use crate::domain::{format_amount, Transaction};

/// Column set and field transforms for an export.
///
/// The two layouts serve different consumers and stay distinct:
/// user-facing downloads get capitalized display columns, the monthly email
/// attachment gets raw lowercase field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvLayout {
    /// `Date,Type,Category,Amount,Description,Created`: calendar dates and
    /// capitalized type names.
    Display,
    /// `date,type,category,amount,description,createdAt`: raw values with
    /// full timestamps.
    Report,
}

impl CsvLayout {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "display" => Some(CsvLayout::Display),
            "report" => Some(CsvLayout::Report),
            _ => None,
        }
    }

    fn headers(&self) -> [&'static str; 6] {
        match self {
            CsvLayout::Display => ["Date", "Type", "Category", "Amount", "Description", "Created"],
            CsvLayout::Report => ["date", "type", "category", "amount", "description", "createdAt"],
        }
    }

    fn record(&self, tx: &Transaction) -> [String; 6] {
        let description = tx.description.clone().unwrap_or_default();
        match self {
            CsvLayout::Display => [
                tx.date.format("%Y-%m-%d").to_string(),
                tx.kind.display_name().to_string(),
                tx.category.as_str().to_string(),
                format_amount(tx.amount_cents),
                description,
                tx.created_at.to_rfc3339(),
            ],
            CsvLayout::Report => [
                tx.date.to_rfc3339(),
                tx.kind.as_str().to_string(),
                tx.category.as_str().to_string(),
                format_amount(tx.amount_cents),
                description,
                tx.created_at.to_rfc3339(),
            ],
        }
    }
}

/// Serialize the transactions as CSV, newest first.
///
/// Export is defined only over non-empty inputs: an empty set fails with
/// [`AppError::EmptyExport`] rather than producing a header-only file.
pub fn write_transactions_csv(
    transactions: &[Transaction],
    layout: CsvLayout,
) -> Result<String, AppError> {
    if transactions.is_empty() {
        return Err(AppError::EmptyExport);
    }

    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(layout.headers())
        .map_err(anyhow::Error::from)?;
    for tx in sorted {
        writer
            .write_record(layout.record(tx))
            .map_err(anyhow::Error::from)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::Error::from(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| AppError::Storage(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, TransactionType};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn tx(amount: i64, day: u32, description: Option<&str>) -> Transaction {
        let mut tx = Transaction::new(
            Uuid::nil(),
            amount,
            TransactionType::Expense,
            Category::Food,
            Utc.with_ymd_and_hms(2024, 3, day, 8, 30, 0).unwrap(),
        );
        if let Some(d) = description {
            tx = tx.with_description(d);
        }
        tx
    }

    #[test]
    fn test_display_layout_headers_and_transforms() {
        let csv = write_transactions_csv(&[tx(4250, 10, None)], CsvLayout::Display).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Date,Type,Category,Amount,Description,Created"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("2024-03-10,Expense,food,42.50,,"));
    }

    #[test]
    fn test_report_layout_uses_raw_fields() {
        let csv = write_transactions_csv(&[tx(4250, 10, None)], CsvLayout::Report).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "date,type,category,amount,description,createdAt"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("2024-03-10T08:30:00+00:00,expense,food,42.50,,"));
    }

    #[test]
    fn test_rows_sorted_newest_first() {
        let csv = write_transactions_csv(
            &[tx(100, 5, None), tx(200, 20, None), tx(300, 12, None)],
            CsvLayout::Display,
        )
        .unwrap();
        let dates: Vec<&str> = csv
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap())
            .collect();
        assert_eq!(dates, ["2024-03-20", "2024-03-12", "2024-03-05"]);
    }

    #[test]
    fn test_description_with_comma_is_quoted() {
        let csv = write_transactions_csv(
            &[tx(100, 5, Some("coffee, pastries"))],
            CsvLayout::Display,
        )
        .unwrap();
        assert!(csv.contains("\"coffee, pastries\""));
    }

    #[test]
    fn test_empty_set_is_an_error() {
        assert!(matches!(
            write_transactions_csv(&[], CsvLayout::Display),
            Err(AppError::EmptyExport)
        ));
    }
}
