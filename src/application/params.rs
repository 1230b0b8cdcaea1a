//! Parsing of the string query parameters supplied by HTTP or CLI clients
//! (`year`, `month`, `months`, `startDate`, `endDate`, `limit`, `type`,
//! `category`, `period`) into typed values.

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{Category, Period, TransactionType};

use super::AppError;

/// Parse a date parameter. Accepts `YYYY-MM-DD` (midnight UTC) or a full
/// RFC 3339 timestamp.
pub fn parse_date_param(input: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| AppError::InvalidDate(input.to_string()))?;
        return Ok(midnight.and_utc());
    }

    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::InvalidDate(input.to_string()))
}

pub fn parse_year_param(input: &str) -> Result<i32, AppError> {
    input
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidDate(format!("year '{input}'")))
}

pub fn parse_month_param(input: &str) -> Result<u32, AppError> {
    let month: u32 = input
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidDate(format!("month '{input}'")))?;
    if (1..=12).contains(&month) {
        Ok(month)
    } else {
        Err(AppError::InvalidDate(format!("month '{input}'")))
    }
}

pub fn parse_months_param(input: &str) -> Result<u32, AppError> {
    let months: u32 = input
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidDate(format!("months '{input}'")))?;
    if months == 0 {
        return Err(AppError::InvalidDate(format!("months '{input}'")));
    }
    Ok(months)
}

pub fn parse_limit_param(input: &str) -> Result<usize, AppError> {
    input
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidFilter(format!("limit '{input}'")))
}

pub fn parse_type_param(input: &str) -> Result<TransactionType, AppError> {
    TransactionType::from_str(input)
        .ok_or_else(|| AppError::InvalidFilter(format!("unknown transaction type '{input}'")))
}

pub fn parse_category_param(input: &str) -> Result<Category, AppError> {
    Category::from_str(input)
        .ok_or_else(|| AppError::InvalidFilter(format!("unknown category '{input}'")))
}

pub fn parse_period_param(input: &str) -> Result<Period, AppError> {
    Period::from_str(input)
        .ok_or_else(|| AppError::InvalidFilter(format!("unknown period '{input}'")))
}
