use std::fmt;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// $42.50 = 4250 cents.
pub type Cents = i64;

/// Format cents as a decimal amount string.
/// Example: 4250 -> "42.50", -75 -> "-0.75"
pub fn format_amount(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Parse a decimal amount string into cents.
/// Accepts "42.50", "42.5", "42", ".50" and a leading minus.
/// Extra decimal digits beyond two are truncated.
pub fn parse_amount(input: &str) -> Result<Cents, ParseAmountError> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    if digits.is_empty() {
        return Err(ParseAmountError);
    }

    let (units_str, frac_str) = match digits.split_once('.') {
        Some((u, f)) => (u, f),
        None => (digits, ""),
    };

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| ParseAmountError)?
    };

    let frac: i64 = match frac_str.len() {
        0 => 0,
        1 => frac_str.parse::<i64>().map_err(|_| ParseAmountError)? * 10,
        _ => frac_str[..2].parse().map_err(|_| ParseAmountError)?,
    };

    let cents = units * 100 + frac;
    Ok(if negative { -cents } else { cents })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAmountError;

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid money format")
    }
}

impl std::error::Error for ParseAmountError {}
