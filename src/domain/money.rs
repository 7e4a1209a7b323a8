use thiserror::Error;

/// Amounts are held as integer cents so balances never drift.
/// ₹15.50 is stored as 1550.
pub type Cents = i64;

const CENTS_PER_UNIT: i64 = 100;

/// The ledger is single-currency; amounts are shown in rupees.
pub const CURRENCY_SYMBOL: &str = "₹";

/// Format cents as a plain decimal string.
/// Example: 150000 -> "1500.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!(
        "{}{}.{:02}",
        sign,
        abs_cents / CENTS_PER_UNIT as u64,
        abs_cents % CENTS_PER_UNIT as u64
    )
}

/// Format cents with thousands separators, the way amounts are shown to people.
/// Example: 123456789 -> "1,234,567.89"
pub fn format_cents_grouped(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    let units = (abs_cents / CENTS_PER_UNIT as u64).to_string();

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}{}.{:02}", sign, grouped, abs_cents % CENTS_PER_UNIT as u64)
}

/// Grouped amount with the currency symbol, e.g. "₹1,500.00" or "₹-500.00".
pub fn format_currency(cents: Cents) -> String {
    format!("{}{}", CURRENCY_SYMBOL, format_cents_grouped(cents))
}

/// Parse a decimal string like "1500", "12.5" or "-0.75" into cents.
/// Digits past the second decimal place are truncated.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (digits, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(ParseCentsError::InvalidFormat(input.to_string()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ParseCentsError::InvalidFormat(input.to_string()));
    }

    let units: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| ParseCentsError::OutOfRange)?
    };

    let fraction_cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().unwrap_or(0) * 10,
        _ => fraction[..2].parse().unwrap_or(0),
    };

    let cents = units
        .checked_mul(CENTS_PER_UNIT)
        .and_then(|c| c.checked_add(fraction_cents))
        .ok_or(ParseCentsError::OutOfRange)?;

    Ok(if negative { -cents } else { cents })
}

/// Convert a currency amount expressed in units (as found in JSON) to cents,
/// rounding to the nearest cent.
pub fn units_to_cents(units: f64) -> Option<Cents> {
    if !units.is_finite() {
        return None;
    }
    let cents = (units * CENTS_PER_UNIT as f64).round();
    if cents.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(cents as Cents)
}

pub fn cents_to_units(cents: Cents) -> f64 {
    cents as f64 / CENTS_PER_UNIT as f64
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCentsError {
    #[error("invalid money format: '{0}'")]
    InvalidFormat(String),

    #[error("amount is too large")]
    OutOfRange,
}

/// Serde adapter writing cents as a JSON number in currency units.
pub mod as_units {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::{Cents, cents_to_units, units_to_cents};

    pub fn serialize<S: Serializer>(cents: &Cents, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(cents_to_units(*cents))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cents, D::Error> {
        let units = f64::deserialize(deserializer)?;
        units_to_cents(units)
            .ok_or_else(|| de::Error::custom(format!("amount out of range: {}", units)))
    }
}
