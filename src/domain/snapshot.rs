//! The persisted shape of a ledger. These records are the stable exchange
//! format and are kept apart from the in-memory types on purpose: renaming a
//! field on `Transaction` must not change what ends up on disk.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{Cents, Customer, CustomerId, Transaction, TransactionId, TransactionType};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Full exportable state of a ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub transactions: Vec<TransactionRecord>,
    pub customers: Vec<CustomerRecord>,
    pub next_ids: NextIds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub customer_name: String,
    #[serde(with = "super::money::as_units")]
    pub amount: Cents,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: CustomerId,
    pub name: String,
    #[serde(with = "super::money::as_units")]
    pub balance: Cents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextIds {
    pub transaction: TransactionId,
    pub customer: CustomerId,
}

impl From<&Transaction> for TransactionRecord {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id,
            customer_name: tx.customer_name.clone(),
            amount: tx.amount,
            transaction_type: tx.transaction_type,
            description: tx.description.clone(),
            created_at: format_timestamp(&tx.created_at),
        }
    }
}

impl From<&Customer> for CustomerRecord {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name.clone(),
            balance: customer.balance,
        }
    }
}

impl From<CustomerRecord> for Customer {
    fn from(record: CustomerRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            balance: record.balance,
        }
    }
}

/// Render a timestamp as ISO-8601 without offset. Fractional seconds are only
/// written when present.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse an ISO-8601 timestamp. Accepts a naive date-time, an RFC 3339
/// date-time with offset (kept as its local wall time), or a bare date.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT) {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.naive_local());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_format_timestamp_omits_zero_fraction() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        assert_eq!(format_timestamp(&ts), "2024-01-15T09:05:00");
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let midnight = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        assert_eq!(parse_timestamp("2024-01-15T00:00:00"), Some(midnight));
        assert_eq!(parse_timestamp("2024-01-15"), Some(midnight));
        assert_eq!(parse_timestamp("2024-01-15T00:00:00+05:30"), Some(midnight));

        let precise = parse_timestamp("2024-01-15T10:20:30.123456").unwrap();
        assert_eq!(precise.and_utc().timestamp_subsec_micros(), 123456);

        assert_eq!(parse_timestamp("15/01/2024"), None);
    }

    #[test]
    fn test_record_uses_wire_field_names() {
        let record = TransactionRecord {
            id: 7,
            customer_name: "Ram".into(),
            amount: -50025,
            transaction_type: TransactionType::Expense,
            description: "rent".into(),
            created_at: "2024-01-15T00:00:00".into(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "expense");
        assert_eq!(json["amount"], -500.25);
        assert_eq!(json["customer_name"], "Ram");
        assert!(json.get("transaction_type").is_none());
    }
}
