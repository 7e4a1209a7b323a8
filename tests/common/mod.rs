// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use khata::application::{Language, LedgerService};
use khata::domain::{Ledger, TransactionType};
use tempfile::TempDir;

/// Helper to create a test service with a temporary, empty database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap(), Language::En, false).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Helper to parse a date string into a midnight timestamp
pub fn parse_datetime(date_str: &str) -> NaiveDateTime {
    parse_date(date_str).and_hms_opt(0, 0, 0).unwrap()
}

/// Test fixture: a small shop's week of business
pub struct ShopLedger;

impl ShopLedger {
    /// Ram buys on credit twice, Shyam is paid, a walk-in sale and rent.
    pub fn create() -> Ledger {
        let mut ledger = Ledger::new();
        let entries = [
            ("Ram", 150000, TransactionType::Credit, "milk", "2024-03-01"),
            ("Shyam", 50000, TransactionType::Debit, "supplies", "2024-03-02"),
            ("Walk-in", 30000, TransactionType::Sale, "curd", "2024-03-03"),
            ("Landlord", 20000, TransactionType::Expense, "rent", "2024-03-04"),
            ("Ram", 25000, TransactionType::Credit, "ghee", "2024-03-05"),
        ];
        for (name, amount, kind, description, date) in entries {
            ledger
                .add_transaction(name, amount, kind, description, Some(parse_datetime(date)))
                .unwrap();
        }
        ledger
    }
}
