use serde::{Deserialize, Serialize};

use super::Cents;

/// Number of customers ranked by default in insights.
pub const DEFAULT_TOP_CUSTOMERS: usize = 5;

/// A customer's combined sales and credit, used for ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopCustomer {
    pub name: String,
    #[serde(with = "super::money::as_units")]
    pub amount: Cents,
}

/// Aggregate view derived from the current transactions. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessInsights {
    #[serde(with = "super::money::as_units")]
    pub total_balance: Cents,
    #[serde(with = "super::money::as_units")]
    pub total_sales: Cents,
    /// Absolute value of all expenses
    #[serde(with = "super::money::as_units")]
    pub total_expenses: Cents,
    #[serde(with = "super::money::as_units")]
    pub total_credit: Cents,
    /// Absolute value of all debits
    #[serde(with = "super::money::as_units")]
    pub total_debit: Cents,
    #[serde(with = "super::money::as_units")]
    pub net_profit: Cents,
    pub transaction_count: usize,
    pub customer_count: usize,
    pub top_customers: Vec<TopCustomer>,
}

/// Result of re-checking the ledger's balance and id invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub transaction_count: usize,
    pub customer_count: usize,
    pub total_balance: Cents,
    /// Sum of stored customer balances; equals `total_balance` when healthy
    pub customer_balance_sum: Cents,
    pub issues: Vec<String>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}
