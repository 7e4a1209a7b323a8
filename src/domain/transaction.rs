use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Cents;

pub type TransactionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money lent to or owed by the customer (receivable)
    Credit,
    /// Money borrowed from or paid to the customer (payable)
    Debit,
    /// Goods or services sold
    Sale,
    /// Money spent running the business
    Expense,
}

impl TransactionType {
    pub const ALL: [TransactionType; 4] = [
        TransactionType::Credit,
        TransactionType::Debit,
        TransactionType::Sale,
        TransactionType::Expense,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "credit",
            TransactionType::Debit => "debit",
            TransactionType::Sale => "sale",
            TransactionType::Expense => "expense",
        }
    }

    /// Debits and expenses take money out of the ledger.
    pub fn is_outflow(&self) -> bool {
        matches!(self, TransactionType::Debit | TransactionType::Expense)
    }

    /// Sales and credits count towards a customer's income ranking.
    pub fn is_income(&self) -> bool {
        matches!(self, TransactionType::Sale | TransactionType::Credit)
    }

    /// Apply the sign convention of this type to an amount, whatever sign it came with.
    pub fn signed(&self, amount: Cents) -> Cents {
        if self.is_outflow() {
            -amount.abs()
        } else {
            amount.abs()
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = super::LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "credit" => Ok(TransactionType::Credit),
            "debit" => Ok(TransactionType::Debit),
            "sale" => Ok(TransactionType::Sale),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(super::LedgerError::InvalidInput(format!(
                "unknown transaction type '{}' (expected credit, debit, sale or expense)",
                s
            ))),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single signed money event with one customer.
/// Transactions are never edited once recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub customer_name: String,
    /// Signed amount in cents; negative for debits and expenses
    pub amount: Cents,
    pub transaction_type: TransactionType,
    pub description: String,
    /// Local wall-clock time the transaction was recorded for
    pub created_at: NaiveDateTime,
}

impl Transaction {
    /// Magnitude of the amount, as shown on a receipt.
    pub fn magnitude(&self) -> Cents {
        self.amount.abs()
    }
}
