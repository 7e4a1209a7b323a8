use chrono::NaiveDate;

use super::Transaction;

/// Type filter value that disables type filtering. Compared case-sensitively.
pub const ALL_TYPES: &str = "All";

/// Conjunctive filter over transactions. Every field left as `None` (or as an
/// empty string) is ignored; the rest must all match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Type name, matched case-insensitively; `"All"` disables this filter
    pub transaction_type: Option<String>,
    /// Inclusive lower bound on the transaction date
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the transaction date
    pub end_date: Option<NaiveDate>,
    /// Case-insensitive substring of the customer name
    pub customer_name: Option<String>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, transaction_type: impl Into<String>) -> Self {
        self.transaction_type = Some(transaction_type.into());
        self
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn with_customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.matches_type(transaction)
            && self.matches_dates(transaction)
            && self.matches_customer(transaction)
    }

    fn matches_type(&self, transaction: &Transaction) -> bool {
        match self.transaction_type.as_deref() {
            None | Some("") | Some(ALL_TYPES) => true,
            Some(wanted) => wanted.to_lowercase() == transaction.transaction_type.as_str(),
        }
    }

    fn matches_dates(&self, transaction: &Transaction) -> bool {
        let date = transaction.created_at.date();
        self.start_date.is_none_or(|start| date >= start)
            && self.end_date.is_none_or(|end| date <= end)
    }

    fn matches_customer(&self, transaction: &Transaction) -> bool {
        match self.customer_name.as_deref() {
            None | Some("") => true,
            Some(needle) => transaction
                .customer_name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        }
    }
}
