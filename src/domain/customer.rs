use super::Cents;

pub type CustomerId = u64;

/// A counterparty identified by name, with the running total of every
/// transaction recorded against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub balance: Cents,
}

impl Customer {
    pub fn new(id: CustomerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            balance: 0,
        }
    }

    /// Positive balances are owed to the business, negative ones are owed by it.
    pub fn owes_business(&self) -> bool {
        self.balance > 0
    }
}
