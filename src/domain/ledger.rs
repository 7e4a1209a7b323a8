use std::collections::{HashMap, HashSet};

use chrono::{Local, NaiveDateTime};
use thiserror::Error;

use super::{
    BusinessInsights, Cents, Customer, CustomerId, CustomerRecord, DEFAULT_TOP_CUSTOMERS,
    IntegrityReport, LedgerSnapshot, NextIds, TopCustomer, Transaction, TransactionFilter,
    TransactionId, TransactionRecord, TransactionType, parse_timestamp,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),
}

/// The ledger engine: every transaction ever recorded, in insertion order,
/// and one customer per distinct name with its running balance.
///
/// All operations are synchronous and in-memory. Callers sharing a ledger
/// across threads must serialize access themselves.
#[derive(Debug, Clone)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    customers: Vec<Customer>,
    /// name -> position in `customers`
    customer_index: HashMap<String, usize>,
    next_transaction_id: TransactionId,
    next_customer_id: CustomerId,
    /// Sum of every transaction's magnitude. Bounds every balance and total,
    /// so keeping it in range keeps all of them in range.
    turnover: Cents,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
            customers: Vec::new(),
            customer_index: HashMap::new(),
            next_transaction_id: 1,
            next_customer_id: 1,
            turnover: 0,
        }
    }

    // ========================
    // Mutation
    // ========================

    /// Record a transaction for `customer_name`, creating the customer on first sight.
    ///
    /// The sign of `amount` is ignored: debits and expenses are stored negative,
    /// credits and sales positive. `created_at` defaults to the current local time.
    pub fn add_transaction(
        &mut self,
        customer_name: &str,
        amount: Cents,
        transaction_type: TransactionType,
        description: impl Into<String>,
        created_at: Option<NaiveDateTime>,
    ) -> Result<&Transaction, LedgerError> {
        // Validate everything before touching state
        if customer_name.trim().is_empty() {
            return Err(LedgerError::InvalidInput(
                "customer name must not be empty".to_string(),
            ));
        }
        if amount == 0 {
            return Err(LedgerError::InvalidInput(
                "amount must not be zero".to_string(),
            ));
        }
        let amount = amount
            .checked_abs()
            .map(|_| transaction_type.signed(amount))
            .ok_or_else(|| LedgerError::InvalidInput("amount is out of range".to_string()))?;
        let turnover = self
            .turnover
            .checked_add(amount.abs())
            .ok_or_else(|| LedgerError::InvalidInput("balance out of range".to_string()))?;

        let created_at = created_at.unwrap_or_else(|| Local::now().naive_local());

        let position = self.customer_position_or_insert(customer_name);
        self.customers[position].balance += amount;
        self.turnover = turnover;

        let transaction = Transaction {
            id: self.next_transaction_id,
            customer_name: customer_name.to_string(),
            amount,
            transaction_type,
            description: description.into(),
            created_at,
        };
        self.next_transaction_id += 1;

        log::debug!(
            "Recorded transaction {} for '{}': {} {}",
            transaction.id,
            transaction.customer_name,
            transaction.transaction_type,
            transaction.amount
        );

        self.transactions.push(transaction);
        Ok(&self.transactions[self.transactions.len() - 1])
    }

    fn customer_position_or_insert(&mut self, name: &str) -> usize {
        if let Some(&position) = self.customer_index.get(name) {
            return position;
        }

        let customer = Customer::new(self.next_customer_id, name);
        self.next_customer_id += 1;
        log::debug!("Created customer {} '{}'", customer.id, customer.name);

        let position = self.customers.len();
        self.customers.push(customer);
        self.customer_index.insert(name.to_string(), position);
        position
    }

    // ========================
    // Queries
    // ========================

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Customers in the order they were first seen.
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// Look up a customer by exact, case-sensitive name.
    pub fn customer(&self, name: &str) -> Option<&Customer> {
        self.customer_index
            .get(name)
            .map(|&position| &self.customers[position])
    }

    pub fn next_transaction_id(&self) -> TransactionId {
        self.next_transaction_id
    }

    pub fn next_customer_id(&self) -> CustomerId {
        self.next_customer_id
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Net of every signed transaction amount.
    pub fn calculate_total_balance(&self) -> Cents {
        self.transactions.iter().map(|t| t.amount).sum()
    }

    /// Transactions matching every populated field of `filter`, in insertion order.
    pub fn get_filtered_transactions(&self, filter: &TransactionFilter) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| filter.matches(t))
            .collect()
    }

    /// Customers ranked by their combined sales and credit, highest first.
    ///
    /// Debits and expenses are not counted. Customers with equal totals keep
    /// the order in which they first appear in the transaction history.
    pub fn get_top_customers(&self, limit: usize) -> Vec<TopCustomer> {
        let mut totals: Vec<TopCustomer> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for tx in self
            .transactions
            .iter()
            .filter(|t| t.transaction_type.is_income())
        {
            match positions.get(tx.customer_name.as_str()) {
                Some(&i) => totals[i].amount += tx.amount,
                None => {
                    positions.insert(tx.customer_name.as_str(), totals.len());
                    totals.push(TopCustomer {
                        name: tx.customer_name.clone(),
                        amount: tx.amount,
                    });
                }
            }
        }

        // sort_by is stable, so ties stay in first-appearance order
        totals.sort_by(|a, b| b.amount.cmp(&a.amount));
        totals.truncate(limit);
        totals
    }

    /// Totals by transaction type, net profit and the default top-customer ranking.
    pub fn generate_business_insights(&self) -> BusinessInsights {
        let mut total_balance = 0;
        let mut total_sales = 0;
        let mut total_expenses = 0;
        let mut total_credit = 0;
        let mut total_debit = 0;

        for tx in &self.transactions {
            total_balance += tx.amount;
            match tx.transaction_type {
                TransactionType::Sale => total_sales += tx.amount,
                TransactionType::Expense => total_expenses += tx.magnitude(),
                TransactionType::Credit => total_credit += tx.amount,
                TransactionType::Debit => total_debit += tx.magnitude(),
            }
        }

        BusinessInsights {
            total_balance,
            total_sales,
            total_expenses,
            total_credit,
            total_debit,
            net_profit: total_sales - total_expenses,
            transaction_count: self.transactions.len(),
            customer_count: self.customers.len(),
            top_customers: self.get_top_customers(DEFAULT_TOP_CUSTOMERS),
        }
    }

    /// Re-check the balance identities and id counters.
    pub fn verify(&self) -> IntegrityReport {
        let mut issues = Vec::new();
        let total_balance = self.calculate_total_balance();
        let customer_balance_sum: Cents = self.customers.iter().map(|c| c.balance).sum();

        let mut expected: HashMap<&str, Cents> = HashMap::new();
        for tx in &self.transactions {
            *expected.entry(tx.customer_name.as_str()).or_insert(0) += tx.amount;
            if tx.amount != tx.transaction_type.signed(tx.amount) {
                issues.push(format!(
                    "Transaction {} has a {} amount with the wrong sign",
                    tx.id, tx.transaction_type
                ));
            }
            if tx.id >= self.next_transaction_id {
                issues.push(format!(
                    "Transaction id {} is not below the next id {}",
                    tx.id, self.next_transaction_id
                ));
            }
            if self.customer(&tx.customer_name).is_none() {
                issues.push(format!(
                    "Transaction {} refers to unknown customer '{}'",
                    tx.id, tx.customer_name
                ));
            }
        }

        for customer in &self.customers {
            let sum = expected.get(customer.name.as_str()).copied().unwrap_or(0);
            if sum != customer.balance {
                issues.push(format!(
                    "Customer '{}' balance {} differs from its transactions {}",
                    customer.name, customer.balance, sum
                ));
            }
            if customer.id >= self.next_customer_id {
                issues.push(format!(
                    "Customer id {} is not below the next id {}",
                    customer.id, self.next_customer_id
                ));
            }
        }

        if total_balance != customer_balance_sum {
            issues.push(format!(
                "Total balance {} differs from the sum of customer balances {}",
                total_balance, customer_balance_sum
            ));
        }

        IntegrityReport {
            transaction_count: self.transactions.len(),
            customer_count: self.customers.len(),
            total_balance,
            customer_balance_sum,
            issues,
        }
    }

    // ========================
    // Snapshots
    // ========================

    /// Complete state of the ledger, including the id counters.
    pub fn export_data(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            transactions: self.transactions.iter().map(TransactionRecord::from).collect(),
            customers: self.customers.iter().map(CustomerRecord::from).collect(),
            next_ids: NextIds {
                transaction: self.next_transaction_id,
                customer: self.next_customer_id,
            },
        }
    }

    /// Replace the whole ledger with `snapshot`.
    ///
    /// The snapshot is checked in full first; if it is rejected the ledger is
    /// left exactly as it was.
    pub fn import_data(&mut self, snapshot: LedgerSnapshot) -> Result<(), LedgerError> {
        let imported = Self::from_snapshot(snapshot)?;
        log::debug!(
            "Imported snapshot: {} transactions, {} customers",
            imported.transactions.len(),
            imported.customers.len()
        );
        *self = imported;
        Ok(())
    }

    /// Build a ledger from a snapshot, rejecting anything that would break
    /// id uniqueness or the balance identities.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self, LedgerError> {
        let LedgerSnapshot {
            transactions,
            customers,
            next_ids,
        } = snapshot;

        let mut customer_ids = HashSet::new();
        let mut customer_index = HashMap::new();
        let mut ledger_customers = Vec::with_capacity(customers.len());

        for record in customers {
            if record.name.trim().is_empty() {
                return Err(malformed(format!(
                    "customer {} has an empty name",
                    record.id
                )));
            }
            if !customer_ids.insert(record.id) {
                return Err(malformed(format!("duplicate customer id {}", record.id)));
            }
            if record.id >= next_ids.customer {
                return Err(malformed(format!(
                    "customer id {} is not below next customer id {}",
                    record.id, next_ids.customer
                )));
            }
            if customer_index
                .insert(record.name.clone(), ledger_customers.len())
                .is_some()
            {
                return Err(malformed(format!("duplicate customer name '{}'", record.name)));
            }
            ledger_customers.push(Customer::from(record));
        }

        let mut transaction_ids = HashSet::new();
        let mut balances: HashMap<String, Cents> = HashMap::new();
        let mut turnover: Cents = 0;
        let mut ledger_transactions = Vec::with_capacity(transactions.len());

        for record in transactions {
            if !transaction_ids.insert(record.id) {
                return Err(malformed(format!("duplicate transaction id {}", record.id)));
            }
            if record.id >= next_ids.transaction {
                return Err(malformed(format!(
                    "transaction id {} is not below next transaction id {}",
                    record.id, next_ids.transaction
                )));
            }
            if !customer_index.contains_key(&record.customer_name) {
                return Err(malformed(format!(
                    "transaction {} refers to unknown customer '{}'",
                    record.id, record.customer_name
                )));
            }
            if record.amount != record.transaction_type.signed(record.amount) {
                return Err(malformed(format!(
                    "transaction {} has a {} amount with the wrong sign",
                    record.id, record.transaction_type
                )));
            }
            let created_at = parse_timestamp(&record.created_at).ok_or_else(|| {
                malformed(format!(
                    "transaction {} has an invalid created_at '{}'",
                    record.id, record.created_at
                ))
            })?;

            turnover = turnover
                .checked_add(record.amount.abs())
                .ok_or_else(|| {
                    malformed(format!(
                        "transaction {} pushes the ledger total out of range",
                        record.id
                    ))
                })?;
            *balances.entry(record.customer_name.clone()).or_insert(0) += record.amount;
            ledger_transactions.push(Transaction {
                id: record.id,
                customer_name: record.customer_name,
                amount: record.amount,
                transaction_type: record.transaction_type,
                description: record.description,
                created_at,
            });
        }

        for customer in &ledger_customers {
            let expected = balances.get(&customer.name).copied().unwrap_or(0);
            if expected != customer.balance {
                return Err(malformed(format!(
                    "customer '{}' has balance {} but its transactions sum to {}",
                    customer.name, customer.balance, expected
                )));
            }
        }

        Ok(Self {
            transactions: ledger_transactions,
            customers: ledger_customers,
            customer_index,
            next_transaction_id: next_ids.transaction,
            next_customer_id: next_ids.customer,
            turnover,
        })
    }
}

fn malformed(message: String) -> LedgerError {
    LedgerError::MalformedSnapshot(message)
}
