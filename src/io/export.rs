use anyhow::Result;
use std::io::Write;

use crate::domain::{Ledger, LedgerSnapshot, TransactionFilter, format_cents, format_timestamp};

/// Exporter for converting ledger data to various formats
pub struct Exporter<'a> {
    ledger: &'a Ledger,
}

impl<'a> Exporter<'a> {
    pub fn new(ledger: &'a Ledger) -> Self {
        Self { ledger }
    }

    /// Export the full ledger as a pretty-printed JSON snapshot.
    pub fn export_snapshot_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let snapshot = self.ledger.export_data();

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        log::debug!(
            "Exported snapshot: {} transactions, {} customers",
            snapshot.transactions.len(),
            snapshot.customers.len()
        );
        Ok(snapshot)
    }

    /// Export the transactions matching `filter` to CSV.
    pub fn export_transactions_csv<W: Write>(
        &self,
        writer: W,
        filter: &TransactionFilter,
    ) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "created_at",
            "customer_name",
            "type",
            "amount",
            "description",
        ])?;

        let mut count = 0;
        for tx in self.ledger.get_filtered_transactions(filter) {
            csv_writer.write_record([
                tx.id.to_string(),
                format_timestamp(&tx.created_at),
                tx.customer_name.clone(),
                tx.transaction_type.to_string(),
                format_cents(tx.amount),
                tx.description.clone(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export customers and their balances to CSV.
    pub fn export_customers_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "name", "balance"])?;

        for customer in self.ledger.customers() {
            csv_writer.write_record([
                customer.id.to_string(),
                customer.name.clone(),
                format_cents(customer.balance),
            ])?;
        }

        csv_writer.flush()?;
        Ok(self.ledger.customers().len())
    }
}
