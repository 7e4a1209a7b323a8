use std::io::Read;

use crate::domain::{Ledger, LedgerError, LedgerSnapshot};

/// Result of an import operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResult {
    pub transactions: usize,
    pub customers: usize,
    /// False when the snapshot was only validated
    pub applied: bool,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub validate_only: bool,
}

/// Importer for replacing a ledger's contents from a snapshot
pub struct Importer<'a> {
    ledger: &'a mut Ledger,
}

impl<'a> Importer<'a> {
    pub fn new(ledger: &'a mut Ledger) -> Self {
        Self { ledger }
    }

    /// Import a full ledger from a JSON snapshot.
    ///
    /// The previous contents are discarded; nothing is merged. A snapshot
    /// that cannot be parsed or fails validation leaves the ledger untouched.
    pub fn import_snapshot_json<R: Read>(
        &mut self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult, LedgerError> {
        let snapshot = read_snapshot(reader)?;
        let transactions = snapshot.transactions.len();
        let customers = snapshot.customers.len();

        if options.validate_only {
            Ledger::from_snapshot(snapshot)?;
            return Ok(ImportResult {
                transactions,
                customers,
                applied: false,
            });
        }

        self.ledger.import_data(snapshot)?;
        Ok(ImportResult {
            transactions,
            customers,
            applied: true,
        })
    }
}

/// Parse a JSON snapshot. Syntax errors and missing or mistyped fields are
/// reported as a malformed snapshot.
pub fn read_snapshot<R: Read>(reader: R) -> Result<LedgerSnapshot, LedgerError> {
    serde_json::from_reader(reader).map_err(|e| LedgerError::MalformedSnapshot(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransactionType;
    use crate::io::Exporter;

    const SNAPSHOT: &str = r#"{
        "transactions": [
            {"id": 1, "customer_name": "राम कुमार", "amount": 1500.0, "type": "credit",
             "description": "दूध की बिक्री", "created_at": "2024-05-01T10:15:30.123456"},
            {"id": 2, "customer_name": "श्याम", "amount": -500, "type": "debit",
             "description": "सामान खरीदा", "created_at": "2024-05-02T00:00:00"}
        ],
        "customers": [
            {"id": 1, "name": "राम कुमार", "balance": 1500.0},
            {"id": 2, "name": "श्याम", "balance": -500.0}
        ],
        "next_ids": {"transaction": 3, "customer": 3}
    }"#;

    #[test]
    fn test_import_snapshot_json() {
        let mut ledger = Ledger::new();
        let result = Importer::new(&mut ledger)
            .import_snapshot_json(SNAPSHOT.as_bytes(), ImportOptions::default())
            .unwrap();

        assert_eq!(
            result,
            ImportResult {
                transactions: 2,
                customers: 2,
                applied: true
            }
        );
        assert_eq!(ledger.calculate_total_balance(), 100000);
        assert_eq!(ledger.customer("श्याम").unwrap().balance, -50000);
        assert_eq!(ledger.next_transaction_id(), 3);
    }

    #[test]
    fn test_validate_only_leaves_ledger_alone() {
        let mut ledger = Ledger::new();
        let result = Importer::new(&mut ledger)
            .import_snapshot_json(
                SNAPSHOT.as_bytes(),
                ImportOptions {
                    validate_only: true,
                },
            )
            .unwrap();

        assert!(!result.applied);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let mut ledger = Ledger::new();
        let json = r#"{"transactions": [], "customers": []}"#;
        let err = Importer::new(&mut ledger)
            .import_snapshot_json(json.as_bytes(), ImportOptions::default())
            .unwrap_err();

        assert!(matches!(err, LedgerError::MalformedSnapshot(_)));
    }

    #[test]
    fn test_unknown_type_is_malformed() {
        let json = SNAPSHOT.replace("\"type\": \"debit\"", "\"type\": \"refund\"");
        assert!(matches!(
            read_snapshot(json.as_bytes()),
            Err(LedgerError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn test_rejected_import_keeps_previous_state() {
        let mut ledger = Ledger::new();
        ledger
            .add_transaction("Gita", 700, TransactionType::Sale, "", None)
            .unwrap();

        let json = SNAPSHOT.replace("\"id\": 2, \"customer_name\"", "\"id\": 1, \"customer_name\"");
        let result =
            Importer::new(&mut ledger).import_snapshot_json(json.as_bytes(), ImportOptions::default());

        assert!(result.is_err());
        assert_eq!(ledger.transactions().len(), 1);
        assert!(ledger.customer("Gita").is_some());
    }

    #[test]
    fn test_export_then_import_roundtrip() {
        let mut source = Ledger::new();
        source
            .add_transaction("Ram", 150000, TransactionType::Credit, "", None)
            .unwrap();
        source
            .add_transaction("Shyam", 50000, TransactionType::Debit, "", None)
            .unwrap();
        source
            .add_transaction("Ram", 1999, TransactionType::Sale, "", None)
            .unwrap();

        let mut buffer = Vec::new();
        Exporter::new(&source).export_snapshot_json(&mut buffer).unwrap();

        let mut target = Ledger::new();
        Importer::new(&mut target)
            .import_snapshot_json(buffer.as_slice(), ImportOptions::default())
            .unwrap();

        assert_eq!(
            target.calculate_total_balance(),
            source.calculate_total_balance()
        );
        assert_eq!(target.transactions().len(), source.transactions().len());
        assert_eq!(target.customers().len(), source.customers().len());
        assert_eq!(target.transactions(), source.transactions());
    }
}
