use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::io::Read;

use crate::domain::{Cents, IntegrityReport, Ledger, LedgerSnapshot, Transaction, TransactionType};
use crate::io::{ImportOptions, ImportResult, Importer};
use crate::storage::{Repository, SnapshotId, SnapshotInfo};

use super::{AppError, Assistant, Language, Session};

/// Application service tying a session to the snapshot store.
/// This is the primary interface for any client (CLI, TUI, etc.).
///
/// Every successful mutation saves a new snapshot, so the store always holds
/// the current ledger.
pub struct LedgerService {
    repo: Repository,
    session: Session,
}

impl LedgerService {
    /// Create a new database at the given path and save the first snapshot.
    /// With `seed` the ledger starts with the sample transactions.
    ///
    /// Fails with `AppError::AlreadyInitialized` if the database already
    /// holds a ledger.
    pub async fn init(database_path: &str, language: Language, seed: bool) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        if repo.latest_snapshot().await?.is_some() {
            return Err(AppError::AlreadyInitialized(database_path.to_string()));
        }

        let session = if seed {
            Session::initialize(language)
        } else {
            Session::from_ledger(Ledger::new(), language)
        };

        let service = Self { repo, session };
        service.save().await?;
        Ok(service)
    }

    /// Connect to an existing database and resume from its latest snapshot.
    pub async fn connect(database_path: &str, language: Language) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;

        let snapshot = repo.latest_snapshot().await?.ok_or(AppError::NoSnapshot)?;
        let ledger = Ledger::from_snapshot(snapshot)?;
        log::debug!(
            "Loaded ledger with {} transactions from {}",
            ledger.transactions().len(),
            database_path
        );

        Ok(Self {
            repo,
            session: Session::from_ledger(ledger, language),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn ledger(&self) -> &Ledger {
        self.session.ledger()
    }

    /// Persist the current ledger as a new snapshot.
    pub async fn save(&self) -> Result<SnapshotInfo, AppError> {
        Ok(self
            .repo
            .save_snapshot(&self.session.ledger().export_data())
            .await?)
    }

    // ========================
    // Transaction operations
    // ========================

    /// Record a transaction from user input.
    ///
    /// Unlike the engine, this boundary insists on a positive amount. A date
    /// is recorded at midnight; without one the current time is used.
    pub async fn record_transaction(
        &mut self,
        customer_name: &str,
        amount: Cents,
        transaction_type: TransactionType,
        description: &str,
        date: Option<NaiveDate>,
    ) -> Result<Transaction, AppError> {
        let customer_name = customer_name.trim();
        if customer_name.is_empty() {
            return Err(AppError::InvalidInput(
                "Customer name is required".to_string(),
            ));
        }
        if amount <= 0 {
            return Err(AppError::InvalidAmount(
                "Amount must be positive".to_string(),
            ));
        }

        let created_at = date.map(midnight);
        let transaction = self
            .session
            .ledger_mut()
            .add_transaction(customer_name, amount, transaction_type, description, created_at)?
            .clone();

        self.save().await?;
        Ok(transaction)
    }

    // ========================
    // Snapshot operations
    // ========================

    /// Replace the whole ledger with `snapshot` and persist it.
    pub async fn replace_ledger(&mut self, snapshot: LedgerSnapshot) -> Result<SnapshotInfo, AppError> {
        self.session.ledger_mut().import_data(snapshot)?;
        self.save().await
    }

    /// Import a JSON snapshot, replacing the ledger unless only validating.
    pub async fn import_snapshot_json<R: Read>(
        &mut self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult, AppError> {
        let result =
            Importer::new(self.session.ledger_mut()).import_snapshot_json(reader, options)?;
        if result.applied {
            self.save().await?;
        }
        Ok(result)
    }

    /// Bring back an earlier snapshot as the current state.
    pub async fn restore_snapshot(&mut self, id: SnapshotId) -> Result<SnapshotInfo, AppError> {
        let snapshot = self
            .repo
            .get_snapshot(id)
            .await?
            .ok_or_else(|| AppError::SnapshotNotFound(id.to_string()))?;
        self.replace_ledger(snapshot).await
    }

    pub async fn list_snapshots(&self, limit: Option<usize>) -> Result<Vec<SnapshotInfo>, AppError> {
        Ok(self.repo.list_snapshots(limit).await?)
    }

    // ========================
    // Assistant & integrity
    // ========================

    /// Ask the assistant about the business. Failures come back as an
    /// inline error reply; the ledger is left alone.
    pub async fn ask<A: Assistant>(&mut self, assistant: &A, question: &str) -> String {
        self.session.ask(assistant, question).await
    }

    pub fn set_language(&mut self, language: Language) {
        self.session.set_language(language);
    }

    /// Check ledger integrity and return a report.
    pub fn check_integrity(&self) -> IntegrityReport {
        self.session.ledger().verify()
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}
