use thiserror::Error;

use crate::domain::LedgerError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No ledger saved yet. Run `khata init` first.")]
    NoSnapshot,

    #[error("Ledger already exists in {0}. Use `khata import` or `khata restore` to replace it.")]
    AlreadyInitialized(String),

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
