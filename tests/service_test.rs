mod common;

use anyhow::Result;
use common::{ShopLedger, parse_date, test_service};
use khata::application::{AppError, Assistant, AssistantError, Language, LedgerService, Role};
use khata::domain::{LedgerError, TransactionType};
use khata::io::{Exporter, ImportOptions};
use tempfile::TempDir;

/// Assistant that answers every prompt with its length
struct EchoAssistant;

impl Assistant for EchoAssistant {
    async fn generate(&self, prompt: &str) -> Result<String, AssistantError> {
        Ok(format!("{} chars", prompt.chars().count()))
    }
}

struct BrokenAssistant;

impl Assistant for BrokenAssistant {
    async fn generate(&self, _prompt: &str) -> Result<String, AssistantError> {
        Err(AssistantError::EmptyResponse)
    }
}

#[tokio::test]
async fn test_init_seeds_sample_data() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("seeded.db");
    let service = LedgerService::init(db_path.to_str().unwrap(), Language::Hi, true).await?;

    assert_eq!(service.ledger().transactions().len(), 2);
    assert_eq!(service.ledger().calculate_total_balance(), 100000);
    assert_eq!(service.session().chat_history().len(), 1);
    assert_eq!(service.session().chat_history()[0].role, Role::Assistant);

    Ok(())
}

#[tokio::test]
async fn test_transactions_persist_across_connections() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("khata.db");
    let path = db_path.to_str().unwrap();

    {
        let mut service = LedgerService::init(path, Language::En, false).await?;
        service
            .record_transaction("Ram", 150000, TransactionType::Credit, "milk", Some(parse_date("2024-01-15")))
            .await?;
        service
            .record_transaction("Shyam", 50000, TransactionType::Debit, "", None)
            .await?;
    }

    let service = LedgerService::connect(path, Language::En).await?;
    let ledger = service.ledger();
    assert_eq!(ledger.transactions().len(), 2);
    assert_eq!(ledger.calculate_total_balance(), 100000);
    assert_eq!(
        ledger.transactions()[0].created_at.date().to_string(),
        "2024-01-15"
    );
    assert_eq!(ledger.next_transaction_id(), 3);

    Ok(())
}

#[tokio::test]
async fn test_record_transaction_validation() -> Result<()> {
    let (mut service, _temp) = test_service().await?;

    let result = service
        .record_transaction("Ram", -500, TransactionType::Sale, "", None)
        .await;
    assert!(matches!(result, Err(AppError::InvalidAmount(_))));

    let result = service
        .record_transaction("  ", 500, TransactionType::Sale, "", None)
        .await;
    assert!(matches!(result, Err(AppError::InvalidInput(_))));

    let tx = service
        .record_transaction("  Ram  ", 500, TransactionType::Expense, "", None)
        .await?;
    assert_eq!(tx.customer_name, "Ram");
    assert_eq!(tx.amount, -500);

    // Only the initial save and the one successful recording
    assert_eq!(service.list_snapshots(None).await?.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_import_and_restore() -> Result<()> {
    let (mut service, _temp) = test_service().await?;
    service
        .record_transaction("Gita", 700, TransactionType::Sale, "", None)
        .await?;
    let before_import = service.list_snapshots(Some(1)).await?.remove(0);

    let shop = ShopLedger::create();
    let mut json = Vec::new();
    Exporter::new(&shop).export_snapshot_json(&mut json)?;

    let validated = service
        .import_snapshot_json(json.as_slice(), ImportOptions { validate_only: true })
        .await?;
    assert!(!validated.applied);
    assert_eq!(service.ledger().transactions().len(), 1);

    let imported = service
        .import_snapshot_json(json.as_slice(), ImportOptions::default())
        .await?;
    assert!(imported.applied);
    assert_eq!(imported.transactions, 5);
    assert_eq!(service.ledger().calculate_total_balance(), shop.calculate_total_balance());
    assert!(service.ledger().customer("Gita").is_none());

    service.restore_snapshot(before_import.id).await?;
    assert_eq!(service.ledger().transactions().len(), 1);
    assert!(service.ledger().customer("Gita").is_some());

    Ok(())
}

#[tokio::test]
async fn test_malformed_import_is_a_ledger_error() -> Result<()> {
    let (mut service, _temp) = test_service().await?;

    let result = service
        .import_snapshot_json("{not json".as_bytes(), ImportOptions::default())
        .await;
    assert!(matches!(
        result,
        Err(AppError::Ledger(LedgerError::MalformedSnapshot(_)))
    ));

    Ok(())
}

#[tokio::test]
async fn test_restore_unknown_snapshot() -> Result<()> {
    let (mut service, _temp) = test_service().await?;

    let result = service.restore_snapshot(uuid::Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::SnapshotNotFound(_))));

    Ok(())
}

#[tokio::test]
async fn test_ask_records_history_without_touching_ledger() -> Result<()> {
    let (mut service, _temp) = test_service().await?;
    service
        .record_transaction("Ram", 1000, TransactionType::Sale, "", None)
        .await?;
    let before = service.ledger().export_data();

    let reply = service.ask(&EchoAssistant, "How is business?").await;
    assert!(reply.ends_with("chars"));

    let reply = service.ask(&BrokenAssistant, "And now?").await;
    assert!(reply.starts_with("Error: "));

    let history = service.session().chat_history();
    // Welcome message plus two question/reply pairs
    assert_eq!(history.len(), 5);
    assert_eq!(history[1].role, Role::User);
    assert_eq!(history[1].content, "How is business?");
    assert_eq!(history[4].role, Role::Assistant);
    assert_eq!(service.ledger().export_data(), before);

    Ok(())
}

#[tokio::test]
async fn test_connect_without_snapshot() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("bare.db");
    let url = format!("sqlite:{}?mode=rwc", db_path.display());
    khata::storage::Repository::init(&url).await?;

    let result = LedgerService::connect(db_path.to_str().unwrap(), Language::En).await;
    assert!(matches!(result, Err(AppError::NoSnapshot)));

    Ok(())
}

#[tokio::test]
async fn test_init_refuses_existing_ledger() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("khata.db");
    let path = db_path.to_str().unwrap();

    {
        let mut service = LedgerService::init(path, Language::En, false).await?;
        service
            .record_transaction("Gita", 700, TransactionType::Sale, "", None)
            .await?;
    }

    let result = LedgerService::init(path, Language::En, true).await;
    assert!(matches!(result, Err(AppError::AlreadyInitialized(_))));

    let service = LedgerService::connect(path, Language::En).await?;
    assert_eq!(service.ledger().transactions().len(), 1);
    assert!(service.ledger().customer("Gita").is_some());
    assert_eq!(service.list_snapshots(None).await?.len(), 2);

    Ok(())
}
