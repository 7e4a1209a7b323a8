use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use uuid::Uuid;

use crate::application::{AppError, ChatMessage, CommandAssistant, Language, LedgerService, Role};
use crate::domain::{
    ALL_TYPES, DEFAULT_TOP_CUSTOMERS, Transaction, TransactionFilter, TransactionType,
    format_cents, format_currency, parse_cents,
};

/// Khata - Small Business Ledger
#[derive(Parser)]
#[command(name = "khata")]
#[command(about = "A small business ledger with customer balances, insights and an AI assistant")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(long, default_value = "khata.db", global = true)]
    pub database: String,

    /// Language for assistant replies (en, hi, bn, ta, te, mr, gu, kn, ml, pa, or)
    #[arg(short, long, default_value = "hi", global = true)]
    pub language: Language,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database (fails if it already holds a ledger)
    Init {
        /// Start without the sample transactions
        #[arg(long)]
        empty: bool,
    },

    /// Record a transaction
    Add {
        /// Amount (e.g., "1500" or "1500.00")
        amount: String,

        /// Customer or party name
        #[arg(short, long)]
        customer: String,

        /// Transaction type: credit, debit, sale, expense
        #[arg(short = 't', long = "type")]
        transaction_type: String,

        /// Description of the transaction
        #[arg(short, long, default_value = "")]
        description: String,

        /// Date of the transaction (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show the total balance, or one customer's balance
    Balance {
        /// Customer name (omit for all customers)
        customer: Option<String>,
    },

    /// List transactions
    Transactions {
        /// Filter by type: All, Credit, Debit, Sale, Expense
        #[arg(short = 't', long = "type", default_value = ALL_TYPES)]
        transaction_type: String,

        /// Filter from date (YYYY-MM-DD)
        #[arg(long)]
        from_date: Option<String>,

        /// Filter to date (YYYY-MM-DD)
        #[arg(long)]
        to_date: Option<String>,

        /// Filter by part of the customer name
        #[arg(short, long)]
        customer: Option<String>,

        /// Output format: table, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Rank customers by sales and credit
    Top {
        /// Number of customers to show
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_CUSTOMERS)]
        limit: usize,
    },

    /// Business totals and top customers
    Insights {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Verify ledger integrity
    Check,

    /// Export data to JSON or CSV
    Export {
        /// What to export: snapshot (JSON), transactions (CSV), customers (CSV)
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Replace the ledger with a JSON snapshot
    Import {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Validate without importing
        #[arg(long)]
        validate: bool,
    },

    /// List saved snapshots
    Snapshots {
        /// Maximum number of snapshots to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Restore an earlier snapshot as the current ledger
    Restore {
        /// Snapshot ID
        id: String,
    },

    /// Ask the assistant a single question
    Ask {
        /// The question
        question: String,

        /// Command that reads a prompt on stdin and prints a reply
        #[arg(long, env = "KHATA_ASSISTANT_CMD")]
        assistant_cmd: String,
    },

    /// Chat with the assistant interactively
    Chat {
        /// Command that reads a prompt on stdin and prints a reply
        #[arg(long, env = "KHATA_ASSISTANT_CMD")]
        assistant_cmd: String,
    },

    /// List supported languages
    Languages,
}

impl Cli {
    /// Log to stderr at `warn`, or `debug` with --verbose. RUST_LOG overrides both.
    pub fn configure_logging(&self) -> Result<()> {
        let level = if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        };
        SimpleLogger::new()
            .with_level(level)
            .env()
            .init()
            .context("Failed to initialize logging")?;
        Ok(())
    }

    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init { empty } => {
                let service = LedgerService::init(&self.database, self.language, !empty).await?;
                println!("Database initialized: {}", self.database);
                if !empty {
                    println!(
                        "Loaded {} sample transactions",
                        service.ledger().transactions().len()
                    );
                }
            }

            Commands::Languages => {
                for lang in Language::ALL {
                    println!("{:<4} {}", lang.code(), lang.display_name());
                }
            }

            command => {
                let mut service = connect(&self.database, self.language).await?;
                run_command(&mut service, command).await?;
            }
        }

        Ok(())
    }
}

async fn connect(database: &str, language: Language) -> Result<LedgerService> {
    if !std::path::Path::new(database).exists() {
        return Err(AppError::NoSnapshot.into());
    }
    Ok(LedgerService::connect(database, language).await?)
}

async fn run_command(service: &mut LedgerService, command: Commands) -> Result<()> {
    match command {
        Commands::Add {
            amount,
            customer,
            transaction_type,
            description,
            date,
        } => {
            let amount_cents =
                parse_cents(&amount).context("Invalid amount format. Use '1500.00' or '1500'")?;
            let transaction_type: TransactionType = transaction_type.parse()?;
            let date = date.as_deref().map(parse_date).transpose()?;

            let tx = service
                .record_transaction(&customer, amount_cents, transaction_type, &description, date)
                .await?;

            println!(
                "Recorded {} #{}: {} {}",
                tx.transaction_type,
                tx.id,
                tx.customer_name,
                format_currency(tx.amount)
            );
            println!(
                "Total balance: {}",
                format_currency(service.ledger().calculate_total_balance())
            );
        }

        Commands::Balance { customer } => run_balance_command(service, customer)?,

        Commands::Transactions {
            transaction_type,
            from_date,
            to_date,
            customer,
            format,
        } => {
            let mut filter = TransactionFilter::new().with_type(transaction_type);
            if let Some(date) = from_date {
                filter = filter.with_start_date(parse_date(&date)?);
            }
            if let Some(date) = to_date {
                filter = filter.with_end_date(parse_date(&date)?);
            }
            if let Some(name) = customer {
                filter = filter.with_customer_name(name);
            }
            run_transactions_command(service, &filter, &format)?;
        }

        Commands::Top { limit } => {
            let top = service.ledger().get_top_customers(limit);
            if top.is_empty() {
                println!("No sales or credit recorded yet.");
            } else {
                println!("{:<4} {:<24} {:>16}", "#", "CUSTOMER", "AMOUNT");
                println!("{}", "-".repeat(46));
                for (rank, customer) in top.iter().enumerate() {
                    println!(
                        "{:<4} {:<24} {:>16}",
                        rank + 1,
                        truncate(&customer.name, 24),
                        format_currency(customer.amount)
                    );
                }
            }
        }

        Commands::Insights { format } => {
            let insights = service.ledger().generate_business_insights();
            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&insights)?),
                _ => {
                    println!("Business Insights");
                    println!("{}", "-".repeat(36));
                    println!("{:<18} {:>17}", "Total Balance", format_currency(insights.total_balance));
                    println!("{:<18} {:>17}", "Total Sales", format_currency(insights.total_sales));
                    println!("{:<18} {:>17}", "Total Expenses", format_currency(insights.total_expenses));
                    println!("{:<18} {:>17}", "Total Credit", format_currency(insights.total_credit));
                    println!("{:<18} {:>17}", "Total Debit", format_currency(insights.total_debit));
                    println!("{}", "-".repeat(36));
                    println!("{:<18} {:>17}", "Net Profit", format_currency(insights.net_profit));
                    println!();
                    println!(
                        "Transactions: {}  Customers: {}",
                        insights.transaction_count, insights.customer_count
                    );
                    if !insights.top_customers.is_empty() {
                        println!();
                        println!("Top customers:");
                        for (rank, customer) in insights.top_customers.iter().enumerate() {
                            println!(
                                "  {}. {:<24} {:>16}",
                                rank + 1,
                                truncate(&customer.name, 24),
                                format_currency(customer.amount)
                            );
                        }
                    }
                }
            }
        }

        Commands::Check => {
            let report = service.check_integrity();

            println!("Ledger Integrity Check");
            println!("======================");
            println!("Transactions: {}", report.transaction_count);
            println!("Customers:    {}", report.customer_count);
            println!(
                "Total balance: {} (customers: {})",
                format_cents(report.total_balance),
                format_cents(report.customer_balance_sum)
            );
            println!();

            if report.is_healthy() {
                println!("✓ Ledger is healthy");
            } else {
                println!("✗ Found {} issue(s):", report.issues.len());
                for issue in &report.issues {
                    println!("  - {}", issue);
                }
            }
        }

        Commands::Export {
            export_type,
            output,
        } => run_export_command(service, &export_type, output.as_deref())?,

        Commands::Import { input, validate } => {
            run_import_command(service, input.as_deref(), validate).await?
        }

        Commands::Snapshots { limit } => {
            let snapshots = service.list_snapshots(limit).await?;
            println!(
                "{:<38} {:<20} {:>6} {:>6} {:>16}",
                "ID", "SAVED", "TXNS", "CUST", "BALANCE"
            );
            println!("{}", "-".repeat(90));
            for info in snapshots {
                println!(
                    "{:<38} {:<20} {:>6} {:>6} {:>16}",
                    info.id,
                    info.saved_at.format("%Y-%m-%d %H:%M:%S"),
                    info.transaction_count,
                    info.customer_count,
                    format_currency(info.total_balance)
                );
            }
        }

        Commands::Restore { id } => {
            let snapshot_id =
                Uuid::parse_str(&id).context("Invalid snapshot ID format (expected UUID)")?;
            service.restore_snapshot(snapshot_id).await?;
            println!(
                "Restored snapshot {}: {} transactions, balance {}",
                snapshot_id,
                service.ledger().transactions().len(),
                format_currency(service.ledger().calculate_total_balance())
            );
        }

        Commands::Ask {
            question,
            assistant_cmd,
        } => {
            let assistant = parse_assistant(&assistant_cmd)?;
            let reply = service.ask(&assistant, &question).await;
            println!("{}", reply);
        }

        Commands::Chat { assistant_cmd } => {
            let assistant = parse_assistant(&assistant_cmd)?;
            run_chat(service, &assistant).await?;
        }

        // Handled in `Cli::run` without opening the ledger
        Commands::Init { .. } | Commands::Languages => {}
    }

    Ok(())
}

fn run_balance_command(service: &LedgerService, customer: Option<String>) -> Result<()> {
    let ledger = service.ledger();

    match customer {
        Some(name) => {
            let customer = ledger
                .customer(&name)
                .with_context(|| format!("Customer not found: {}", name))?;
            let status = if customer.owes_business() {
                " (owes you)"
            } else if customer.balance < 0 {
                " (you owe)"
            } else {
                ""
            };
            println!(
                "{}: {}{}",
                customer.name,
                format_currency(customer.balance),
                status
            );
        }
        None => {
            if ledger.customers().is_empty() {
                println!("No customers found.");
            } else {
                println!("{:<6} {:<24} {:>16}", "ID", "CUSTOMER", "BALANCE");
                println!("{}", "-".repeat(48));
                for customer in ledger.customers() {
                    println!(
                        "{:<6} {:<24} {:>16}",
                        customer.id,
                        truncate(&customer.name, 24),
                        format_currency(customer.balance)
                    );
                }
                println!("{}", "-".repeat(48));
            }
            println!(
                "Total Balance: {}",
                format_currency(ledger.calculate_total_balance())
            );
        }
    }
    Ok(())
}

fn run_transactions_command(
    service: &LedgerService,
    filter: &TransactionFilter,
    format: &str,
) -> Result<()> {
    use crate::io::Exporter;

    if format == "csv" {
        Exporter::new(service.ledger()).export_transactions_csv(std::io::stdout(), filter)?;
        return Ok(());
    }

    let transactions = service.ledger().get_filtered_transactions(filter);
    if transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!(
        "{:<6} {:<10} {:<20} {:<8} {:>16}  {}",
        "ID", "DATE", "CUSTOMER", "TYPE", "AMOUNT", "DESCRIPTION"
    );
    println!("{}", "-".repeat(90));
    for tx in &transactions {
        print_transaction(tx);
    }
    println!("{}", "-".repeat(90));
    println!("{} transaction(s)", transactions.len());
    Ok(())
}

fn print_transaction(tx: &Transaction) {
    println!(
        "{:<6} {:<10} {:<20} {:<8} {:>16}  {}",
        tx.id,
        tx.created_at.format("%d/%m/%Y"),
        truncate(&tx.customer_name, 20),
        tx.transaction_type,
        format_currency(tx.amount),
        tx.description
    );
}

fn run_export_command(
    service: &LedgerService,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service.ledger());

    // Determine output writer
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "snapshot" => {
            let snapshot = exporter.export_snapshot_json(writer)?;
            if output.is_some() {
                eprintln!(
                    "Exported snapshot: {} transactions, {} customers",
                    snapshot.transactions.len(),
                    snapshot.customers.len()
                );
            }
        }
        "transactions" => {
            let count =
                exporter.export_transactions_csv(writer, &TransactionFilter::new())?;
            if output.is_some() {
                eprintln!("Exported {} transactions", count);
            }
        }
        "customers" => {
            let count = exporter.export_customers_csv(writer)?;
            if output.is_some() {
                eprintln!("Exported {} customers", count);
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: snapshot, transactions, customers",
                export_type
            );
        }
    }

    Ok(())
}

async fn run_import_command(
    service: &mut LedgerService,
    input: Option<&str>,
    validate: bool,
) -> Result<()> {
    use crate::io::ImportOptions;
    use std::fs::File;
    use std::io::{Read, stdin};

    // Determine input reader
    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let result = service
        .import_snapshot_json(
            reader,
            ImportOptions {
                validate_only: validate,
            },
        )
        .await?;

    if result.applied {
        println!("Import complete");
    } else {
        println!("Validation successful");
    }
    println!("  Transactions: {}", result.transactions);
    println!("  Customers:    {}", result.customers);

    Ok(())
}

async fn run_chat(service: &mut LedgerService, assistant: &CommandAssistant) -> Result<()> {
    use std::io::Write;
    use tokio::io::{AsyncBufReadExt, BufReader, stdin};

    for message in service.session().chat_history() {
        print_chat_message(message);
    }
    println!("(type 'exit' to leave)");

    let mut lines = BufReader::new(stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }

        let reply = service.ask(assistant, question).await;
        println!("{}", reply);
    }

    Ok(())
}

fn print_chat_message(message: &ChatMessage) {
    let speaker = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    println!("[{}] {}", speaker, message.content.trim());
}

fn parse_assistant(command_line: &str) -> Result<CommandAssistant> {
    CommandAssistant::from_command_line(command_line)
        .context("Assistant command is empty. Pass --assistant-cmd or set KHATA_ASSISTANT_CMD")
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str))
}
