use anyhow::Result;
use clap::Parser;
use khata::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.configure_logging()?;
    cli.run().await
}
