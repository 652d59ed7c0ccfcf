//! Loads sample trades into a running Trade Records API.

use anyhow::{Context, bail};
use clap::Parser;
use std::path::PathBuf;
use trade_client::TradeClient;
use trade_client::loader::{clear_all_trades, load_trades, read_trades};

#[derive(Parser, Debug)]
#[command(name = "load-sample-data")]
#[command(about = "Load sample data into the Trade Records API")]
struct Cli {
    /// API base URL
    #[arg(long, default_value = "http://localhost:5000")]
    url: String,

    /// Sample data file (JSON array of trades)
    #[arg(long, default_value = "data/sample_trades.json")]
    file: PathBuf,

    /// Clear all existing trades first
    #[arg(long)]
    clear: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    println!("Trade Records API Data Loader");
    println!("{}", "=".repeat(40));

    let client = TradeClient::with_base_url(&cli.url)?;
    client
        .health_check()
        .await
        .with_context(|| format!("API at {} is not reachable or unhealthy", cli.url))?;
    println!("API is healthy at {}", cli.url);

    if cli.clear {
        let deleted = clear_all_trades(&client).await?;
        println!("Deleted {deleted} existing trades\n");
    }

    let trades = read_trades(&cli.file)
        .with_context(|| format!("cannot load sample file {}", cli.file.display()))?;
    println!("Loaded {} sample trades from {}", trades.len(), cli.file.display());

    let summary = load_trades(&client, &trades).await;

    println!("\n{}", "=".repeat(50));
    println!("SUMMARY");
    println!("{}", "=".repeat(50));
    println!("Successfully created: {} trades", summary.created.len());
    println!("Failed to create: {} trades", summary.failed.len());

    if !summary.failed.is_empty() {
        println!("\nFailed trades:");
        for failed in &summary.failed {
            println!(
                "  - Trade {} ({}): {}",
                failed.index, failed.symbol, failed.error
            );
        }
    }

    if !summary.created.is_empty() {
        println!("\nCreated trade IDs:");
        for trade_id in &summary.created {
            println!("  - {trade_id}");
        }
    }

    let listing = client.list_trades().await?;
    println!("\nTotal trades in API: {}", listing.count);

    if !summary.is_complete() {
        bail!(
            "{} of {} trades failed to load",
            summary.failed.len(),
            summary.total()
        );
    }

    println!("\nYou can now query the API:");
    println!("  curl {}/api/trades", client.base_url());
    println!("  curl {}/health", client.base_url());

    Ok(())
}
