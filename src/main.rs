//! Command-line entry point for the kite opportunity consumer.

use clap::{Parser, Subcommand};
use eyre::{Error, Result};
use log::info;

use kite::models::request::{CalculateRequest, ScanMode};
use kite::sync;
use kite::sync::backend;
use kite::utils::app_context::AppContext;
use kite::utils::logger::setup_logger;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Asset to start arbitrage cycles from
    #[arg(long, default_value = "USDT", global = true)]
    start_coin: String,

    /// Capital to simulate cycles with
    #[arg(long, default_value_t = 1000.0, global = true)]
    start_amount: f64,

    /// Where paths are allowed to end
    #[arg(long, value_enum, default_value = "both", global = true)]
    mode: ScanMode,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the backend on an interval and print reconciled snapshots
    Watch,
    /// Run one streaming calculate and print records as they decode
    Stream,
    /// Run one non-streaming calculate and print the batch
    Fetch,
    /// Ask the backend to refresh its market data
    Refresh,
    /// Show the backend's market-graph summary
    Info,
    /// Check backend health
    Health,
}

impl Cli {
    fn request(&self) -> CalculateRequest {
        CalculateRequest {
            start_coin: self.start_coin.clone(),
            start_amount: self.start_amount,
            mode: self.mode,
        }
    }
}

async fn stream_once(ctx: &AppContext, request: CalculateRequest) -> Result<()> {
    let batch = backend::calculate_stream(ctx, &request, |record| {
        println!("  {:>8.4}%  {}", record.profit(), record.key());
    })
    .await?;
    println!(
        "\nStream complete: {} opportunities",
        batch.opportunities.len()
    );
    Ok(())
}

async fn fetch_once(ctx: &AppContext, request: CalculateRequest) -> Result<()> {
    let batch = backend::calculate(ctx, &request).await?;
    for opp in &batch.opportunities {
        println!("  {:>8.4}%  {}", opp.profit(), opp.key());
    }
    println!("{} opportunities", batch.opportunities.len());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    setup_logger().expect("Failed to set up logger");

    let cli = Cli::parse();
    let ctx = AppContext::new()?;

    info!("Connected to backend at {}", ctx.config.backend_url);

    match cli.command {
        Some(Commands::Stream) => {
            stream_once(&ctx, cli.request()).await?;
        }
        Some(Commands::Fetch) => {
            fetch_once(&ctx, cli.request()).await?;
        }
        Some(Commands::Refresh) => {
            backend::refresh(&ctx).await?;
            println!("Backend refresh triggered");
        }
        Some(Commands::Info) => {
            let info = backend::graph_info(&ctx).await?;
            println!(
                "{} coins, {} pairs, {} edges, last updated {}",
                info.total_coins, info.total_pairs, info.total_edges, info.last_updated
            );
        }
        Some(Commands::Health) => {
            let health = backend::health(&ctx).await?;
            println!("{} at {}", health.status, health.timestamp);
        }
        Some(Commands::Watch) | None => {
            // Default behavior when no subcommand is provided
            sync::start(ctx, cli.request()).await?;
        }
    }

    Ok(())
}
