// In app/src/main.rs

use std::sync::Arc;

use anyhow::Result;
use api_client::{CommentaryClient, ForecastClient, MarketDataClient};
use app_config::Settings;
use clap::{Parser, Subcommand};
use engine::{BacktestRequest, Engine, SeriesRange};
use signal_cache::SignalCache;
use tracing_subscriber::prelude::*;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "A moving-average crossover signal service.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the HTTP service. This is the default when no subcommand is given.
    Serve,

    /// Runs a single backtest against the configured data service and prints
    /// the summary as JSON.
    Backtest {
        /// The symbol to backtest (e.g. "GC=F").
        #[arg(short, long, default_value = "GC=F")]
        symbol: String,

        /// Relative period understood by the data service (e.g. "2y", "6mo").
        #[arg(short, long, default_value = "2y")]
        period: String,

        /// Optional start date; together with --end it overrides --period.
        #[arg(long)]
        start: Option<String>,

        /// Optional end date.
        #[arg(long)]
        end: Option<String>,

        /// Provider hint passed through to the data service.
        #[arg(long)]
        provider: Option<String>,

        /// Also ask the commentary model for a short narrative.
        #[arg(long)]
        with_llm: bool,
    },
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(
        tracing_subscriber::filter::Targets::new()
            .with_target("hyper", tracing::Level::WARN)
            .with_target("reqwest", tracing::Level::WARN)
            .with_default(tracing::Level::INFO),
    );
    tracing_subscriber::registry().with(fmt_layer).init();

    // Parse command-line arguments.
    let cli = Cli::parse();

    let settings = app_config::load_settings()?;
    tracing::info!("Application settings loaded successfully.");

    let engine = Arc::new(build_engine(&settings)?);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            run_serve(settings, engine).await?;
        }
        Commands::Backtest {
            symbol,
            period,
            start,
            end,
            provider,
            with_llm,
        } => {
            handle_backtest(&engine, symbol, period, start, end, provider, with_llm).await?;
        }
    }

    Ok(())
}

/// Wires the upstream clients and the shared cache into the engine.
fn build_engine(settings: &Settings) -> Result<Engine> {
    let services = &settings.services;

    let market = MarketDataClient::new(&services.data_url, services.data_timeout())?;
    let forecast = ForecastClient::new(&services.transformer_url, services.predict_timeout())?;
    let commentary = CommentaryClient::new(
        &services.ollama_url,
        &settings.commentary.model,
        services.generate_timeout(),
    )?;

    Ok(Engine::new(market, forecast, commentary, SignalCache::new()))
}

// --- "Serve" Subcommand Logic ---

/// Starts the HTTP service and runs until the process is terminated.
async fn run_serve(settings: Settings, engine: Arc<Engine>) -> Result<()> {
    tracing::info!("Starting signal engine service");
    web_server::run(settings.server, engine).await?;
    Ok(())
}

// --- "Backtest" Subcommand Logic ---

/// Runs one backtest from the command line and prints the summary.
async fn handle_backtest(
    engine: &Engine,
    symbol: String,
    period: String,
    start: Option<String>,
    end: Option<String>,
    provider: Option<String>,
    with_llm: bool,
) -> Result<()> {
    let range = if start.is_some() || end.is_some() {
        SeriesRange::Dates { start, end }
    } else {
        SeriesRange::Period(period)
    };

    let summary = engine
        .run_backtest(BacktestRequest {
            symbol,
            range,
            provider,
            with_llm,
        })
        .await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
