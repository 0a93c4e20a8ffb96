use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{HttpBackendGateway, MutationIntent, ViewSynchronizer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod session;

use config::load_config;
use render::Printer;
use session::read_upload;

#[derive(Parser, Debug)]
#[command(name = "merchantlens", about = "MerchantLens sales, sentiment and pricing dashboard")]
struct Cli {
    /// Analytics backend location, e.g. http://localhost:8000
    #[arg(long, global = true)]
    backend_url: Option<String>,
    /// Config file; defaults to ./merchantlens.toml when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print JSON instead of the text dashboard
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and show the dashboard
    View,
    /// Upload sales and/or reviews CSV datasets, then refresh
    Upload {
        #[arg(long)]
        sales: Option<PathBuf>,
        #[arg(long)]
        reviews: Option<PathBuf>,
    },
    /// Ask the backend a natural-language question, then refresh
    Query {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Keep the dashboard open and accept commands from stdin
    Interactive,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), cli.backend_url.as_deref()).await?;
    info!(backend = config.backend_base_url(), "using analytics backend");
    let sync = ViewSynchronizer::new(Arc::new(HttpBackendGateway::new(config)));
    let printer = Printer { json: cli.json };

    let intent = match cli.command {
        Command::View => {
            let view = sync.refresh().await;
            printer.view(&view, sync.last_refreshed_at().await)?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Interactive => {
            session::run(&sync, printer).await?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Upload { sales, reviews } => MutationIntent::upload(
            read_upload(sales.as_deref()).await?,
            read_upload(reviews.as_deref()).await?,
        ),
        Command::Query { text } => MutationIntent::query(text.join(" ")),
    };

    // Entering the view loads it once; a successful submission re-reads it.
    sync.refresh().await;
    let result = sync.submit(intent).await;
    printer.mutation(&result, &sync.current_view().await, sync.last_refreshed_at().await)?;

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
