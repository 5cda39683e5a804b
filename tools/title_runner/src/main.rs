use clap::{Parser, Subcommand};
use listing_core::category::resolver::CategoryResolver;
use listing_core::category::table::CategoryTable;
use listing_core::config::ServiceConfig;
use listing_core::entitlement::memory::InMemoryLedger;
use listing_core::error::CoreResult;
use listing_core::export::write_batch_csv;
use listing_core::generation::openai::ChatCompletionsGenerator;
use listing_core::keywords::related::lookup_related_keywords;
use listing_core::pipeline::batch::ItemInput;
use listing_core::pipeline::orchestrator::{Capabilities, NameSynthesisOrchestrator};
use listing_core::sources::naver::{SearchAdClient, ShoppingSearchClient};
use listing_core::sources::related::KeywordTableClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "title_runner")]
struct Cli {
    /// Service config JSON. Credentials may also come from the environment.
    #[arg(long, env = "TITLE_RUNNER_CONFIG")]
    config: Option<PathBuf>,

    /// Category table CSV replacing the bundled one.
    #[arg(long)]
    categories: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate titles for a JSON array of {productName, imageUrl}.
    Batch {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "local")]
        account: String,
        /// Units granted to the local ledger before the run.
        #[arg(long, default_value_t = 100)]
        units: u64,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Related keywords within the volume band.
    Related { keyword: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("title_runner error: {}", e);
            std::process::exit(2);
        }
    }
}

/// Ok(false) when at least one item failed.
async fn run(cli: Cli) -> CoreResult<bool> {
    let config = match &cli.config {
        Some(path) => ServiceConfig::load(path)?,
        None => {
            let mut cfg = ServiceConfig::default();
            cfg.apply_env_overrides(|k| std::env::var(k).ok());
            cfg
        }
    };
    let http = reqwest::Client::builder()
        .timeout(config.http_timeout())
        .build()?;

    match cli.command {
        Command::Related { keyword } => {
            let source = KeywordTableClient::new(http, &config.related)?;
            let banded =
                lookup_related_keywords(&source, &keyword, config.pipeline.volume_band).await?;
            println!("{}", serde_json::to_string_pretty(&banded)?);
            Ok(true)
        }
        Command::Batch {
            input,
            account,
            units,
            csv,
        } => {
            let items: Vec<ItemInput> = serde_json::from_str(&std::fs::read_to_string(&input)?)?;
            let table = match &cli.categories {
                Some(path) => CategoryTable::from_path(path)?,
                None => CategoryTable::bundled()?,
            };
            info!(categories = table.len(), items = items.len(), "starting batch");

            let caps = Capabilities {
                suggestions: Arc::new(SearchAdClient::new(http.clone(), &config.search_ad)?),
                listings: Arc::new(ShoppingSearchClient::new(http.clone(), &config.shopping)?),
                generator: Arc::new(ChatCompletionsGenerator::new(http, &config.generation)?),
                ledger: Arc::new(InMemoryLedger::with_account(&account, units)),
            };
            let orchestrator = Arc::new(NameSynthesisOrchestrator::new(
                Arc::new(CategoryResolver::new(table)),
                caps,
                config.pipeline.clone(),
            )?);

            let outcome = orchestrator.run_batch(&account, items).await?;
            if let Some(path) = csv {
                write_batch_csv(&outcome, &path)?;
                info!(path = %path.display(), "csv written");
            }
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(outcome.failed_count() == 0)
        }
    }
}
