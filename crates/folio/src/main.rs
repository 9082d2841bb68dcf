use anyhow::Result;
use clap::{Parser, Subcommand};
use folio_common::{logger, AppConfig};
use folio_vector::{RecordKind, SearchRequest, VectorSearchEngine, DEFAULT_TOP_K};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    match find_project_root().map(|root| root.join(".env")) {
        Some(env_path) if env_path.exists() => {
            dotenv::from_path(&env_path).ok();
        }
        _ => {
            dotenv::dotenv().ok();
        }
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio - semantic search over blog posts and documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,

        /// Database path
        #[arg(long)]
        db_path: Option<PathBuf>,
    },

    /// Regenerate missing and stale embeddings
    Refresh {
        /// Regenerate every embedding, fresh or not
        #[arg(long)]
        force: bool,
    },

    /// Rank records against a query
    Search {
        /// Query text
        query: String,

        /// Number of results
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,

        /// Restrict to a record kind (blog, file, folder, link)
        #[arg(long)]
        kind: Option<RecordKind>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_dotenv_from_project_root();
    let mut config = AppConfig::from_env()?;

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            db_path,
        }) => {
            if let Some(host) = host {
                config.server_host = host;
            }
            if let Some(port) = port {
                config.server_port = port;
            }
            if let Some(db_path) = db_path {
                config.records_path = db_path.join("records.json");
                config.db_base_path = db_path;
                config.ensure_directories()?;
            }
            serve(config).await
        }
        Some(Commands::Refresh { force }) => refresh(config, force).await,
        Some(Commands::Search { query, top_k, kind }) => search(config, query, top_k, kind).await,
        None => serve(config).await,
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    logger::setup_logging(&config.log_dir, &config.log_level)?;

    tracing::info!("Folio starting...");
    tracing::info!("  Address: {}", config.server_bind_address());
    tracing::info!("  Records: {}", config.records_path.display());
    tracing::info!("  Model: {} ({} dims)", config.embedding_model, config.embedding_dim);

    folio_server::start_server(config).await?;
    Ok(())
}

async fn refresh(config: AppConfig, force: bool) -> Result<()> {
    logger::setup_console_logging("warn")?;
    config.validate()?;
    let engine = VectorSearchEngine::from_config(&config).await?;

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")?
            .progress_chars("#>-"),
    );

    let report = engine
        .refresh(force, |progress| {
            bar.set_length(progress.total as u64);
            bar.set_position(progress.processed as u64);
        })
        .await?;
    bar.finish_and_clear();

    println!(
        "Refreshed {} records: {} succeeded, {} failed",
        report.total(),
        report.succeeded(),
        report.failed()
    );
    for failure in report.failures() {
        println!(
            "  {}: {}",
            failure.id,
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(())
}

async fn search(
    config: AppConfig,
    query: String,
    top_k: usize,
    kind: Option<RecordKind>,
) -> Result<()> {
    logger::setup_console_logging("warn")?;
    config.validate()?;
    let engine = VectorSearchEngine::from_config(&config).await?;

    let request = SearchRequest::new(query, top_k)?.with_kind(kind);
    let hits = engine.search(&request).await?;

    if hits.is_empty() {
        println!("No matching records");
    }
    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{:>2}. {:.4}  [{}] {}  ({})",
            rank + 1,
            hit.score,
            hit.kind,
            hit.title,
            hit.id
        );
    }

    Ok(())
}
