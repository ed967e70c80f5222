//! # docquery CLI (`dq`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dq init` | Create the SQLite database and run schema migrations |
//! | `dq ingest <file>` | Chunk and index a plain-text file |
//! | `dq query "<text>"` | Rank stored fragments against a query |
//! | `dq list` | List indexed documents |
//! | `dq delete <id>` | Remove a document and its fragments |
//!
//! ## Examples
//!
//! ```bash
//! dq init
//! dq ingest noi-quy.txt --name "Nội quy 2024"
//! dq query "quy chế thi của trường" --top-k 3
//! dq query "hoc phi" --explain
//! dq list
//! ```
//!
//! Text extraction (PDF parsing, OCR) happens upstream; `dq ingest` takes
//! plain text only. Configuration comes from an optional TOML file plus
//! the `CHUNK_SIZE`, `CHUNK_OVERLAP`, `TOP_K_CHUNKS`,
//! `SIMILARITY_THRESHOLD`, and `DATABASE_PATH` environment variables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docquery::config::load_config;
use docquery::engine::RetrievalEngine;
use docquery::store::sqlite::SqliteStore;
use docquery::{db, migrate};

/// docquery — keyword-based document retrieval for Vietnamese QA
/// assistants.
#[derive(Parser)]
#[command(
    name = "dq",
    about = "docquery — keyword-based document retrieval for Vietnamese QA assistants",
    version
)]
struct Cli {
    /// Path to a TOML configuration file. Environment variables override
    /// file values; defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Idempotent.
    Init,

    /// Chunk and index a plain-text file.
    Ingest {
        /// Path to the text file.
        file: PathBuf,
        /// Display name for the document; defaults to the file name.
        #[arg(long)]
        name: Option<String>,
    },

    /// Rank stored fragments against a query.
    Query {
        /// The query text.
        query: String,
        /// Maximum fragments to return.
        #[arg(long)]
        top_k: Option<usize>,
        /// Minimum composite score.
        #[arg(long)]
        threshold: Option<f64>,
        /// Print the per-factor score breakdown as JSON.
        #[arg(long)]
        explain: bool,
    },

    /// List indexed documents, newest first.
    List,

    /// Remove a document and all of its fragments.
    Delete {
        /// Document id.
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&config).await?;
            migrate::run_migrations(&pool).await?;
            pool.close().await;
            println!("initialized {}", config.db.path.display());
        }
        Commands::Ingest { file, name } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let name = name.unwrap_or_else(|| {
                file.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file.display().to_string())
            });

            let engine = open_engine(&config).await?;
            let record = engine.ingest(&text, &name).await?;
            println!("ingested {}", record.name);
            println!("  id: {}", record.id);
            println!("  fragments: {}", record.fragment_count);
        }
        Commands::Query {
            query,
            top_k,
            threshold,
            explain,
        } => {
            let engine = open_engine(&config).await?;
            let hits = engine.search(&query, top_k, threshold).await?;
            if hits.is_empty() {
                println!("no relevant fragments");
            } else if explain {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else {
                for (i, hit) in hits.iter().enumerate() {
                    println!("{}. [{:.3}] {}", i + 1, hit.score, hit.text.trim());
                }
            }
        }
        Commands::List => {
            let engine = open_engine(&config).await?;
            let records = engine.list_documents().await?;
            if records.is_empty() {
                println!("no documents");
            }
            for r in records {
                println!(
                    "{}  {}  {} fragments  {}",
                    r.id, r.created_at, r.fragment_count, r.name
                );
            }
        }
        Commands::Delete { id } => {
            let engine = open_engine(&config).await?;
            if engine.delete_document(&id).await? {
                println!("deleted {id}");
            } else {
                println!("no document with id {id}");
            }
        }
    }

    Ok(())
}

async fn open_engine(
    config: &docquery::config::Config,
) -> Result<RetrievalEngine<SqliteStore>> {
    let pool = db::connect(config).await?;
    migrate::run_migrations(&pool).await?;
    Ok(RetrievalEngine::new(
        SqliteStore::new(pool),
        config.clone(),
    ))
}
