//! Configuration: an optional TOML file plus environment overrides.
//!
//! The recognized environment variables are `DATABASE_PATH`, `CHUNK_SIZE`,
//! `CHUNK_OVERLAP`, `TOP_K_CHUNKS`, and `SIMILARITY_THRESHOLD`; each
//! overrides the matching field after the file (or the defaults) is
//! loaded. A `.env` file is honored when the binary starts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/docquery.sqlite")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Maximum chunk length in chars.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Chars of the preceding text repeated at the head of each chunk.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}
fn default_chunk_overlap() -> usize {
    200
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Maximum fragments returned per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Minimum composite score for a fragment to count as relevant.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            threshold: default_threshold(),
        }
    }
}

fn default_top_k() -> usize {
    5
}
fn default_threshold() -> f64 {
    0.08
}

/// Load configuration: TOML file if given, defaults otherwise, then
/// environment overrides, then validation.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p)
                .with_context(|| format!("Failed to read config file: {}", p.display()))?;
            toml::from_str(&content).with_context(|| "Failed to parse config file")?
        }
        None => Config::default(),
    };

    apply_env_overrides(&mut config)?;

    if config.chunking.chunk_size == 0 {
        anyhow::bail!("chunking.chunk_size must be > 0");
    }
    if config.chunking.chunk_overlap >= config.chunking.chunk_size {
        anyhow::bail!("chunking.chunk_overlap must be < chunking.chunk_size");
    }
    if config.retrieval.top_k < 1 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }
    if config.retrieval.threshold < 0.0 {
        anyhow::bail!("retrieval.threshold must be >= 0");
    }

    Ok(config)
}

fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Ok(v) = std::env::var("DATABASE_PATH") {
        config.db.path = PathBuf::from(v);
    }
    if let Ok(v) = std::env::var("CHUNK_SIZE") {
        config.chunking.chunk_size = v
            .parse()
            .with_context(|| format!("CHUNK_SIZE must be an integer, got '{}'", v))?;
    }
    if let Ok(v) = std::env::var("CHUNK_OVERLAP") {
        config.chunking.chunk_overlap = v
            .parse()
            .with_context(|| format!("CHUNK_OVERLAP must be an integer, got '{}'", v))?;
    }
    if let Ok(v) = std::env::var("TOP_K_CHUNKS") {
        config.retrieval.top_k = v
            .parse()
            .with_context(|| format!("TOP_K_CHUNKS must be an integer, got '{}'", v))?;
    }
    if let Ok(v) = std::env::var("SIMILARITY_THRESHOLD") {
        config.retrieval.threshold = v
            .parse()
            .with_context(|| format!("SIMILARITY_THRESHOLD must be a number, got '{}'", v))?;
    }
    Ok(())
}
