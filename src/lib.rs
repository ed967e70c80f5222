//! # docquery
//!
//! A keyword-based document retrieval engine for Vietnamese
//! question-answering assistants.
//!
//! Given a user query, docquery surfaces the most relevant previously
//! ingested text fragments so a caller can fold them into a prompt. No
//! embeddings are involved: relevance comes from a four-factor lexical
//! blend (Jaccard overlap, keyword frequency, keyword position, verbatim
//! phrase match) computed over raw and diacritic-folded token streams,
//! which tolerates the inconsistent accent usage common in Vietnamese
//! input.
//!
//! ## Architecture
//!
//! ```text
//! ingest text ──▶ Chunker ──▶ ChunkStore (SQLite / memory)
//!                                  │
//! query ──▶ Scorer ◀── snapshot ───┘
//!              │
//!              ▼
//!      ranked fragments ──▶ caller
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`text`] | Diacritic folding, tokenization, stop-word filtering |
//! | [`chunk`] | Overlapping separator-hierarchy chunker |
//! | [`score`] | Four-factor relevance scoring and ranking |
//! | [`store`] | `ChunkStore` trait, memory and SQLite backends |
//! | [`engine`] | Ingestion and query facade |
//! | [`config`] | TOML + environment configuration |
//! | [`db`] | SQLite pool |
//! | [`migrate`] | Schema migrations |

pub mod chunk;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod migrate;
pub mod models;
pub mod score;
pub mod store;
pub mod text;
