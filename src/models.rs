//! Core data models for the retrieval pipeline.

use serde::Serialize;

/// An ingested source text. Immutable once created; deleting it cascades
/// to all of its chunks.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub name: String,
    /// Unix seconds.
    pub created_at: i64,
    /// Short excerpt of the source text, for listings.
    pub preview: Option<String>,
}

/// A contiguous slice of a document's text, the unit of retrieval.
///
/// `chunk_index` values are unique and contiguous within a document and
/// reflect ingestion order. Chunks are write-once.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    pub document_id: String,
    pub chunk_index: i64,
    pub text: String,
    /// SHA-256 of the chunk text.
    pub hash: String,
    /// Unix seconds.
    pub created_at: i64,
}

/// Summary of a stored document, returned from ingestion and listings.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
    pub id: String,
    pub name: String,
    /// ISO 8601.
    pub created_at: String,
    pub fragment_count: i64,
}

/// Format a Unix timestamp as ISO 8601.
pub fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}
