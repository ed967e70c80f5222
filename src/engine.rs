//! Retrieval facade: the only component collaborators talk to.
//!
//! Ingestion: validate → chunk → persist behind one commit. Query:
//! snapshot all chunks → score → rank → threshold → truncate. The scorer
//! holds no state; every query is evaluated fresh against the snapshot,
//! an O(N·Q) full scan. That trade keeps ingestion trivial and is fine
//! for corpora of hundreds to low thousands of fragments; a larger
//! deployment would swap the [`ChunkStore`] behind this facade.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::chunk::{make_chunk, split};
use crate::config::Config;
use crate::error::RetrievalError;
use crate::models::{format_ts_iso, Document, DocumentRecord};
use crate::score::{self, ScoredFragment};
use crate::store::ChunkStore;

/// Trimmed texts shorter than this are rejected as having no extractable
/// content.
pub const MIN_INGEST_CHARS: usize = 50;

/// Fragments folded into a prompt for one-shot context injection.
pub const CONTEXT_TOP_K: usize = 3;

/// Chars of source text kept as the document preview.
const PREVIEW_CHARS: usize = 240;

pub struct RetrievalEngine<S: ChunkStore> {
    store: S,
    config: Config,
}

impl<S: ChunkStore> RetrievalEngine<S> {
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Chunk `text` and persist it as a new document named `name`.
    ///
    /// All chunks land behind a single commit: a concurrent query sees
    /// either the whole document or none of it.
    pub async fn ingest(&self, text: &str, name: &str) -> Result<DocumentRecord, RetrievalError> {
        let trimmed = text.trim();
        let length = trimmed.chars().count();
        if length < MIN_INGEST_CHARS {
            return Err(RetrievalError::EmptyDocument {
                name: name.to_string(),
                length,
                min: MIN_INGEST_CHARS,
            });
        }

        let now = Utc::now().timestamp();
        let doc = Document {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: now,
            preview: Some(trimmed.chars().take(PREVIEW_CHARS).collect()),
        };

        let pieces = split(
            text,
            self.config.chunking.chunk_size,
            self.config.chunking.chunk_overlap,
        );
        let chunks: Vec<_> = pieces
            .iter()
            .enumerate()
            .map(|(i, piece)| make_chunk(&doc.id, i as i64, piece, now))
            .collect();

        self.store
            .insert_document(&doc, &chunks)
            .await
            .map_err(RetrievalError::Store)?;

        info!(
            document_id = %doc.id,
            name,
            fragments = chunks.len(),
            "ingested document"
        );

        Ok(DocumentRecord {
            id: doc.id,
            name: doc.name,
            created_at: format_ts_iso(now),
            fragment_count: chunks.len() as i64,
        })
    }

    /// Rank all stored fragments against `query_text` and return the
    /// survivors with scores. `top_k` and `threshold` fall back to the
    /// configured defaults when `None`.
    pub async fn search(
        &self,
        query_text: &str,
        top_k: Option<usize>,
        threshold: Option<f64>,
    ) -> Result<Vec<ScoredFragment>, RetrievalError> {
        let top_k = top_k.unwrap_or(self.config.retrieval.top_k);
        let threshold = threshold.unwrap_or(self.config.retrieval.threshold);

        let chunks = self
            .store
            .all_chunks()
            .await
            .map_err(RetrievalError::Store)?;
        let hits = score::search(query_text, &chunks, top_k, threshold);
        debug!(hits = hits.len(), top_k, threshold, "query scored");
        Ok(hits)
    }

    /// Fragment texts relevant to `query_text`, best first. An empty
    /// result means "no relevant context", never an error.
    pub async fn query(
        &self,
        query_text: &str,
        top_k: Option<usize>,
        threshold: Option<f64>,
    ) -> Result<Vec<String>, RetrievalError> {
        let hits = self.search(query_text, top_k, threshold).await?;
        Ok(hits.into_iter().map(|h| h.text).collect())
    }

    /// Retrieval tuned for folding into a prompt: a small `top_k` plus a
    /// flag telling the caller whether any context was found.
    pub async fn query_with_context(
        &self,
        query_text: &str,
    ) -> Result<(Vec<String>, bool), RetrievalError> {
        let fragments = self
            .query(query_text, Some(CONTEXT_TOP_K), None)
            .await?;
        let has_context = !fragments.is_empty();
        Ok((fragments, has_context))
    }

    /// Stored document summaries, newest first.
    pub async fn list_documents(&self) -> Result<Vec<DocumentRecord>, RetrievalError> {
        self.store
            .list_documents()
            .await
            .map_err(RetrievalError::Store)
    }

    /// Cascade-delete a document. Returns `false` for unknown ids.
    pub async fn delete_document(&self, id: &str) -> Result<bool, RetrievalError> {
        self.store
            .delete_document(id)
            .await
            .map_err(RetrievalError::Store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::memory::MemoryStore;

    fn engine() -> RetrievalEngine<MemoryStore> {
        RetrievalEngine::new(MemoryStore::new(), Config::default())
    }

    #[tokio::test]
    async fn test_ingest_rejects_short_text() {
        let engine = engine();
        let err = engine.ingest("quá ngắn", "note.txt").await.unwrap_err();
        match err {
            RetrievalError::EmptyDocument { length, min, .. } => {
                assert!(length < min);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_ingest_whitespace_only_rejected() {
        let engine = engine();
        let padding = " \n\t ".repeat(100);
        assert!(engine.ingest(&padding, "blank.txt").await.is_err());
    }

    #[tokio::test]
    async fn test_ingest_reports_fragment_count() {
        let engine = engine();
        let text = "Nhà trường thông báo kế hoạch ôn tập cuối kỳ cho toàn bộ các khối lớp. \
                    Chi tiết từng môn học được niêm yết tại bảng tin."
            .to_string();
        let record = engine.ingest(&text, "thong-bao.txt").await.unwrap();
        let stored = engine.store().all_chunks().await.unwrap();
        assert_eq!(record.fragment_count as usize, stored.len());
        assert!(record.fragment_count >= 1);
    }

    #[tokio::test]
    async fn test_query_with_context_flags_empty() {
        let engine = engine();
        let (fragments, has_context) = engine.query_with_context("điểm thi").await.unwrap();
        assert!(fragments.is_empty());
        assert!(!has_context);
    }

    #[tokio::test]
    async fn test_query_with_context_caps_at_three() {
        let engine = engine();
        for i in 0..6 {
            let text = format!(
                "Thông báo số {i}: lịch thi học kỳ một dành cho học sinh toàn trường, xem chi tiết bên dưới.",
            );
            engine.ingest(&text, &format!("tb-{i}.txt")).await.unwrap();
        }
        let (fragments, has_context) = engine
            .query_with_context("lịch thi học kỳ")
            .await
            .unwrap();
        assert!(has_context);
        assert!(fragments.len() <= CONTEXT_TOP_K);
    }
}
