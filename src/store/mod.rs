//! Storage abstraction for the retrieval engine.
//!
//! The [`ChunkStore`] trait covers the append-only persistence the scorer
//! needs: documents are written once together with all of their chunks,
//! read back as a flat snapshot, and removed only as a cascading delete.
//! There is no update operation.
//!
//! Implementations must be `Send + Sync`; queries only read, so any number
//! may run concurrently against the same store.

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Chunk, Document, DocumentRecord};

/// Abstract chunk storage backend.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`insert_document`](ChunkStore::insert_document) | Persist a document with all chunks, atomically |
/// | [`all_chunks`](ChunkStore::all_chunks) | Snapshot of every stored chunk |
/// | [`list_documents`](ChunkStore::list_documents) | Document summaries, newest first |
/// | [`delete_document`](ChunkStore::delete_document) | Cascade-delete a document |
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Persist a document and all of its chunks behind one commit.
    ///
    /// A concurrent [`all_chunks`](ChunkStore::all_chunks) call must see
    /// either none of the document's chunks or all of them.
    async fn insert_document(&self, doc: &Document, chunks: &[Chunk]) -> Result<String>;

    /// A consistent snapshot of every stored chunk, in ingestion order
    /// (document by document, then by `chunk_index`).
    async fn all_chunks(&self) -> Result<Vec<Chunk>>;

    /// Summaries of all documents with their fragment counts, newest first.
    async fn list_documents(&self) -> Result<Vec<DocumentRecord>>;

    /// Remove a document and all of its chunks. Returns `false` when the
    /// id is unknown.
    async fn delete_document(&self, id: &str) -> Result<bool>;
}
