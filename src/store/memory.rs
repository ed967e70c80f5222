//! In-memory [`ChunkStore`] for tests and embedded use.
//!
//! Documents and chunks live in `Vec`s behind a single `std::sync::RwLock`,
//! so one write guard covers a whole document insert and readers always see
//! complete documents.

use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{format_ts_iso, Chunk, Document, DocumentRecord};

use super::ChunkStore;

#[derive(Default)]
struct Inner {
    docs: Vec<Document>,
    chunks: Vec<Chunk>,
}

/// In-memory store. Chunk order is insertion order.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChunkStore for MemoryStore {
    async fn insert_document(&self, doc: &Document, chunks: &[Chunk]) -> Result<String> {
        let mut inner = self.inner.write().unwrap();
        inner.docs.push(doc.clone());
        inner.chunks.extend(chunks.iter().cloned());
        Ok(doc.id.clone())
    }

    async fn all_chunks(&self) -> Result<Vec<Chunk>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.chunks.clone())
    }

    async fn list_documents(&self) -> Result<Vec<DocumentRecord>> {
        let inner = self.inner.read().unwrap();
        let mut records: Vec<DocumentRecord> = inner
            .docs
            .iter()
            .map(|d| DocumentRecord {
                id: d.id.clone(),
                name: d.name.clone(),
                created_at: format_ts_iso(d.created_at),
                fragment_count: inner.chunks.iter().filter(|c| c.document_id == d.id).count()
                    as i64,
            })
            .collect();
        records.reverse();
        Ok(records)
    }

    async fn delete_document(&self, id: &str) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();
        let before = inner.docs.len();
        inner.docs.retain(|d| d.id != id);
        let existed = inner.docs.len() < before;
        inner.chunks.retain(|c| c.document_id != id);
        Ok(existed)
    }
}
