//! SQLite-backed [`ChunkStore`].
//!
//! Each document insert runs inside one transaction, so a query scanning
//! [`all_chunks`](super::ChunkStore::all_chunks) never observes a document
//! with only some of its chunks persisted.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::models::{format_ts_iso, Chunk, Document, DocumentRecord};

use super::ChunkStore;

/// SQLite implementation of [`ChunkStore`] over a [`SqlitePool`].
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ChunkStore for SqliteStore {
    async fn insert_document(&self, doc: &Document, chunks: &[Chunk]) -> Result<String> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO documents (id, name, created_at, preview) VALUES (?, ?, ?, ?)")
            .bind(&doc.id)
            .bind(&doc.name)
            .bind(doc.created_at)
            .bind(&doc.preview)
            .execute(&mut *tx)
            .await?;

        for chunk in chunks {
            sqlx::query(
                "INSERT INTO chunks (id, document_id, chunk_index, text, hash, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&chunk.id)
            .bind(&chunk.document_id)
            .bind(chunk.chunk_index)
            .bind(&chunk.text)
            .bind(&chunk.hash)
            .bind(chunk.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(doc.id.clone())
    }

    async fn all_chunks(&self) -> Result<Vec<Chunk>> {
        let rows = sqlx::query(
            "SELECT id, document_id, chunk_index, text, hash, created_at FROM chunks \
             ORDER BY created_at ASC, document_id ASC, chunk_index ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| Chunk {
                id: row.get("id"),
                document_id: row.get("document_id"),
                chunk_index: row.get("chunk_index"),
                text: row.get("text"),
                hash: row.get("hash"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn list_documents(&self) -> Result<Vec<DocumentRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT d.id, d.name, d.created_at, COUNT(c.id) AS fragment_count
            FROM documents d
            LEFT JOIN chunks c ON c.document_id = d.id
            GROUP BY d.id
            ORDER BY d.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let created_at: i64 = row.get("created_at");
                DocumentRecord {
                    id: row.get("id"),
                    name: row.get("name"),
                    created_at: format_ts_iso(created_at),
                    fragment_count: row.get("fragment_count"),
                }
            })
            .collect())
    }

    async fn delete_document(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
