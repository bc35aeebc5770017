//! Persisted reference-design store.
//!
//! SQLite table of reference designs with their embeddings. Lookup is a
//! brute-force cosine scan, which is plenty for a few thousand reference
//! designs. Rows are keyed by the SHA-256 of their content so re-adding
//! the same design is idempotent.

use std::path::Path;

use rusqlite::{Connection, params};
use sha2::{Digest, Sha256};

use crate::error::Result;

/// A reference design held in the store.
#[derive(Debug, Clone)]
pub struct StoredDesign {
    pub id: String,
    pub summary: String,
    pub content: String,
}

/// A store hit with its cosine similarity to the query.
#[derive(Debug, Clone)]
pub struct ScoredDesign {
    pub design: StoredDesign,
    pub score: f32,
}

/// SQLite-backed embedding store of reference designs.
pub struct DesignStore {
    conn: Connection,
}

impl DesignStore {
    /// Open (or create) a store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS designs (
                id        TEXT PRIMARY KEY,
                summary   TEXT NOT NULL,
                content   TEXT NOT NULL,
                embedding BLOB NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn })
    }

    /// Add a design with its embedding. Returns the content-derived ID.
    pub fn add(&self, summary: &str, content: &str, embedding: &[f32]) -> Result<String> {
        let id = content_id(content);
        self.conn.execute(
            "INSERT OR REPLACE INTO designs (id, summary, content, embedding) VALUES (?1, ?2, ?3, ?4)",
            params![id, summary, content, encode_embedding(embedding)],
        )?;
        Ok(id)
    }

    /// Number of designs in the store.
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM designs", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// True when the store holds no designs.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// The `k` designs most similar to the query embedding, best first.
    pub fn most_similar(&self, query: &[f32], k: usize) -> Result<Vec<ScoredDesign>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, summary, content, embedding FROM designs")?;

        let rows = stmt.query_map([], |row| {
            let embedding: Vec<u8> = row.get(3)?;
            Ok((
                StoredDesign {
                    id: row.get(0)?,
                    summary: row.get(1)?,
                    content: row.get(2)?,
                },
                embedding,
            ))
        })?;

        let mut scored = Vec::new();
        for row in rows {
            let (design, blob) = row?;
            let embedding = decode_embedding(&blob);
            let score = cosine_similarity(query, &embedding);
            scored.push(ScoredDesign { design, score });
        }

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }
}

/// Stable content-derived row ID.
fn content_id(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Cosine similarity; 0.0 for mismatched lengths or zero vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
