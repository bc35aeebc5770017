//! Retrieval support: persisted reference designs and embeddings.

pub mod embedding;
pub mod store;

pub use embedding::{EmbeddingClient, OpenAiEmbeddings};
pub use store::{DesignStore, ScoredDesign, StoredDesign};
