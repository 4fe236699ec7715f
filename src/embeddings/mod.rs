// Embeddings module
// Text splitting and the embedding function used to index and query documents

pub mod chunking;
pub mod ollama;

pub use chunking::{Chunk, ChunkingConfig, split_document, split_text};
pub use ollama::{EmbeddingResult, OllamaClient};

use crate::Result;

/// Maps text to a fixed-dimension vector. Called once per chunk when a
/// document is indexed and once per question.
pub trait Embedder {
    /// Embed a single query string
    fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of documents, preserving input order
    fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
