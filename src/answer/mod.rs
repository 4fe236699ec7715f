// Answer engine module
// Retrieves the chunks nearest a question and asks the LLM to answer from them

pub mod llm;

#[cfg(test)]
mod tests;

pub use llm::{ChatClient, ChatModel};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::RetrievalConfig;
use crate::embeddings::Embedder;
use crate::store::{SearchResult, VectorStore};

/// Number of chunks retrieved per question
pub const DEFAULT_TOP_K: usize = 3;

const PROMPT_PREAMBLE: &str = "Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.";

/// A generated answer with the chunks it was grounded on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<SearchResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerEngine {
    top_k: usize,
}

impl Default for AnswerEngine {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}

impl AnswerEngine {
    #[inline]
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    #[inline]
    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self::new(config.top_k)
    }

    #[inline]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Retrieve context for `question`, then make exactly one LLM call.
    /// The model's text is returned unmodified.
    #[inline]
    pub fn answer<E, M>(
        &self,
        store: &VectorStore,
        embedder: &E,
        llm: &M,
        question: &str,
    ) -> crate::Result<Answer>
    where
        E: Embedder + ?Sized,
        M: ChatModel + ?Sized,
    {
        let sources = store.similarity_search(question, embedder, self.top_k)?;
        debug!(
            "Retrieved {} chunks, nearest at distance {:?}",
            sources.len(),
            sources.first().map(|s| s.distance)
        );

        let prompt = build_prompt(question, &sources);
        let text = llm.complete(&prompt)?;

        info!("Answered question with {} context chunks", sources.len());
        Ok(Answer { text, sources })
    }
}

/// Stuff the retrieved chunks, separated by blank lines, into the QA prompt
#[inline]
pub fn build_prompt(question: &str, sources: &[SearchResult]) -> String {
    let context = sources
        .iter()
        .map(|source| source.record.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{PROMPT_PREAMBLE}\n\n{context}\n\nQuestion: {question}\nHelpful Answer:")
}
