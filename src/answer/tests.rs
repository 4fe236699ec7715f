use super::*;
use crate::ArchiveError;
use crate::embeddings::Chunk;
use crate::store::IndexError;
use std::cell::RefCell;

/// One-dimensional embedding: the number of characters
struct LengthEmbedder;

impl Embedder for LengthEmbedder {
    fn embed_query(&self, text: &str) -> crate::Result<Vec<f32>> {
        Ok(vec![text.chars().count() as f32])
    }

    fn embed_documents(&self, texts: &[String]) -> crate::Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_query(t)).collect()
    }
}

/// Records every prompt and replies with a fixed answer
struct RecordingModel {
    reply: String,
    prompts: RefCell<Vec<String>>,
}

impl RecordingModel {
    fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: RefCell::new(Vec::new()),
        }
    }
}

impl ChatModel for RecordingModel {
    fn complete(&self, prompt: &str) -> crate::Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

struct FailingModel;

impl ChatModel for FailingModel {
    fn complete(&self, _prompt: &str) -> crate::Result<String> {
        Err(ArchiveError::Llm("rate limited".to_string()))
    }
}

fn store_of(texts: &[&str]) -> VectorStore {
    let chunks: Vec<Chunk> = texts
        .iter()
        .enumerate()
        .map(|(index, text)| Chunk {
            text: (*text).to_string(),
            index,
            source: None,
            title: None,
        })
        .collect();
    VectorStore::from_chunks(&chunks, &LengthEmbedder).expect("index should build")
}

#[test]
fn prompt_matches_stuff_template() {
    let store = store_of(&["alpha", "beta"]);
    let sources = store.search_by_vector(&[5.0], 2).expect("search");

    let prompt = build_prompt("Which letters?", &sources);

    assert_eq!(
        prompt,
        "Use the following pieces of context to answer the question at the end. \
         If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\n\
         alpha\n\nbeta\n\nQuestion: Which letters?\nHelpful Answer:"
    );
}

#[test]
fn answer_uses_top_k_nearest_chunks() {
    let store = store_of(&["x", "xxxxxxxxxxxx", "xxxx", "xxxxxx", "xxxxxxxxxxxxxxxxxxxx"]);
    let model = RecordingModel::replying("The answer.");
    let engine = AnswerEngine::default();

    // five characters: nearest are lengths 4, 6 then 1
    let answer = engine
        .answer(&store, &LengthEmbedder, &model, "hello")
        .expect("answer should succeed");

    assert_eq!(answer.text, "The answer.");
    let texts: Vec<&str> = answer.sources.iter().map(|s| s.record.text.as_str()).collect();
    assert_eq!(texts, vec!["xxxx", "xxxxxx", "x"]);

    let prompts = model.prompts.borrow();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("xxxx\n\nxxxxxx\n\nx\n\nQuestion: hello"));
}

#[test]
fn small_store_returns_every_chunk() {
    let store = store_of(&["only chunk"]);
    let model = RecordingModel::replying("ok");

    let answer = AnswerEngine::new(3)
        .answer(&store, &LengthEmbedder, &model, "q")
        .expect("answer should succeed");

    assert_eq!(answer.sources.len(), 1);
}

#[test]
fn answer_text_is_not_post_processed() {
    let store = store_of(&["context"]);
    let model = RecordingModel::replying("  I don't know.\n");

    let answer = AnswerEngine::default()
        .answer(&store, &LengthEmbedder, &model, "q")
        .expect("answer should succeed");

    assert_eq!(answer.text, "  I don't know.\n");
}

#[test]
fn llm_failure_propagates() {
    let store = store_of(&["context"]);

    let err = AnswerEngine::default()
        .answer(&store, &LengthEmbedder, &FailingModel, "q")
        .expect_err("llm failure should propagate");

    assert!(matches!(err, ArchiveError::Llm(ref msg) if msg == "rate limited"));
}

#[test]
fn empty_store_fails_before_llm() {
    let model = RecordingModel::replying("unused");

    let err = AnswerEngine::default()
        .answer(&VectorStore::new(), &LengthEmbedder, &model, "q")
        .expect_err("empty store should fail");

    assert!(matches!(err, ArchiveError::Index(IndexError::Empty)));
    assert!(model.prompts.borrow().is_empty());
}

#[test]
fn engine_reads_top_k_from_config() {
    let engine = AnswerEngine::from_config(&RetrievalConfig { top_k: 7 });
    assert_eq!(engine.top_k(), 7);
    assert_eq!(AnswerEngine::default().top_k(), DEFAULT_TOP_K);
}
