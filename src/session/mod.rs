// Session module
// Per-user state shared by the web and terminal front ends: the current
// document index, the chat transcript and the last status notice


use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::ArchiveError;
use crate::answer::{AnswerEngine, ChatClient, ChatModel};
use crate::config::Config;
use crate::embeddings::{ChunkingConfig, Embedder, OllamaClient, split_document};
use crate::loader::{DocumentKind, DocumentLoader, DocumentPayload};
use crate::store::{SearchResult, VectorStore};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{}", missing_input_message(.0))]
    MissingInput(DocumentKind),
    #[error("Error processing document: {0}")]
    Processing(#[source] ArchiveError),
    #[error("Please enter a question")]
    EmptyQuestion,
    #[error("Please upload and process a document to start chatting")]
    NoDocument,
    #[error("Error generating answer: {0}")]
    Answering(#[source] ArchiveError),
}

fn missing_input_message(kind: &DocumentKind) -> String {
    match *kind {
        DocumentKind::Text => "Please enter some text".to_string(),
        DocumentKind::Link => "Please enter at least one URL".to_string(),
        file_kind => format!("Please upload a {} file", file_kind),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// One-shot status message shown after an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[inline]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[inline]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// A question and the answer it received
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
    pub sources: Vec<SearchResult>,
    pub asked_at: DateTime<Utc>,
}

/// What is currently loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub kind: DocumentKind,
    pub characters: usize,
    pub chunks: usize,
    pub loaded_at: DateTime<Utc>,
}

pub struct Session {
    embedder: Box<dyn Embedder + Send>,
    llm: Box<dyn ChatModel + Send>,
    loader: DocumentLoader,
    chunking: ChunkingConfig,
    engine: AnswerEngine,
    store: Option<VectorStore>,
    document: Option<DocumentSummary>,
    transcript: Vec<ChatTurn>,
    notice: Option<Notice>,
}

impl std::fmt::Debug for Session {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("chunking", &self.chunking)
            .field("engine", &self.engine)
            .field("document", &self.document)
            .field("transcript_len", &self.transcript.len())
            .field("notice", &self.notice)
            .finish_non_exhaustive()
    }
}

impl Session {
    #[inline]
    pub fn new(embedder: Box<dyn Embedder + Send>, llm: Box<dyn ChatModel + Send>) -> Self {
        Self {
            embedder,
            llm,
            loader: DocumentLoader::default(),
            chunking: ChunkingConfig::default(),
            engine: AnswerEngine::default(),
            store: None,
            document: None,
            transcript: Vec::new(),
            notice: None,
        }
    }

    /// Wire up the Ollama embedder and hosted chat model from configuration
    #[inline]
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let embedder = OllamaClient::new(&config.ollama)?;
        let llm = ChatClient::new(&config.llm)?;

        Ok(Self::new(Box::new(embedder), Box::new(llm))
            .with_chunking(config.chunking)
            .with_engine(AnswerEngine::from_config(&config.retrieval)))
    }

    #[inline]
    pub fn with_loader(mut self, loader: DocumentLoader) -> Self {
        self.loader = loader;
        self
    }

    #[inline]
    pub fn with_fetch_timeout(self, timeout: Duration) -> Self {
        self.with_loader(DocumentLoader::with_fetch_timeout(timeout))
    }

    #[inline]
    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = chunking;
        self
    }

    #[inline]
    pub fn with_engine(mut self, engine: AnswerEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Load, split and index a new document. On success the previous
    /// document and transcript are replaced; on failure they are kept.
    #[inline]
    pub fn process(
        &mut self,
        kind: DocumentKind,
        payload: DocumentPayload,
    ) -> Result<&DocumentSummary, SessionError> {
        if !has_input(&payload) {
            let err = SessionError::MissingInput(kind);
            self.notice = Some(Notice::error(err.to_string()));
            return Err(err);
        }

        match self.build_index(kind, payload) {
            Ok((store, summary)) => {
                info!(
                    "Indexed {} document: {} characters in {} chunks",
                    summary.kind, summary.characters, summary.chunks
                );
                self.store = Some(store);
                self.transcript.clear();
                self.notice = Some(Notice::success("Document processed successfully!"));
                Ok(self.document.insert(summary))
            }
            Err(e) => {
                let err = SessionError::Processing(e);
                error!("{}", err);
                self.notice = Some(Notice::error(err.to_string()));
                Err(err)
            }
        }
    }

    fn build_index(
        &self,
        kind: DocumentKind,
        payload: DocumentPayload,
    ) -> crate::Result<(VectorStore, DocumentSummary)> {
        let document = self.loader.load(kind, payload)?;
        let chunks = split_document(&document, &self.chunking)?;
        let store = VectorStore::from_chunks(&chunks, self.embedder.as_ref())?;

        let summary = DocumentSummary {
            kind,
            characters: document.char_count(),
            chunks: chunks.len(),
            loaded_at: Utc::now(),
        };

        Ok((store, summary))
    }

    /// Answer a question about the loaded document and record the exchange
    #[inline]
    pub fn ask(&mut self, question: &str) -> Result<&ChatTurn, SessionError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }

        let Some(store) = self.store.as_ref() else {
            let err = SessionError::NoDocument;
            self.notice = Some(Notice::error(err.to_string()));
            return Err(err);
        };

        let answer = match self
            .engine
            .answer(store, self.embedder.as_ref(), self.llm.as_ref(), question)
        {
            Ok(answer) => answer,
            Err(e) => {
                let err = SessionError::Answering(e);
                error!("{}", err);
                self.notice = Some(Notice::error(err.to_string()));
                return Err(err);
            }
        };

        self.transcript.push(ChatTurn {
            question: question.to_string(),
            answer: answer.text,
            sources: answer.sources,
            asked_at: Utc::now(),
        });

        Ok(&self.transcript[self.transcript.len() - 1])
    }

    #[inline]
    pub fn has_document(&self) -> bool {
        self.store.is_some()
    }

    #[inline]
    pub fn document(&self) -> Option<&DocumentSummary> {
        self.document.as_ref()
    }

    #[inline]
    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    #[inline]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    #[inline]
    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// Remove and return the pending notice so it is shown only once
    #[inline]
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}

fn has_input(payload: &DocumentPayload) -> bool {
    match payload {
        DocumentPayload::Text(text) => !text.is_empty(),
        DocumentPayload::Bytes(bytes) => !bytes.is_empty(),
        DocumentPayload::Urls(urls) => urls.iter().any(|url| !url.trim().is_empty()),
    }
}
