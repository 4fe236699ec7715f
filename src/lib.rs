use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArchiveError>;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Input error: {0}")]
    Input(#[from] loader::LoadError),

    #[error("Index error: {0}")]
    Index(#[from] store::IndexError),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod answer;
pub mod commands;
pub mod config;
pub mod embeddings;
pub mod http;
pub mod loader;
pub mod session;
pub mod store;
pub mod web;
