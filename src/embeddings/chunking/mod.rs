
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::loader::{LoadedDocument, WebPage};

/// A bounded window of source text, the unit of retrieval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The chunk text
    pub text: String,
    /// Position of this chunk within the document
    pub index: usize,
    /// Page URL for chunks cut from web links
    pub source: Option<String>,
    /// Page title for chunks cut from web links
    pub title: Option<String>,
}

impl Chunk {
    /// Length in characters (Unicode scalar values)
    #[inline]
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Configuration for fixed-size character windowing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters
    pub chunk_size: usize,
    /// Characters shared with the preceding chunk
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 100,
        }
    }
}

impl ChunkingConfig {
    /// Distance between the starts of consecutive windows
    #[inline]
    pub fn stride(&self) -> usize {
        self.chunk_size.saturating_sub(self.chunk_overlap)
    }

    /// Number of chunks `split_text` produces for a text of `len` characters
    #[inline]
    pub fn expected_chunks(&self, len: usize) -> usize {
        if len == 0 {
            0
        } else if len <= self.chunk_size {
            1
        } else {
            (len - self.chunk_overlap).div_ceil(self.stride().max(1))
        }
    }

    fn check(&self) -> Result<()> {
        if self.chunk_size == 0 {
            bail!("chunk_size must be greater than 0");
        }
        if self.chunk_overlap >= self.chunk_size {
            bail!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap,
                self.chunk_size
            );
        }
        Ok(())
    }
}

/// Cut `text` into windows of `chunk_size` characters, each starting
/// `chunk_size - chunk_overlap` characters after the previous one. The last
/// window ends exactly at the end of the text.
#[inline]
pub fn split_text(text: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    config.check()?;

    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::with_capacity(config.expected_chunks(chars.len()));

    if chars.is_empty() {
        return Ok(chunks);
    }

    let stride = config.stride();
    let mut start = 0;

    loop {
        let end = (start + config.chunk_size).min(chars.len());
        chunks.push(Chunk {
            text: chars[start..end].iter().collect(),
            index: chunks.len(),
            source: None,
            title: None,
        });

        if end == chars.len() {
            break;
        }
        start += stride;
    }

    debug!(
        "Split {} characters into {} chunks (size {}, overlap {})",
        chars.len(),
        chunks.len(),
        config.chunk_size,
        config.chunk_overlap
    );

    Ok(chunks)
}

/// Split a loaded document. Web pages are windowed independently so overlap
/// never spans two pages; indices run across the whole document.
#[inline]
pub fn split_document(document: &LoadedDocument, config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    let chunks = match document {
        LoadedDocument::Text(text) => split_text(text, config)?,
        LoadedDocument::Pages(pages) => split_pages(pages, config)?,
    };

    debug!("Document produced {} chunks", chunks.len());
    Ok(chunks)
}

fn split_pages(pages: &[WebPage], config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    let mut chunks = Vec::new();

    for page in pages {
        for mut chunk in split_text(&page.text, config)? {
            chunk.index = chunks.len();
            chunk.source = Some(page.url.clone());
            chunk.title = Some(page.title.clone());
            chunks.push(chunk);
        }
    }

    Ok(chunks)
}
