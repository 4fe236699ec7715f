// Document loader module
// Turns a typed user input into plain text (or per-page text for web links)

pub mod docx;
pub mod extractor;
pub mod pdf;
pub mod web;


use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use web::{WebLoader, validate_url};

/// The document types the loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    Text,
    Pdf,
    Docx,
    Txt,
    Link,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 5] = [
        DocumentKind::Text,
        DocumentKind::Pdf,
        DocumentKind::Docx,
        DocumentKind::Txt,
        DocumentKind::Link,
    ];

    /// Label shown in the document type selector
    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Txt => "TXT",
            Self::Link => "Link",
        }
    }

    /// File extension accepted for upload-based kinds
    #[inline]
    pub fn file_extension(self) -> Option<&'static str> {
        match self {
            Self::Pdf => Some("pdf"),
            Self::Docx => Some("docx"),
            Self::Txt => Some("txt"),
            Self::Text | Self::Link => None,
        }
    }

    /// Whether this kind is supplied as uploaded file bytes
    #[inline]
    pub fn is_file(self) -> bool {
        self.file_extension().is_some()
    }

    fn expected_payload(self) -> &'static str {
        match self {
            Self::Text => "a string",
            Self::Pdf | Self::Docx | Self::Txt => "file contents",
            Self::Link => "one or more URLs",
        }
    }
}

impl fmt::Display for DocumentKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DocumentKind {
    type Err = LoadError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(tag))
            .ok_or_else(|| LoadError::UnsupportedType(tag.to_string()))
    }
}

/// The raw input accompanying a document kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentPayload {
    Text(String),
    Bytes(Vec<u8>),
    Urls(Vec<String>),
}

impl DocumentPayload {
    fn describe(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bytes(_) => "file contents",
            Self::Urls(_) => "URLs",
        }
    }
}

/// A fetched web page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebPage {
    pub url: String,
    pub title: String,
    pub text: String,
}

/// Plain text extracted from a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadedDocument {
    Text(String),
    Pages(Vec<WebPage>),
}

impl LoadedDocument {
    /// Total number of characters across the document
    #[inline]
    pub fn char_count(&self) -> usize {
        match self {
            Self::Text(text) => text.chars().count(),
            Self::Pages(pages) => pages.iter().map(|p| p.text.chars().count()).sum(),
        }
    }

    /// True when there is no non-whitespace text to index
    #[inline]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Pages(pages) => pages.iter().all(|p| p.text.trim().is_empty()),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Unsupported input type: {0:?} (expected one of Text, PDF, DOCX, TXT, Link)")]
    UnsupportedType(String),
    #[error("Invalid input data for {kind}: expected {expected}, got {actual}")]
    PayloadMismatch {
        kind: DocumentKind,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("The {0} document is empty")]
    EmptyDocument(DocumentKind),
    #[error("No valid URLs provided")]
    NoValidUrls,
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("TXT file is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("Failed to read PDF: {0}")]
    Pdf(String),
    #[error("Failed to read DOCX: {0}")]
    Docx(String),
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },
}

/// Loads documents of every supported kind
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    web: WebLoader,
}

impl Default for DocumentLoader {
    #[inline]
    fn default() -> Self {
        Self::new(WebLoader::default())
    }
}

impl DocumentLoader {
    #[inline]
    pub fn new(web: WebLoader) -> Self {
        Self { web }
    }

    #[inline]
    pub fn with_fetch_timeout(timeout: Duration) -> Self {
        Self::new(WebLoader::new(timeout))
    }

    /// Convert `payload` into text according to `kind`. The whole load fails
    /// on the first error; nothing is retried and nothing partial is returned.
    #[inline]
    pub fn load(
        &self,
        kind: DocumentKind,
        payload: DocumentPayload,
    ) -> Result<LoadedDocument, LoadError> {
        info!("Loading {} document from {}", kind, payload.describe());

        let document = match (kind, payload) {
            (DocumentKind::Text, DocumentPayload::Text(text)) => LoadedDocument::Text(text),
            (DocumentKind::Pdf, DocumentPayload::Bytes(bytes)) => {
                ensure_bytes(kind, &bytes)?;
                LoadedDocument::Text(pdf::extract_text(&bytes)?)
            }
            (DocumentKind::Docx, DocumentPayload::Bytes(bytes)) => {
                ensure_bytes(kind, &bytes)?;
                LoadedDocument::Text(docx::extract_text(&bytes)?)
            }
            (DocumentKind::Txt, DocumentPayload::Bytes(bytes)) => {
                ensure_bytes(kind, &bytes)?;
                LoadedDocument::Text(String::from_utf8(bytes)?)
            }
            (DocumentKind::Link, DocumentPayload::Urls(urls)) => {
                LoadedDocument::Pages(self.web.fetch_pages(&urls)?)
            }
            (DocumentKind::Link, DocumentPayload::Text(url)) => {
                LoadedDocument::Pages(self.web.fetch_pages(&[url])?)
            }
            (kind, payload) => {
                return Err(LoadError::PayloadMismatch {
                    kind,
                    expected: kind.expected_payload(),
                    actual: payload.describe(),
                });
            }
        };

        if document.is_blank() {
            return Err(LoadError::EmptyDocument(kind));
        }

        debug!(
            "Loaded {} document with {} characters",
            kind,
            document.char_count()
        );

        Ok(document)
    }
}

fn ensure_bytes(kind: DocumentKind, bytes: &[u8]) -> Result<(), LoadError> {
    if bytes.is_empty() {
        return Err(LoadError::EmptyDocument(kind));
    }
    Ok(())
}
