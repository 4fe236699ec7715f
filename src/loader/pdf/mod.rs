
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, warn};

use super::LoadError;

/// Extract the text layer of a PDF, pages concatenated in order
#[inline]
pub fn extract_text(bytes: &[u8]) -> Result<String, LoadError> {
    // pdf-extract panics on some malformed inputs instead of returning an error
    let outcome = catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)));

    match outcome {
        Ok(Ok(text)) => {
            debug!("Extracted {} characters from PDF", text.len());
            Ok(text)
        }
        Ok(Err(e)) => Err(LoadError::Pdf(e.to_string())),
        Err(_) => {
            warn!("PDF parser panicked on a {} byte input", bytes.len());
            Err(LoadError::Pdf("the file could not be parsed".to_string()))
        }
    }
}
