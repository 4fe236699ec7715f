// DOCX text extraction
// A .docx file is a zip archive; body text lives in word/document.xml


use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;
use zip::ZipArchive;

use super::LoadError;

const DOCUMENT_PART: &str = "word/document.xml";
const SKIPPED_CONTAINER: &[u8] = b"w:txbxContent";
const ALTERNATE_FALLBACK: &[u8] = b"mc:Fallback";

/// Extract paragraph text from DOCX bytes, one paragraph per line
#[inline]
pub fn extract_text(bytes: &[u8]) -> Result<String, LoadError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| LoadError::Docx(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| LoadError::Docx(format!("{}: {}", DOCUMENT_PART, e)))?
        .read_to_string(&mut xml)
        .map_err(|e| LoadError::Docx(format!("{}: {}", DOCUMENT_PART, e)))?;

    let paragraphs = paragraphs_from_xml(&xml)?;
    debug!("Extracted {} paragraphs from DOCX", paragraphs.len());

    Ok(paragraphs.join("\n"))
}

/// Walk WordprocessingML and return the text of every body `w:p` in document order.
/// Text boxes (`w:txbxContent`) and the `mc:Fallback` copy of alternate content are
/// skipped, so their paragraphs never split the paragraph that anchors them.
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, LoadError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    // Open paragraphs, innermost last
    let mut open: Vec<String> = Vec::new();
    let mut skipped_depth = 0_usize;
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                SKIPPED_CONTAINER | ALTERNATE_FALLBACK => skipped_depth += 1,
                _ if skipped_depth > 0 => {}
                b"w:p" => open.push(String::new()),
                b"w:t" => in_text_run = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) if skipped_depth == 0 => match e.name().as_ref() {
                b"w:p" => paragraphs.push(String::new()),
                b"w:tab" => push_text(&mut open, "\t"),
                b"w:br" | b"w:cr" => push_text(&mut open, "\n"),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text_run && skipped_depth == 0 => {
                let text = e
                    .unescape()
                    .map_err(|err| LoadError::Docx(format!("Malformed text run: {}", err)))?;
                push_text(&mut open, &text);
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                SKIPPED_CONTAINER | ALTERNATE_FALLBACK => {
                    skipped_depth = skipped_depth.saturating_sub(1);
                }
                _ if skipped_depth > 0 => {}
                b"w:t" => in_text_run = false,
                b"w:p" => {
                    if let Some(paragraph) = open.pop() {
                        match open.last_mut() {
                            // A paragraph nested in another one continues its parent
                            Some(parent) => parent.push_str(&paragraph),
                            None => paragraphs.push(paragraph),
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(LoadError::Docx(format!(
                    "Malformed XML at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
        }
    }

    Ok(paragraphs)
}

fn push_text(open: &mut [String], text: &str) {
    if let Some(paragraph) = open.last_mut() {
        paragraph.push_str(text);
    }
}
