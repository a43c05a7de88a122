use std::io::{Cursor, Read};
use std::time::Instant;

use lopdf::Document;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::models::{DocumentFormat, RawDocument};

const DOCX_BODY: &str = "word/document.xml";

static SELF_CLOSING_PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<w:p(?:\s[^>]*)?/>").expect("self-closing paragraph pattern"));

static PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<w:p(?:\s[^>]*)?>(.*?)</w:p>").expect("paragraph pattern"));

/// Text runs, tabs and line breaks in document order. Empty self-closing
/// `<w:t/>` runs come first so they never open a text run.
static RUN_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?s)<w:t(?:\s[^>]*)?/>",
        r"|<w:t(?:\s[^>]*)?>(.*?)</w:t>",
        r"|<w:tab\s*/>",
        r"|<w:(?:br|cr)(?:\s[^>]*)?/>",
    ))
    .expect("run content pattern")
});

/// Predefined entities plus decimal and hexadecimal character references.
static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#[xX]([0-9A-Fa-f]+)|#([0-9]+)|(lt|gt|quot|apos|amp));")
        .expect("entity pattern")
});

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file format for '{name}' (expected .pdf or .docx)")]
    UnsupportedFormat { name: String },

    #[error("failed to read PDF: {message}")]
    Pdf { message: String },

    #[error("failed to read DOCX: {message}")]
    Docx { message: String },
}

/// Extracts plain text from an uploaded résumé.
///
/// Extraction is best-effort: pages and paragraphs without text are skipped,
/// and an empty result is not an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentLoader;

impl DocumentLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load(&self, raw: RawDocument) -> Result<String, LoadError> {
        let start = Instant::now();
        let format = raw.format().ok_or_else(|| LoadError::UnsupportedFormat {
            name: raw.name.clone(),
        })?;

        debug!(
            file_name = %raw.name,
            format = format.extension(),
            size = raw.size,
            "Loading document"
        );

        let text = match format {
            DocumentFormat::Pdf => Self::read_pdf(&raw.content)?,
            DocumentFormat::Docx => Self::read_docx(&raw.content)?,
        };

        info!(
            file_name = %raw.name,
            format = format.extension(),
            characters = text.chars().count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Document text extracted"
        );
        Ok(text)
    }

    fn read_pdf(content: &[u8]) -> Result<String, LoadError> {
        let document = match Document::load_mem(content) {
            Ok(document) => document,
            Err(e) => {
                warn!("PDF structure could not be parsed: {}, trying whole-document extraction", e);
                return pdf_extract::extract_text_from_mem(content).map_err(|fallback| {
                    LoadError::Pdf {
                        message: format!("{}; fallback extraction failed: {}", e, fallback),
                    }
                });
            }
        };

        let mut text = String::new();
        for page_number in document.get_pages().keys() {
            match document.extract_text(&[*page_number]) {
                Ok(page_text) if !page_text.trim().is_empty() => text.push_str(&page_text),
                Ok(_) => debug!(page = page_number, "Page has no extractable text"),
                Err(e) => debug!(page = page_number, error = %e, "Skipping unreadable page"),
            }
        }
        Ok(text)
    }

    fn read_docx(content: &[u8]) -> Result<String, LoadError> {
        let mut archive = ZipArchive::new(Cursor::new(content)).map_err(|e| LoadError::Docx {
            message: format!("not a valid DOCX container: {}", e),
        })?;

        let mut xml = String::new();
        archive
            .by_name(DOCX_BODY)
            .map_err(|e| LoadError::Docx {
                message: format!("missing {}: {}", DOCX_BODY, e),
            })?
            .read_to_string(&mut xml)
            .map_err(|e| LoadError::Docx {
                message: format!("unreadable {}: {}", DOCX_BODY, e),
            })?;

        Ok(paragraphs_from_xml(&xml).join("\n"))
    }
}

/// Paragraph texts of a WordprocessingML body, skipping paragraphs without text.
fn paragraphs_from_xml(xml: &str) -> Vec<String> {
    let xml = SELF_CLOSING_PARAGRAPH.replace_all(xml, "");

    PARAGRAPH
        .captures_iter(&xml)
        .filter_map(|paragraph| {
            let mut text = String::new();
            for piece in RUN_CONTENT.captures_iter(&paragraph[1]) {
                match piece.get(1) {
                    Some(run) => text.push_str(&unescape_xml(run.as_str())),
                    None if piece[0].starts_with("<w:tab") => text.push('\t'),
                    None if piece[0].starts_with("<w:t") => {}
                    None => text.push('\n'),
                }
            }
            if text.trim().is_empty() {
                None
            } else {
                Some(text)
            }
        })
        .collect()
}

/// Decodes entities in a single pass, so `&amp;#38;` stays `&#38;`. Unknown or
/// out-of-range references are kept verbatim.
fn unescape_xml(text: &str) -> String {
    ENTITY
        .replace_all(text, |entity: &Captures<'_>| {
            let decoded = if let Some(name) = entity.get(3) {
                match name.as_str() {
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    _ => Some('&'),
                }
            } else if let Some(hex) = entity.get(1) {
                u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
            } else {
                entity[2].parse::<u32>().ok().and_then(char::from_u32)
            };
            decoded.map(String::from).unwrap_or_else(|| entity[0].to_string())
        })
        .into_owned()
}
