use std::time::Instant;

use bytes::Bytes;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use thiserror::Error;
use tracing::info;

use crate::models::RenderedResume;
use crate::services::summarizer::truncate_chars;

pub const HEADING: &str = "Updated Resume";

// US Letter, points.
const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 72;

const HEADING_SIZE: i64 = 18;
const HEADING_LEADING: i64 = 22;
const HEADING_SPACER: i64 = 12;

const BODY_SIZE: i64 = 10;
const BODY_LEADING: i64 = 14;
const PARAGRAPH_SPACE_AFTER: i64 = 6;

/// Average Helvetica glyph width as a fraction of the font size.
const AVERAGE_CHAR_EM: f32 = 0.5;

const BODY_FONT: &[u8] = b"F1";
const HEADING_FONT: &[u8] = b"F2";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to build PDF: {message}")]
    Pdf { message: String },
}

/// Maps text to WinAnsi bytes; anything without a WinAnsi code becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '€' => 0x80,
            '‚' => 0x82,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Greedy word wrap; words longer than a line are split.
fn wrap_line(line: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        let mut word = word;
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head = truncate_chars(word, max_chars);
            lines.push(head.to_string());
            word = &word[head.len()..];
        }

        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Accumulates text operations page by page, top to bottom.
struct PageLayout {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    cursor_y: i64,
}

impl PageLayout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            cursor_y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.cursor_y = PAGE_HEIGHT - MARGIN;
    }

    fn write_line(&mut self, font: &[u8], size: i64, leading: i64, text: &str) {
        if self.cursor_y - leading < MARGIN && !self.current.is_empty() {
            self.break_page();
        }
        self.cursor_y -= leading;

        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(font.to_vec()), Object::Integer(size)]),
            Operation::new("Td", vec![Object::Integer(MARGIN), Object::Integer(self.cursor_y)]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    fn skip(&mut self, points: i64) {
        self.cursor_y -= points;
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// Reflows résumé text into a paginated PDF under a fixed heading.
#[derive(Debug, Clone, Copy)]
pub struct ResumeRenderer {
    max_line_chars: usize,
}

impl Default for ResumeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResumeRenderer {
    pub fn new() -> Self {
        let frame_width = (PAGE_WIDTH - 2 * MARGIN) as f32;
        Self {
            max_line_chars: (frame_width / (BODY_SIZE as f32 * AVERAGE_CHAR_EM)) as usize,
        }
    }

    pub fn render(&self, resume_text: &str) -> Result<RenderedResume, RenderError> {
        let start = Instant::now();
        let paragraphs: Vec<&str> = resume_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let mut layout = PageLayout::new();
        layout.write_line(HEADING_FONT, HEADING_SIZE, HEADING_LEADING, HEADING);
        layout.skip(HEADING_SPACER);

        for paragraph in &paragraphs {
            for line in wrap_line(paragraph, self.max_line_chars) {
                layout.write_line(BODY_FONT, BODY_SIZE, BODY_LEADING, &line);
            }
            layout.skip(PARAGRAPH_SPACE_AFTER);
        }

        let pages = layout.finish();
        let page_count = pages.len();
        let bytes = Self::build_document(pages)?;

        info!(
            paragraphs = paragraphs.len(),
            pages = page_count,
            bytes = bytes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Resume rendered"
        );

        Ok(RenderedResume {
            bytes: Bytes::from(bytes),
            pages: page_count,
            paragraphs: paragraphs.len(),
        })
    }

    fn build_document(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>, RenderError> {
        let mut doc = Document::with_version("1.5");
        let pages_id: ObjectId = doc.new_object_id();

        let body_font = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let heading_font = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => body_font,
                "F2" => heading_font,
            },
        });

        let mut kids = Vec::with_capacity(pages.len());
        for operations in pages {
            let encoded = Content { operations }
                .encode()
                .map_err(|e| RenderError::Pdf {
                    message: format!("content encoding failed: {}", e),
                })?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(PAGE_WIDTH),
                    Object::Integer(PAGE_HEIGHT),
                ],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).map_err(|e| RenderError::Pdf {
            message: format!("serialization failed: {}", e),
        })?;
        Ok(buffer)
    }
}
