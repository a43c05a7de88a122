const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Résumé formats the loader knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }

    /// Resolves the format from a file name, ignoring case.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if lower.ends_with(".pdf") {
            Some(DocumentFormat::Pdf)
        } else if lower.ends_with(".docx") {
            Some(DocumentFormat::Docx)
        } else {
            None
        }
    }

    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        match mime_type {
            "application/pdf" => Some(DocumentFormat::Pdf),
            DOCX_MIME => Some(DocumentFormat::Docx),
            _ => None,
        }
    }
}

/// An uploaded résumé before text extraction. Consumed once by the loader.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub name: String,
    pub size: usize,
    pub content: Vec<u8>,
    pub mime_type: Option<String>,
}

impl RawDocument {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        let size = content.len();
        Self {
            name: name.into(),
            size,
            content,
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// The declared format tag: file extension first, then the upload's mime type.
    pub fn format(&self) -> Option<DocumentFormat> {
        DocumentFormat::from_file_name(&self.name).or_else(|| {
            self.mime_type
                .as_deref()
                .and_then(DocumentFormat::from_mime_type)
        })
    }
}
