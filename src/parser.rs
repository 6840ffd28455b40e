//! Document parsers: raw upload bytes in, ordered page texts out.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("PDF extraction error: {0}")]
    Pdf(String),
    #[error("document is not valid UTF-8 text")]
    NotUtf8,
}

/// Splits a document into page texts. Unreadable pages come back as empty
/// strings so page numbering stays intact.
pub trait DocumentParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<Vec<String>, ParseError>;
}

/// PDF parser built on `pdf-extract`.
pub struct PdfParser;

impl DocumentParser for PdfParser {
    fn parse(&self, bytes: &[u8]) -> Result<Vec<String>, ParseError> {
        // pdf-extract panics on some malformed inputs
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        }))
        .map_err(|_| ParseError::Pdf("extractor panicked on malformed PDF".to_string()))?
        .map_err(|e| ParseError::Pdf(e.to_string()))
    }
}

/// Plain text / Markdown. Form feeds separate pages.
pub struct PlainTextParser;

impl DocumentParser for PlainTextParser {
    fn parse(&self, bytes: &[u8]) -> Result<Vec<String>, ParseError> {
        let text = std::str::from_utf8(bytes).map_err(|_| ParseError::NotUtf8)?;
        Ok(text.split('\u{c}').map(str::to_string).collect())
    }
}

/// Pick a parser by file extension. `None` means the type is unsupported.
pub fn parser_for(filename: &str) -> Option<Box<dyn DocumentParser>> {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())?;

    match ext.as_str() {
        "pdf" => Some(Box::new(PdfParser)),
        "txt" | "md" | "markdown" => Some(Box::new(PlainTextParser)),
        _ => None,
    }
}
