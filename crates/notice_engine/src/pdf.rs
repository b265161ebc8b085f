use std::panic;

use lopdf::Document;
use notice_logging::{notice_debug, notice_warn};

/// Text returned in place of a document that cannot be read as PDF.
pub const PDF_READ_ERROR: &str = "PDF read error";

const PDF_MAGIC: &[u8] = b"%PDF-";
/// The header may be preceded by a little junk.
const MAGIC_WINDOW: usize = 1024;

/// Page texts joined with `\n`. Never fails: unreadable input yields
/// [`PDF_READ_ERROR`].
pub fn pdf_text(bytes: &[u8]) -> String {
    if !looks_like_pdf(bytes) {
        notice_warn!("{} bytes without a PDF header", bytes.len());
        return PDF_READ_ERROR.to_string();
    }
    match panic::catch_unwind(|| try_pdf_text(bytes)) {
        Ok(Ok(text)) => text,
        Ok(Err(err)) => {
            notice_warn!("unreadable PDF ({} bytes): {err}", bytes.len());
            PDF_READ_ERROR.to_string()
        }
        Err(_) => {
            notice_warn!("PDF parser panicked on {} bytes", bytes.len());
            PDF_READ_ERROR.to_string()
        }
    }
}

fn looks_like_pdf(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(MAGIC_WINDOW)];
    window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC)
}

fn try_pdf_text(bytes: &[u8]) -> Result<String, lopdf::Error> {
    let document = Document::load_mem(bytes)?;
    let pages = document.get_pages();
    notice_debug!("extracting text from {} PDF pages", pages.len());
    let mut texts = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        texts.push(document.extract_text(&[*page_number])?);
    }
    Ok(texts.join("\n"))
}
