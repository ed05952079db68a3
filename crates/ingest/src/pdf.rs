use crate::error::{IngestError, Result};
use crate::window::Window;
use lopdf::Document;
use tracing::{debug, warn};

/// Text of the windowed pages, one page per line block.
pub fn parse_pdf(bytes: &[u8], window: Window) -> Result<String> {
    let doc = Document::load_mem(bytes).map_err(|e| IngestError::malformed("pdf", e))?;

    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    let selected = window.apply(&page_numbers, "page");

    let mut pages = Vec::with_capacity(selected.len());
    for &page in selected {
        match doc.extract_text(&[page]) {
            Ok(text) => pages.push(text),
            Err(e) => {
                // Pages without a readable content stream still count as units
                warn!(page, error = %e, "Failed to extract page text");
                pages.push(String::new());
            }
        }
    }

    debug!(total = page_numbers.len(), selected = pages.len(), "Parsed pdf");
    Ok(pages.join("\n"))
}
