use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::LazyLock;

use regex::Regex;

use super::fields::extract_fields;
use super::{ExtractedDocument, ExtractedPage};
use crate::error::ImportError;

/// Below this share of readable characters a page is flagged as garbled
pub const GARBLED_THRESHOLD: f32 = 0.3;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static PAREN_STRING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((.*?)\)").expect("valid regex"));
static NOT_WORDISH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\s\-.,@]").expect("valid regex"));

/// Text of one page: `raw` keeps line breaks for field matching
#[derive(Debug, Clone, PartialEq)]
struct PageText {
    raw: String,
    display: String,
}

/// Collapse runs of whitespace and trim
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_owned()
}

fn is_readable(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || ".,-:;'\"!?".contains(c)
}

/// Share of characters that look like ordinary text
pub fn readable_ratio(text: &str) -> f32 {
    let total = text.chars().count();
    if total == 0 {
        return 1.0;
    }
    text.chars().filter(|&c| is_readable(c)).count() as f32 / total as f32
}

pub fn is_garbled(text: &str) -> bool {
    readable_ratio(text) < GARBLED_THRESHOLD
}

/// Extract per-page text and labelled fields from PDF bytes.
///
/// Text comes from the PDF's content streams; when that fails the raw bytes
/// are scanned for literal strings instead.
pub fn extract_document(bytes: &[u8]) -> Result<ExtractedDocument, ImportError> {
    if bytes.is_empty() {
        return Err(ImportError::NoFile);
    }

    let texts = match extract_pages(bytes) {
        Ok(pages) => pages,
        Err(reason) => {
            log::warn!("Text extraction failed ({}), scanning raw bytes", reason);
            fallback_pages(bytes)
        }
    };
    if texts.is_empty() {
        return Err(ImportError::NoText);
    }

    let pages = texts
        .into_iter()
        .enumerate()
        .map(|(index, page)| {
            let garbled = is_garbled(&page.display);
            if garbled {
                log::warn!("Page {} text might be garbled", index + 1);
            }
            ExtractedPage {
                page_number: index + 1,
                data: extract_fields(&page.raw),
                text: page.display,
                garbled,
            }
        })
        .collect::<Vec<_>>();

    log::info!("Extracted text from {} page(s)", pages.len());
    Ok(ExtractedDocument {
        total_pages: pages.len(),
        pages,
    })
}

fn extract_pages(bytes: &[u8]) -> Result<Vec<PageText>, String> {
    // pdf-extract panics on some malformed inputs
    let result = catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }))
    .map_err(|_| "extractor panicked".to_owned())?;
    let pages = result.map_err(|err| err.to_string())?;

    Ok(pages
        .into_iter()
        .filter_map(|raw| {
            let display = normalize_whitespace(&raw);
            (!display.is_empty()).then_some(PageText { raw, display })
        })
        .collect())
}

/// Literal `( ... )` strings from the undecoded file, as a single page
fn fallback_pages(bytes: &[u8]) -> Vec<PageText> {
    let latin1 = bytes.iter().map(|&b| b as char).collect::<String>();
    let joined = PAREN_STRING
        .captures_iter(&latin1)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\\', "");
    let cleaned = NOT_WORDISH.replace_all(&joined, " ");
    let text = normalize_whitespace(&cleaned);

    if text.is_empty() {
        Vec::new()
    } else {
        vec![PageText {
            raw: text.clone(),
            display: text,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_compile() {
        LazyLock::force(&WHITESPACE);
        LazyLock::force(&PAREN_STRING);
        LazyLock::force(&NOT_WORDISH);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(extract_document(&[]), Err(ImportError::NoFile)));
    }

    #[test]
    fn test_not_a_pdf_without_strings() {
        assert!(matches!(
            extract_document(b"definitely not a pdf"),
            Err(ImportError::NoText)
        ));
    }

    #[test]
    fn test_fallback_scans_literal_strings() {
        let bytes = b"%PDF-1.4 garbage BT (Invoice) Tj (for\\) Tj (ACME #1) Tj ET";
        let pages = fallback_pages(bytes);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].display, "Invoice for ACME 1");
    }

    #[test]
    fn test_garbled_detection() {
        assert!(!is_garbled("Name: John Smith"));
        assert!(is_garbled("ÿþ§¶•ªº¤¥©®"));
        assert_eq!(readable_ratio(""), 1.0);
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a\n\n b\tc  "), "a b c");
    }
}
