use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

static LAYOUT_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\n\t\r]").expect("valid layout character regex"));

/// Text of the first element matching `container`, with newlines, tabs and carriage
/// returns removed and surrounding spaces trimmed.
///
/// `None` means the container is absent; `Some("")` means it exists but is empty.
pub fn extract_status(html: &str, container: &Selector) -> Option<String> {
    let document = Html::parse_document(html);
    let element = document.select(container).next()?;
    let text = element.text().collect::<String>();
    Some(LAYOUT_CHARS.replace_all(&text, "").trim().to_string())
}
