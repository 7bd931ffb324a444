//! Page title resolution.

use crate::parse::Document;

/// Configuration for title resolution.
#[derive(Debug, Clone)]
pub struct TitleConfig {
    /// Title returned when no candidate has text (default: "Untitled").
    pub fallback: String,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self { fallback: "Untitled".to_string() }
    }
}

/// Resolve a title with priority fallback:
/// 1. first `<h1>` with non-empty text
/// 2. first `<h2>` with non-empty text
/// 3. `<title>` element
/// 4. `config.fallback`
pub fn resolve_title(doc: &Document, config: &TitleConfig) -> String {
    first_heading(doc, "h1")
        .or_else(|| first_heading(doc, "h2"))
        .or_else(|| doc.title())
        .unwrap_or_else(|| config.fallback.clone())
}

fn first_heading(doc: &Document, tag: &str) -> Option<String> {
    doc.root()
        .descendants()
        .filter(|el| el.is(tag))
        .map(|el| el.visible_text())
        .find(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title_of(html: &str) -> String {
        resolve_title(&Document::parse(html).unwrap(), &TitleConfig::default())
    }

    #[test]
    fn test_h1_beats_title_element() {
        let html = "<html><head><title>Site Name</title></head><body><h1>Post Title</h1></body></html>";
        assert_eq!(title_of(html), "Post Title");
    }

    #[test]
    fn test_skips_empty_h1() {
        let html = "<html><body><h1>  </h1><h1><span>Real</span>  Title</h1></body></html>";
        assert_eq!(title_of(html), "Real Title");
    }

    #[test]
    fn test_h2_before_title_element() {
        let html = "<html><head><title>Site</title></head><body><h1></h1><h2>Sub</h2></body></html>";
        assert_eq!(title_of(html), "Sub");
    }

    #[test]
    fn test_title_element_fallback() {
        let html = "<html><head><title>\n  Only Title \n</title></head><body><p>x</p></body></html>";
        assert_eq!(title_of(html), "Only Title");
    }

    #[test]
    fn test_configured_fallback() {
        let doc = Document::parse("<p>no headings</p>").unwrap();
        assert_eq!(resolve_title(&doc, &TitleConfig::default()), "Untitled");

        let config = TitleConfig { fallback: "(no title)".to_string() };
        assert_eq!(resolve_title(&doc, &config), "(no title)");
    }
}
