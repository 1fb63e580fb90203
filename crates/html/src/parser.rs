//! HTML parser implementation.

use regex::Regex;
use scraper::{ElementRef, Html, Node as ScraperNode, Selector};
use slidetext_core::{convert_to_body, Dom, Error, NodeId, Result, RichTextBody};
use std::sync::LazyLock;

/// Regex matching runs of HTML whitespace.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\n\r\x0C]+").unwrap());

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

/// Elements whose content is never rendered as slide text.
const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "template", "noscript"];

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// A parsed HTML document.
#[derive(Debug, Clone)]
pub struct ParsedHtml {
    /// Content tree, rooted at a document node.
    pub dom: Dom,

    /// Text of the `<title>` element, if present and non-blank.
    pub title: Option<String>,
}

impl ParsedHtml {
    /// Convert the content tree into slide rich text.
    pub fn to_rich_text(&self) -> RichTextBody {
        convert_to_body(self.dom.root())
    }
}

/// Parser turning HTML markup into a [`Dom`].
#[derive(Debug, Clone)]
pub struct HtmlParser {
    /// Whether runs of whitespace inside text collapse to one space.
    collapse_whitespace: bool,
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self {
            collapse_whitespace: true,
        }
    }
}

impl HtmlParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether whitespace runs inside text nodes collapse to a single
    /// space, as a browser would render them.
    pub fn with_collapse_whitespace(mut self, collapse: bool) -> Self {
        self.collapse_whitespace = collapse;
        self
    }

    /// Parse an HTML document or fragment.
    ///
    /// Parsing never fails; malformed markup is repaired the way browsers
    /// repair it.
    pub fn parse(&self, html: &str) -> ParsedHtml {
        let document = Html::parse_document(html);

        let title = document
            .select(&TITLE_SELECTOR)
            .next()
            .map(|title| self.clean_text(&title.text().collect::<String>()).trim().to_string())
            .filter(|title| !title.is_empty());

        let mut dom = Dom::new();
        let root = document.root_element();
        let html_id = dom.append_element(dom.root_id(), root.value().name());
        self.copy_children(root, &mut dom, html_id);

        log::debug!("Parsed HTML into {} nodes", dom.len());

        ParsedHtml { dom, title }
    }

    /// Parse raw bytes, which must be UTF-8 (a leading BOM is ignored).
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<ParsedHtml> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let html = std::str::from_utf8(bytes)
            .map_err(|e| Error::InvalidEncoding(format!("HTML input is not UTF-8: {}", e)))?;
        Ok(self.parse(html))
    }

    fn copy_children(&self, element: ElementRef<'_>, dom: &mut Dom, parent: NodeId) {
        for child in element.children() {
            match child.value() {
                ScraperNode::Text(text) => {
                    dom.append_text(parent, self.clean_text(text));
                }
                ScraperNode::Element(value) => {
                    let tag = value.name();
                    if SKIPPED_TAGS.contains(&tag) {
                        log::trace!("Skipping <{}>", tag);
                        continue;
                    }
                    if let Some(child_element) = ElementRef::wrap(child) {
                        let id = dom.append_element(parent, tag);
                        self.copy_children(child_element, dom, id);
                    }
                }
                _ => {
                    dom.append_other(parent);
                }
            }
        }
    }

    fn clean_text(&self, text: &str) -> String {
        if self.collapse_whitespace {
            WHITESPACE_COLLAPSE_REGEX.replace_all(text, " ").into_owned()
        } else {
            text.to_string()
        }
    }
}
