//! Tag classification tables.
//!
//! All predicates take a lowercase tag name. Tags not listed anywhere here
//! are transparent: they neither open a paragraph nor a run.

use crate::context::Formatting;

/// Font scale for `h1`, relative to the body size.
pub const H1_SCALE: f64 = 2.125;
/// Font scale for `h2`.
pub const H2_SCALE: f64 = 1.875;
/// Font scale for `h3`.
pub const H3_SCALE: f64 = 1.5;

/// Tags that start a paragraph when met with no paragraph open.
///
/// Bare inline markup at top level still needs a paragraph to hold it, so
/// the inline formatting tags are included. Inside a paragraph or run those
/// tags are caught by [`is_run_opener`] first.
const PARAGRAPH_TAGS: &[&str] = &[
    "p", "li", "h1", "h2", "h3", "b", "i", "u", "strong", "em",
];

/// Tags whose formatting can only be expressed on a run.
const RUN_TAGS: &[&str] = &["b", "strong", "i", "em", "u", "h1", "h2", "h3"];

pub fn is_paragraph_opener(tag: &str) -> bool {
    PARAGRAPH_TAGS.contains(&tag)
}

pub fn is_run_opener(tag: &str) -> bool {
    RUN_TAGS.contains(&tag)
}

/// Heading font scale; 1.0 for anything that is not `h1`-`h3`.
pub fn heading_scale(tag: &str) -> f64 {
    match tag {
        "h1" => H1_SCALE,
        "h2" => H2_SCALE,
        "h3" => H3_SCALE,
        _ => 1.0,
    }
}

pub fn is_list_item(tag: &str) -> bool {
    tag == "li"
}

pub fn is_ordered_list(tag: &str) -> bool {
    tag == "ol"
}

/// Formatting a run-opener applies on its own.
///
/// Headings only scale the font; they do not imply bold.
pub fn tag_formatting(tag: &str) -> Formatting {
    let mut formatting = Formatting {
        font_scale: heading_scale(tag),
        ..Formatting::default()
    };
    match tag {
        "b" | "strong" => formatting.bold = true,
        "i" | "em" => formatting.italic = true,
        "u" => formatting.underline = true,
        _ => {}
    }
    formatting
}
