//! HTML input backend for slide rich-text conversion.
//!
//! Parses markup with `scraper` and copies the result into the read-only
//! tree the core transducer walks.

pub mod parser;

pub use parser::{HtmlParser, ParsedHtml};
