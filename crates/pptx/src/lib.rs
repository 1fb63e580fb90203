//! PPTX (Office Open XML) backend for slide rich text.
//!
//! Writes converted text into the body placeholder of a one-slide .pptx
//! (a ZIP archive of XML parts) and reads slide text bodies back.

mod package;
pub mod parser;
pub mod writer;

pub use parser::PptxParser;
pub use writer::{PptxWriter, DEFAULT_BASE_FONT_SIZE};
