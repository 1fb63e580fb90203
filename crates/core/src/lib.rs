//! Core conversion of HTML document trees into slide rich text.
//!
//! The [`transducer`] walks a read-only [`Dom`] once and drives a
//! [`DocumentSink`], deciding for each node whether it opens a paragraph,
//! opens or extends a run, or is transparent.

pub mod classify;
pub mod context;
pub mod dom;
pub mod error;
pub mod sink;
pub mod transducer;
pub mod types;

pub use context::{EmissionContext, Formatting};
pub use dom::{Dom, NodeData, NodeId, NodeRef};
pub use error::{Error, Result};
pub use sink::DocumentSink;
pub use transducer::{convert, convert_to_body};
pub use types::{
    AutoNumberScheme, Bullet, Paragraph, ParagraphId, RichTextBody, Run, RunId, SlideContent,
};
