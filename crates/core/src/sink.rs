//! Output side of the transducer.

use crate::context::Formatting;
use crate::types::Bullet;

/// Receiver of paragraphs and runs, in traversal order.
///
/// Handles are opaque to the transducer. A sink is driven by one traversal
/// at a time.
pub trait DocumentSink {
    type Paragraph: Copy;
    type Run: Copy;

    /// Start a new paragraph at the end of the body.
    fn open_paragraph(&mut self, bullet: Bullet) -> Self::Paragraph;

    /// Start a new, unformatted run at the end of `paragraph`.
    fn open_run(&mut self, paragraph: &Self::Paragraph) -> Self::Run;

    /// Append text to a run.
    fn push_run_text(&mut self, run: &Self::Run, text: &str);

    /// Merge `formatting` into the run's current formatting.
    ///
    /// Flags are OR'd and the font scale is multiplied; a flag is never
    /// reset to false.
    fn apply_formatting(&mut self, run: &Self::Run, formatting: &Formatting);
}
