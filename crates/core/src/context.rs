//! Formatting state and the emission context carried through the traversal.

use serde::{Deserialize, Serialize};

use crate::types::Bullet;

/// Run-level formatting.
///
/// Flags only ever turn on. Font scales compose by multiplication, so a
/// heading nested in a heading grows further instead of replacing the
/// outer size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Formatting {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Multiplier applied to the body font size.
    pub font_scale: f64,
}

impl Default for Formatting {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            underline: false,
            font_scale: 1.0,
        }
    }
}

impl Formatting {
    /// Combine two formatting states: flags are OR'd, scales multiplied.
    pub fn merge(self, other: Formatting) -> Formatting {
        Formatting {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
            underline: self.underline || other.underline,
            font_scale: self.font_scale * other.font_scale,
        }
    }

    /// True when merging this state would change nothing.
    pub fn is_plain(&self) -> bool {
        !self.bold && !self.italic && !self.underline && self.font_scale == 1.0
    }
}

/// Which output container new content attaches to.
///
/// `P` and `R` are the sink's paragraph and run handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmissionContext<P, R> {
    /// No paragraph is open.
    Body,
    /// A paragraph is open and has no run that later text should join.
    Paragraph {
        paragraph: P,
        /// Decided when the paragraph was opened; never changed afterwards.
        bullet: Bullet,
        /// Inherited by every run opened in this paragraph.
        formatting: Formatting,
    },
    /// A run is open; `formatting` has already been applied to it.
    Run { run: R, formatting: Formatting },
}

impl<P, R> EmissionContext<P, R> {
    /// Formatting that content emitted under this context inherits.
    pub fn formatting(&self) -> Formatting {
        match self {
            EmissionContext::Body => Formatting::default(),
            EmissionContext::Paragraph { formatting, .. } | EmissionContext::Run { formatting, .. } => {
                *formatting
            }
        }
    }
}
