//! Domain types for representing slide rich text.

use serde::{Deserialize, Serialize};

use crate::context::Formatting;
use crate::sink::DocumentSink;

/// Auto-numbering scheme of a numbered paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoNumberScheme {
    /// `1.`, `2.`, `3.`
    ArabicPeriod,
}

impl AutoNumberScheme {
    /// DrawingML `buAutoNum` type name.
    pub fn ooxml_name(&self) -> &'static str {
        match self {
            AutoNumberScheme::ArabicPeriod => "arabicPeriod",
        }
    }

    /// Parse a DrawingML `buAutoNum` type name.
    pub fn from_ooxml_name(name: &str) -> Option<Self> {
        match name {
            "arabicPeriod" => Some(Self::ArabicPeriod),
            _ => None,
        }
    }

    /// Label shown in front of item `number`.
    pub fn label(&self, number: u32) -> String {
        match self {
            AutoNumberScheme::ArabicPeriod => format!("{}.", number),
        }
    }
}

/// Bullet mode of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Bullet {
    /// Plain paragraph.
    #[default]
    None,
    /// Bullet symbol.
    Symbol,
    /// Auto-numbered list item.
    Numbered {
        scheme: AutoNumberScheme,
        /// 1-based position of the item within its list.
        number: u32,
    },
}

impl Bullet {
    pub fn is_bulleted(&self) -> bool {
        !matches!(self, Bullet::None)
    }

    pub fn is_numbered(&self) -> bool {
        matches!(self, Bullet::Numbered { .. })
    }
}

/// A span of text with uniform formatting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Run {
    /// The text content.
    pub text: String,

    /// Formatting applied to the whole run.
    pub formatting: Formatting,
}

impl Run {
    /// Create an unformatted run.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            formatting: Formatting::default(),
        }
    }

    /// Create a run with the given formatting.
    pub fn with_formatting(text: impl Into<String>, formatting: Formatting) -> Self {
        Self {
            text: text.into(),
            formatting,
        }
    }

    /// Resolved font size in points for a body size of `base_size_pt`.
    pub fn font_size(&self, base_size_pt: f64) -> f64 {
        base_size_pt * self.formatting.font_scale
    }
}

/// One paragraph of the text body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Bullet mode, fixed when the paragraph is created.
    pub bullet: Bullet,

    /// Runs in reading order. May be empty.
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Create an empty paragraph.
    pub fn new(bullet: Bullet) -> Self {
        Self {
            bullet,
            runs: Vec::new(),
        }
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Handle to a paragraph of a [`RichTextBody`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParagraphId(usize);

/// Handle to a run of a [`RichTextBody`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunId {
    paragraph: usize,
    run: usize,
}

/// The text body of a slide shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RichTextBody {
    /// Paragraphs in document order.
    pub paragraphs: Vec<Paragraph>,
}

impl RichTextBody {
    /// Create an empty body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finished paragraph.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Total number of runs across all paragraphs.
    pub fn run_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.runs.len()).sum()
    }

    /// Plain text rendering, one line per paragraph, with bullet labels.
    pub fn to_plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| match p.bullet {
                Bullet::None => p.text(),
                Bullet::Symbol => format!("\u{2022} {}", p.text()),
                Bullet::Numbered { scheme, number } => {
                    format!("{} {}", scheme.label(number), p.text())
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl DocumentSink for RichTextBody {
    type Paragraph = ParagraphId;
    type Run = RunId;

    fn open_paragraph(&mut self, bullet: Bullet) -> ParagraphId {
        self.paragraphs.push(Paragraph::new(bullet));
        ParagraphId(self.paragraphs.len() - 1)
    }

    fn open_run(&mut self, paragraph: &ParagraphId) -> RunId {
        let runs = &mut self.paragraphs[paragraph.0].runs;
        runs.push(Run::default());
        RunId {
            paragraph: paragraph.0,
            run: runs.len() - 1,
        }
    }

    fn push_run_text(&mut self, run: &RunId, text: &str) {
        self.paragraphs[run.paragraph].runs[run.run]
            .text
            .push_str(text);
    }

    fn apply_formatting(&mut self, run: &RunId, formatting: &Formatting) {
        let target = &mut self.paragraphs[run.paragraph].runs[run.run].formatting;
        *target = target.merge(*formatting);
    }
}

/// Text bodies read from one slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideContent {
    /// 1-based slide number.
    pub number: usize,

    /// Text bodies of the slide's shapes, in document order.
    pub bodies: Vec<RichTextBody>,
}

impl SlideContent {
    /// Create a slide with no text bodies.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            bodies: Vec::new(),
        }
    }
}
