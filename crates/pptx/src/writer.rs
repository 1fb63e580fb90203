//! PPTX file writer implementation.

use crate::package::{self, BODY_PLACEHOLDER_IDX, NS_DRAWING, NS_PRESENTATION, NS_RELATIONSHIPS};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use slidetext_core::{Bullet, Error, Paragraph, Result, RichTextBody, Run};
use std::io::{Cursor, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Default body text size in points.
pub const DEFAULT_BASE_FONT_SIZE: f64 = 18.0;

const MIN_FONT_SIZE: f64 = 1.0;
const MAX_FONT_SIZE: f64 = 400.0;

/// Left margin and hanging indent of bulleted paragraphs, in EMU.
const BULLET_INDENT: i64 = 342_900;
const NUMBER_INDENT: i64 = 457_200;

/// Writer producing a one-slide PPTX from slide rich text.
#[derive(Debug, Clone)]
pub struct PptxWriter {
    /// Text for the slide's title placeholder.
    title: Option<String>,

    /// Body text size in points; run sizes are this times their scale.
    base_font_size: f64,
}

impl Default for PptxWriter {
    fn default() -> Self {
        Self {
            title: None,
            base_font_size: DEFAULT_BASE_FONT_SIZE,
        }
    }
}

impl PptxWriter {
    /// Create a writer with no title and an 18pt body size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the slide title.
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title.filter(|t| !t.trim().is_empty());
        self
    }

    /// Set the body text size in points (clamped to 1-400pt).
    pub fn with_base_font_size(mut self, size: f64) -> Self {
        self.base_font_size = if size.is_finite() {
            size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
        } else {
            DEFAULT_BASE_FONT_SIZE
        };
        self
    }

    pub fn base_font_size(&self) -> f64 {
        self.base_font_size
    }

    /// Write a complete presentation whose only slide holds `body`.
    ///
    /// Returns the underlying writer once the archive is finished.
    pub fn write<W: Write + Seek>(&self, body: &RichTextBody, writer: W) -> Result<W> {
        let slide_xml = self.slide_xml(body)?;

        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts: [(&str, &str); 11] = [
            (package::CONTENT_TYPES_PATH, package::CONTENT_TYPES_XML),
            (package::PACKAGE_RELS_PATH, package::PACKAGE_RELS_XML),
            (package::PRESENTATION_PATH, package::PRESENTATION_XML),
            (package::PRESENTATION_RELS_PATH, package::PRESENTATION_RELS_XML),
            (package::MASTER_PATH, package::MASTER_XML),
            (package::MASTER_RELS_PATH, package::MASTER_RELS_XML),
            (package::LAYOUT_PATH, package::LAYOUT_XML),
            (package::LAYOUT_RELS_PATH, package::LAYOUT_RELS_XML),
            (package::THEME_PATH, package::THEME_XML),
            (package::SLIDE_PATH, slide_xml.as_str()),
            (package::SLIDE_RELS_PATH, package::SLIDE_RELS_XML),
        ];

        for (path, content) in parts {
            zip.start_file(path, options)
                .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", path, e)))?;
            zip.write_all(content.as_bytes())?;
        }

        let writer = zip
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))?;

        log::debug!(
            "Wrote presentation with {} paragraphs, {} runs",
            body.paragraphs.len(),
            body.run_count()
        );

        Ok(writer)
    }

    /// Write the presentation into memory.
    pub fn to_bytes(&self, body: &RichTextBody) -> Result<Vec<u8>> {
        let cursor = self.write(body, Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    /// Build the XML of the single slide.
    pub fn slide_xml(&self, body: &RichTextBody) -> Result<String> {
        let mut xml = XmlOut::new();

        xml.decl()?;
        xml.start(
            "p:sld",
            &[
                ("xmlns:a", NS_DRAWING),
                ("xmlns:r", NS_RELATIONSHIPS),
                ("xmlns:p", NS_PRESENTATION),
            ],
        )?;
        xml.start("p:cSld", &[])?;
        xml.start("p:spTree", &[])?;

        xml.start("p:nvGrpSpPr", &[])?;
        xml.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
        xml.empty("p:cNvGrpSpPr", &[])?;
        xml.empty("p:nvPr", &[])?;
        xml.end("p:nvGrpSpPr")?;
        xml.empty("p:grpSpPr", &[])?;

        if let Some(title) = &self.title {
            self.write_shape(&mut xml, 2, "Title 1", &[("type", "title")], |xml| {
                xml.start("a:p", &[])?;
                self.write_run(xml, &Run::new(title.as_str()))?;
                xml.end("a:p")
            })?;
        }

        self.write_shape(
            &mut xml,
            3,
            "Content Placeholder 2",
            &[("idx", BODY_PLACEHOLDER_IDX)],
            |xml| {
                if body.is_empty() {
                    xml.empty("a:p", &[])?;
                }
                for paragraph in &body.paragraphs {
                    self.write_paragraph(xml, paragraph)?;
                }
                Ok(())
            },
        )?;

        xml.end("p:spTree")?;
        xml.end("p:cSld")?;
        xml.start("p:clrMapOvr", &[])?;
        xml.empty("a:masterClrMapping", &[])?;
        xml.end("p:clrMapOvr")?;
        xml.end("p:sld")?;

        xml.finish()
    }

    /// Write a placeholder shape whose text body is filled by `paragraphs`.
    fn write_shape<F>(
        &self,
        xml: &mut XmlOut,
        id: u32,
        name: &str,
        placeholder: &[(&str, &str)],
        paragraphs: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut XmlOut) -> Result<()>,
    {
        let id = id.to_string();

        xml.start("p:sp", &[])?;
        xml.start("p:nvSpPr", &[])?;
        xml.empty("p:cNvPr", &[("id", id.as_str()), ("name", name)])?;
        xml.start("p:cNvSpPr", &[])?;
        xml.empty("a:spLocks", &[("noGrp", "1")])?;
        xml.end("p:cNvSpPr")?;
        xml.start("p:nvPr", &[])?;
        xml.empty("p:ph", placeholder)?;
        xml.end("p:nvPr")?;
        xml.end("p:nvSpPr")?;
        xml.empty("p:spPr", &[])?;

        xml.start("p:txBody", &[])?;
        xml.start("a:bodyPr", &[])?;
        xml.empty("a:normAutofit", &[])?;
        xml.end("a:bodyPr")?;
        xml.empty("a:lstStyle", &[])?;
        paragraphs(xml)?;
        xml.end("p:txBody")?;
        xml.end("p:sp")
    }

    fn write_paragraph(&self, xml: &mut XmlOut, paragraph: &Paragraph) -> Result<()> {
        xml.start("a:p", &[])?;

        match paragraph.bullet {
            Bullet::None => {
                xml.start("a:pPr", &[("marL", "0"), ("indent", "0")])?;
                xml.empty("a:buNone", &[])?;
            }
            Bullet::Symbol => {
                let (mar_l, indent) = indent_attrs(BULLET_INDENT);
                xml.start("a:pPr", &[("marL", mar_l.as_str()), ("indent", indent.as_str())])?;
                xml.empty("a:buFont", &[("typeface", "Arial")])?;
                xml.empty("a:buChar", &[("char", "\u{2022}")])?;
            }
            Bullet::Numbered { scheme, .. } => {
                // PowerPoint numbers consecutive auto-numbered paragraphs
                // itself; every item carries the list start.
                let (mar_l, indent) = indent_attrs(NUMBER_INDENT);
                xml.start("a:pPr", &[("marL", mar_l.as_str()), ("indent", indent.as_str())])?;
                xml.empty("a:buFont", &[("typeface", "+mj-lt")])?;
                xml.empty(
                    "a:buAutoNum",
                    &[("type", scheme.ooxml_name()), ("startAt", "1")],
                )?;
            }
        }
        xml.end("a:pPr")?;

        for run in &paragraph.runs {
            self.write_run(xml, run)?;
        }

        let size = font_size_attr(self.base_font_size);
        xml.empty(
            "a:endParaRPr",
            &[("lang", "en-US"), ("sz", size.as_str()), ("dirty", "0")],
        )?;
        xml.end("a:p")
    }

    fn write_run(&self, xml: &mut XmlOut, run: &Run) -> Result<()> {
        let size = font_size_attr(run.font_size(self.base_font_size));
        let mut attrs: Vec<(&str, &str)> = vec![("lang", "en-US"), ("sz", size.as_str())];
        if run.formatting.bold {
            attrs.push(("b", "1"));
        }
        if run.formatting.italic {
            attrs.push(("i", "1"));
        }
        if run.formatting.underline {
            attrs.push(("u", "sng"));
        }
        attrs.push(("dirty", "0"));

        xml.start("a:r", &[])?;
        xml.empty("a:rPr", &attrs)?;
        xml.start("a:t", &[])?;
        xml.text(&run.text)?;
        xml.end("a:t")?;
        xml.end("a:r")
    }
}

fn indent_attrs(indent: i64) -> (String, String) {
    (indent.to_string(), (-indent).to_string())
}

/// DrawingML `sz`: hundredths of a point, 1pt to 4000pt.
fn font_size_attr(points: f64) -> String {
    let hundredths = (points * 100.0).round().clamp(100.0, 400_000.0) as u32;
    hundredths.to_string()
}

/// Thin wrapper over the quick-xml writer mapping its errors.
struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::XmlError(format!("Failed to write slide XML: {}", e)))
    }

    fn decl(&mut self) -> Result<()> {
        self.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut tag = BytesStart::new(name);
        tag.extend_attributes(attrs.iter().copied());
        self.event(Event::Start(tag))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut tag = BytesStart::new(name);
        tag.extend_attributes(attrs.iter().copied());
        self.event(Event::Empty(tag))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, text: &str) -> Result<()> {
        self.event(Event::Text(BytesText::new(text)))
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| Error::PptxWriteError(format!("Slide XML is not UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidetext_core::{AutoNumberScheme, Formatting};

    fn sample_body() -> RichTextBody {
        let mut body = RichTextBody::new();

        let mut intro = Paragraph::new(Bullet::None);
        intro.runs.push(Run::new("Tom & Jerry "));
        intro.runs.push(Run::with_formatting(
            "rule",
            Formatting {
                bold: true,
                underline: true,
                font_scale: 2.0,
                ..Formatting::default()
            },
        ));
        body.add_paragraph(intro);

        let mut item = Paragraph::new(Bullet::Numbered {
            scheme: AutoNumberScheme::ArabicPeriod,
            number: 1,
        });
        item.runs.push(Run::new("first"));
        body.add_paragraph(item);

        body.add_paragraph(Paragraph::new(Bullet::Symbol));
        body
    }

    #[test]
    fn test_slide_xml_runs_and_bullets() {
        let xml = PptxWriter::new().slide_xml(&sample_body()).unwrap();

        assert!(xml.contains("<a:t>Tom &amp; Jerry </a:t>"));
        assert!(xml.contains(r#"<a:rPr lang="en-US" sz="3600" b="1" u="sng" dirty="0"/>"#));
        assert!(xml.contains(r#"<a:buAutoNum type="arabicPeriod" startAt="1"/>"#));
        assert!(xml.contains("<a:buNone/>"));
        assert!(xml.contains(r#"<a:buChar char="•"/>"#));
        assert!(xml.contains(r#"<p:ph idx="1"/>"#));
        assert!(!xml.contains(r#"<p:ph type="title"/>"#));
    }

    #[test]
    fn test_slide_xml_title_and_empty_body() {
        let writer = PptxWriter::new().with_title(Some("Agenda <1>".to_string()));
        let xml = writer.slide_xml(&RichTextBody::new()).unwrap();

        assert!(xml.contains(r#"<p:ph type="title"/>"#));
        assert!(xml.contains("<a:t>Agenda &lt;1&gt;</a:t>"));
        assert!(xml.contains("<a:p/>"));
    }

    #[test]
    fn test_blank_title_is_dropped() {
        let writer = PptxWriter::new().with_title(Some("   ".to_string()));
        let xml = writer.slide_xml(&RichTextBody::new()).unwrap();
        assert!(!xml.contains(r#"type="title""#));
    }

    #[test]
    fn test_base_font_size_is_clamped() {
        assert_eq!(PptxWriter::new().with_base_font_size(0.0).base_font_size(), 1.0);
        assert_eq!(PptxWriter::new().with_base_font_size(9000.0).base_font_size(), 400.0);
        assert_eq!(
            PptxWriter::new().with_base_font_size(f64::NAN).base_font_size(),
            DEFAULT_BASE_FONT_SIZE
        );
    }

    #[test]
    fn test_font_size_attr() {
        assert_eq!(font_size_attr(18.0), "1800");
        assert_eq!(font_size_attr(18.0 * 2.125), "3825");
        assert_eq!(font_size_attr(0.1), "100");
    }

    #[test]
    fn test_write_produces_zip_archive() {
        let bytes = PptxWriter::new().to_bytes(&sample_body()).unwrap();
        assert!(bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]));

        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert!(names.contains(&"[Content_Types].xml"));
        assert!(names.contains(&"ppt/slides/slide1.xml"));
        assert!(names.contains(&"ppt/theme/theme1.xml"));
        assert_eq!(archive.len(), 11);
    }
}
