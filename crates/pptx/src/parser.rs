//! PPTX file parser implementation.
//!
//! Reads the text bodies of every slide back into [`RichTextBody`] values.

use crate::writer::DEFAULT_BASE_FONT_SIZE;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use slidetext_core::{
    AutoNumberScheme, Bullet, Error, Formatting, Paragraph, Result, RichTextBody, Run,
    SlideContent,
};
use std::io::{Read, Seek};
use zip::ZipArchive;

/// Parser for PPTX (Office Open XML) files.
#[derive(Debug, Clone)]
pub struct PptxParser {
    /// Body size in points that run sizes are divided by to get a scale.
    base_font_size: f64,
}

impl PptxParser {
    /// Create a new PPTX parser assuming an 18pt body size.
    pub fn new() -> Self {
        Self {
            base_font_size: DEFAULT_BASE_FONT_SIZE,
        }
    }

    /// Set the body size used to turn run sizes back into scales.
    pub fn with_base_font_size(mut self, size: f64) -> Self {
        if size.is_finite() && size > 0.0 {
            self.base_font_size = size;
        }
        self
    }

    /// Parse a PPTX file from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<Vec<SlideContent>> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let slide_order = self.get_slide_order(&mut archive)?;
        log::debug!("Found {} slides", slide_order.len());

        let mut slides = Vec::with_capacity(slide_order.len());
        for (idx, slide_path) in slide_order.iter().enumerate() {
            let content = self.read_file_from_archive(&mut archive, slide_path)?;
            let mut slide = SlideContent::new(idx + 1);
            slide.bodies = self.extract_text_bodies(&content)?;
            slides.push(slide);
        }

        Ok(slides)
    }

    /// Get the ordered list of slide paths from the presentation relationships.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_path = "ppt/_rels/presentation.xml.rels";

        let rels_content = self.read_file_from_archive(archive, rels_path)?;
        let mut slides: Vec<(String, Option<usize>)> = Vec::new();

        let mut reader = Reader::from_str(&rels_content);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let rel_type = attribute(e, b"Type").unwrap_or_default();
                    let target = attribute(e, b"Target").unwrap_or_default();
                    let id = attribute(e, b"Id").unwrap_or_default();

                    // Slide relationships only, not layouts or masters
                    if rel_type.ends_with("/slide") {
                        let order_num =
                            extract_slide_number(&id).or_else(|| extract_slide_number(&target));
                        let full_path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("ppt/{}", target),
                        };
                        slides.push((full_path, order_num));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    /// Extract every `txBody` of a slide, in document order.
    fn extract_text_bodies(&self, xml_content: &str) -> Result<Vec<RichTextBody>> {
        let mut reader = Reader::from_str(xml_content);
        // Run text keeps its leading and trailing spaces.
        reader.trim_text(false);

        let mut state = TextBodyState::default();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    match local_name(name.as_ref()) {
                        b"txBody" => state.body = Some(RichTextBody::new()),
                        b"p" if state.body.is_some() => {
                            state.paragraph = Some(Paragraph::new(Bullet::None))
                        }
                        b"r" if state.paragraph.is_some() => state.run = Some(Run::default()),
                        b"t" if state.run.is_some() => state.in_text = true,
                        other => self.apply_properties(&mut state, other, e),
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    let name = e.name();
                    match local_name(name.as_ref()) {
                        b"p" if state.body.is_some() => {
                            state.paragraph = Some(Paragraph::new(Bullet::None));
                            state.finish_paragraph();
                        }
                        other => self.apply_properties(&mut state, other, e),
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if state.in_text {
                        if let Some(run) = state.run.as_mut() {
                            let text = e
                                .unescape()
                                .map_err(|e| Error::XmlError(format!("Bad run text: {}", e)))?;
                            run.text.push_str(&text);
                        }
                    }
                }
                Ok(Event::End(ref e)) => {
                    let name = e.name();
                    match local_name(name.as_ref()) {
                        b"t" => state.in_text = false,
                        b"r" => {
                            if let (Some(run), Some(paragraph)) =
                                (state.run.take(), state.paragraph.as_mut())
                            {
                                paragraph.runs.push(run);
                            }
                        }
                        b"p" => state.finish_paragraph(),
                        b"txBody" => {
                            if let Some(body) = state.body.take() {
                                state.bodies.push(body);
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing slide at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
                _ => {}
            }
        }

        Ok(state.bodies)
    }

    /// Apply bullet and run properties from elements inside a paragraph.
    fn apply_properties(&self, state: &mut TextBodyState, name: &[u8], e: &BytesStart<'_>) {
        match name {
            b"buNone" | b"buChar" | b"buAutoNum" if state.run.is_none() => {
                if let Some(paragraph) = state.paragraph.as_mut() {
                    paragraph.bullet = bullet_from_element(name, e);
                }
            }
            b"rPr" => {
                if let Some(run) = state.run.as_mut() {
                    run.formatting = self.formatting_from_element(e);
                }
            }
            _ => {}
        }
    }

    fn formatting_from_element(&self, e: &BytesStart<'_>) -> Formatting {
        let is_on = |value: Option<String>| matches!(value.as_deref(), Some("1") | Some("true"));

        let font_scale = attribute(e, b"sz")
            .and_then(|sz| sz.parse::<f64>().ok())
            .map(|sz| sz / 100.0 / self.base_font_size)
            .unwrap_or(1.0);

        Formatting {
            bold: is_on(attribute(e, b"b")),
            italic: is_on(attribute(e, b"i")),
            underline: attribute(e, b"u").is_some_and(|u| u != "none"),
            font_scale,
        }
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive.by_name(path).map_err(|e| {
            Error::PptxReadError(format!("File not found in archive '{}': {}", path, e))
        })?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Paragraphs and runs being collected while walking a slide.
#[derive(Debug, Default)]
struct TextBodyState {
    bodies: Vec<RichTextBody>,
    body: Option<RichTextBody>,
    paragraph: Option<Paragraph>,
    run: Option<Run>,
    in_text: bool,
}

impl TextBodyState {
    /// Close the open paragraph, continuing the numbering of the one before.
    fn finish_paragraph(&mut self) {
        let (Some(mut paragraph), Some(body)) = (self.paragraph.take(), self.body.as_mut()) else {
            return;
        };

        if let Bullet::Numbered { scheme, number } = &mut paragraph.bullet {
            if let Some(Bullet::Numbered {
                scheme: previous_scheme,
                number: previous,
            }) = body.paragraphs.last().map(|p| p.bullet)
            {
                if previous_scheme == *scheme {
                    *number = previous + 1;
                }
            }
        }

        body.paragraphs.push(paragraph);
    }
}

fn bullet_from_element(name: &[u8], e: &BytesStart<'_>) -> Bullet {
    match name {
        b"buChar" => Bullet::Symbol,
        b"buAutoNum" => {
            let kind = attribute(e, b"type").unwrap_or_default();
            let scheme = AutoNumberScheme::from_ooxml_name(&kind).unwrap_or_else(|| {
                log::warn!("Unsupported numbering scheme '{}', reading as arabic", kind);
                AutoNumberScheme::ArabicPeriod
            });
            let start_at = attribute(e, b"startAt")
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(1);
            Bullet::Numbered {
                scheme,
                number: start_at,
            }
        }
        _ => Bullet::None,
    }
}

/// Value of an attribute, matched on its local name.
fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| local_name(attr.key.as_ref()) == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PptxWriter;
    use slidetext_html::HtmlParser;
    use std::io::Cursor;

    fn round_trip(html: &str, writer: PptxWriter) -> Vec<SlideContent> {
        let body = HtmlParser::new().parse(html).to_rich_text();
        let bytes = writer.to_bytes(&body).unwrap();
        PptxParser::new()
            .with_base_font_size(writer.base_font_size())
            .parse(Cursor::new(bytes))
            .unwrap()
    }

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_written_body_reads_back() {
        let html = "<h1>Title</h1><p>Hello <b>world</b></p><ol><li>One</li><li>Two</li></ol>";
        let expected = HtmlParser::new().parse(html).to_rich_text();

        let slides = round_trip(html, PptxWriter::new());

        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].number, 1);
        assert_eq!(slides[0].bodies, vec![expected]);
    }

    #[test]
    fn test_title_is_first_body() {
        let slides = round_trip(
            "<ul><li>point</li></ul>",
            PptxWriter::new()
                .with_title(Some("Deck".to_string()))
                .with_base_font_size(24.0),
        );

        let bodies = &slides[0].bodies;
        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[0].to_plain_text(), "Deck");
        assert_eq!(bodies[1].paragraphs[0].bullet, Bullet::Symbol);
        assert_eq!(bodies[1].paragraphs[0].runs[0].formatting.font_scale, 1.0);
    }

    #[test]
    fn test_empty_body_reads_single_empty_paragraph() {
        let slides = round_trip("   ", PptxWriter::new());
        assert_eq!(slides[0].bodies[0].paragraphs, vec![Paragraph::new(Bullet::None)]);
    }

    #[test]
    fn test_not_a_zip() {
        let result = PptxParser::new().parse(Cursor::new(b"<html></html>".to_vec()));
        assert!(matches!(result, Err(Error::ZipError(_))));
    }
}
