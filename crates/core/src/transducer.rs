//! Recursive conversion of an input tree into paragraphs and runs.
//!
//! One depth-first pass. Every node is dispatched to exactly one branch of
//! [`Transducer::visit`], and that branch alone walks the node's children,
//! so nothing is visited twice and the input tree is never touched.

use crate::classify::{
    is_list_item, is_ordered_list, is_paragraph_opener, is_run_opener, tag_formatting,
};
use crate::context::{EmissionContext, Formatting};
use crate::dom::{NodeData, NodeRef};
use crate::sink::DocumentSink;
use crate::types::{AutoNumberScheme, Bullet, RichTextBody};

type Context<S> = EmissionContext<<S as DocumentSink>::Paragraph, <S as DocumentSink>::Run>;

/// Convert the tree under `root` into paragraphs and runs on `sink`.
pub fn convert<S: DocumentSink>(root: NodeRef<'_>, sink: &mut S) {
    let mut transducer = Transducer {
        sink,
        paragraphs: 0,
        runs: 0,
    };
    transducer.visit(root, EmissionContext::Body);

    log::debug!(
        "Converted tree into {} paragraphs, {} runs",
        transducer.paragraphs,
        transducer.runs
    );
}

/// Convert the tree under `root` into a fresh [`RichTextBody`].
pub fn convert_to_body(root: NodeRef<'_>) -> RichTextBody {
    let mut body = RichTextBody::new();
    convert(root, &mut body);
    body
}

struct Transducer<'s, S> {
    sink: &'s mut S,
    paragraphs: usize,
    runs: usize,
}

impl<S: DocumentSink> Transducer<'_, S> {
    fn visit(&mut self, node: NodeRef<'_>, ctx: Context<S>) {
        match node.data() {
            NodeData::Text(text) => self.visit_text(text, ctx),
            NodeData::Element { tag } => self.visit_element(node, tag, ctx),
            NodeData::Document => self.visit_children(node, ctx),
            NodeData::Other => {}
        }
    }

    fn visit_text(&mut self, text: &str, ctx: Context<S>) {
        if text.trim().is_empty() {
            return;
        }
        log::trace!("Text: {:?}", text);

        let run = match ctx {
            EmissionContext::Body => {
                let paragraph = self.open_paragraph(Bullet::None);
                self.open_run(&paragraph, ctx.formatting())
            }
            EmissionContext::Paragraph { paragraph, .. } => {
                self.open_run(&paragraph, ctx.formatting())
            }
            EmissionContext::Run { run, .. } => run,
        };
        self.sink.push_run_text(&run, text);
    }

    fn visit_element(&mut self, node: NodeRef<'_>, tag: &str, ctx: Context<S>) {
        match ctx {
            EmissionContext::Body if is_paragraph_opener(tag) => self.open_block(node, tag),
            EmissionContext::Paragraph { paragraph, .. } if is_run_opener(tag) => {
                let formatting = ctx.formatting().merge(tag_formatting(tag));
                let run = self.open_run(&paragraph, formatting);
                self.visit_children(node, EmissionContext::Run { run, formatting });
            }
            EmissionContext::Run { run, .. } if is_run_opener(tag) => {
                // Extends the open run in place instead of starting a new one.
                let own = tag_formatting(tag);
                self.sink.apply_formatting(&run, &own);
                let formatting = ctx.formatting().merge(own);
                self.visit_children(node, EmissionContext::Run { run, formatting });
            }
            EmissionContext::Paragraph { .. } | EmissionContext::Run { .. }
                if is_paragraph_opener(tag) =>
            {
                self.open_block(node, tag)
            }
            _ => self.visit_children(node, ctx),
        }
    }

    /// Open a paragraph for a block-level element and convert its content.
    ///
    /// Any paragraph already open is left as it is: nested blocks always
    /// start a fresh paragraph, and the enclosing element's later children
    /// still attach to its own context.
    fn open_block(&mut self, node: NodeRef<'_>, tag: &str) {
        let bullet = list_bullet(node, tag);
        let paragraph = self.open_paragraph(bullet);

        if is_run_opener(tag) {
            let formatting = tag_formatting(tag);
            let run = self.open_run(&paragraph, formatting);
            self.visit_children(node, EmissionContext::Run { run, formatting });
        } else {
            self.visit_children(
                node,
                EmissionContext::Paragraph {
                    paragraph,
                    bullet,
                    formatting: Formatting::default(),
                },
            );
        }
    }

    fn visit_children(&mut self, node: NodeRef<'_>, ctx: Context<S>) {
        for child in node.children() {
            self.visit(child, ctx);
        }
    }

    fn open_paragraph(&mut self, bullet: Bullet) -> S::Paragraph {
        log::trace!("Opening paragraph ({:?})", bullet);
        self.paragraphs += 1;
        self.sink.open_paragraph(bullet)
    }

    fn open_run(&mut self, paragraph: &S::Paragraph, formatting: Formatting) -> S::Run {
        log::trace!("Opening run ({:?})", formatting);
        self.runs += 1;
        let run = self.sink.open_run(paragraph);
        if !formatting.is_plain() {
            self.sink.apply_formatting(&run, &formatting);
        }
        run
    }
}

/// Bullet mode for a paragraph opened by `node`.
///
/// List items are bulleted; items of an `ol` are numbered by their position
/// among the list's items, so every list starts again at 1.
fn list_bullet(node: NodeRef<'_>, tag: &str) -> Bullet {
    if !is_list_item(tag) {
        return Bullet::None;
    }

    let in_ordered_list = node
        .parent()
        .and_then(|parent| parent.tag())
        .is_some_and(is_ordered_list);
    if !in_ordered_list {
        return Bullet::Symbol;
    }

    let earlier_items = node
        .preceding_siblings()
        .filter(|sibling| sibling.tag().is_some_and(is_list_item))
        .count();

    Bullet::Numbered {
        scheme: AutoNumberScheme::ArabicPeriod,
        number: earlier_items as u32 + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Dom, NodeId};
    use crate::types::{Paragraph, Run};

    /// Test tree description: an element with children, or a text node.
    enum T {
        E(&'static str, Vec<T>),
        X(&'static str),
    }

    fn e(tag: &'static str, children: Vec<T>) -> T {
        T::E(tag, children)
    }

    fn x(text: &'static str) -> T {
        T::X(text)
    }

    fn build(nodes: Vec<T>) -> Dom {
        fn add(dom: &mut Dom, parent: NodeId, node: T) {
            match node {
                T::E(tag, children) => {
                    let id = dom.append_element(parent, tag);
                    for child in children {
                        add(dom, id, child);
                    }
                }
                T::X(text) => {
                    dom.append_text(parent, text);
                }
            }
        }

        let mut dom = Dom::new();
        let root = dom.root_id();
        for node in nodes {
            add(&mut dom, root, node);
        }
        dom
    }

    fn convert_nodes(nodes: Vec<T>) -> RichTextBody {
        let dom = build(nodes);
        convert_to_body(dom.root())
    }

    fn bold() -> Formatting {
        Formatting {
            bold: true,
            ..Formatting::default()
        }
    }

    fn numbered(number: u32) -> Bullet {
        Bullet::Numbered {
            scheme: AutoNumberScheme::ArabicPeriod,
            number,
        }
    }

    #[test]
    fn test_paragraph_with_bold_run() {
        let body = convert_nodes(vec![e("p", vec![x("Hello "), e("b", vec![x("world")])])]);

        assert_eq!(
            body.paragraphs,
            vec![Paragraph {
                bullet: Bullet::None,
                runs: vec![Run::new("Hello "), Run::with_formatting("world", bold())],
            }]
        );
    }

    #[test]
    fn test_ordered_list_items_are_numbered() {
        let body = convert_nodes(vec![e(
            "ol",
            vec![e("li", vec![x("One")]), e("li", vec![x("Two")])],
        )]);

        assert_eq!(body.paragraphs.len(), 2);
        assert_eq!(body.paragraphs[0].bullet, numbered(1));
        assert_eq!(body.paragraphs[1].bullet, numbered(2));
        assert_eq!(body.paragraphs[0].runs, vec![Run::new("One")]);
        assert_eq!(body.paragraphs[1].runs, vec![Run::new("Two")]);
    }

    #[test]
    fn test_numbering_restarts_per_list() {
        let body = convert_nodes(vec![
            e("ol", vec![e("li", vec![x("a")]), e("li", vec![x("b")])]),
            e("ol", vec![e("li", vec![x("c")])]),
        ]);

        let bullets: Vec<Bullet> = body.paragraphs.iter().map(|p| p.bullet).collect();
        assert_eq!(bullets, vec![numbered(1), numbered(2), numbered(1)]);
    }

    #[test]
    fn test_numbering_ignores_whitespace_between_items() {
        let body = convert_nodes(vec![e(
            "ol",
            vec![
                x("\n  "),
                e("li", vec![x("a")]),
                x("\n  "),
                e("li", vec![x("b")]),
            ],
        )]);

        assert_eq!(body.paragraphs.len(), 2);
        assert_eq!(body.paragraphs[1].bullet, numbered(2));
    }

    #[test]
    fn test_unordered_list_items_are_bulleted() {
        let body = convert_nodes(vec![e("ul", vec![e("li", vec![x("a")])])]);
        assert_eq!(body.paragraphs[0].bullet, Bullet::Symbol);

        // A list item with no enclosing list is still a bulleted paragraph.
        let body = convert_nodes(vec![e("li", vec![x("stray")])]);
        assert_eq!(body.paragraphs[0].bullet, Bullet::Symbol);
    }

    #[test]
    fn test_bare_text_gets_plain_paragraph() {
        let body = convert_nodes(vec![x("Hi there")]);

        assert_eq!(
            body.paragraphs,
            vec![Paragraph {
                bullet: Bullet::None,
                runs: vec![Run::new("Hi there")],
            }]
        );
    }

    #[test]
    fn test_whitespace_only_text_is_dropped() {
        let body = convert_nodes(vec![
            x("   \n\t "),
            e("div", vec![x("  ")]),
            e("p", vec![x(" ")]),
        ]);

        // Only the `p` produces output, and it holds no run.
        assert_eq!(body.paragraphs, vec![Paragraph::new(Bullet::None)]);
    }

    #[test]
    fn test_formatting_is_order_independent() {
        let bold_italic = Formatting {
            bold: true,
            italic: true,
            ..Formatting::default()
        };

        for tree in [
            e("p", vec![e("b", vec![e("i", vec![x("x")])])]),
            e("p", vec![e("i", vec![e("b", vec![x("x")])])]),
        ] {
            let body = convert_nodes(vec![tree]);
            assert_eq!(body.run_count(), 1);
            assert_eq!(body.paragraphs[0].runs[0].formatting, bold_italic);
        }
    }

    #[test]
    fn test_top_level_inline_tag_opens_paragraph() {
        let body = convert_nodes(vec![e("b", vec![e("i", vec![x("x")])])]);

        assert_eq!(body.paragraphs.len(), 1);
        let run = &body.paragraphs[0].runs[0];
        assert_eq!(run.text, "x");
        assert!(run.formatting.bold && run.formatting.italic);
    }

    #[test]
    fn test_nested_headings_multiply_scale() {
        let body = convert_nodes(vec![e("h1", vec![e("h2", vec![x("x")])])]);

        assert_eq!(body.paragraphs.len(), 1);
        let run = &body.paragraphs[0].runs[0];
        assert_eq!(run.formatting.font_scale, 2.125 * 1.875);
        assert!(!run.formatting.bold);
    }

    #[test]
    fn test_heading_inside_paragraph_is_a_run() {
        let body = convert_nodes(vec![e("p", vec![x("a"), e("h3", vec![x("b")])])]);

        assert_eq!(body.paragraphs.len(), 1);
        assert_eq!(body.paragraphs[0].runs[1].formatting.font_scale, 1.5);
    }

    #[test]
    fn test_transparent_containers() {
        let body = convert_nodes(vec![e(
            "div",
            vec![e("p", vec![x("a")]), e("p", vec![x("b")])],
        )]);

        assert_eq!(body.paragraphs.len(), 2);
        assert_eq!(body.paragraphs[0].runs, vec![Run::new("a")]);
        assert_eq!(body.paragraphs[1].runs, vec![Run::new("b")]);

        let body = convert_nodes(vec![e("p", vec![e("span", vec![x("in span")])])]);
        assert_eq!(body.paragraphs.len(), 1);
        assert_eq!(body.paragraphs[0].runs, vec![Run::new("in span")]);
    }

    #[test]
    fn test_unknown_tags_pass_through() {
        let body = convert_nodes(vec![e("blink", vec![e("p", vec![e("marquee", vec![x("x")])])])]);

        assert_eq!(body.paragraphs.len(), 1);
        assert_eq!(body.paragraphs[0].runs, vec![Run::new("x")]);
    }

    #[test]
    fn test_run_text_appends_in_place() {
        let body = convert_nodes(vec![e(
            "h1",
            vec![x("Big "), e("u", vec![x("and")]), x(" bold")],
        )]);

        assert_eq!(body.run_count(), 1);
        let run = &body.paragraphs[0].runs[0];
        assert_eq!(run.text, "Big and bold");
        assert!(run.formatting.underline);
        assert_eq!(run.formatting.font_scale, 2.125);
    }

    #[test]
    fn test_nested_list_item_opens_new_paragraph() {
        let body = convert_nodes(vec![e(
            "ul",
            vec![e(
                "li",
                vec![
                    x("outer"),
                    e("ol", vec![e("li", vec![x("inner")])]),
                    x("after"),
                ],
            )],
        )]);

        // Text after the nested list stays in the outer item's paragraph.
        assert_eq!(body.paragraphs.len(), 2);
        assert_eq!(body.paragraphs[0].bullet, Bullet::Symbol);
        assert_eq!(
            body.paragraphs[0].runs,
            vec![Run::new("outer"), Run::new("after")]
        );
        assert_eq!(body.paragraphs[1].bullet, numbered(1));
        assert_eq!(body.paragraphs[1].runs, vec![Run::new("inner")]);
    }

    #[test]
    fn test_formatting_survives_nested_block() {
        let body = convert_nodes(vec![e(
            "p",
            vec![e(
                "b",
                vec![x("x"), e("div", vec![e("p", vec![x("y")])]), x("z")],
            )],
        )]);

        assert_eq!(body.paragraphs.len(), 2);
        assert_eq!(body.paragraphs[0].runs, vec![Run::with_formatting("xz", bold())]);
        assert_eq!(body.paragraphs[1].runs, vec![Run::new("y")]);
    }

    #[test]
    fn test_transparent_tag_inside_run() {
        let body = convert_nodes(vec![e("h1", vec![e("span", vec![x("x")])])]);

        assert_eq!(body.run_count(), 1);
        let run = &body.paragraphs[0].runs[0];
        assert_eq!(run.text, "x");
        assert_eq!(run.formatting.font_scale, 2.125);
    }

    #[test]
    fn test_formatting_inherited_through_transparent_tag() {
        let body = convert_nodes(vec![e(
            "p",
            vec![e("b", vec![e("span", vec![e("i", vec![x("x")])])])],
        )]);

        assert_eq!(body.paragraphs.len(), 1);
        assert_eq!(body.run_count(), 1);
        let run = &body.paragraphs[0].runs[0];
        assert_eq!(run.text, "x");
        assert!(run.formatting.bold && run.formatting.italic);
    }

    #[test]
    fn test_block_inside_run_opens_new_paragraph() {
        let body = convert_nodes(vec![e("p", vec![e("b", vec![e("p", vec![x("inner")])])])]);

        assert_eq!(body.paragraphs.len(), 2);
        // The outer paragraph keeps its empty bold run.
        assert_eq!(body.paragraphs[0].runs, vec![Run::with_formatting("", bold())]);
        assert_eq!(body.paragraphs[1].runs, vec![Run::new("inner")]);
    }

    #[test]
    fn test_conversion_is_repeatable() {
        let dom = build(vec![
            e("h2", vec![x("Agenda")]),
            e("ol", vec![e("li", vec![e("em", vec![x("first")])])]),
            x("tail"),
        ]);

        let first = convert_to_body(dom.root());
        let second = convert_to_body(dom.root());
        assert_eq!(first, second);
        assert_eq!(first.paragraphs.len(), 3);
    }
}
