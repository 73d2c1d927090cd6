//! Intermediate Document Format (IDF)
//! This crate defines the in-memory representation of a finished document:
//! what the builders produce once every scope has closed, and what the
//! render walker feeds to a backend driver.

mod figure;
mod labels;
mod math;
mod shape;
mod table;

pub use figure::{DrawOp, Drawing, FigureNode, FigureSeriesNode};
pub use labels::{ResolvedLabel, ResolvedLabels};
pub use math::{BinaryOp, MathNode, NaryOp, UnaryOp};
pub use shape::Shape;
pub use table::{TableCellNode, TableNode, TableRowNode, TablePart, TableSectionNode};

use chrono::NaiveDate;
use folio_traits::BibRecord;
use folio_types::{CitationMode, DocumentId, Label, SequenceMode, Style};

/// A string type for the document.
pub type TextStr = String;

// --- Document Root ---

/// A complete document: header, body sections and appendix sections.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTree {
    pub id: DocumentId,
    pub header: HeaderNode,
    pub body: Vec<SectionNode>,
    pub footer: Vec<SectionNode>,
}

impl DocumentTree {
    pub fn new(id: DocumentId) -> Self {
        Self {
            id,
            header: HeaderNode::default(),
            body: Vec::new(),
            footer: Vec::new(),
        }
    }

    /// The structural skeleton of this tree, ignoring text content.
    pub fn shape(&self) -> Shape {
        Shape::of_document(self)
    }

    /// Every section in the document, depth-first in declared order.
    pub fn all_sections(&self) -> Vec<&SectionNode> {
        fn visit<'a>(section: &'a SectionNode, out: &mut Vec<&'a SectionNode>) {
            out.push(section);
            for child in section.subsections() {
                visit(child, out);
            }
        }
        let mut out = Vec::new();
        for section in self.body.iter().chain(&self.footer) {
            visit(section, &mut out);
        }
        out
    }

    /// Every body node that is not a section, depth-first in declared order.
    pub fn all_blocks(&self) -> Vec<&BodyNode> {
        let mut out = Vec::new();
        for section in self.all_sections() {
            out.extend(
                section
                    .body
                    .iter()
                    .filter(|n| !matches!(n, BodyNode::Section(_))),
            );
        }
        out
    }

    pub fn tables(&self) -> Vec<&TableNode> {
        self.all_blocks()
            .into_iter()
            .filter_map(|n| match n {
                BodyNode::Table(t) => Some(t),
                _ => None,
            })
            .collect()
    }
}

/// Title material of a document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeaderNode {
    pub title: Vec<Inline>,
    pub authors: Vec<Vec<Inline>>,
    pub date: Option<NaiveDate>,
    pub summary: Vec<Inline>,
}

impl HeaderNode {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.authors.is_empty()
            && self.date.is_none()
            && self.summary.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SectionNode {
    pub label: Option<Label>,
    pub title: Vec<Inline>,
    pub body: Vec<BodyNode>,
}

impl SectionNode {
    pub fn title_text(&self) -> String {
        plain_text(&self.title)
    }

    /// Text of all top-level paragraphs, joined by blank lines.
    pub fn body_text(&self) -> String {
        self.body
            .iter()
            .filter_map(|n| match n {
                BodyNode::Paragraph(p) => Some(plain_text(p)),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn subsections(&self) -> impl Iterator<Item = &SectionNode> {
        self.body.iter().filter_map(|n| match n {
            BodyNode::Section(s) => Some(s),
            _ => None,
        })
    }
}

// --- Block Nodes ---

/// A block-level element of a section body or list item.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyNode {
    /// A paragraph of flowing text.
    Paragraph(Vec<Inline>),
    Section(SectionNode),
    List(ListNode),
    Table(TableNode),
    Figure(FigureNode),
    FigureSeries(FigureSeriesNode),
    Equation(EquationNode),
    Code(CodeNode),
}

impl BodyNode {
    /// Returns a string identifier for the node type.
    pub fn kind(&self) -> &'static str {
        match self {
            BodyNode::Paragraph(_) => "paragraph",
            BodyNode::Section(_) => "section",
            BodyNode::List(_) => "list",
            BodyNode::Table(_) => "table",
            BodyNode::Figure(_) => "figure",
            BodyNode::FigureSeries(_) => "figure-series",
            BodyNode::Equation(_) => "equation",
            BodyNode::Code(_) => "code",
        }
    }

    /// The label this node carries, if it is a labeled element.
    pub fn label(&self) -> Option<Label> {
        match self {
            BodyNode::Section(s) => s.label,
            BodyNode::Table(t) => t.label,
            BodyNode::Figure(f) => f.label,
            BodyNode::FigureSeries(f) => f.label,
            BodyNode::Equation(e) => e.label,
            BodyNode::Code(c) => c.label,
            BodyNode::Paragraph(_) | BodyNode::List(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListNode {
    /// Enumeration when true, itemization otherwise.
    pub ordered: bool,
    pub items: Vec<ListItemNode>,
}

/// An item holds paragraphs and nested lists.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListItemNode {
    pub children: Vec<BodyNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquationNode {
    pub label: Option<Label>,
    pub expr: MathNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeNode {
    pub label: Option<Label>,
    pub caption: Vec<Inline>,
    pub body: TextStr,
}

// --- Inline Nodes ---

/// An inline-level element of flowing text.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// A run of plain text.
    Text(TextStr),
    LineBreak,
    /// A span rendered with a font or color from the style pool.
    Styled {
        style: Style,
        children: Vec<Inline>,
    },
    Emphasis(Vec<Inline>),
    Code(Vec<Inline>),
    Subscript(Vec<Inline>),
    Superscript(Vec<Inline>),
    Braces(Vec<Inline>),
    Quotes(Vec<Inline>),
    Math(MathNode),
    Citation {
        mode: CitationMode,
        sequence: SequenceMode,
        records: Vec<BibRecord>,
    },
    Reference {
        sequence: SequenceMode,
        labels: Vec<Label>,
    },
}

/// Flattens inline content into its visible text, ignoring references,
/// citations and math.
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_plain(inlines, &mut out);
    out
}

fn push_plain(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(t) => out.push_str(t),
            Inline::LineBreak => out.push('\n'),
            Inline::Styled { children, .. }
            | Inline::Emphasis(children)
            | Inline::Code(children)
            | Inline::Subscript(children)
            | Inline::Superscript(children) => push_plain(children, out),
            Inline::Braces(children) => {
                out.push('(');
                push_plain(children, out);
                out.push(')');
            }
            Inline::Quotes(children) => {
                out.push('\u{201c}');
                push_plain(children, out);
                out.push('\u{201d}');
            }
            Inline::Math(_) | Inline::Citation { .. } | Inline::Reference { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn test_plain_text_flattens_wrappers() {
        let inl = vec![
            text("a "),
            Inline::Emphasis(vec![text("b")]),
            Inline::Braces(vec![text("c")]),
            Inline::Quotes(vec![text("d")]),
        ];
        assert_eq!(plain_text(&inl), "a b(c)\u{201c}d\u{201d}");
    }

    #[test]
    fn test_all_sections_is_depth_first() {
        let mut tree = DocumentTree::new(DocumentId::next());
        let inner = SectionNode {
            title: vec![text("1.1")],
            ..Default::default()
        };
        tree.body.push(SectionNode {
            title: vec![text("1")],
            body: vec![BodyNode::Section(inner)],
            ..Default::default()
        });
        tree.body.push(SectionNode {
            title: vec![text("2")],
            ..Default::default()
        });
        tree.footer.push(SectionNode {
            title: vec![text("A")],
            ..Default::default()
        });
        let titles: Vec<String> = tree.all_sections().iter().map(|s| s.title_text()).collect();
        assert_eq!(titles, vec!["1", "1.1", "2", "A"]);
    }

    #[test]
    fn test_body_text_joins_paragraphs() {
        let section = SectionNode {
            body: vec![
                BodyNode::Paragraph(vec![text("one")]),
                BodyNode::Paragraph(vec![text("two")]),
            ],
            ..Default::default()
        };
        assert_eq!(section.body_text(), "one\n\ntwo");
    }
}
