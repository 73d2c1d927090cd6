//! Final numbering of a finished tree.
//!
//! Body sections are numbered `1`, `1.2`, ...; footer sections are
//! appendices `A`, `A.1`, .... Tables, figures (including series),
//! equations and listings are counted document-wide in declared order,
//! whether labeled or not; sub-figures are lettered within their series.

use crate::error::DocumentError;
use crate::label::LabelRegistry;
use folio_idf::{BodyNode, DocumentTree, ResolvedLabel, ResolvedLabels, SectionNode};
use folio_render_core::utils::alpha_index;
use folio_types::{Label, LabelKind};
use itertools::Itertools;
use log::debug;

#[derive(Default)]
struct Counters {
    tables: usize,
    figures: usize,
    equations: usize,
    listings: usize,
}

struct Numbering {
    counters: Counters,
    labels: ResolvedLabels,
}

impl Numbering {
    fn bind(&mut self, label: Option<Label>, kind: LabelKind, number: String) {
        if let Some(label) = label {
            self.labels.insert(label, ResolvedLabel::new(kind, number));
        }
    }

    fn section(&mut self, section: &SectionNode, number: String) {
        self.bind(section.label, LabelKind::Section, number.clone());
        let mut child = 0;
        for node in &section.body {
            if let BodyNode::Section(sub) = node {
                child += 1;
                self.section(sub, format!("{}.{}", number, child));
            } else {
                self.block(node);
            }
        }
    }

    fn block(&mut self, node: &BodyNode) {
        match node {
            BodyNode::Paragraph(_) | BodyNode::Section(_) => {}
            BodyNode::List(list) => {
                for item in &list.items {
                    for child in &item.children {
                        self.block(child);
                    }
                }
            }
            BodyNode::Table(table) => {
                self.counters.tables += 1;
                self.bind(table.label, LabelKind::Table, self.counters.tables.to_string());
            }
            BodyNode::Figure(figure) => {
                self.counters.figures += 1;
                self.bind(figure.label, LabelKind::Figure, self.counters.figures.to_string());
            }
            BodyNode::FigureSeries(series) => {
                self.counters.figures += 1;
                let number = self.counters.figures;
                self.bind(series.label, LabelKind::Figure, number.to_string());
                for (i, sub) in series.figures.iter().enumerate() {
                    self.bind(
                        sub.label,
                        LabelKind::SubFigure,
                        format!("{}{}", number, alpha_index(i)),
                    );
                }
            }
            BodyNode::Equation(eq) => {
                self.counters.equations += 1;
                self.bind(eq.label, LabelKind::Equation, self.counters.equations.to_string());
            }
            BodyNode::Code(code) => {
                self.counters.listings += 1;
                self.bind(code.label, LabelKind::Code, self.counters.listings.to_string());
            }
        }
    }
}

/// Assigns every bound label its final number.
///
/// # Errors
///
/// `Label` when a label was allocated but never bound.
pub(crate) fn resolve_labels(
    tree: &DocumentTree,
    registry: &LabelRegistry,
) -> Result<ResolvedLabels, DocumentError> {
    let unbound = registry.unbound()?;
    if !unbound.is_empty() {
        return Err(DocumentError::label(format!(
            "label(s) {} were never bound to an element",
            unbound.iter().join(", ")
        )));
    }
    let mut numbering = Numbering {
        counters: Counters::default(),
        labels: ResolvedLabels::new(),
    };
    for (i, section) in tree.body.iter().enumerate() {
        numbering.section(section, (i + 1).to_string());
    }
    for (i, section) in tree.footer.iter().enumerate() {
        numbering.section(section, alpha_index(i).to_uppercase());
    }
    debug!("Resolved {} label(s)", numbering.labels.len());
    Ok(numbering.labels)
}
