//! Structural skeleton of a document tree.
//!
//! Two trees have equal shapes when they hold the same kinds of elements
//! nested and ordered the same way, regardless of text content. Builders
//! driven by one worker and by many must agree on this.

use crate::{BodyNode, DocumentTree, ListItemNode, SectionNode, TableNode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub kind: &'static str,
    pub children: Vec<Shape>,
}

impl Shape {
    fn leaf(kind: &'static str) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    fn node(kind: &'static str, children: Vec<Shape>) -> Self {
        Self { kind, children }
    }

    pub(crate) fn of_document(tree: &DocumentTree) -> Self {
        Shape::node(
            "document",
            vec![
                Shape::leaf("header"),
                Shape::node("body", tree.body.iter().map(Shape::of_section).collect()),
                Shape::node("footer", tree.footer.iter().map(Shape::of_section).collect()),
            ],
        )
    }

    fn of_section(section: &SectionNode) -> Self {
        Shape::node("section", section.body.iter().map(Shape::of_body).collect())
    }

    fn of_item(item: &ListItemNode) -> Self {
        Shape::node("item", item.children.iter().map(Shape::of_body).collect())
    }

    fn of_table(table: &TableNode) -> Self {
        let parts = table
            .parts()
            .map(|part| {
                let rows = part
                    .rows
                    .iter()
                    .map(|row| {
                        Shape::node("row", row.cells.iter().map(|_| Shape::leaf("cell")).collect())
                    })
                    .collect();
                Shape::node(part.part.name(), rows)
            })
            .collect();
        Shape::node("table", parts)
    }

    fn of_body(node: &BodyNode) -> Self {
        match node {
            BodyNode::Section(s) => Shape::of_section(s),
            BodyNode::List(l) => Shape::node(
                if l.ordered { "enumeration" } else { "itemization" },
                l.items.iter().map(Shape::of_item).collect(),
            ),
            BodyNode::Table(t) => Shape::of_table(t),
            BodyNode::FigureSeries(s) => Shape::node(
                "figure-series",
                s.figures.iter().map(|_| Shape::leaf("figure")).collect(),
            ),
            other => Shape::leaf(other.kind()),
        }
    }

    /// Total number of nodes in this shape.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Shape::count).sum::<usize>()
    }

    /// Number of nodes of `kind` in this shape.
    pub fn count_kind(&self, kind: &str) -> usize {
        usize::from(self.kind == kind)
            + self
                .children
                .iter()
                .map(|c| c.count_kind(kind))
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Inline, ListNode};
    use folio_types::DocumentId;

    #[test]
    fn test_text_does_not_affect_shape() {
        let mut a = DocumentTree::new(DocumentId::next());
        let mut b = DocumentTree::new(DocumentId::next());
        a.body.push(SectionNode {
            body: vec![BodyNode::Paragraph(vec![Inline::Text("x".into())])],
            ..Default::default()
        });
        b.body.push(SectionNode {
            title: vec![Inline::Text("titled".into())],
            body: vec![BodyNode::Paragraph(vec![Inline::Text("y".into())])],
            ..Default::default()
        });
        assert_eq!(a.shape(), b.shape());
    }

    #[test]
    fn test_order_affects_shape() {
        let list = BodyNode::List(ListNode {
            ordered: true,
            items: vec![ListItemNode::default()],
        });
        let para = BodyNode::Paragraph(vec![]);
        let mut a = DocumentTree::new(DocumentId::next());
        let mut b = DocumentTree::new(DocumentId::next());
        a.body.push(SectionNode {
            body: vec![list.clone(), para.clone()],
            ..Default::default()
        });
        b.body.push(SectionNode {
            body: vec![para, list],
            ..Default::default()
        });
        assert_ne!(a.shape(), b.shape());
        assert_eq!(a.shape().count_kind("item"), 1);
    }
}
