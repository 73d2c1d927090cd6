//! Drives an [`ElementRenderer`] over a finished tree in declared order.

use folio_idf::{BodyNode, DocumentTree, ListNode, SectionNode};
use folio_render_core::{
    DocumentPart, ElementRenderer, OutputSink, RenderContext, RenderDriver, RenderError,
};
use log::debug;

fn walk_block(renderer: &mut dyn ElementRenderer, node: &BodyNode, depth: usize) -> Result<(), RenderError> {
    match node {
        BodyNode::Paragraph(content) => renderer.inline(content),
        BodyNode::Section(section) => walk_section(renderer, section, depth + 1),
        BodyNode::List(list) => walk_list(renderer, list, depth),
        BodyNode::Table(table) => renderer.table(table),
        BodyNode::Figure(figure) => renderer.figure(figure),
        BodyNode::FigureSeries(series) => renderer.figure_series(series),
        BodyNode::Equation(equation) => renderer.equation(equation),
        BodyNode::Code(code) => renderer.code(code),
    }
}

fn walk_list(renderer: &mut dyn ElementRenderer, list: &ListNode, depth: usize) -> Result<(), RenderError> {
    renderer.begin_list(list.ordered)?;
    for item in &list.items {
        renderer.begin_item()?;
        for child in &item.children {
            walk_block(renderer, child, depth)?;
        }
        renderer.end_item()?;
    }
    renderer.end_list(list.ordered)
}

fn walk_section(
    renderer: &mut dyn ElementRenderer,
    section: &SectionNode,
    depth: usize,
) -> Result<(), RenderError> {
    renderer.begin_section(section, depth)?;
    for node in &section.body {
        walk_block(renderer, node, depth)?;
    }
    renderer.end_section(depth)
}

/// Renders `tree` through `driver` into `sink` and returns the written
/// unit paths, main unit first.
pub fn render_tree(
    tree: &DocumentTree,
    driver: &dyn RenderDriver,
    context: RenderContext,
    sink: &mut dyn OutputSink,
) -> Result<Vec<String>, RenderError> {
    debug!("Rendering document {} with the {} driver", tree.id, driver.name());
    let mut renderer = driver.start(context);
    renderer.begin_document(&tree.header)?;

    renderer.begin_part(DocumentPart::Body)?;
    for section in &tree.body {
        walk_section(renderer.as_mut(), section, 1)?;
    }
    renderer.end_part(DocumentPart::Body)?;

    if !tree.footer.is_empty() {
        renderer.begin_part(DocumentPart::Appendix)?;
        for section in &tree.footer {
            walk_section(renderer.as_mut(), section, 1)?;
        }
        renderer.end_part(DocumentPart::Appendix)?;
    }
    renderer.finish(sink)
}
