#![allow(dead_code)]

use folio::idf::{BodyNode, DocumentTree, SectionNode, TableNode};
use folio::{Document, DocumentBuilder, DocumentFormat, FolioError};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// An in-memory document rendered as LaTeX.
pub fn latex_document(workers: usize) -> Result<Document, FolioError> {
    document(DocumentFormat::Latex, workers)
}

pub fn xhtml_document(workers: usize) -> Result<Document, FolioError> {
    document(DocumentFormat::Xhtml, workers)
}

pub fn document(format: DocumentFormat, workers: usize) -> Result<Document, FolioError> {
    init_logger();
    DocumentBuilder::new().format(format).workers(workers).build()
}

/// Tables of a section, in declared order.
pub fn tables_of(section: &SectionNode) -> Vec<&TableNode> {
    section
        .body
        .iter()
        .filter_map(|n| match n {
            BodyNode::Table(t) => Some(t),
            _ => None,
        })
        .collect()
}

pub fn section_titles(tree: &DocumentTree) -> Vec<String> {
    tree.all_sections().iter().map(|s| s.title_text()).collect()
}
