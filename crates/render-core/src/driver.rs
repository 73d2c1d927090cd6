use crate::error::RenderError;
use crate::sink::OutputSink;
use folio_idf::{
    CodeNode, EquationNode, FigureNode, FigureSeriesNode, HeaderNode, Inline, ResolvedLabels,
    SectionNode, TableNode,
};
use std::fmt::Debug;
use std::sync::Arc;

/// The two section-holding parts of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentPart {
    Body,
    /// The footer; its sections are appendices.
    Appendix,
}

/// Everything a renderer needs to know about the document up front.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Base name of the main output unit, without extension.
    pub main_name: String,
    /// Final numbers and anchors of every label.
    pub labels: Arc<ResolvedLabels>,
    /// Soft byte budget per output unit, for drivers that split.
    pub split_budget: usize,
}

impl RenderContext {
    pub fn new(main_name: impl Into<String>, labels: Arc<ResolvedLabels>) -> Self {
        Self {
            main_name: main_name.into(),
            labels,
            split_budget: usize::MAX,
        }
    }

    pub fn with_split_budget(mut self, bytes: usize) -> Self {
        self.split_budget = bytes;
        self
    }
}

/// A backend: a factory for per-document renderers.
pub trait RenderDriver: Send + Sync + Debug {
    /// Human-readable driver name (for logging/debugging).
    fn name(&self) -> &'static str;

    /// Extension of the main output unit, without the dot.
    fn main_extension(&self) -> &'static str;

    /// Creates a renderer holding the private state for one document.
    fn start(&self, context: RenderContext) -> Box<dyn ElementRenderer>;
}

/// Receives a finished document, element by element, in declared order.
///
/// Calls arrive strictly nested: `begin_document`, then for each part
/// `begin_part` .. `end_part`, sections bracketed by `begin_section` /
/// `end_section` and lists by `begin_list` / `end_list`.
pub trait ElementRenderer: Send {
    fn begin_document(&mut self, header: &HeaderNode) -> Result<(), RenderError>;

    fn begin_part(&mut self, part: DocumentPart) -> Result<(), RenderError>;

    fn end_part(&mut self, part: DocumentPart) -> Result<(), RenderError>;

    /// `depth` is 1 for top-level sections.
    fn begin_section(&mut self, section: &SectionNode, depth: usize) -> Result<(), RenderError>;

    fn end_section(&mut self, depth: usize) -> Result<(), RenderError>;

    /// A paragraph of flowing text.
    fn inline(&mut self, content: &[Inline]) -> Result<(), RenderError>;

    fn begin_list(&mut self, ordered: bool) -> Result<(), RenderError>;

    fn begin_item(&mut self) -> Result<(), RenderError>;

    fn end_item(&mut self) -> Result<(), RenderError>;

    fn end_list(&mut self, ordered: bool) -> Result<(), RenderError>;

    fn table(&mut self, table: &TableNode) -> Result<(), RenderError>;

    fn figure(&mut self, figure: &FigureNode) -> Result<(), RenderError>;

    fn figure_series(&mut self, series: &FigureSeriesNode) -> Result<(), RenderError>;

    fn equation(&mut self, equation: &EquationNode) -> Result<(), RenderError>;

    fn code(&mut self, code: &CodeNode) -> Result<(), RenderError>;

    /// Writes every unit to `sink` and returns their relative paths, main unit first.
    fn finish(self: Box<Self>, sink: &mut dyn OutputSink) -> Result<Vec<String>, RenderError>;
}
