//! Sections and their bodies.
//!
//! Sections are built by closures. A [`SectionContainer`] hands each
//! closure to the document's executor: with a worker pool sibling
//! sections are built concurrently, with the sync executor they run
//! inline in declared order. The container joins every task before it
//! closes and reports all task errors together.

use crate::Labelable;
use crate::code::Code;
use crate::error::{DocumentError, ErrorCollector};
use crate::figure::{Figure, FigureSeries};
use crate::list::List;
use crate::math::Math;
use crate::scope::{ScopeKind, ScopeLink, close_on_drop};
use crate::slot::{Outlet, reserve, take_cell};
use crate::table::Table;
use crate::text::{BlockContent, ComplexHost, PlainHost, PlainText, Sealed, TextCore, TextHost};
use folio_idf::{BodyNode, EquationNode, Inline, MathNode, SectionNode};
use folio_traits::{Executor, TaskHandle};
use folio_types::{CellDef, FigureSize, Label, LabelKind, LabelRequest};
use log::debug;
use std::sync::{Arc, OnceLock};

/// Scopes that hold sections.
pub trait SectionContainer {
    /// Adds a section built by `build`.
    ///
    /// The section is closed once `build` returns, also when it fails.
    /// Errors from `build` and from closing surface when this container
    /// closes.
    ///
    /// # Errors
    ///
    /// Immediate errors only: a closed or busy container, nesting deeper
    /// than `max_section_depth`, or an unusable label.
    fn section<F>(&mut self, label: impl Into<LabelRequest>, build: F) -> Result<(), DocumentError>
    where
        F: FnOnce(&mut Section) -> Result<(), DocumentError> + Send + 'static;
}

type SectionTask = TaskHandle<Result<(), DocumentError>>;

/// Pending section tasks of a container.
pub(crate) struct Subsections {
    /// Depth of the sections this container creates.
    depth: usize,
    handles: Vec<SectionTask>,
    started: bool,
}

impl Subsections {
    pub(crate) fn new(depth: usize) -> Self {
        Self {
            depth,
            handles: Vec::new(),
            started: false,
        }
    }

    pub(crate) fn started(&self) -> bool {
        self.started
    }

    /// Opens a section scope below `parent` and dispatches `build` for it.
    pub(crate) fn spawn<F>(
        &mut self,
        parent: &ScopeLink,
        label: LabelRequest,
        slot: impl FnOnce() -> Outlet<SectionNode>,
        build: F,
    ) -> Result<(), DocumentError>
    where
        F: FnOnce(&mut Section) -> Result<(), DocumentError> + Send + 'static,
    {
        parent.ensure_mutable_allowing(&[ScopeKind::Section])?;
        let ctx = parent.ctx();
        let max = ctx.config.max_section_depth;
        if self.depth > max {
            return Err(DocumentError::structural(format!(
                "section depth {} exceeds the maximum of {}",
                self.depth, max
            )));
        }
        let label = ctx.labels.consume(label, LabelKind::Section)?;
        let link = parent.child(ScopeKind::Section)?;
        let section = Section::new(link, label, self.depth, slot());
        debug!(
            "Dispatching section at depth {} on {} executor",
            self.depth,
            ctx.executor.name()
        );
        let handle = ctx.executor.spawn(move || run_section(section, build));
        self.handles.push(handle);
        self.started = true;
        Ok(())
    }

    /// Waits for every dispatched section. Failed sections mark the
    /// document incomplete.
    pub(crate) fn join_all(&mut self, parent: &ScopeLink, errors: &mut ErrorCollector) {
        for handle in self.handles.drain(..) {
            let outcome = handle.join().map_err(DocumentError::from).and_then(|r| r);
            if let Err(err) = outcome {
                parent.record_failure(&err);
                errors.push(err);
            }
        }
    }
}

fn run_section<F>(mut section: Section, build: F) -> Result<(), DocumentError>
where
    F: FnOnce(&mut Section) -> Result<(), DocumentError>,
{
    let mut errors = ErrorCollector::new();
    errors.record(build(&mut section));
    errors.record(section.close());
    errors.into_result()
}

/// A section under construction: one title, then one body.
pub struct Section {
    link: ScopeLink,
    label: Option<Label>,
    depth: usize,
    title: Option<Arc<OnceLock<Vec<Inline>>>>,
    body: Option<Arc<OnceLock<Vec<BodyNode>>>>,
    outlet: Outlet<SectionNode>,
}

impl Section {
    fn new(link: ScopeLink, label: Option<Label>, depth: usize, outlet: Outlet<SectionNode>) -> Self {
        Self {
            link,
            label,
            depth,
            title: None,
            body: None,
            outlet,
        }
    }

    /// 1 for top-level sections.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn title(&mut self) -> Result<PlainText, DocumentError> {
        self.link.ensure_mutable()?;
        if self.title.is_some() {
            return Err(DocumentError::structural("section title requested twice"));
        }
        if self.body.is_some() {
            return Err(DocumentError::structural(
                "section title requested after its body",
            ));
        }
        let cell = Arc::new(OnceLock::new());
        let link = self.link.child(ScopeKind::PlainText)?;
        self.title = Some(Arc::clone(&cell));
        Ok(PlainText::new(link, Outlet::new(cell, |t| t)))
    }

    pub fn body(&mut self) -> Result<SectionBody, DocumentError> {
        self.link.ensure_mutable()?;
        if self.body.is_some() {
            return Err(DocumentError::structural("section body requested twice"));
        }
        let cell = Arc::new(OnceLock::new());
        let link = self.link.child(ScopeKind::SectionBody)?;
        self.body = Some(Arc::clone(&cell));
        Ok(SectionBody {
            content: BlockContent::new(link),
            subsections: Subsections::new(self.depth + 1),
            outlet: Outlet::new(cell, |b| b),
        })
    }

    /// Creates a missing title or body empty, then closes.
    pub(crate) fn close(&mut self) -> Result<(), DocumentError> {
        self.link.ensure_open()?;
        let mut errors = ErrorCollector::new();
        if self.title.is_none() && self.body.is_none() {
            errors.record(self.title().and_then(|mut t| t.close()));
        }
        if self.body.is_none() {
            errors.record(self.body().and_then(|mut b| b.close()));
        }
        errors.record(self.link.close_with(|| {
            self.outlet.deliver(SectionNode {
                label: self.label,
                title: self.title.take().and_then(take_cell).unwrap_or_default(),
                body: self.body.take().and_then(take_cell).unwrap_or_default(),
            });
            Ok(())
        }));
        errors.into_result()
    }
}

impl Labelable for Section {
    fn label(&self) -> Option<Label> {
        self.label
    }
}

close_on_drop!(Section => link);

/// Content of a section: paragraphs and blocks, then subsections.
pub struct SectionBody {
    content: BlockContent,
    subsections: Subsections,
    outlet: Outlet<Vec<BodyNode>>,
}

impl SectionBody {
    fn check_content(&self) -> Result<(), DocumentError> {
        if self.subsections.started() {
            return Err(DocumentError::structural(
                "content cannot follow a subsection",
            ));
        }
        Ok(())
    }

    /// Admission check for a new block element.
    fn admit_block(&mut self) -> Result<(), DocumentError> {
        self.content.link().ensure_mutable()?;
        self.check_content()
    }

    pub fn depth(&self) -> usize {
        self.subsections.depth - 1
    }

    /// Allocates a label to bind later, possibly in another section.
    pub fn allocate_label(&self, kind: LabelKind) -> Result<Label, DocumentError> {
        self.content.link().ensure_open()?;
        self.content.link().ctx().labels.allocate(kind)
    }

    pub fn enumeration(&mut self) -> Result<List, DocumentError> {
        self.admit_block()?;
        List::open_in(&mut self.content, true)
    }

    pub fn itemization(&mut self) -> Result<List, DocumentError> {
        self.admit_block()?;
        List::open_in(&mut self.content, false)
    }

    /// # Errors
    ///
    /// `Layout` when `cells` holds no pure column.
    pub fn table(
        &mut self,
        label: impl Into<LabelRequest>,
        spans_all_columns: bool,
        cells: &[CellDef],
    ) -> Result<Table, DocumentError> {
        self.admit_block()?;
        Table::validate_columns(cells)?;
        let label = self
            .content
            .link()
            .ctx()
            .labels
            .consume(label.into(), LabelKind::Table)?;
        let (link, outlet) = self.content.open_block(ScopeKind::Table, BodyNode::Table)?;
        Ok(Table::new(link, label, spans_all_columns, cells, outlet))
    }

    pub fn figure(
        &mut self,
        label: impl Into<LabelRequest>,
        size: FigureSize,
        suggestion: &str,
    ) -> Result<Figure, DocumentError> {
        self.admit_block()?;
        let label = self
            .content
            .link()
            .ctx()
            .labels
            .consume(label.into(), LabelKind::Figure)?;
        let (link, outlet) = self.content.open_block(ScopeKind::Figure, BodyNode::Figure)?;
        Ok(Figure::open(link, label, size, suggestion, outlet))
    }

    pub fn figure_series(
        &mut self,
        label: impl Into<LabelRequest>,
        size: FigureSize,
        suggestion: &str,
    ) -> Result<FigureSeries, DocumentError> {
        self.admit_block()?;
        let label = self
            .content
            .link()
            .ctx()
            .labels
            .consume(label.into(), LabelKind::Figure)?;
        let (link, outlet) = self
            .content
            .open_block(ScopeKind::FigureSeries, BodyNode::FigureSeries)?;
        Ok(FigureSeries::open(link, label, size, suggestion, outlet))
    }

    /// Opens a displayed equation holding one expression.
    pub fn equation(&mut self, label: impl Into<LabelRequest>) -> Result<Math, DocumentError> {
        self.admit_block()?;
        let label = self
            .content
            .link()
            .ctx()
            .labels
            .consume(label.into(), LabelKind::Equation)?;
        let (link, outlet) = self
            .content
            .open_block(ScopeKind::Math, move |expr: MathNode| {
                BodyNode::Equation(EquationNode { label, expr })
            })?;
        Ok(Math::expression(link, label, outlet))
    }

    pub fn code(&mut self, label: impl Into<LabelRequest>) -> Result<Code, DocumentError> {
        self.admit_block()?;
        let label = self
            .content
            .link()
            .ctx()
            .labels
            .consume(label.into(), LabelKind::Code)?;
        let (link, outlet) = self.content.open_block(ScopeKind::Code, BodyNode::Code)?;
        Ok(Code::new(link, label, outlet))
    }

    /// Joins the subsection tasks, then closes.
    pub fn close(&mut self) -> Result<(), DocumentError> {
        self.content.link().ensure_open()?;
        let mut errors = ErrorCollector::new();
        self.subsections.join_all(self.content.link(), &mut errors);
        match self.content.close() {
            Ok(blocks) => self.outlet.deliver(blocks),
            Err(err) => errors.push(err),
        }
        errors.into_result()
    }
}

impl SectionContainer for SectionBody {
    fn section<F>(&mut self, label: impl Into<LabelRequest>, build: F) -> Result<(), DocumentError>
    where
        F: FnOnce(&mut Section) -> Result<(), DocumentError> + Send + 'static,
    {
        self.content
            .link()
            .ensure_mutable_allowing(&[ScopeKind::Section])?;
        self.content.flush_paragraph();
        let blocks = &mut self.content.blocks;
        self.subsections.spawn(
            &self.content.text.link,
            label.into(),
            || reserve(blocks, BodyNode::Section),
            build,
        )
    }
}

impl Sealed for SectionBody {}

impl TextHost for SectionBody {
    fn text_core(&mut self) -> &mut TextCore {
        &mut self.content.text
    }

    fn check_inline(&self) -> Result<(), DocumentError> {
        self.check_content()
    }

    fn break_paragraph(&mut self) -> Result<(), DocumentError> {
        self.content.flush_paragraph();
        Ok(())
    }
}

impl PlainHost for SectionBody {}
impl ComplexHost for SectionBody {}

close_on_drop!(SectionBody => content.text.link);
