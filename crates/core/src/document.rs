//! The document root and its fixed Header, Body, Footer pipeline.

use crate::config::DocumentConfig;
use crate::context::DocumentContext;
use crate::error::{DocumentError, ErrorCollector};
use crate::numbering::resolve_labels;
use crate::render::render_tree;
use crate::scope::{ScopeKind, ScopeLink, close_on_drop};
use crate::section::{Section, SectionContainer, Subsections};
use crate::slot::{Outlet, Slot, reserve, resolve_all, take_cell};
use crate::styles::StyleFacade;
use crate::text::PlainText;
use chrono::NaiveDate;
use folio_executor::ExecutorImpl;
use folio_idf::{DocumentTree, HeaderNode, Inline, ResolvedLabels, SectionNode};
use folio_render_core::{DirectorySink, MemorySink, RenderContext, RenderDriver};
use folio_traits::{Bibliography, Executor, InMemoryBibliography, InMemoryStylePalette, StyleProvider};
use folio_types::{DocumentId, Label, LabelKind, LabelRequest};
use log::{debug, info, warn};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

/// Called with the output of every successfully closed document.
pub trait FinishedListener: Send + Sync {
    fn finished(&self, output: &DocumentOutput);
}

impl<F> FinishedListener for F
where
    F: Fn(&DocumentOutput) + Send + Sync,
{
    fn finished(&self, output: &DocumentOutput) {
        self(output)
    }
}

/// Collaborators a document is built with.
#[derive(Clone)]
pub struct DocumentEnvironment {
    pub config: DocumentConfig,
    pub executor: ExecutorImpl,
    pub driver: Arc<dyn RenderDriver>,
    pub styles: Arc<dyn StyleProvider>,
    pub bibliography: Arc<dyn Bibliography>,
    pub listener: Option<Arc<dyn FinishedListener>>,
}

impl DocumentEnvironment {
    /// In-memory collaborators, default configuration, inline execution.
    pub fn new(driver: Arc<dyn RenderDriver>) -> Self {
        Self {
            config: DocumentConfig::default(),
            executor: ExecutorImpl::default(),
            driver,
            styles: Arc::new(InMemoryStylePalette::new()),
            bibliography: Arc::new(InMemoryBibliography::new()),
            listener: None,
        }
    }
}

impl fmt::Debug for DocumentEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentEnvironment")
            .field("config", &self.config)
            .field("executor", &self.executor.name())
            .field("driver", &self.driver.name())
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

/// Everything a closed document produced.
#[derive(Debug)]
pub struct DocumentOutput {
    pub tree: DocumentTree,
    pub labels: Arc<ResolvedLabels>,
    /// Relative paths of the written units, main unit first.
    pub units: Vec<String>,
    /// The units, when no base path was configured.
    pub memory: Option<MemorySink>,
    pub base_path: Option<PathBuf>,
}

impl DocumentOutput {
    pub fn main_unit(&self) -> Option<&str> {
        self.units.first().map(String::as_str)
    }

    /// Text of an in-memory unit.
    pub fn unit_text(&self, path: &str) -> Option<&str> {
        self.memory.as_ref().and_then(|m| m.text(path))
    }
}

const HEADER: usize = 0;
const BODY: usize = 1;
const FOOTER: usize = 2;
const DONE: usize = 3;

fn phase_name(phase: usize) -> &'static str {
    match phase {
        HEADER => "header",
        BODY => "body",
        FOOTER => "footer",
        _ => "document",
    }
}

/// A document under construction.
///
/// Phases are requested in the order header, body, footer; each must be
/// closed before the next is requested. Skipped phases are created empty.
pub struct Document {
    ctx: Arc<DocumentContext>,
    link: ScopeLink,
    driver: Arc<dyn RenderDriver>,
    listener: Option<Arc<dyn FinishedListener>>,
    next_phase: usize,
    header: Arc<OnceLock<HeaderNode>>,
    body: Arc<OnceLock<Vec<SectionNode>>>,
    footer: Arc<OnceLock<Vec<SectionNode>>>,
    finished: bool,
}

impl Document {
    pub fn new(env: DocumentEnvironment) -> Result<Self, DocumentError> {
        let ctx = Arc::new(DocumentContext::new(
            env.config,
            StyleFacade::new(env.styles),
            env.bibliography,
            env.executor,
        ));
        let link = ScopeLink::open(&ctx, None, ScopeKind::Document)?;
        info!(
            "Started document {} ({} driver, {} executor)",
            ctx.id,
            env.driver.name(),
            ctx.executor.name()
        );
        Ok(Self {
            ctx,
            link,
            driver: env.driver,
            listener: env.listener,
            next_phase: HEADER,
            header: Arc::default(),
            body: Arc::default(),
            footer: Arc::default(),
            finished: false,
        })
    }

    pub fn id(&self) -> DocumentId {
        self.ctx.id
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.ctx.config
    }

    /// Creates an unbound label to reference now and bind later.
    pub fn allocate_label(&self, kind: LabelKind) -> Result<Label, DocumentError> {
        self.ctx.labels.allocate(kind)
    }

    /// The kind of the element bound to `label`.
    ///
    /// # Errors
    ///
    /// `Label` while `label` is unbound or foreign.
    pub fn resolve_label(&self, label: &Label) -> Result<LabelKind, DocumentError> {
        self.ctx.labels.resolve(label)
    }

    /// Like [`Document::resolve_label`], but `None` while unbound.
    pub fn peek_label(&self, label: &Label) -> Result<Option<LabelKind>, DocumentError> {
        self.ctx.labels.peek(label)
    }

    /// Admits a request for `phase`, creating skipped phases empty.
    fn enter(&mut self, phase: usize) -> Result<(), DocumentError> {
        self.link.ensure_mutable()?;
        if phase < self.next_phase {
            return Err(DocumentError::structural(format!(
                "document {} requested after {}",
                phase_name(phase),
                phase_name(self.next_phase - 1)
            )));
        }
        while self.next_phase < phase {
            self.fill(self.next_phase)?;
        }
        self.next_phase = phase + 1;
        debug!("Document {} entered its {}", self.ctx.id, phase_name(phase));
        Ok(())
    }

    /// Creates and closes an empty phase.
    fn fill(&mut self, phase: usize) -> Result<(), DocumentError> {
        self.next_phase = phase + 1;
        match phase {
            HEADER => self.open_header()?.close(),
            BODY => self.open_body()?.close(),
            FOOTER => self.open_footer()?.close(),
            _ => Ok(()),
        }
    }

    fn open_header(&self) -> Result<Header, DocumentError> {
        let link = self.link.child(ScopeKind::Header)?;
        Ok(Header::new(link, Outlet::new(Arc::clone(&self.header), |h| h)))
    }

    fn open_body(&self) -> Result<DocumentBody, DocumentError> {
        let link = self.link.child(ScopeKind::Body)?;
        Ok(DocumentBody {
            sections: PhaseSections::new(link, Outlet::new(Arc::clone(&self.body), |b| b)),
        })
    }

    fn open_footer(&self) -> Result<DocumentFooter, DocumentError> {
        let link = self.link.child(ScopeKind::Footer)?;
        Ok(DocumentFooter {
            sections: PhaseSections::new(link, Outlet::new(Arc::clone(&self.footer), |f| f)),
        })
    }

    pub fn header(&mut self) -> Result<Header, DocumentError> {
        self.enter(HEADER)?;
        self.open_header()
    }

    pub fn body(&mut self) -> Result<DocumentBody, DocumentError> {
        self.enter(BODY)?;
        self.open_body()
    }

    /// The appendix part.
    pub fn footer(&mut self) -> Result<DocumentFooter, DocumentError> {
        self.enter(FOOTER)?;
        self.open_footer()
    }

    /// Completes the document: fills missing phases, resolves labels and
    /// renders through the driver.
    ///
    /// # Errors
    ///
    /// Every error found during construction or rendering, aggregated.
    /// Nothing is rendered when construction failed.
    pub fn close(mut self) -> Result<DocumentOutput, DocumentError> {
        self.finish(ErrorCollector::new())
    }

    /// Runs the three phases in order, then closes the document.
    ///
    /// Every phase runs even when an earlier one failed.
    pub fn compose<H, B, F>(mut self, header: H, body: B, footer: F) -> Result<DocumentOutput, DocumentError>
    where
        H: FnOnce(&mut Header) -> Result<(), DocumentError>,
        B: FnOnce(&mut DocumentBody) -> Result<(), DocumentError>,
        F: FnOnce(&mut DocumentFooter) -> Result<(), DocumentError>,
    {
        let mut errors = ErrorCollector::new();
        match self.header() {
            Ok(mut h) => {
                errors.record(header(&mut h));
                errors.record(h.close());
            }
            Err(err) => errors.push(err),
        }
        match self.body() {
            Ok(mut b) => {
                errors.record(body(&mut b));
                errors.record(b.close());
            }
            Err(err) => errors.push(err),
        }
        match self.footer() {
            Ok(mut f) => {
                errors.record(footer(&mut f));
                errors.record(f.close());
            }
            Err(err) => errors.push(err),
        }
        self.finish(errors)
    }

    fn finish(&mut self, mut errors: ErrorCollector) -> Result<DocumentOutput, DocumentError> {
        self.finished = true;
        while self.next_phase < DONE {
            if let Err(err) = self.link.ensure_mutable() {
                errors.push(err);
                break;
            }
            let phase = self.next_phase;
            errors.record(self.fill(phase));
        }
        if self.link.close().is_err() {
            for (id, kind) in self.force_close() {
                if kind != ScopeKind::Document {
                    errors.push(DocumentError::structural(format!(
                        "{} {} was still open when the document closed",
                        kind, id
                    )));
                }
            }
        }
        errors.extend(self.ctx.take_deferred());
        if let Some(err) = errors.into_error() {
            warn!("Document {} failed: {}", self.ctx.id, err);
            return Err(err);
        }
        // Failures the caller saw and dropped still block rendering.
        let mut failures = ErrorCollector::new();
        failures.extend(self.ctx.take_failures());
        if let Some(err) = failures.into_error() {
            warn!("Document {} was left incomplete: {}", self.ctx.id, err);
            return Err(err);
        }

        let tree = DocumentTree {
            id: self.ctx.id,
            header: take_cell(std::mem::take(&mut self.header)).unwrap_or_default(),
            body: take_cell(std::mem::take(&mut self.body)).unwrap_or_default(),
            footer: take_cell(std::mem::take(&mut self.footer)).unwrap_or_default(),
        };
        let labels = Arc::new(resolve_labels(&tree, &self.ctx.labels)?);

        let config = &self.ctx.config;
        let context = RenderContext::new(config.main_name.clone(), Arc::clone(&labels))
            .with_split_budget(config.html_split_budget);
        let (units, memory) = match &config.base_path {
            Some(base) => {
                let mut sink = DirectorySink::new(base);
                (render_tree(&tree, self.driver.as_ref(), context, &mut sink)?, None)
            }
            None => {
                let mut sink = MemorySink::new();
                let units = render_tree(&tree, self.driver.as_ref(), context, &mut sink)?;
                (units, Some(sink))
            }
        };
        info!(
            "Finished document {}: {} section(s), {} unit(s)",
            self.ctx.id,
            tree.all_sections().len(),
            units.len()
        );

        let output = DocumentOutput {
            tree,
            labels,
            units,
            memory,
            base_path: config.base_path.clone(),
        };
        if let Some(listener) = &self.listener {
            listener.finished(&output);
        }
        Ok(output)
    }

    fn force_close(&self) -> Vec<(crate::scope::ScopeId, ScopeKind)> {
        self.ctx
            .with_scopes(|arena| Ok(arena.force_close_all()))
            .unwrap_or_default()
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        if !self.finished {
            let leftovers = self.force_close();
            warn!(
                "Document {} dropped without being closed; tore down {} scope(s)",
                self.ctx.id,
                leftovers.len()
            );
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.ctx.id)
            .field("phase", &phase_name(self.next_phase.min(DONE)))
            .finish()
    }
}

/// Title material: title, authors, date and summary.
pub struct Header {
    link: ScopeLink,
    title: Option<Arc<OnceLock<Vec<Inline>>>>,
    authors: Vec<Slot<Vec<Inline>>>,
    date: Option<NaiveDate>,
    summary: Option<Arc<OnceLock<Vec<Inline>>>>,
    outlet: Outlet<HeaderNode>,
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Header").field("link", &self.link).finish()
    }
}

impl Header {
    fn new(link: ScopeLink, outlet: Outlet<HeaderNode>) -> Self {
        Self {
            link,
            title: None,
            authors: Vec::new(),
            date: None,
            summary: None,
            outlet,
        }
    }

    fn single(
        link: &ScopeLink,
        cell: &mut Option<Arc<OnceLock<Vec<Inline>>>>,
        what: &str,
    ) -> Result<PlainText, DocumentError> {
        link.ensure_mutable()?;
        if cell.is_some() {
            return Err(DocumentError::structural(format!("{} requested twice", what)));
        }
        let shared = Arc::new(OnceLock::new());
        let child = link.child(ScopeKind::PlainText)?;
        *cell = Some(Arc::clone(&shared));
        Ok(PlainText::new(child, Outlet::new(shared, |t| t)))
    }

    pub fn title(&mut self) -> Result<PlainText, DocumentError> {
        Self::single(&self.link, &mut self.title, "document title")
    }

    /// Adds an author entry.
    pub fn author(&mut self) -> Result<PlainText, DocumentError> {
        self.link.ensure_mutable()?;
        let child = self.link.child(ScopeKind::PlainText)?;
        Ok(PlainText::new(child, reserve(&mut self.authors, |a| a)))
    }

    pub fn date(&mut self, date: NaiveDate) -> Result<(), DocumentError> {
        self.link.ensure_mutable()?;
        if self.date.is_some() {
            return Err(DocumentError::structural("document date set twice"));
        }
        self.date = Some(date);
        Ok(())
    }

    pub fn summary(&mut self) -> Result<PlainText, DocumentError> {
        Self::single(&self.link, &mut self.summary, "document summary")
    }

    pub fn close(&mut self) -> Result<(), DocumentError> {
        self.link.close_with(|| {
            self.outlet.deliver(HeaderNode {
                title: self.title.take().and_then(take_cell).unwrap_or_default(),
                authors: resolve_all(std::mem::take(&mut self.authors)),
                date: self.date,
                summary: self.summary.take().and_then(take_cell).unwrap_or_default(),
            });
            Ok(())
        })
    }
}

close_on_drop!(Header => link);

/// Top-level sections of the body or footer.
struct PhaseSections {
    link: ScopeLink,
    sections: Vec<Slot<SectionNode>>,
    subsections: Subsections,
    outlet: Outlet<Vec<SectionNode>>,
}

impl PhaseSections {
    fn new(link: ScopeLink, outlet: Outlet<Vec<SectionNode>>) -> Self {
        Self {
            link,
            sections: Vec::new(),
            subsections: Subsections::new(1),
            outlet,
        }
    }

    fn section<F>(&mut self, label: LabelRequest, build: F) -> Result<(), DocumentError>
    where
        F: FnOnce(&mut Section) -> Result<(), DocumentError> + Send + 'static,
    {
        let sections = &mut self.sections;
        self.subsections
            .spawn(&self.link, label, || reserve(sections, |s| s), build)
    }

    fn allocate_label(&self, kind: LabelKind) -> Result<Label, DocumentError> {
        self.link.ensure_open()?;
        self.link.ctx().labels.allocate(kind)
    }

    fn close(&mut self) -> Result<(), DocumentError> {
        self.link.ensure_open()?;
        let mut errors = ErrorCollector::new();
        self.subsections.join_all(&self.link, &mut errors);
        errors.record(self.link.close_with(|| {
            self.outlet
                .deliver(resolve_all(std::mem::take(&mut self.sections)));
            Ok(())
        }));
        errors.into_result()
    }
}

close_on_drop!(PhaseSections => link);

/// The main part of the document.
pub struct DocumentBody {
    sections: PhaseSections,
}

impl DocumentBody {
    pub fn allocate_label(&self, kind: LabelKind) -> Result<Label, DocumentError> {
        self.sections.allocate_label(kind)
    }

    /// Joins all section tasks, then closes.
    pub fn close(&mut self) -> Result<(), DocumentError> {
        self.sections.close()
    }
}

impl SectionContainer for DocumentBody {
    fn section<F>(&mut self, label: impl Into<LabelRequest>, build: F) -> Result<(), DocumentError>
    where
        F: FnOnce(&mut Section) -> Result<(), DocumentError> + Send + 'static,
    {
        self.sections.section(label.into(), build)
    }
}

/// The appendix part of the document.
pub struct DocumentFooter {
    sections: PhaseSections,
}

impl DocumentFooter {
    pub fn allocate_label(&self, kind: LabelKind) -> Result<Label, DocumentError> {
        self.sections.allocate_label(kind)
    }

    pub fn close(&mut self) -> Result<(), DocumentError> {
        self.sections.close()
    }
}

impl SectionContainer for DocumentFooter {
    fn section<F>(&mut self, label: impl Into<LabelRequest>, build: F) -> Result<(), DocumentError>
    where
        F: FnOnce(&mut Section) -> Result<(), DocumentError> + Send + 'static,
    {
        self.sections.section(label.into(), build)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{OutlineDriver, document, environment};
    use crate::text::{ComplexTextOutput, TextOutput};
    use folio_types::SequenceMode;
    use std::sync::Mutex;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn outline(output: &DocumentOutput) -> String {
        output
            .main_unit()
            .and_then(|path| output.unit_text(path))
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn test_phases_in_order_render_outline() -> TestResult {
        let mut doc = document();
        let mut header = doc.header()?;
        let mut title = header.title()?;
        title.append("Annual report")?;
        title.close()?;
        header.date(NaiveDate::from_ymd_opt(2024, 3, 1).ok_or("date")?)?;
        header.close()?;

        let mut body = doc.body()?;
        body.section(LabelRequest::Auto, |section| {
            let mut title = section.title()?;
            title.append("Intro")?;
            title.close()?;
            let mut body = section.body()?;
            body.append("Hello")?;
            body.close()
        })?;
        body.close()?;

        let output = doc.close()?;
        assert_eq!(output.units, vec!["report.txt".to_string()]);
        let text = outline(&output);
        assert!(text.starts_with("document: Annual report"));
        assert!(text.contains("section 1 [1]: Intro"));
        assert!(text.contains("text: Hello"));
        assert!(!text.contains("Appendix"));
        assert_eq!(output.tree.header.date, NaiveDate::from_ymd_opt(2024, 3, 1));
        Ok(())
    }

    #[test]
    fn test_skipped_phases_are_created_empty() -> TestResult {
        let mut doc = document();
        doc.footer()?.close()?;
        let output = doc.close()?;
        assert!(output.tree.header.is_empty());
        assert!(output.tree.body.is_empty());
        Ok(())
    }

    #[test]
    fn test_phase_out_of_order_is_rejected() -> TestResult {
        let mut doc = document();
        doc.body()?.close()?;
        let err = doc.header().unwrap_err();
        assert!(matches!(err, DocumentError::StructuralViolation(_)));
        doc.close()?;
        Ok(())
    }

    #[test]
    fn test_phase_while_previous_open_is_rejected() -> TestResult {
        let mut doc = document();
        let mut header = doc.header()?;
        assert!(doc.body().is_err());
        header.close()?;
        assert!(doc.body().is_ok());
        Ok(())
    }

    #[test]
    fn test_closed_header_rejects_mutation() -> TestResult {
        let mut doc = document();
        let mut header = doc.header()?;
        header.close()?;
        assert!(matches!(header.title(), Err(DocumentError::ClosedScope(_))));
        assert!(matches!(
            header.date(NaiveDate::from_ymd_opt(2020, 1, 1).ok_or("date")?),
            Err(DocumentError::ClosedScope(_))
        ));
        Ok(())
    }

    #[test]
    fn test_header_title_once() -> TestResult {
        let mut doc = document();
        let mut header = doc.header()?;
        header.title()?.close()?;
        assert!(header.title().is_err());
        header.author()?.append("A")?;
        header.author()?.append("B")?;
        header.close()?;
        let output = doc.close()?;
        assert_eq!(output.tree.header.authors.len(), 2);
        Ok(())
    }

    #[test]
    fn test_open_child_fails_document_close() -> TestResult {
        let mut doc = document();
        let _header = doc.header()?;
        let err = doc.close().unwrap_err();
        assert!(err.any_cause(|e| matches!(e, DocumentError::StructuralViolation(m) if m.contains("still open"))));
        Ok(())
    }

    #[test]
    fn test_failed_section_aggregates_errors() -> TestResult {
        let mut doc = document();
        let mut body = doc.body()?;
        body.section(LabelRequest::None, |_| Err(DocumentError::layout("first")))?;
        body.section(LabelRequest::None, |_| Err(DocumentError::layout("second")))?;
        let err = body.close().unwrap_err();
        assert_eq!(err.causes().len(), 2);
        assert!(doc.close().is_err());
        Ok(())
    }

    #[test]
    fn test_ignored_failure_keeps_its_kind_at_close() -> TestResult {
        let mut doc = document();
        let mut body = doc.body()?;
        body.section(LabelRequest::None, |_| Err(DocumentError::layout("row overflow")))?;
        let _ = body.close();
        let err = doc.close().unwrap_err();
        assert_eq!(err.causes().len(), 1);
        assert!(matches!(&err, DocumentError::Layout(m) if m == "row overflow"));
        Ok(())
    }

    #[test]
    fn test_compose_runs_every_phase() -> TestResult {
        let doc = document();
        let footer_ran = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&footer_ran);
        let result = doc.compose(
            |_| Err(DocumentError::structural("header broke")),
            |_| Ok(()),
            move |_| {
                *flag.lock().map_err(|_| DocumentError::structural("poisoned"))? = true;
                Ok(())
            },
        );
        assert!(result.is_err());
        assert!(*footer_ran.lock().map_err(|_| "poisoned")?);
        Ok(())
    }

    #[test]
    fn test_forward_reference_resolves() -> TestResult {
        let mut doc = document();
        let mut body = doc.body()?;
        let target = body.allocate_label(LabelKind::Section)?;
        body.section(LabelRequest::None, move |section| {
            let mut text = section.body()?;
            text.append("see ")?;
            text.reference(SequenceMode::Comma, &[target])?;
            text.close()
        })?;
        body.section(target, |_| Ok(()))?;
        body.close()?;
        assert_eq!(doc.resolve_label(&target)?, LabelKind::Section);
        let output = doc.close()?;
        assert_eq!(output.labels.get(&target).ok_or("unresolved")?.number, "2");
        Ok(())
    }

    #[test]
    fn test_unbound_label_fails_close() -> TestResult {
        let mut doc = document();
        let label = doc.allocate_label(LabelKind::Table)?;
        assert_eq!(doc.peek_label(&label)?, None);
        assert!(doc.resolve_label(&label).is_err());
        let err = doc.close().unwrap_err();
        assert!(matches!(err, DocumentError::Label(_)));
        Ok(())
    }

    #[test]
    fn test_listener_sees_output() -> TestResult {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut env = environment(1);
        env.listener = Some(Arc::new(move |output: &DocumentOutput| {
            if let Ok(mut seen) = sink.lock() {
                seen.extend(output.units.clone());
            }
        }));
        Document::new(env)?.close()?;
        assert_eq!(*seen.lock().map_err(|_| "poisoned")?, vec!["report.txt".to_string()]);
        Ok(())
    }

    #[test]
    fn test_parallel_sections_keep_declared_order() -> TestResult {
        let mut doc = Document::new(environment(4))?;
        let mut body = doc.body()?;
        for i in 0..8 {
            body.section(LabelRequest::Auto, move |section| {
                let mut title = section.title()?;
                title.append_display(i)?;
                title.close()?;
                let mut inner = section.body()?;
                for j in 0..3 {
                    inner.section(LabelRequest::None, move |sub| {
                        let mut title = sub.title()?;
                        title.append(&format!("{}.{}", i, j))?;
                        title.close()
                    })?;
                }
                inner.close()
            })?;
        }
        body.close()?;
        let output = doc.close()?;
        let titles: Vec<String> = output.tree.body.iter().map(|s| s.title_text()).collect();
        assert_eq!(titles, (0..8).map(|i| i.to_string()).collect::<Vec<_>>());
        let third: Vec<String> = output.tree.body[2]
            .subsections()
            .map(|s| s.title_text())
            .collect();
        assert_eq!(third, vec!["2.0", "2.1", "2.2"]);
        Ok(())
    }

    #[test]
    fn test_worker_count_does_not_change_shape() -> TestResult {
        fn build(workers: usize) -> Result<DocumentOutput, DocumentError> {
            let mut doc = Document::new(environment(workers))?;
            let mut body = doc.body()?;
            for _ in 0..3 {
                body.section(LabelRequest::Auto, |section| {
                    let mut inner = section.body()?;
                    inner.append("text")?;
                    inner.equation(LabelRequest::Auto)?.number(1)?;
                    inner.section(LabelRequest::Auto, |_| Ok(()))?;
                    inner.close()
                })?;
            }
            body.close()?;
            doc.close()
        }
        let single = build(1)?;
        let many = build(4)?;
        assert_eq!(single.tree.shape(), many.tree.shape());
        assert_eq!(outline(&single), outline(&many));
        Ok(())
    }

    #[test]
    fn test_environment_debug_names_driver() {
        let env = DocumentEnvironment::new(Arc::new(OutlineDriver));
        assert!(format!("{:?}", env).contains("outline"));
    }
}
