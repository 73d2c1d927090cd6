use crate::config::DocumentConfig;
use crate::error::DocumentError;
use crate::label::LabelRegistry;
use crate::scope::ScopeArena;
use crate::styles::StyleFacade;
use folio_executor::ExecutorImpl;
use folio_traits::{BibRecord, Bibliography, ResourceError};
use folio_types::DocumentId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// State shared by every builder of one document.
#[derive(Debug)]
pub(crate) struct DocumentContext {
    pub(crate) id: DocumentId,
    pub(crate) config: DocumentConfig,
    scopes: Mutex<ScopeArena>,
    pub(crate) labels: LabelRegistry,
    pub(crate) styles: StyleFacade,
    bibliography: Arc<dyn Bibliography>,
    pub(crate) executor: ExecutorImpl,
    figure_counter: AtomicU64,
    deferred: Mutex<Vec<DocumentError>>,
    failures: Mutex<Vec<DocumentError>>,
}

impl DocumentContext {
    pub(crate) fn new(
        config: DocumentConfig,
        styles: StyleFacade,
        bibliography: Arc<dyn Bibliography>,
        executor: ExecutorImpl,
    ) -> Self {
        let id = DocumentId::next();
        Self {
            id,
            config,
            scopes: Mutex::new(ScopeArena::new()),
            labels: LabelRegistry::new(id),
            styles,
            bibliography,
            executor,
            figure_counter: AtomicU64::new(0),
            deferred: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
        }
    }

    /// Runs `f` with the scope arena locked.
    pub(crate) fn with_scopes<R>(
        &self,
        f: impl FnOnce(&mut ScopeArena) -> Result<R, DocumentError>,
    ) -> Result<R, DocumentError> {
        let mut arena = self
            .scopes
            .lock()
            .map_err(|_| DocumentError::structural("scope arena lock poisoned"))?;
        f(&mut arena)
    }

    /// Files an error nobody could return; it surfaces at document close.
    pub(crate) fn defer(&self, err: DocumentError) {
        if let Ok(mut deferred) = self.deferred.lock() {
            deferred.push(err);
        }
    }

    pub(crate) fn take_deferred(&self) -> Vec<DocumentError> {
        self.deferred
            .lock()
            .map(|mut d| std::mem::take(&mut *d))
            .unwrap_or_default()
    }

    /// Marks the document as incomplete; rendering will be skipped.
    pub(crate) fn record_failure(&self, err: &DocumentError) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push(err.clone());
        }
    }

    pub(crate) fn take_failures(&self) -> Vec<DocumentError> {
        self.failures
            .lock()
            .map(|mut f| std::mem::take(&mut *f))
            .unwrap_or_default()
    }

    pub(crate) fn citation(&self, index: usize) -> Result<BibRecord, DocumentError> {
        self.bibliography
            .get(index)
            .ok_or(DocumentError::Resource(ResourceError::MissingRecord(index)))
    }

    /// Output path for the next figure: `figures/<slug>-<n>`.
    pub(crate) fn next_figure_path(&self, suggestion: &str) -> String {
        let n = self.figure_counter.fetch_add(1, Ordering::Relaxed) + 1;
        let slug = slug::slugify(suggestion);
        let stem = if slug.is_empty() { "figure" } else { slug.as_str() };
        format!("figures/{}-{}", stem, n)
    }
}
