//! Defines the error types for all document construction operations.

use folio_render_core::RenderError;
use folio_traits::{ExecutorError, ResourceError};
use std::fmt;
use thiserror::Error;

/// The main error enum for everything a document builder can report.
#[derive(Error, Debug, Clone)]
pub enum DocumentError {
    #[error("Structural violation: {0}")]
    StructuralViolation(String),
    #[error("Operation on closed {0}")]
    ClosedScope(String),
    #[error("Label error: {0}")]
    Label(String),
    #[error("Layout error: {0}")]
    Layout(String),
    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),
    #[error("Executor error: {0}")]
    Executor(#[from] ExecutorError),
    #[error("{0}")]
    Aggregated(AggregatedError),
}

impl DocumentError {
    pub fn structural(message: impl Into<String>) -> Self {
        DocumentError::StructuralViolation(message.into())
    }

    pub fn label(message: impl Into<String>) -> Self {
        DocumentError::Label(message.into())
    }

    pub fn layout(message: impl Into<String>) -> Self {
        DocumentError::Layout(message.into())
    }

    /// Every underlying cause, with aggregates flattened.
    pub fn causes(&self) -> Vec<&DocumentError> {
        match self {
            DocumentError::Aggregated(agg) => agg.iter().collect(),
            other => vec![other],
        }
    }

    /// Whether any cause matches `pred`.
    pub fn any_cause(&self, pred: impl Fn(&DocumentError) -> bool) -> bool {
        self.causes().into_iter().any(pred)
    }
}

/// Several errors reported together. The first one raised is the primary.
#[derive(Debug, Clone)]
pub struct AggregatedError {
    primary: Box<DocumentError>,
    additional: Vec<DocumentError>,
}

impl AggregatedError {
    pub fn primary(&self) -> &DocumentError {
        &self.primary
    }

    pub fn additional(&self) -> &[DocumentError] {
        &self.additional
    }

    pub fn len(&self) -> usize {
        1 + self.additional.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentError> {
        std::iter::once(self.primary.as_ref()).chain(self.additional.iter())
    }
}

impl fmt::Display for AggregatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.primary)?;
        if !self.additional.is_empty() {
            write!(f, " (and {} more error(s):", self.additional.len())?;
            for err in &self.additional {
                write!(f, " [{}]", err)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregatedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.primary.as_ref())
    }
}

/// Accumulates errors from independent steps and reports them as one.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Vec<DocumentError>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error, flattening aggregates.
    pub fn push(&mut self, err: DocumentError) {
        match err {
            DocumentError::Aggregated(agg) => {
                self.errors.push(*agg.primary);
                self.errors.extend(agg.additional);
            }
            other => self.errors.push(other),
        }
    }

    /// Keeps the value of a successful step, records the error of a failed one.
    pub fn record<T>(&mut self, result: Result<T, DocumentError>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.push(e);
                None
            }
        }
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = DocumentError>) {
        for err in errors {
            self.push(err);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The single error, an aggregate of several, or `None`.
    pub fn into_error(mut self) -> Option<DocumentError> {
        match self.errors.len() {
            0 => None,
            1 => self.errors.pop(),
            _ => {
                let primary = Box::new(self.errors.remove(0));
                Some(DocumentError::Aggregated(AggregatedError {
                    primary,
                    additional: self.errors,
                }))
            }
        }
    }

    pub fn into_result(self) -> Result<(), DocumentError> {
        self.finish(())
    }

    /// `Ok(value)` if nothing was recorded.
    pub fn finish<T>(self, value: T) -> Result<T, DocumentError> {
        match self.into_error() {
            None => Ok(value),
            Some(err) => Err(err),
        }
    }
}
