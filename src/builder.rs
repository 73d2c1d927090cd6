use crate::error::FolioError;
use folio_core::{Document, DocumentConfig, DocumentEnvironment, DocumentOutput, FinishedListener};
use folio_executor::ExecutorImpl;
use folio_render_core::RenderDriver;
use folio_render_html::HtmlDriver;
use folio_render_latex::LatexDriver;
use folio_traits::{Bibliography, StyleProvider};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// The concrete output grammars shipped with folio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentFormat {
    /// A single `.tex` unit plus one SVG per figure.
    #[default]
    Latex,
    /// One or more linked `.html` units plus one SVG per figure.
    Xhtml,
}

impl DocumentFormat {
    pub fn driver(self) -> Arc<dyn RenderDriver> {
        match self {
            DocumentFormat::Latex => Arc::new(LatexDriver::new()),
            DocumentFormat::Xhtml => Arc::new(HtmlDriver::new()),
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "latex" | "tex" => Ok(DocumentFormat::Latex),
            "xhtml" | "html" => Ok(DocumentFormat::Xhtml),
            other => Err(FolioError::Config(format!("Unsupported output format: {}", other))),
        }
    }
}

/// A builder for creating a [`Document`] wired to a backend and a worker pool.
pub struct DocumentBuilder {
    format: DocumentFormat,
    driver: Option<Arc<dyn RenderDriver>>,
    workers: usize,
    config: DocumentConfig,
    styles: Option<Arc<dyn StyleProvider>>,
    bibliography: Option<Arc<dyn Bibliography>>,
    listener: Option<Arc<dyn FinishedListener>>,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self {
            format: DocumentFormat::default(),
            driver: None,
            workers: num_cpus::get(),
            config: DocumentConfig::default(),
            styles: None,
            bibliography: None,
            listener: None,
        }
    }
}

impl fmt::Debug for DocumentBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentBuilder")
            .field("format", &self.format)
            .field("driver", &self.driver.as_ref().map(|d| d.name()))
            .field("workers", &self.workers)
            .field("config", &self.config)
            .finish()
    }
}

impl DocumentBuilder {
    /// One worker per logical CPU, LaTeX output, in-memory collaborators.
    pub fn new() -> Self {
        Default::default()
    }

    pub fn format(mut self, format: DocumentFormat) -> Self {
        self.format = format;
        self
    }

    /// Uses a custom backend instead of one of the shipped formats.
    pub fn driver(mut self, driver: Arc<dyn RenderDriver>) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Number of threads that build sections. `1` runs everything on the
    /// calling thread.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn config(mut self, config: DocumentConfig) -> Self {
        self.config = config;
        self
    }

    /// Reads the configuration from JSON; missing fields keep their defaults.
    pub fn config_json(mut self, json: &str) -> Result<Self, FolioError> {
        self.config = DocumentConfig::from_json(json)?;
        Ok(self)
    }

    pub fn main_name(mut self, name: impl Into<String>) -> Self {
        self.config.main_name = name.into();
        self
    }

    /// Writes units below `path` instead of keeping them in memory.
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.base_path = Some(path.into());
        self
    }

    pub fn styles(mut self, styles: Arc<dyn StyleProvider>) -> Self {
        self.styles = Some(styles);
        self
    }

    pub fn bibliography(mut self, bibliography: Arc<dyn Bibliography>) -> Self {
        self.bibliography = Some(bibliography);
        self
    }

    /// Called with the output once the document has been rendered.
    pub fn listener<L>(mut self, listener: L) -> Self
    where
        L: Fn(&DocumentOutput) + Send + Sync + 'static,
    {
        self.listener = Some(Arc::new(listener));
        self
    }

    /// The collaborators a document would be created with.
    pub fn environment(self) -> Result<DocumentEnvironment, FolioError> {
        if self.workers == 0 {
            return Err(FolioError::Config("at least one worker is required".to_string()));
        }
        if self.config.max_section_depth == 0 {
            return Err(FolioError::Config("maxSectionDepth must be at least 1".to_string()));
        }
        let driver = self.driver.unwrap_or_else(|| self.format.driver());
        let mut env = DocumentEnvironment::new(driver);
        env.executor = ExecutorImpl::for_workers(self.workers).map_err(folio_core::DocumentError::from)?;
        env.config = self.config;
        if let Some(styles) = self.styles {
            env.styles = styles;
        }
        if let Some(bibliography) = self.bibliography {
            env.bibliography = bibliography;
        }
        env.listener = self.listener;
        log::debug!("Document environment ready: {:?}", env);
        Ok(env)
    }

    /// Consumes the builder and opens the document.
    pub fn build(self) -> Result<Document, FolioError> {
        Ok(Document::new(self.environment()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{LabelRequest, SectionContainer, TextOutput};
    use std::sync::Mutex;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_format_parsing() -> TestResult {
        assert_eq!("LaTeX".parse::<DocumentFormat>()?, DocumentFormat::Latex);
        assert_eq!("html".parse::<DocumentFormat>()?, DocumentFormat::Xhtml);
        assert!("pdf".parse::<DocumentFormat>().is_err());
        Ok(())
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let err = DocumentBuilder::new().workers(0).build().unwrap_err();
        assert!(matches!(err, FolioError::Config(_)));
    }

    #[test]
    fn test_config_json_and_listener() -> TestResult {
        let _ = env_logger::builder().is_test(true).try_init();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = Arc::clone(&seen);
        let mut doc = DocumentBuilder::new()
            .format(DocumentFormat::Xhtml)
            .workers(1)
            .config_json(r#"{"mainName":"notes"}"#)?
            .listener(move |output: &DocumentOutput| {
                if let Ok(mut seen) = record.lock() {
                    seen.extend(output.units.clone());
                }
            })
            .build()?;
        let mut body = doc.body()?;
        body.section(LabelRequest::None, |section| {
            let mut text = section.body()?;
            text.append("Hello")?;
            text.close()
        })?;
        body.close()?;
        let output = doc.close()?;
        assert_eq!(output.main_unit(), Some("notes.html"));
        assert_eq!(*seen.lock().map_err(|_| "poisoned")?, vec!["notes.html".to_string()]);
        Ok(())
    }

    #[test]
    fn test_malformed_config_json() {
        let err = DocumentBuilder::new().config_json("{").unwrap_err();
        assert!(matches!(err, FolioError::Config(_)));
    }
}
