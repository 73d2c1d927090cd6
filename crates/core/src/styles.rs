use crate::error::DocumentError;
use folio_traits::{ResourceError, StyleProvider};
use folio_types::{ColorStyle, FontStyle, Style, StyleKind, StrokeStyle};
use log::debug;
use std::sync::{Arc, Mutex};

/// Serializes access to the document's style pool.
#[derive(Debug)]
pub struct StyleFacade {
    provider: Arc<dyn StyleProvider>,
    lock: Mutex<()>,
}

impl StyleFacade {
    pub fn new(provider: Arc<dyn StyleProvider>) -> Self {
        Self {
            provider,
            lock: Mutex::new(()),
        }
    }

    /// Takes `count` distinct styles of `kind` out of the pool.
    pub fn allocate(&self, kind: StyleKind, count: usize) -> Result<Vec<Style>, DocumentError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| ResourceError::Poisoned("style pool".to_string()))?;
        let styles = self.provider.allocate(kind, count)?;
        debug!(
            "Allocated {} {:?} style(s) from '{}'",
            styles.len(),
            kind,
            self.provider.name()
        );
        Ok(styles)
    }

    pub fn default_font(&self) -> FontStyle {
        self.provider.default_font()
    }

    pub fn emphasis_font(&self) -> FontStyle {
        self.provider.emphasis_font()
    }

    pub fn code_font(&self) -> FontStyle {
        self.provider.code_font()
    }

    pub fn default_color(&self) -> ColorStyle {
        self.provider.default_color()
    }

    pub fn default_stroke(&self) -> StrokeStyle {
        self.provider.default_stroke()
    }

    pub fn thin_stroke(&self) -> StrokeStyle {
        self.provider.thin_stroke()
    }

    pub fn thick_stroke(&self) -> StrokeStyle {
        self.provider.thick_stroke()
    }
}
