use crate::Labelable;
use crate::error::DocumentError;
use crate::scope::{ScopeKind, ScopeLink, close_on_drop};
use crate::slot::{Outlet, resolve_all, take_cell};
use crate::text::{PlainText, Sealed, TextCore, TextHost};
use folio_idf::{CodeNode, Inline, plain_text};
use folio_types::Label;
use std::sync::{Arc, OnceLock};

/// A code listing with an optional caption.
pub struct Code {
    link: ScopeLink,
    label: Option<Label>,
    caption: Option<Arc<OnceLock<Vec<Inline>>>>,
    body: Option<Arc<OnceLock<String>>>,
    outlet: Outlet<CodeNode>,
}

impl Code {
    pub(crate) fn new(link: ScopeLink, label: Option<Label>, outlet: Outlet<CodeNode>) -> Self {
        Self {
            link,
            label,
            caption: None,
            body: None,
            outlet,
        }
    }

    pub fn caption(&mut self) -> Result<PlainText, DocumentError> {
        self.link.ensure_mutable()?;
        if self.caption.is_some() {
            return Err(DocumentError::structural("code caption requested twice"));
        }
        let cell = Arc::new(OnceLock::new());
        let link = self.link.child(ScopeKind::PlainText)?;
        self.caption = Some(Arc::clone(&cell));
        Ok(PlainText::new(link, Outlet::new(cell, |c| c)))
    }

    /// Opens the listing text. Line breaks become newlines.
    pub fn body(&mut self) -> Result<CodeBody, DocumentError> {
        self.link.ensure_mutable()?;
        if self.body.is_some() {
            return Err(DocumentError::structural("code body requested twice"));
        }
        let cell = Arc::new(OnceLock::new());
        let link = self.link.child(ScopeKind::CodeBody)?;
        self.body = Some(Arc::clone(&cell));
        Ok(CodeBody {
            core: TextCore::new(link),
            outlet: Outlet::new(cell, |text| text),
        })
    }

    pub fn close(&mut self) -> Result<(), DocumentError> {
        self.link.close_with(|| {
            self.outlet.deliver(CodeNode {
                label: self.label,
                caption: self.caption.take().and_then(take_cell).unwrap_or_default(),
                body: self.body.take().and_then(take_cell).unwrap_or_default(),
            });
            Ok(())
        })
    }
}

impl Labelable for Code {
    fn label(&self) -> Option<Label> {
        self.label
    }
}

close_on_drop!(Code => link);

/// Raw listing text.
pub struct CodeBody {
    core: TextCore,
    outlet: Outlet<String>,
}

impl CodeBody {
    pub fn close(&mut self) -> Result<(), DocumentError> {
        self.core.link.close_with(|| {
            let text = plain_text(&resolve_all(std::mem::take(&mut self.core.inlines)));
            self.outlet.deliver(text);
            Ok(())
        })
    }
}

impl Sealed for CodeBody {}

impl TextHost for CodeBody {
    fn text_core(&mut self) -> &mut TextCore {
        &mut self.core
    }
}

close_on_drop!(CodeBody => core.link);
