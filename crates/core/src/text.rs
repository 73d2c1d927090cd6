//! Flowing text and its capabilities.
//!
//! Text-bearing scopes share one content buffer ([`TextCore`]) and receive
//! their operations through blanket implementations:
//!
//! - [`TextOutput`] for every text host,
//! - [`PlainTextOutput`] for plain text (titles, captions, cells),
//! - [`ComplexTextOutput`] and [`Styleable`] for rich text (section
//!   bodies, list items, styled spans).
//!
//! Every operation first checks that the scope is open and has no open
//! child; nested spans are child scopes that must close before their
//! parent continues.

use crate::error::DocumentError;
use crate::math::Math;
use crate::scope::{ScopeKind, ScopeLink, close_on_drop};
use crate::slot::{Outlet, Slot, reserve, resolve_all};
use folio_idf::{BodyNode, Inline};
use folio_types::{CitationMode, Label, SequenceMode, Style, StyleKind};
use std::fmt::Display;

mod private {
    pub trait Sealed {}
}

pub(crate) use private::Sealed;

/// Content buffer of a text-bearing scope.
#[doc(hidden)]
pub struct TextCore {
    pub(crate) link: ScopeLink,
    pub(crate) inlines: Vec<Slot<Inline>>,
}

impl TextCore {
    pub(crate) fn new(link: ScopeLink) -> Self {
        Self {
            link,
            inlines: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, inline: Inline) {
        if let (Some(Slot::Ready(Inline::Text(last))), Inline::Text(more)) =
            (self.inlines.last_mut(), &inline)
        {
            last.push_str(more);
            return;
        }
        self.inlines.push(Slot::Ready(inline));
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.inlines.is_empty()
    }

    pub(crate) fn take(&mut self) -> Vec<Inline> {
        resolve_all(std::mem::take(&mut self.inlines))
    }
}

/// A scope that accepts flowing text.
pub trait TextHost: Sealed {
    #[doc(hidden)]
    fn text_core(&mut self) -> &mut TextCore;

    /// Extra admission rule for inline content.
    #[doc(hidden)]
    fn check_inline(&self) -> Result<(), DocumentError> {
        Ok(())
    }

    #[doc(hidden)]
    fn break_paragraph(&mut self) -> Result<(), DocumentError> {
        self.text_core().push(Inline::LineBreak);
        Ok(())
    }
}

/// Hosts of plain text and its wrappers.
pub trait PlainHost: TextHost {}

/// Hosts of rich text.
pub trait ComplexHost: PlainHost {}

fn ready<H: TextHost + ?Sized>(host: &mut H) -> Result<&mut TextCore, DocumentError> {
    host.text_core().link.ensure_mutable()?;
    host.check_inline()?;
    Ok(host.text_core())
}

fn open_plain<H: TextHost + ?Sized>(
    host: &mut H,
    wrap: fn(Vec<Inline>) -> Inline,
) -> Result<PlainText, DocumentError> {
    let core = ready(host)?;
    let link = core.link.child(ScopeKind::PlainText)?;
    Ok(PlainText::new(link, reserve(&mut core.inlines, wrap)))
}

fn open_complex<H: TextHost + ?Sized>(
    host: &mut H,
    wrap: impl FnOnce(Vec<Inline>) -> Inline + Send + 'static,
) -> Result<ComplexText, DocumentError> {
    let core = ready(host)?;
    let link = core.link.child(ScopeKind::ComplexText)?;
    Ok(ComplexText::new(link, reserve(&mut core.inlines, wrap)))
}

pub trait TextOutput {
    fn append(&mut self, text: &str) -> Result<(), DocumentError>;

    fn append_display(&mut self, value: impl Display) -> Result<(), DocumentError>;

    fn line_break(&mut self) -> Result<(), DocumentError>;

    /// Starts a new paragraph in block scopes, a new line elsewhere.
    fn paragraph_break(&mut self) -> Result<(), DocumentError>;
}

impl<H: TextHost> TextOutput for H {
    fn append(&mut self, text: &str) -> Result<(), DocumentError> {
        let core = ready(self)?;
        if !text.is_empty() {
            core.push(Inline::Text(text.to_string()));
        }
        Ok(())
    }

    fn append_display(&mut self, value: impl Display) -> Result<(), DocumentError> {
        self.append(&value.to_string())
    }

    fn line_break(&mut self) -> Result<(), DocumentError> {
        ready(self)?.push(Inline::LineBreak);
        Ok(())
    }

    fn paragraph_break(&mut self) -> Result<(), DocumentError> {
        ready(self)?;
        self.break_paragraph()
    }
}

pub trait PlainTextOutput: TextOutput {
    /// Opens a parenthesized span.
    fn in_braces(&mut self) -> Result<PlainText, DocumentError>;

    /// Opens a quoted span.
    fn in_quotes(&mut self) -> Result<PlainText, DocumentError>;
}

impl<H: PlainHost> PlainTextOutput for H {
    fn in_braces(&mut self) -> Result<PlainText, DocumentError> {
        open_plain(self, Inline::Braces)
    }

    fn in_quotes(&mut self) -> Result<PlainText, DocumentError> {
        open_plain(self, Inline::Quotes)
    }
}

pub trait ComplexTextOutput: PlainTextOutput {
    fn emphasize(&mut self) -> Result<ComplexText, DocumentError>;

    fn subscript(&mut self) -> Result<ComplexText, DocumentError>;

    fn superscript(&mut self) -> Result<ComplexText, DocumentError>;

    fn inline_code(&mut self) -> Result<PlainText, DocumentError>;

    /// Opens a math expression set in the running text.
    fn inline_math(&mut self) -> Result<Math, DocumentError>;

    /// Cites bibliography records by index.
    ///
    /// # Errors
    ///
    /// `Resource` if an index has no record.
    fn cite(
        &mut self,
        mode: CitationMode,
        sequence: SequenceMode,
        records: &[usize],
    ) -> Result<(), DocumentError>;

    /// References labeled elements, which may not exist yet.
    ///
    /// # Errors
    ///
    /// `Label` if `labels` is empty or holds a label of another document.
    fn reference(&mut self, sequence: SequenceMode, labels: &[Label]) -> Result<(), DocumentError>;

    fn allocate_styles(&mut self, kind: StyleKind, count: usize) -> Result<Vec<Style>, DocumentError>;
}

impl<H: ComplexHost> ComplexTextOutput for H {
    fn emphasize(&mut self) -> Result<ComplexText, DocumentError> {
        open_complex(self, Inline::Emphasis)
    }

    fn subscript(&mut self) -> Result<ComplexText, DocumentError> {
        open_complex(self, Inline::Subscript)
    }

    fn superscript(&mut self) -> Result<ComplexText, DocumentError> {
        open_complex(self, Inline::Superscript)
    }

    fn inline_code(&mut self) -> Result<PlainText, DocumentError> {
        open_plain(self, Inline::Code)
    }

    fn inline_math(&mut self) -> Result<Math, DocumentError> {
        let core = ready(self)?;
        let link = core.link.child(ScopeKind::Math)?;
        Ok(Math::expression(link, None, reserve(&mut core.inlines, Inline::Math)))
    }

    fn cite(
        &mut self,
        mode: CitationMode,
        sequence: SequenceMode,
        records: &[usize],
    ) -> Result<(), DocumentError> {
        let core = ready(self)?;
        if records.is_empty() {
            return Err(DocumentError::structural("a citation needs at least one record"));
        }
        let records = records
            .iter()
            .map(|i| core.link.ctx().citation(*i))
            .collect::<Result<Vec<_>, _>>()?;
        core.push(Inline::Citation {
            mode,
            sequence,
            records,
        });
        Ok(())
    }

    fn reference(&mut self, sequence: SequenceMode, labels: &[Label]) -> Result<(), DocumentError> {
        let core = ready(self)?;
        core.link.ctx().labels.check_known(labels)?;
        core.push(Inline::Reference {
            sequence,
            labels: labels.to_vec(),
        });
        Ok(())
    }

    fn allocate_styles(&mut self, kind: StyleKind, count: usize) -> Result<Vec<Style>, DocumentError> {
        let core = self.text_core();
        core.link.ensure_open()?;
        core.link.ctx().styles.allocate(kind, count)
    }
}

/// Scopes that can open a span set in a font or color.
pub trait Styleable {
    fn style(&mut self, style: Style) -> Result<ComplexText, DocumentError>;
}

impl<H: ComplexHost> Styleable for H {
    fn style(&mut self, style: Style) -> Result<ComplexText, DocumentError> {
        if style.kind() == StyleKind::Stroke {
            ready(self)?;
            return Err(DocumentError::structural(format!(
                "stroke style '{}' cannot be applied to text",
                style.name()
            )));
        }
        open_complex(self, move |children| Inline::Styled { style, children })
    }
}

/// A span of plain text: a title, caption, cell, author or wrapper.
pub struct PlainText {
    core: TextCore,
    outlet: Outlet<Vec<Inline>>,
}

impl PlainText {
    pub(crate) fn new(link: ScopeLink, outlet: Outlet<Vec<Inline>>) -> Self {
        Self {
            core: TextCore::new(link),
            outlet,
        }
    }

    pub fn close(&mut self) -> Result<(), DocumentError> {
        self.core.link.close_with(|| {
            let content = resolve_all(std::mem::take(&mut self.core.inlines));
            self.outlet.deliver(content);
            Ok(())
        })
    }
}

impl Sealed for PlainText {}

impl TextHost for PlainText {
    fn text_core(&mut self) -> &mut TextCore {
        &mut self.core
    }
}

impl PlainHost for PlainText {}

close_on_drop!(PlainText => core.link);

/// A rich text span: emphasis, sub/superscript or a styled run.
pub struct ComplexText {
    core: TextCore,
    outlet: Outlet<Vec<Inline>>,
}

impl ComplexText {
    pub(crate) fn new(link: ScopeLink, outlet: Outlet<Vec<Inline>>) -> Self {
        Self {
            core: TextCore::new(link),
            outlet,
        }
    }

    pub fn close(&mut self) -> Result<(), DocumentError> {
        self.core.link.close_with(|| {
            let content = resolve_all(std::mem::take(&mut self.core.inlines));
            self.outlet.deliver(content);
            Ok(())
        })
    }
}

impl Sealed for ComplexText {}

impl TextHost for ComplexText {
    fn text_core(&mut self) -> &mut TextCore {
        &mut self.core
    }
}

impl PlainHost for ComplexText {}
impl ComplexHost for ComplexText {}

close_on_drop!(ComplexText => core.link);

/// Paragraphs plus block elements, shared by section bodies and list items.
pub(crate) struct BlockContent {
    pub(crate) text: TextCore,
    pub(crate) blocks: Vec<Slot<BodyNode>>,
}

impl BlockContent {
    pub(crate) fn new(link: ScopeLink) -> Self {
        Self {
            text: TextCore::new(link),
            blocks: Vec::new(),
        }
    }

    pub(crate) fn link(&self) -> &ScopeLink {
        &self.text.link
    }

    /// Moves the running paragraph, if any, into the block list.
    pub(crate) fn flush_paragraph(&mut self) {
        if !self.text.is_empty() {
            let paragraph = self.text.take();
            if !paragraph.is_empty() {
                self.blocks.push(Slot::Ready(BodyNode::Paragraph(paragraph)));
            }
        }
    }

    /// Ends the running paragraph and opens a block child.
    pub(crate) fn open_block<T: 'static>(
        &mut self,
        kind: ScopeKind,
        map: impl FnOnce(T) -> BodyNode + Send + 'static,
    ) -> Result<(ScopeLink, Outlet<T>), DocumentError> {
        self.text.link.ensure_mutable()?;
        self.flush_paragraph();
        let link = self.text.link.child(kind)?;
        Ok((link, reserve(&mut self.blocks, map)))
    }

    pub(crate) fn close(&mut self) -> Result<Vec<BodyNode>, DocumentError> {
        self.text.link.close()?;
        self.flush_paragraph();
        Ok(resolve_all(std::mem::take(&mut self.blocks)))
    }
}
