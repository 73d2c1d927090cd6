//! Label identities for cross-references.
//!
//! A [`Label`] is a cheap, copyable handle. It carries the id of the
//! document that issued it, so a label can never be bound or referenced
//! in a document other than its own. Binding state lives in the owning
//! document's registry, not in the label itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_DOCUMENT_ID: AtomicU32 = AtomicU32::new(1);

/// Identifies one document instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(u32);

impl DocumentId {
    /// Issues a process-wide unique document id.
    pub fn next() -> Self {
        Self(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// The kind of element a label marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelKind {
    Section,
    Table,
    Figure,
    SubFigure,
    Equation,
    Code,
    /// Wildcard: binds to whichever element consumes it.
    Auto,
}

impl LabelKind {
    pub const ALL: [LabelKind; 7] = [
        LabelKind::Section,
        LabelKind::Table,
        LabelKind::Figure,
        LabelKind::SubFigure,
        LabelKind::Equation,
        LabelKind::Code,
        LabelKind::Auto,
    ];

    /// Short prefix used when building anchor names.
    pub fn prefix(self) -> &'static str {
        match self {
            LabelKind::Section => "sec",
            LabelKind::Table => "tab",
            LabelKind::Figure => "fig",
            LabelKind::SubFigure => "subfig",
            LabelKind::Equation => "eq",
            LabelKind::Code => "code",
            LabelKind::Auto => "lbl",
        }
    }

    /// The word used in running text for a reference to this kind.
    pub fn display_name(self) -> &'static str {
        match self {
            LabelKind::Section => "Section",
            LabelKind::Table => "Table",
            LabelKind::Figure | LabelKind::SubFigure => "Figure",
            LabelKind::Equation => "Equation",
            LabelKind::Code => "Listing",
            LabelKind::Auto => "Item",
        }
    }

    /// Whether a label allocated with `self` may be bound by an element of `element`.
    pub fn accepts(self, element: LabelKind) -> bool {
        self == LabelKind::Auto || self == element
    }
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// An identifier for a document element, usable before the element exists.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Label {
    document: DocumentId,
    index: u32,
    kind: LabelKind,
}

impl Label {
    /// Creates a label handle. Only label registries should call this.
    pub fn new(document: DocumentId, index: u32, kind: LabelKind) -> Self {
        Self {
            document,
            index,
            kind,
        }
    }

    pub fn document(&self) -> DocumentId {
        self.document
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// The kind this label was allocated with.
    pub fn kind(&self) -> LabelKind {
        self.kind
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.prefix(), self.index)
    }
}

/// How an element that can be labeled should obtain its label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LabelRequest {
    /// The element is not labeled.
    #[default]
    None,
    /// Mint and bind a fresh label of the element's kind.
    Auto,
    /// Consume a previously allocated label.
    Use(Label),
}

impl From<Label> for LabelRequest {
    fn from(label: Label) -> Self {
        LabelRequest::Use(label)
    }
}

impl From<Option<Label>> for LabelRequest {
    fn from(label: Option<Label>) -> Self {
        label.map_or(LabelRequest::None, LabelRequest::Use)
    }
}
