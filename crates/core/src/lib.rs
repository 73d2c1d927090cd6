//! # folio-core
//!
//! The document construction engine.
//!
//! A [`Document`] hands out builders for its header, body and footer.
//! Every builder owns one scope in a per-document scope tree: a scope
//! accepts content only while it is open and none of its children are,
//! and closing it hands the assembled node to the slot its parent
//! reserved for it. Sections are built by closures dispatched to the
//! configured executor, so sibling sections may be composed in parallel
//! while the finished tree always keeps declared order.
//!
//! Once the document closes, labels receive their final numbers and the
//! tree is walked through a [`folio_render_core::RenderDriver`].

pub mod code;
pub mod config;
mod context;
pub mod document;
pub mod error;
pub mod figure;
pub mod grid;
pub mod label;
pub mod list;
pub mod math;
pub mod numbering;
pub mod render;
pub mod scope;
pub mod section;
mod slot;
pub mod styles;
pub mod table;
pub mod text;
#[cfg(test)]
mod testing;

use folio_types::Label;

/// Elements that may carry a label.
pub trait Labelable {
    /// The bound label, if any.
    fn label(&self) -> Option<Label>;
}

pub use code::{Code, CodeBody};
pub use config::DocumentConfig;
pub use document::{
    Document, DocumentBody, DocumentEnvironment, DocumentFooter, DocumentOutput,
    FinishedListener, Header,
};
pub use error::{AggregatedError, DocumentError, ErrorCollector};
pub use figure::{Figure, FigureBody, FigureSeries, RecordingCanvas};
pub use grid::LayoutGrid;
pub use label::LabelRegistry;
pub use list::{List, ListItem};
pub use math::{Math, MathOp};
pub use render::render_tree;
pub use scope::{ScopeArena, ScopeId, ScopeKind, ScopeState};
pub use section::{Section, SectionBody, SectionContainer};
pub use styles::StyleFacade;
pub use table::{Table, TableRow, TableSection};
pub use text::{
    ComplexHost, ComplexText, ComplexTextOutput, PlainHost, PlainText, PlainTextOutput,
    Styleable, TextHost, TextOutput,
};

pub use folio_types::{
    CellDef, CitationMode, Comparison, FigureSize, LabelKind, LabelRequest, SequenceMode,
    StyleKind,
};
