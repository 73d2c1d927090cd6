//! # folio
//!
//! Builds structured reports once and renders them as LaTeX or XHTML.
//!
//! ```ignore
//! use folio::{DocumentBuilder, DocumentFormat, LabelRequest, SectionContainer, TextOutput};
//!
//! let mut doc = DocumentBuilder::new().format(DocumentFormat::Xhtml).workers(4).build()?;
//! let mut body = doc.body()?;
//! body.section(LabelRequest::Auto, |section| {
//!     let mut text = section.body()?;
//!     text.append("Hello")?;
//!     text.close()
//! })?;
//! body.close()?;
//! let output = doc.close()?;
//! ```

pub mod builder;
pub mod error;
pub mod random;

pub use builder::{DocumentBuilder, DocumentFormat};
pub use error::FolioError;
pub use random::{GeneratorConfig, RandomDocument};

pub use folio_core::*;
pub use folio_idf as idf;
pub use folio_render_core::{DirectorySink, MemorySink, OutputSink, RenderDriver, RenderError};
pub use folio_render_html::HtmlDriver;
pub use folio_render_latex::LatexDriver;
pub use folio_traits::{
    BibRecord, Bibliography, Canvas, InMemoryBibliography, InMemoryStylePalette, StyleProvider,
};
pub use folio_types::{Color, Label, Point, Rect};
