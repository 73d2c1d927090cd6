//! Core rendering abstractions for folio backends.
//!
//! This crate provides the contract every output format implements:
//! - `RenderDriver` / `ElementRenderer` traits driven by the core tree walker
//! - `OutputSink` destinations for the produced units
//! - Error types for rendering operations
//! - Shared writers (SVG figures) and reference/citation text helpers

mod driver;
mod error;
mod sink;
pub mod svg;
pub mod utils;

pub use driver::{DocumentPart, ElementRenderer, RenderContext, RenderDriver};
pub use error::RenderError;
pub use sink::{DirectorySink, MemorySink, OutputSink};
