//! Collaborator contracts for the folio engine.
//!
//! ## Traits
//!
//! - [`Executor`] - Abstracts parallel execution (inline or a worker pool)
//! - [`StyleProvider`] - Finite pool of fonts, colors and strokes
//! - [`Bibliography`] - Records that citations refer to
//! - [`Canvas`] - Vector drawing surface for figure bodies
//!
//! Each trait except `Canvas` ships an in-memory default that works in
//! any environment.

pub mod bibliography;
pub mod canvas;
pub mod executor;
pub mod style;

pub use bibliography::{BibRecord, Bibliography, InMemoryBibliography};
pub use canvas::Canvas;
pub use executor::{Executor, ExecutorError, HelpFn, HelpOutcome, SyncExecutor, TaskHandle, run_caught};
pub use style::{InMemoryStylePalette, ResourceError, StyleProvider};
