//! LaTeX backend.
//!
//! Produces one `article` document per folio document, plus one SVG unit
//! per figure which the document includes through the `svg` package.

mod escape;
mod math;
mod renderer;

pub use escape::escape;
pub use math::math_to_latex;
pub use renderer::LatexDriver;
