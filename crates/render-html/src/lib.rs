//! XHTML backend.
//!
//! Writes the document as one or more XHTML units. Once a unit grows past
//! the split budget, the next top-level section starts a new unit
//! (`report.html`, `report_2.html`, ...). Units link to their neighbours,
//! and references into other units are patched once every unit is known.

mod markup;
mod mathml;
mod renderer;
mod units;

pub use renderer::HtmlDriver;
pub use units::unit_name;
