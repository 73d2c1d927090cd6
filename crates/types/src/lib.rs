pub mod color;
pub mod geometry;
pub mod kinds;
pub mod label;
pub mod style;

pub use color::Color;
pub use geometry::{Point, Rect, Size};
pub use kinds::{CellDef, CitationMode, Comparison, FigureSize, SequenceMode};
pub use label::{DocumentId, Label, LabelKind, LabelRequest};
pub use style::{ColorStyle, FontFamily, FontStyle, StrokeStyle, Style, StyleKind};
