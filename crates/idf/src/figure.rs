use crate::Inline;
use folio_types::{Color, FigureSize, Label, Point, Rect, StrokeStyle};

/// One recorded canvas call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    SetColor(Color),
    SetStroke(StrokeStyle),
    Line { from: Point, to: Point },
    StrokeRect(Rect),
    FillRect(Rect),
    Polyline(Vec<Point>),
    FillPolygon(Vec<Point>),
    Text { at: Point, text: String },
    Translate { dx: f32, dy: f32 },
    Scale { sx: f32, sy: f32 },
    Rotate(f32),
}

/// A figure body: the drawing area and everything painted on it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Drawing {
    pub bounds: Rect,
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FigureNode {
    pub label: Option<Label>,
    pub size: FigureSize,
    /// Output path without extension, e.g. `figures/throughput-3`.
    pub path: String,
    pub caption: Vec<Inline>,
    pub drawing: Drawing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FigureSeriesNode {
    pub label: Option<Label>,
    pub size: FigureSize,
    pub path: String,
    pub caption: Vec<Inline>,
    pub figures: Vec<FigureNode>,
}
