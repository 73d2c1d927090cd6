//! Figures, figure series and the recording canvas behind figure bodies.

use crate::Labelable;
use crate::error::DocumentError;
use crate::scope::{ScopeKind, ScopeLink, close_on_drop};
use crate::slot::{Outlet, Slot, reserve, resolve_all, take_cell};
use crate::text::PlainText;
use folio_idf::{DrawOp, Drawing, FigureNode, FigureSeriesNode, Inline};
use folio_traits::Canvas;
use folio_types::{
    Color, FigureSize, Label, LabelKind, LabelRequest, Point, Rect, StrokeStyle, Style, StyleKind,
};
use log::debug;
use std::sync::{Arc, OnceLock};

/// A [`Canvas`] that records every call as a [`DrawOp`].
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    bounds: Rect,
    ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_drawing(self) -> Drawing {
        Drawing {
            bounds: self.bounds,
            ops: self.ops,
        }
    }
}

impl Canvas for RecordingCanvas {
    fn set_color(&mut self, color: Color) {
        self.ops.push(DrawOp::SetColor(color));
    }

    fn set_stroke(&mut self, stroke: StrokeStyle) {
        self.ops.push(DrawOp::SetStroke(stroke));
    }

    fn line(&mut self, from: Point, to: Point) {
        self.ops.push(DrawOp::Line { from, to });
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::StrokeRect(rect));
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::FillRect(rect));
    }

    fn polyline(&mut self, points: &[Point]) {
        self.ops.push(DrawOp::Polyline(points.to_vec()));
    }

    fn fill_polygon(&mut self, points: &[Point]) {
        self.ops.push(DrawOp::FillPolygon(points.to_vec()));
    }

    fn text(&mut self, at: Point, text: &str) {
        self.ops.push(DrawOp::Text {
            at,
            text: text.to_string(),
        });
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.ops.push(DrawOp::Translate { dx, dy });
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.ops.push(DrawOp::Scale { sx, sy });
    }

    fn rotate(&mut self, degrees: f32) {
        self.ops.push(DrawOp::Rotate(degrees));
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }
}

pub struct Figure {
    link: ScopeLink,
    label: Option<Label>,
    size: FigureSize,
    path: String,
    caption: Option<Arc<OnceLock<Vec<Inline>>>>,
    drawing: Option<Arc<OnceLock<Drawing>>>,
    outlet: Outlet<FigureNode>,
}

impl Figure {
    /// Takes the next figure number for the path. The label is already bound.
    pub(crate) fn open(
        link: ScopeLink,
        label: Option<Label>,
        size: FigureSize,
        suggestion: &str,
        outlet: Outlet<FigureNode>,
    ) -> Self {
        let path = link.ctx().next_figure_path(suggestion);
        debug!("Figure '{}' reserved", path);
        Self {
            link,
            label,
            size,
            path,
            caption: None,
            drawing: None,
            outlet,
        }
    }

    /// Output path without extension, e.g. `figures/results-3`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn size(&self) -> FigureSize {
        self.size
    }

    pub fn caption(&mut self) -> Result<PlainText, DocumentError> {
        self.link.ensure_mutable()?;
        if self.caption.is_some() {
            return Err(DocumentError::structural("figure caption requested twice"));
        }
        let cell = Arc::new(OnceLock::new());
        let link = self.link.child(ScopeKind::PlainText)?;
        self.caption = Some(Arc::clone(&cell));
        Ok(PlainText::new(link, Outlet::new(cell, |c| c)))
    }

    /// Opens the drawing area.
    pub fn body(&mut self) -> Result<FigureBody, DocumentError> {
        self.link.ensure_mutable()?;
        if self.drawing.is_some() {
            return Err(DocumentError::structural("figure body requested twice"));
        }
        let cell = Arc::new(OnceLock::new());
        let link = self.link.child(ScopeKind::FigureBody)?;
        self.drawing = Some(Arc::clone(&cell));
        let bounds = Rect::from_size(self.size.size_mm());
        Ok(FigureBody {
            link,
            canvas: RecordingCanvas::new(bounds),
            outlet: Outlet::new(cell, |d| d),
        })
    }

    pub fn close(&mut self) -> Result<(), DocumentError> {
        let size = self.size;
        self.link.close_with(|| {
            let drawing = self
                .drawing
                .take()
                .and_then(take_cell)
                .unwrap_or_else(|| Drawing {
                    bounds: Rect::from_size(size.size_mm()),
                    ops: Vec::new(),
                });
            self.outlet.deliver(FigureNode {
                label: self.label,
                size,
                path: std::mem::take(&mut self.path),
                caption: self.caption.take().and_then(take_cell).unwrap_or_default(),
                drawing,
            });
            Ok(())
        })
    }
}

impl Labelable for Figure {
    fn label(&self) -> Option<Label> {
        self.label
    }
}

close_on_drop!(Figure => link);

/// Drawing area of a figure.
pub struct FigureBody {
    link: ScopeLink,
    canvas: RecordingCanvas,
    outlet: Outlet<Drawing>,
}

impl FigureBody {
    pub fn canvas(&mut self) -> Result<&mut RecordingCanvas, DocumentError> {
        self.link.ensure_open()?;
        Ok(&mut self.canvas)
    }

    pub fn allocate_styles(&mut self, kind: StyleKind, count: usize) -> Result<Vec<Style>, DocumentError> {
        self.link.ensure_open()?;
        self.link.ctx().styles.allocate(kind, count)
    }

    pub fn default_stroke(&self) -> StrokeStyle {
        self.link.ctx().styles.default_stroke()
    }

    pub fn thin_stroke(&self) -> StrokeStyle {
        self.link.ctx().styles.thin_stroke()
    }

    pub fn thick_stroke(&self) -> StrokeStyle {
        self.link.ctx().styles.thick_stroke()
    }

    pub fn default_color(&self) -> Color {
        self.link.ctx().styles.default_color().color
    }

    pub fn close(&mut self) -> Result<(), DocumentError> {
        self.link.close_with(|| {
            let canvas = std::mem::take(&mut self.canvas);
            self.outlet.deliver(canvas.into_drawing());
            Ok(())
        })
    }
}

close_on_drop!(FigureBody => link);

/// Sub-figures sharing one caption and size class.
pub struct FigureSeries {
    link: ScopeLink,
    label: Option<Label>,
    size: FigureSize,
    path: String,
    caption: Option<Arc<OnceLock<Vec<Inline>>>>,
    figures: Vec<Slot<FigureNode>>,
    outlet: Outlet<FigureSeriesNode>,
}

impl FigureSeries {
    pub(crate) fn open(
        link: ScopeLink,
        label: Option<Label>,
        size: FigureSize,
        suggestion: &str,
        outlet: Outlet<FigureSeriesNode>,
    ) -> Self {
        let path = link.ctx().next_figure_path(suggestion);
        Self {
            link,
            label,
            size,
            path,
            caption: None,
            figures: Vec::new(),
            outlet,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn caption(&mut self) -> Result<PlainText, DocumentError> {
        self.link.ensure_mutable()?;
        if self.caption.is_some() {
            return Err(DocumentError::structural("series caption requested twice"));
        }
        let cell = Arc::new(OnceLock::new());
        let link = self.link.child(ScopeKind::PlainText)?;
        self.caption = Some(Arc::clone(&cell));
        Ok(PlainText::new(link, Outlet::new(cell, |c| c)))
    }

    /// Adds a sub-figure of the series' size class.
    pub fn figure(
        &mut self,
        label: impl Into<LabelRequest>,
        suggestion: &str,
    ) -> Result<Figure, DocumentError> {
        self.link.ensure_mutable()?;
        let label = self
            .link
            .ctx()
            .labels
            .consume(label.into(), LabelKind::SubFigure)?;
        let link = self.link.child(ScopeKind::Figure)?;
        let outlet = reserve(&mut self.figures, |f| f);
        Ok(Figure::open(link, label, self.size, suggestion, outlet))
    }

    pub fn close(&mut self) -> Result<(), DocumentError> {
        let size = self.size;
        self.link.close_with(|| {
            let figures = resolve_all(std::mem::take(&mut self.figures));
            debug!("Figure series '{}' holds {} figure(s)", self.path, figures.len());
            self.outlet.deliver(FigureSeriesNode {
                label: self.label,
                size,
                path: std::mem::take(&mut self.path),
                caption: self.caption.take().and_then(take_cell).unwrap_or_default(),
                figures,
            });
            Ok(())
        })
    }
}

impl Labelable for FigureSeries {
    fn label(&self) -> Option<Label> {
        self.label
    }
}

close_on_drop!(FigureSeries => link);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::section::SectionContainer;
    use crate::text::TextOutput;
    use crate::testing::{document, environment};
    use folio_idf::BodyNode;
    use std::collections::HashSet;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_recording_canvas_keeps_call_order() {
        let mut canvas = RecordingCanvas::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        canvas.set_color(Color::gray(0));
        canvas.line(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        canvas.rotate(90.0);
        assert_eq!(canvas.ops().len(), 3);
        assert!(matches!(canvas.ops()[2], DrawOp::Rotate(_)));
        let drawing = canvas.into_drawing();
        assert_eq!(drawing.bounds.width, 10.0);
    }

    #[test]
    fn test_parallel_figures_get_distinct_paths() -> TestResult {
        let mut doc = Document::new(environment(4))?;
        let mut body = doc.body()?;
        for _ in 0..12 {
            body.section(LabelRequest::None, |section| {
                let mut content = section.body()?;
                for _ in 0..3 {
                    content
                        .figure(LabelRequest::Auto, FigureSize::ColumnHalf, "Plot")?
                        .close()?;
                }
                let mut series = content.figure_series(LabelRequest::None, FigureSize::PageFull, "Plot")?;
                series.figure(LabelRequest::None, "Plot")?.close()?;
                series.figure(LabelRequest::None, "Plot")?.close()?;
                series.close()?;
                content.close()
            })?;
        }
        body.close()?;
        let output = doc.close()?;

        let mut paths = Vec::new();
        for block in output.tree.all_blocks() {
            match block {
                BodyNode::Figure(figure) => paths.push(figure.path.clone()),
                BodyNode::FigureSeries(series) => {
                    paths.push(series.path.clone());
                    paths.extend(series.figures.iter().map(|f| f.path.clone()));
                }
                _ => {}
            }
        }
        assert_eq!(paths.len(), 12 * 6);
        assert!(paths.iter().all(|p| p.starts_with("figures/plot-")));
        let distinct: HashSet<&String> = paths.iter().collect();
        assert_eq!(distinct.len(), paths.len());
        Ok(())
    }

    #[test]
    fn test_series_letters_its_sub_figures() -> TestResult {
        let mut doc = document();
        let mut body = doc.body()?;
        let first = body.allocate_label(LabelKind::SubFigure)?;
        let series_label = body.allocate_label(LabelKind::Figure)?;
        body.section(LabelRequest::None, move |section| {
            let mut content = section.body()?;
            content.figure(LabelRequest::None, FigureSize::ColumnFull, "lead")?.close()?;
            content.figure(LabelRequest::None, FigureSize::ColumnFull, "second")?.close()?;
            let mut series = content.figure_series(series_label, FigureSize::ColumnHalf, "runs")?;
            let mut caption = series.caption()?;
            caption.append("Runs")?;
            caption.close()?;
            let mut left = series.figure(first, "left")?;
            assert_eq!(left.label(), Some(first));
            left.close()?;
            let mut right = series.figure(LabelRequest::Auto, "right")?;
            let auto = right.label().ok_or_else(|| DocumentError::label("sub-figure unlabeled"))?;
            assert_eq!(auto.kind(), LabelKind::SubFigure);
            right.close()?;
            series.close()?;
            content.close()
        })?;
        body.close()?;
        let output = doc.close()?;

        let series = output
            .tree
            .all_blocks()
            .into_iter()
            .find_map(|n| match n {
                BodyNode::FigureSeries(s) => Some(s.clone()),
                _ => None,
            })
            .ok_or("no series")?;
        assert_eq!(series.figures.len(), 2);
        assert!(series.figures.iter().all(|f| f.size == FigureSize::ColumnHalf));
        assert_eq!(output.labels.get(&series_label).ok_or("series unresolved")?.number, "3");
        let resolved = output.labels.get(&first).ok_or("sub-figure unresolved")?;
        assert_eq!(resolved.number, "3a");
        assert_eq!(resolved.kind, LabelKind::SubFigure);
        let second = series.figures[1].label.ok_or("second sub-figure unlabeled")?;
        assert_eq!(output.labels.get(&second).ok_or("unresolved")?.number, "3b");
        Ok(())
    }
}
