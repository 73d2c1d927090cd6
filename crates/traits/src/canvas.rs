//! Vector drawing surface contract used by figure bodies.

use folio_types::{Color, Point, Rect, StrokeStyle};

/// A 2-D drawing surface.
///
/// Coordinates are in millimetres with the origin at the top-left corner.
/// Transformations compose with the current transform.
pub trait Canvas {
    fn set_color(&mut self, color: Color);

    fn set_stroke(&mut self, stroke: StrokeStyle);

    fn line(&mut self, from: Point, to: Point);

    fn stroke_rect(&mut self, rect: Rect);

    fn fill_rect(&mut self, rect: Rect);

    fn polyline(&mut self, points: &[Point]);

    fn fill_polygon(&mut self, points: &[Point]);

    fn text(&mut self, at: Point, text: &str);

    fn translate(&mut self, dx: f32, dy: f32);

    fn scale(&mut self, sx: f32, sy: f32);

    /// Rotates by `degrees`, clockwise.
    fn rotate(&mut self, degrees: f32);

    /// The drawable area.
    fn bounds(&self) -> Rect;
}
