//! SVG serialization of recorded figure drawings.

use crate::error::RenderError;
use folio_idf::{DrawOp, FigureNode};
use folio_types::{Color, Point, StrokeStyle};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Relative path of the SVG unit for a figure.
pub fn svg_unit_path(figure: &FigureNode) -> String {
    format!("{}.svg", figure.path)
}

pub(crate) fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), RenderError> {
    writer
        .write_event(event)
        .map_err(|e| RenderError::Markup(e.to_string()))
}

fn fmt_num(v: f32) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

fn fmt_points(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", fmt_num(p.x), fmt_num(p.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

struct PaintState {
    color: Color,
    stroke: StrokeStyle,
    transform: Vec<String>,
}

impl PaintState {
    fn decorate(&self, el: &mut BytesStart<'_>, stroked: bool) {
        let color = self.color.to_hex();
        if stroked {
            el.push_attribute(("fill", "none"));
            el.push_attribute(("stroke", color.as_str()));
            el.push_attribute(("stroke-width", fmt_num(self.stroke.width).as_str()));
            if !self.stroke.dash.is_empty() {
                let dash: Vec<String> = self.stroke.dash.iter().map(|d| fmt_num(*d)).collect();
                el.push_attribute(("stroke-dasharray", dash.join(" ").as_str()));
            }
        } else {
            el.push_attribute(("fill", color.as_str()));
        }
        if !self.transform.is_empty() {
            el.push_attribute(("transform", self.transform.join(" ").as_str()));
        }
    }
}

/// Serializes a figure's drawing as a standalone SVG document sized in millimetres.
pub fn render_svg(figure: &FigureNode) -> Result<Vec<u8>, RenderError> {
    let bounds = figure.drawing.bounds;
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let width = format!("{}mm", fmt_num(bounds.width));
    let height = format!("{}mm", fmt_num(bounds.height));
    let view_box = format!(
        "{} {} {} {}",
        fmt_num(bounds.x),
        fmt_num(bounds.y),
        fmt_num(bounds.width),
        fmt_num(bounds.height)
    );
    let mut root = BytesStart::new("svg");
    root.push_attribute(("xmlns", SVG_NS));
    root.push_attribute(("width", width.as_str()));
    root.push_attribute(("height", height.as_str()));
    root.push_attribute(("viewBox", view_box.as_str()));
    emit(&mut writer, Event::Start(root))?;

    let mut state = PaintState {
        color: Color::BLACK,
        stroke: StrokeStyle::solid("default", 0.3),
        transform: Vec::new(),
    };

    for op in &figure.drawing.ops {
        match op {
            DrawOp::SetColor(c) => state.color = c.clone(),
            DrawOp::SetStroke(s) => state.stroke = s.clone(),
            DrawOp::Translate { dx, dy } => state
                .transform
                .push(format!("translate({} {})", fmt_num(*dx), fmt_num(*dy))),
            DrawOp::Scale { sx, sy } => state
                .transform
                .push(format!("scale({} {})", fmt_num(*sx), fmt_num(*sy))),
            DrawOp::Rotate(deg) => state.transform.push(format!("rotate({})", fmt_num(*deg))),
            DrawOp::Line { from, to } => {
                let mut el = BytesStart::new("line");
                el.push_attribute(("x1", fmt_num(from.x).as_str()));
                el.push_attribute(("y1", fmt_num(from.y).as_str()));
                el.push_attribute(("x2", fmt_num(to.x).as_str()));
                el.push_attribute(("y2", fmt_num(to.y).as_str()));
                state.decorate(&mut el, true);
                emit(&mut writer, Event::Empty(el))?;
            }
            DrawOp::StrokeRect(r) | DrawOp::FillRect(r) => {
                let mut el = BytesStart::new("rect");
                el.push_attribute(("x", fmt_num(r.x).as_str()));
                el.push_attribute(("y", fmt_num(r.y).as_str()));
                el.push_attribute(("width", fmt_num(r.width).as_str()));
                el.push_attribute(("height", fmt_num(r.height).as_str()));
                state.decorate(&mut el, matches!(op, DrawOp::StrokeRect(_)));
                emit(&mut writer, Event::Empty(el))?;
            }
            DrawOp::Polyline(points) => {
                let mut el = BytesStart::new("polyline");
                el.push_attribute(("points", fmt_points(points).as_str()));
                state.decorate(&mut el, true);
                emit(&mut writer, Event::Empty(el))?;
            }
            DrawOp::FillPolygon(points) => {
                let mut el = BytesStart::new("polygon");
                el.push_attribute(("points", fmt_points(points).as_str()));
                state.decorate(&mut el, false);
                emit(&mut writer, Event::Empty(el))?;
            }
            DrawOp::Text { at, text } => {
                let mut el = BytesStart::new("text");
                el.push_attribute(("x", fmt_num(at.x).as_str()));
                el.push_attribute(("y", fmt_num(at.y).as_str()));
                el.push_attribute(("font-size", "3"));
                state.decorate(&mut el, false);
                emit(&mut writer, Event::Start(el))?;
                emit(&mut writer, Event::Text(BytesText::new(text)))?;
                emit(&mut writer, Event::End(BytesEnd::new("text")))?;
            }
        }
    }

    emit(&mut writer, Event::End(BytesEnd::new("svg")))?;
    Ok(writer.into_inner())
}
