use crate::color::Color;
use serde::{Deserialize, Serialize};

/// The three families a style pool hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleKind {
    Font,
    Color,
    Stroke,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    Serif,
    SansSerif,
    Monospace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontStyle {
    pub name: String,
    pub family: FontFamily,
    pub size_pt: f32,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl FontStyle {
    pub fn new(name: impl Into<String>, family: FontFamily, size_pt: f32) -> Self {
        Self {
            name: name.into(),
            family,
            size_pt,
            bold: false,
            italic: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorStyle {
    pub name: String,
    pub color: Color,
}

impl ColorStyle {
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub name: String,
    pub width: f32,
    /// Dash pattern as alternating on/off lengths. Empty means solid.
    #[serde(default)]
    pub dash: Vec<f32>,
}

impl StrokeStyle {
    pub fn solid(name: impl Into<String>, width: f32) -> Self {
        Self {
            name: name.into(),
            width,
            dash: Vec::new(),
        }
    }

    pub fn dashed(name: impl Into<String>, width: f32, dash: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            width,
            dash,
        }
    }
}

/// A single style as handed out by a style pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Style {
    Font(FontStyle),
    Color(ColorStyle),
    Stroke(StrokeStyle),
}

impl Style {
    pub fn kind(&self) -> StyleKind {
        match self {
            Style::Font(_) => StyleKind::Font,
            Style::Color(_) => StyleKind::Color,
            Style::Stroke(_) => StyleKind::Stroke,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Style::Font(f) => &f.name,
            Style::Color(c) => &c.name,
            Style::Stroke(s) => &s.name,
        }
    }
}

impl From<FontStyle> for Style {
    fn from(value: FontStyle) -> Self {
        Style::Font(value)
    }
}

impl From<ColorStyle> for Style {
    fn from(value: ColorStyle) -> Self {
        Style::Color(value)
    }
}

impl From<StrokeStyle> for Style {
    fn from(value: StrokeStyle) -> Self {
        Style::Stroke(value)
    }
}
