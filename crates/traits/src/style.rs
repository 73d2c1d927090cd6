//! StyleProvider trait for abstracting the style resource pool.
//!
//! Documents draw fonts, colors and strokes from a finite pool so that
//! figures and styled text spans get distinguishable styles. The pool is
//! an external collaborator; [`InMemoryStylePalette`] is the default.

use folio_types::{Color, ColorStyle, FontFamily, FontStyle, StrokeStyle, Style, StyleKind};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::RwLock;
use thiserror::Error;

/// Error type for collaborator lookups and allocations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    #[error("Style pool exhausted: requested {requested} {kind:?} style(s), {available} available")]
    Exhausted {
        kind: StyleKind,
        requested: usize,
        available: usize,
    },

    #[error("Bibliography has no record at index {0}")]
    MissingRecord(usize),

    #[error("Resource store lock poisoned: {0}")]
    Poisoned(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ResourceError {
    fn from(err: std::io::Error) -> Self {
        ResourceError::Io(err.to_string())
    }
}

/// A pool of styles a document can allocate from.
///
/// Allocation hands out distinct styles; the `default_*` accessors return
/// shared styles that are never exhausted.
pub trait StyleProvider: Send + Sync + Debug {
    /// Allocate `count` distinct styles of `kind`.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::Exhausted` if fewer than `count` remain.
    fn allocate(&self, kind: StyleKind, count: usize) -> Result<Vec<Style>, ResourceError>;

    fn default_font(&self) -> FontStyle;

    fn emphasis_font(&self) -> FontStyle;

    fn code_font(&self) -> FontStyle;

    fn default_color(&self) -> ColorStyle;

    fn default_stroke(&self) -> StrokeStyle;

    fn thin_stroke(&self) -> StrokeStyle;

    fn thick_stroke(&self) -> StrokeStyle;

    /// Returns a human-readable name for this provider (for logging/debugging).
    fn name(&self) -> &'static str;
}

#[derive(Debug, Default)]
struct Pool {
    styles: Vec<Style>,
    next: usize,
}

/// An in-memory style pool.
///
/// `new()` is pre-populated with a small palette; `empty()` starts with
/// nothing so callers can add exactly what they need.
#[derive(Debug)]
pub struct InMemoryStylePalette {
    pools: RwLock<HashMap<StyleKind, Pool>>,
}

impl Default for InMemoryStylePalette {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStylePalette {
    pub fn new() -> Self {
        let palette = Self::empty();
        let colors = [
            ("blue", Color::rgb(31, 119, 180)),
            ("orange", Color::rgb(255, 127, 14)),
            ("green", Color::rgb(44, 160, 44)),
            ("red", Color::rgb(214, 39, 40)),
            ("purple", Color::rgb(148, 103, 189)),
            ("brown", Color::rgb(140, 86, 75)),
            ("pink", Color::rgb(227, 119, 194)),
            ("gray", Color::gray(127)),
            ("olive", Color::rgb(188, 189, 34)),
            ("cyan", Color::rgb(23, 190, 207)),
        ];
        let fonts = [
            FontStyle::new("serif", FontFamily::Serif, 10.0),
            FontStyle::new("serif-bold", FontFamily::Serif, 10.0).bold(),
            FontStyle::new("serif-italic", FontFamily::Serif, 10.0).italic(),
            FontStyle::new("sans", FontFamily::SansSerif, 10.0),
            FontStyle::new("sans-bold", FontFamily::SansSerif, 10.0).bold(),
            FontStyle::new("mono", FontFamily::Monospace, 9.0),
        ];
        let strokes = [
            StrokeStyle::solid("solid", 1.0),
            StrokeStyle::dashed("dashed", 1.0, vec![4.0, 2.0]),
            StrokeStyle::dashed("dotted", 1.0, vec![1.0, 2.0]),
            StrokeStyle::dashed("dash-dot", 1.0, vec![4.0, 2.0, 1.0, 2.0]),
        ];
        if let Ok(mut pools) = palette.pools.write() {
            let color_pool = pools.entry(StyleKind::Color).or_default();
            color_pool
                .styles
                .extend(colors.into_iter().map(|(n, c)| ColorStyle::new(n, c).into()));
            let font_pool = pools.entry(StyleKind::Font).or_default();
            font_pool.styles.extend(fonts.into_iter().map(Style::from));
            let stroke_pool = pools.entry(StyleKind::Stroke).or_default();
            stroke_pool.styles.extend(strokes.into_iter().map(Style::from));
        }
        palette
    }

    pub fn empty() -> Self {
        Self {
            pools: RwLock::new(HashMap::new()),
        }
    }

    /// Add a style to the pool of its kind.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::Poisoned` if the internal lock is poisoned.
    pub fn add(&self, style: impl Into<Style>) -> Result<(), ResourceError> {
        let style = style.into();
        let mut pools = self
            .pools
            .write()
            .map_err(|_| ResourceError::Poisoned(style.name().to_string()))?;
        pools.entry(style.kind()).or_default().styles.push(style);
        Ok(())
    }

    /// Number of styles of `kind` not yet allocated.
    ///
    /// Returns 0 if the lock is poisoned.
    pub fn remaining(&self, kind: StyleKind) -> usize {
        self.pools
            .read()
            .map(|p| p.get(&kind).map_or(0, |pool| pool.styles.len() - pool.next))
            .unwrap_or(0)
    }
}

impl StyleProvider for InMemoryStylePalette {
    fn allocate(&self, kind: StyleKind, count: usize) -> Result<Vec<Style>, ResourceError> {
        let mut pools = self
            .pools
            .write()
            .map_err(|_| ResourceError::Poisoned(format!("{:?} pool", kind)))?;
        let pool = pools.entry(kind).or_default();
        let available = pool.styles.len() - pool.next;
        if count > available {
            return Err(ResourceError::Exhausted {
                kind,
                requested: count,
                available,
            });
        }
        let start = pool.next;
        pool.next += count;
        Ok(pool.styles[start..pool.next].to_vec())
    }

    fn default_font(&self) -> FontStyle {
        FontStyle::new("serif", FontFamily::Serif, 10.0)
    }

    fn emphasis_font(&self) -> FontStyle {
        FontStyle::new("serif-italic", FontFamily::Serif, 10.0).italic()
    }

    fn code_font(&self) -> FontStyle {
        FontStyle::new("mono", FontFamily::Monospace, 9.0)
    }

    fn default_color(&self) -> ColorStyle {
        ColorStyle::new("black", Color::BLACK)
    }

    fn default_stroke(&self) -> StrokeStyle {
        StrokeStyle::solid("default", 1.0)
    }

    fn thin_stroke(&self) -> StrokeStyle {
        StrokeStyle::solid("thin", 0.5)
    }

    fn thick_stroke(&self) -> StrokeStyle {
        StrokeStyle::solid("thick", 2.0)
    }

    fn name(&self) -> &'static str {
        "InMemoryStylePalette"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_allocates_distinct_styles() {
        let palette = InMemoryStylePalette::new();
        let first = palette.allocate(StyleKind::Color, 2).unwrap();
        let second = palette.allocate(StyleKind::Color, 2).unwrap();
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|s| !second.contains(s)));
        assert!(first.iter().all(|s| s.kind() == StyleKind::Color));
    }

    #[test]
    fn test_palette_exhaustion() {
        let palette = InMemoryStylePalette::empty();
        palette.add(StrokeStyle::solid("only", 1.0)).unwrap();

        let result = palette.allocate(StyleKind::Stroke, 2);
        assert_eq!(
            result,
            Err(ResourceError::Exhausted {
                kind: StyleKind::Stroke,
                requested: 2,
                available: 1,
            })
        );
        // A failed request does not consume anything.
        assert_eq!(palette.remaining(StyleKind::Stroke), 1);
        assert!(palette.allocate(StyleKind::Stroke, 1).is_ok());
        assert_eq!(palette.remaining(StyleKind::Stroke), 0);
    }

    #[test]
    fn test_palette_zero_request_always_succeeds() {
        let palette = InMemoryStylePalette::empty();
        assert_eq!(palette.allocate(StyleKind::Font, 0).unwrap(), vec![]);
    }

    #[test]
    fn test_default_styles() {
        let palette = InMemoryStylePalette::new();
        assert!(palette.emphasis_font().italic);
        assert_eq!(palette.code_font().family, FontFamily::Monospace);
        assert!(palette.thin_stroke().width < palette.thick_stroke().width);
        assert_eq!(palette.default_color().color, Color::BLACK);
        assert_eq!(palette.name(), "InMemoryStylePalette");
    }

    #[test]
    fn test_resource_error_display() {
        let err = ResourceError::MissingRecord(12);
        assert!(err.to_string().contains("12"));

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ResourceError = io_err.into();
        assert!(matches!(err, ResourceError::Io(_)));
    }
}
