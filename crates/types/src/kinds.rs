//! Small closed vocabularies shared by the builders and the drivers.

use crate::geometry::Size;
use serde::{Deserialize, Serialize};

/// How a list of items is joined in running text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SequenceMode {
    /// `a, b, c`
    Comma,
    /// `a, b, and c`
    And,
    /// `a, b, or c`
    Or,
    /// `either a or b`
    EitherOr,
    /// `neither a nor b`
    NeitherNor,
    /// `from a to c`
    FromTo,
    /// `a et al.` for three or more items, otherwise like [`SequenceMode::And`]
    EtAl,
}

impl SequenceMode {
    pub const ALL: [SequenceMode; 7] = [
        SequenceMode::Comma,
        SequenceMode::And,
        SequenceMode::Or,
        SequenceMode::EitherOr,
        SequenceMode::NeitherNor,
        SequenceMode::FromTo,
        SequenceMode::EtAl,
    ];

    /// Joins already-rendered items according to this mode.
    pub fn join<S: AsRef<str>>(self, items: &[S]) -> String {
        let items: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
        match (self, items.as_slice()) {
            (_, []) => String::new(),
            (_, [only]) => (*only).to_string(),
            (SequenceMode::Comma, all) => all.join(", "),
            (SequenceMode::And, all) => join_last(all, "and"),
            (SequenceMode::Or, all) => join_last(all, "or"),
            (SequenceMode::EitherOr, all) => format!("either {}", join_last(all, "or")),
            (SequenceMode::NeitherNor, all) => format!("neither {}", join_last(all, "nor")),
            (SequenceMode::FromTo, [first, .., last]) => format!("from {} to {}", first, last),
            (SequenceMode::EtAl, all) if all.len() > 2 => format!("{} et al.", all[0]),
            (SequenceMode::EtAl, all) => join_last(all, "and"),
        }
    }
}

fn join_last(items: &[&str], word: &str) -> String {
    match items {
        [a, b] => format!("{} {} {}", a, word, b),
        [init @ .., last] => format!("{}, {} {}", init.join(", "), word, last),
        [] => String::new(),
    }
}

/// What a citation prints for each cited record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CitationMode {
    Id,
    Authors,
    AuthorsAndId,
    Title,
}

impl CitationMode {
    pub const ALL: [CitationMode; 4] = [
        CitationMode::Id,
        CitationMode::Authors,
        CitationMode::AuthorsAndId,
        CitationMode::Title,
    ];
}

/// Relational operators for math comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Comparison {
    Less,
    LessOrEqual,
    Equal,
    NotEqual,
    GreaterOrEqual,
    Greater,
    Approximately,
}

impl Comparison {
    pub const ALL: [Comparison; 7] = [
        Comparison::Less,
        Comparison::LessOrEqual,
        Comparison::Equal,
        Comparison::NotEqual,
        Comparison::GreaterOrEqual,
        Comparison::Greater,
        Comparison::Approximately,
    ];

    /// The Unicode symbol for this relation.
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Less => "<",
            Comparison::LessOrEqual => "\u{2264}",
            Comparison::Equal => "=",
            Comparison::NotEqual => "\u{2260}",
            Comparison::GreaterOrEqual => "\u{2265}",
            Comparison::Greater => ">",
            Comparison::Approximately => "\u{2248}",
        }
    }
}

/// Size class of a figure relative to the page or the text column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FigureSize {
    PageFull,
    PageWide,
    PageHalf,
    PageThird,
    PageQuarter,
    ColumnFull,
    ColumnWide,
    ColumnHalf,
}

const PAGE_WIDTH_MM: f32 = 170.0;
const PAGE_HEIGHT_MM: f32 = 240.0;
const COLUMN_WIDTH_MM: f32 = 82.0;

impl FigureSize {
    pub const ALL: [FigureSize; 8] = [
        FigureSize::PageFull,
        FigureSize::PageWide,
        FigureSize::PageHalf,
        FigureSize::PageThird,
        FigureSize::PageQuarter,
        FigureSize::ColumnFull,
        FigureSize::ColumnWide,
        FigureSize::ColumnHalf,
    ];

    /// How many figures of this class fit side by side in a series.
    pub fn per_row(self) -> usize {
        match self {
            FigureSize::PageFull | FigureSize::PageWide => 1,
            FigureSize::PageHalf => 2,
            FigureSize::PageThird => 3,
            FigureSize::PageQuarter => 4,
            FigureSize::ColumnFull | FigureSize::ColumnWide => 1,
            FigureSize::ColumnHalf => 2,
        }
    }

    /// Whether the figure spans both columns of a two-column layout.
    pub fn spans_page(self) -> bool {
        !matches!(
            self,
            FigureSize::ColumnFull | FigureSize::ColumnWide | FigureSize::ColumnHalf
        )
    }

    /// Nominal drawing area in millimetres.
    pub fn size_mm(self) -> Size {
        match self {
            FigureSize::PageFull => Size::new(PAGE_WIDTH_MM, PAGE_HEIGHT_MM * 0.8),
            FigureSize::PageWide => Size::new(PAGE_WIDTH_MM, PAGE_WIDTH_MM * 0.5),
            FigureSize::PageHalf => Size::new(PAGE_WIDTH_MM / 2.0, PAGE_WIDTH_MM / 2.0),
            FigureSize::PageThird => Size::new(PAGE_WIDTH_MM / 3.0, PAGE_WIDTH_MM / 3.0),
            FigureSize::PageQuarter => Size::new(PAGE_WIDTH_MM / 4.0, PAGE_WIDTH_MM / 4.0),
            FigureSize::ColumnFull => Size::new(COLUMN_WIDTH_MM, COLUMN_WIDTH_MM),
            FigureSize::ColumnWide => Size::new(COLUMN_WIDTH_MM, COLUMN_WIDTH_MM * 0.6),
            FigureSize::ColumnHalf => Size::new(COLUMN_WIDTH_MM / 2.0, COLUMN_WIDTH_MM / 2.0),
        }
    }

    /// Width as a fraction of the text width, as used by `\includegraphics`.
    pub fn width_fraction(self) -> f32 {
        let width = self.size_mm().width;
        if self.spans_page() {
            width / PAGE_WIDTH_MM
        } else {
            width / COLUMN_WIDTH_MM
        }
    }
}

/// A table column definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellDef {
    Left,
    Center,
    Right,
    /// A vertical rule between columns. Occupies no grid position.
    Separator,
}

impl CellDef {
    /// Whether this definition describes a real column.
    pub fn is_pure(self) -> bool {
        self != CellDef::Separator
    }

    /// Number of pure columns in a definition list.
    pub fn count_pure(defs: &[CellDef]) -> usize {
        defs.iter().filter(|d| d.is_pure()).count()
    }

    pub fn latex_spec(self) -> &'static str {
        match self {
            CellDef::Left => "l",
            CellDef::Center => "c",
            CellDef::Right => "r",
            CellDef::Separator => "|",
        }
    }

    pub fn css_align(self) -> Option<&'static str> {
        match self {
            CellDef::Left => Some("left"),
            CellDef::Center => Some("center"),
            CellDef::Right => Some("right"),
            CellDef::Separator => None,
        }
    }
}
