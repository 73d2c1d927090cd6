use crate::Inline;
use folio_types::{CellDef, Label};

/// Which of the three optional row groups a table section is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TablePart {
    Header,
    Body,
    Footer,
}

impl TablePart {
    pub fn name(self) -> &'static str {
        match self {
            TablePart::Header => "header",
            TablePart::Body => "body",
            TablePart::Footer => "footer",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableNode {
    pub label: Option<Label>,
    /// Whether the table spans all columns of a multi-column page.
    pub spans_all_columns: bool,
    /// Column definitions, separators included.
    pub columns: Vec<CellDef>,
    pub caption: Vec<Inline>,
    pub header: Option<TableSectionNode>,
    pub body: Option<TableSectionNode>,
    pub footer: Option<TableSectionNode>,
}

impl TableNode {
    pub fn pure_columns(&self) -> usize {
        CellDef::count_pure(&self.columns)
    }

    /// The present sections in fixed header/body/footer order.
    pub fn parts(&self) -> impl Iterator<Item = &TableSectionNode> {
        [&self.header, &self.body, &self.footer]
            .into_iter()
            .filter_map(Option::as_ref)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSectionNode {
    pub part: TablePart,
    pub rows: Vec<TableRowNode>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableRowNode {
    /// Cells anchored in this row, left to right. Positions covered by a
    /// span from an earlier row or column have no entry.
    pub cells: Vec<TableCellNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCellNode {
    /// Pure-column index of the top-left grid position.
    pub column: usize,
    pub col_span: usize,
    pub row_span: usize,
    pub align: CellDef,
    pub content: Vec<Inline>,
    /// Inserted to fill an incomplete row.
    pub padding: bool,
}

impl TableCellNode {
    pub fn text(&self) -> String {
        crate::plain_text(&self.content)
    }
}
