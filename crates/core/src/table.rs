//! Table builder: caption, then header, body and footer sections made of
//! rows of plain-text cells laid out on a [`LayoutGrid`].

use crate::Labelable;
use crate::error::DocumentError;
use crate::grid::LayoutGrid;
use crate::scope::{ScopeKind, ScopeLink, close_on_drop};
use crate::slot::{Outlet, Slot, reserve, resolve_all, take_cell};
use crate::text::PlainText;
use folio_idf::{Inline, TableCellNode, TableNode, TablePart, TableRowNode, TableSectionNode};
use folio_types::{CellDef, Label};
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

fn part_index(part: TablePart) -> usize {
    match part {
        TablePart::Header => 0,
        TablePart::Body => 1,
        TablePart::Footer => 2,
    }
}

pub struct Table {
    link: ScopeLink,
    label: Option<Label>,
    spans_all_columns: bool,
    columns: Vec<CellDef>,
    caption: Option<Arc<OnceLock<Vec<Inline>>>>,
    parts: [Arc<OnceLock<TableSectionNode>>; 3],
    /// Index of the first part that may still be opened.
    next_part: usize,
    outlet: Outlet<TableNode>,
}

impl Table {
    pub(crate) fn new(
        link: ScopeLink,
        label: Option<Label>,
        spans_all_columns: bool,
        columns: &[CellDef],
        outlet: Outlet<TableNode>,
    ) -> Self {
        Self {
            link,
            label,
            spans_all_columns,
            columns: columns.to_vec(),
            caption: None,
            parts: Default::default(),
            next_part: 0,
            outlet,
        }
    }

    /// Rejects a column layout without any pure column.
    pub(crate) fn validate_columns(columns: &[CellDef]) -> Result<(), DocumentError> {
        if CellDef::count_pure(columns) == 0 {
            return Err(DocumentError::layout(
                "a table needs at least one non-separator column",
            ));
        }
        Ok(())
    }

    pub fn pure_columns(&self) -> usize {
        CellDef::count_pure(&self.columns)
    }

    /// Opens the caption. Only allowed once, before any section.
    pub fn caption(&mut self) -> Result<PlainText, DocumentError> {
        self.link.ensure_mutable()?;
        if self.caption.is_some() {
            return Err(DocumentError::structural("table caption requested twice"));
        }
        if self.next_part > 0 {
            return Err(DocumentError::structural(
                "table caption must precede its sections",
            ));
        }
        let cell = Arc::new(OnceLock::new());
        let link = self.link.child(ScopeKind::PlainText)?;
        self.caption = Some(Arc::clone(&cell));
        Ok(PlainText::new(link, Outlet::new(cell, |c| c)))
    }

    pub fn header(&mut self) -> Result<TableSection, DocumentError> {
        self.part(TablePart::Header, None)
    }

    pub fn body(&mut self) -> Result<TableSection, DocumentError> {
        self.part(TablePart::Body, None)
    }

    pub fn footer(&mut self) -> Result<TableSection, DocumentError> {
        self.part(TablePart::Footer, None)
    }

    pub fn header_with_budget(&mut self, rows: usize) -> Result<TableSection, DocumentError> {
        self.part(TablePart::Header, Some(rows))
    }

    pub fn body_with_budget(&mut self, rows: usize) -> Result<TableSection, DocumentError> {
        self.part(TablePart::Body, Some(rows))
    }

    pub fn footer_with_budget(&mut self, rows: usize) -> Result<TableSection, DocumentError> {
        self.part(TablePart::Footer, Some(rows))
    }

    fn part(&mut self, part: TablePart, budget: Option<usize>) -> Result<TableSection, DocumentError> {
        self.link.ensure_mutable()?;
        let index = part_index(part);
        if index < self.next_part {
            return Err(DocumentError::structural(format!(
                "table {} requested after a later or repeated section",
                part.name()
            )));
        }
        let link = self.link.child(ScopeKind::TableSection)?;
        self.next_part = index + 1;
        let grid = LayoutGrid::new(self.pure_columns(), budget);
        let pure: Vec<CellDef> = self.columns.iter().copied().filter(|c| c.is_pure()).collect();
        let outlet = Outlet::new(Arc::clone(&self.parts[index]), |s| s);
        Ok(TableSection::new(link, part, pure, grid, outlet))
    }

    pub fn close(&mut self) -> Result<(), DocumentError> {
        self.link.close_with(|| {
            let [header, body, footer] = std::mem::take(&mut self.parts);
            let node = TableNode {
                label: self.label,
                spans_all_columns: self.spans_all_columns,
                columns: std::mem::take(&mut self.columns),
                caption: self.caption.take().and_then(take_cell).unwrap_or_default(),
                header: take_cell(header),
                body: take_cell(body),
                footer: take_cell(footer),
            };
            debug!(
                "Table with {} pure column(s) and {} part(s) complete",
                node.pure_columns(),
                node.parts().count()
            );
            self.outlet.deliver(node);
            Ok(())
        })
    }
}

impl Labelable for Table {
    fn label(&self) -> Option<Label> {
        self.label
    }
}

close_on_drop!(Table => link);

/// Header, body or footer of a table.
pub struct TableSection {
    link: ScopeLink,
    part: TablePart,
    pure: Arc<Vec<CellDef>>,
    grid: Arc<Mutex<LayoutGrid>>,
    rows: Vec<Slot<TableRowNode>>,
    outlet: Outlet<TableSectionNode>,
}

fn lock_grid(grid: &Mutex<LayoutGrid>) -> Result<MutexGuard<'_, LayoutGrid>, DocumentError> {
    grid.lock()
        .map_err(|_| DocumentError::layout("layout grid lock poisoned"))
}

impl TableSection {
    fn new(
        link: ScopeLink,
        part: TablePart,
        pure: Vec<CellDef>,
        grid: LayoutGrid,
        outlet: Outlet<TableSectionNode>,
    ) -> Self {
        Self {
            link,
            part,
            pure: Arc::new(pure),
            grid: Arc::new(Mutex::new(grid)),
            rows: Vec::new(),
            outlet,
        }
    }

    pub fn part(&self) -> TablePart {
        self.part
    }

    /// Grid positions claimed by the cells placed so far.
    pub fn occupied_positions(&self) -> usize {
        lock_grid(&self.grid)
            .map(|g| g.occupied_positions())
            .unwrap_or(0)
    }

    pub fn row(&mut self) -> Result<TableRow, DocumentError> {
        self.link.ensure_mutable()?;
        lock_grid(&self.grid)?.begin_row()?;
        let link = self.link.child(ScopeKind::TableRow)?;
        let outlet = reserve(&mut self.rows, |r| r);
        Ok(TableRow {
            link,
            pure: Arc::clone(&self.pure),
            grid: Arc::clone(&self.grid),
            cells: Vec::new(),
            outlet,
        })
    }

    /// # Errors
    ///
    /// `Layout` when a cell spans past the last row.
    pub fn close(&mut self) -> Result<(), DocumentError> {
        let part = self.part;
        self.link.close_with(|| {
            lock_grid(&self.grid)?.finish()?;
            let rows = resolve_all(std::mem::take(&mut self.rows));
            self.outlet.deliver(TableSectionNode { part, rows });
            Ok(())
        })
    }
}

close_on_drop!(TableSection => link);

pub struct TableRow {
    link: ScopeLink,
    pure: Arc<Vec<CellDef>>,
    grid: Arc<Mutex<LayoutGrid>>,
    cells: Vec<Slot<TableCellNode>>,
    outlet: Outlet<TableRowNode>,
}

impl TableRow {
    /// A 1x1 cell aligned like its column.
    pub fn cell(&mut self) -> Result<PlainText, DocumentError> {
        self.place(1, 1, None)
    }

    /// A cell covering `cols` pure columns and `rows` rows.
    pub fn cell_spanning(
        &mut self,
        cols: usize,
        rows: usize,
        def: CellDef,
    ) -> Result<PlainText, DocumentError> {
        if !def.is_pure() {
            self.link.ensure_mutable()?;
            return Err(DocumentError::layout("a cell cannot be a separator"));
        }
        self.place(cols, rows, Some(def))
    }

    fn place(
        &mut self,
        col_span: usize,
        row_span: usize,
        def: Option<CellDef>,
    ) -> Result<PlainText, DocumentError> {
        self.link.ensure_mutable()?;
        let column = lock_grid(&self.grid)?.place(col_span, row_span)?;
        let align = def
            .or_else(|| self.pure.get(column).copied())
            .unwrap_or(CellDef::Left);
        let link = self.link.child(ScopeKind::PlainText)?;
        let outlet = reserve(&mut self.cells, move |content| TableCellNode {
            column,
            col_span,
            row_span,
            align,
            content,
            padding: false,
        });
        Ok(PlainText::new(link, outlet))
    }

    /// Pads the unfilled positions of the row with empty cells.
    pub fn close(&mut self) -> Result<(), DocumentError> {
        self.link.close_with(|| {
            let padded = lock_grid(&self.grid)?.pad_row();
            let mut cells = resolve_all(std::mem::take(&mut self.cells));
            cells.extend(padded.into_iter().map(|column| TableCellNode {
                column,
                col_span: 1,
                row_span: 1,
                align: self.pure.get(column).copied().unwrap_or(CellDef::Left),
                content: Vec::new(),
                padding: true,
            }));
            cells.sort_by_key(|c| c.column);
            self.outlet.deliver(TableRowNode { cells });
            Ok(())
        })
    }
}

close_on_drop!(TableRow => link);
