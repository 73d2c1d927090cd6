//! Occupancy map of one table section.
//!
//! Positions are `(pure column, row)`. A cell spanning `c` columns and
//! `r` rows claims `c * r` positions; later rows skip positions claimed
//! from above.

use crate::error::DocumentError;

#[derive(Debug, Clone)]
pub struct LayoutGrid {
    columns: usize,
    budget: Option<usize>,
    /// Rows begun so far.
    rows: usize,
    /// One row per begun row plus rows reached by pending spans.
    occupied: Vec<Vec<bool>>,
    cursor: usize,
    claimed: usize,
}

impl LayoutGrid {
    pub fn new(columns: usize, budget: Option<usize>) -> Self {
        Self {
            columns,
            budget,
            rows: 0,
            occupied: Vec::new(),
            cursor: 0,
            claimed: 0,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of positions claimed by cells. Padding is not counted.
    pub fn occupied_positions(&self) -> usize {
        self.claimed
    }

    fn ensure_rows(&mut self, count: usize) {
        while self.occupied.len() < count {
            self.occupied.push(vec![false; self.columns]);
        }
    }

    pub fn begin_row(&mut self) -> Result<usize, DocumentError> {
        if let Some(budget) = self.budget.filter(|b| self.rows >= *b) {
            return Err(DocumentError::layout(format!(
                "row {} exceeds the row budget of {}",
                self.rows + 1,
                budget
            )));
        }
        self.rows += 1;
        self.ensure_rows(self.rows);
        self.cursor = 0;
        Ok(self.rows - 1)
    }

    /// Claims a `col_span` x `row_span` block at the next free position of
    /// the current row and returns its first column.
    pub fn place(&mut self, col_span: usize, row_span: usize) -> Result<usize, DocumentError> {
        if col_span == 0 || row_span == 0 {
            return Err(DocumentError::layout("cell spans must be at least 1x1"));
        }
        let row = self
            .rows
            .checked_sub(1)
            .ok_or_else(|| DocumentError::layout("no row has been started"))?;
        while self.cursor < self.columns && self.occupied[row][self.cursor] {
            self.cursor += 1;
        }
        let start = self.cursor;
        if start + col_span > self.columns {
            return Err(DocumentError::layout(format!(
                "a {}-column cell at column {} exceeds the {} pure column(s)",
                col_span,
                start + 1,
                self.columns
            )));
        }
        if let Some(budget) = self.budget.filter(|b| row + row_span > *b) {
            return Err(DocumentError::layout(format!(
                "a {}-row cell in row {} exceeds the row budget of {}",
                row_span,
                row + 1,
                budget
            )));
        }
        self.ensure_rows(row + row_span);
        let collides = self.occupied[row..row + row_span]
            .iter()
            .any(|r| r[start..start + col_span].iter().any(|taken| *taken));
        if collides {
            return Err(DocumentError::layout(format!(
                "cell at row {}, column {} overlaps a cell spanning from above",
                row + 1,
                start + 1
            )));
        }
        for r in &mut self.occupied[row..row + row_span] {
            r[start..start + col_span].fill(true);
        }
        self.claimed += col_span * row_span;
        self.cursor = start + col_span;
        Ok(start)
    }

    /// Marks the free positions of the current row as filled and returns
    /// their columns.
    pub fn pad_row(&mut self) -> Vec<usize> {
        let Some(row) = self.rows.checked_sub(1) else {
            return Vec::new();
        };
        let mut padded = Vec::new();
        for (column, taken) in self.occupied[row].iter_mut().enumerate() {
            if !*taken {
                *taken = true;
                padded.push(column);
            }
        }
        padded
    }

    /// Fails when a span reaches below the last row.
    pub fn finish(&self) -> Result<(), DocumentError> {
        if self.occupied.len() > self.rows {
            return Err(DocumentError::layout(format!(
                "a cell spans {} row(s) past the last row",
                self.occupied.len() - self.rows
            )));
        }
        Ok(())
    }
}
