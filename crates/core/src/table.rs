//! Tables placed in a graphic frame.

use crate::error::{Error, Result};
use crate::text::{TextFrame, VerticalAnchor};
use crate::units::RgbColor;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCell {
    pub text: TextFrame,
    pub fill: Option<RgbColor>,
    pub anchor: Option<VerticalAnchor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Height in EMU.
    pub height: i64,
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column widths in EMU.
    pub columns: Vec<i64>,
    pub rows: Vec<TableRow>,
    /// Style the first row as a header.
    pub first_row: bool,
    pub banded_rows: bool,
}

impl Table {
    /// An empty `rows` x `cols` table dividing `width` and `height` evenly.
    pub fn new(rows: usize, cols: usize, width: i64, height: i64) -> Self {
        let col_width = if cols == 0 { 0 } else { width / cols as i64 };
        let row_height = if rows == 0 { 0 } else { height / rows as i64 };
        Self {
            columns: vec![col_width; cols],
            rows: (0..rows)
                .map(|_| TableRow {
                    height: row_height,
                    cells: vec![TableCell::default(); cols],
                })
                .collect(),
            first_row: true,
            banded_rows: true,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn check_cell(&self, row: i64, col: i64) -> Result<()> {
        if row < 0 || row as usize >= self.row_count() {
            return Err(Error::index("row", row, self.row_count()));
        }
        if col < 0 || col as usize >= self.column_count() {
            return Err(Error::index("column", col, self.column_count()));
        }
        Ok(())
    }

    pub fn cell(&self, row: i64, col: i64) -> Result<&TableCell> {
        self.check_cell(row, col)?;
        Ok(&self.rows[row as usize].cells[col as usize])
    }

    pub fn cell_mut(&mut self, row: i64, col: i64) -> Result<&mut TableCell> {
        self.check_cell(row, col)?;
        Ok(&mut self.rows[row as usize].cells[col as usize])
    }

    /// Cell text as a grid of strings.
    pub fn texts(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.cells.iter().map(|c| c.text.text()).collect())
            .collect()
    }
}
