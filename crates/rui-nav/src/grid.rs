#![forbid(unsafe_code)]

//! Cursor stepping over table grids.
//!
//! # Algorithm
//!
//! [`step_cell`] moves by `(d_row, d_col)` until it leaves the grid. At each
//! stepped position it takes the cell if enabled; otherwise it searches
//! backward along the perpendicular axis of that position (earlier columns
//! of the target row for vertical moves, earlier rows of the target column
//! for horizontal moves) before stepping again. The search never goes
//! diagonal.
//!
//! [`step_row`] is the same walk over rows only.

/// Enablement capability of a table grid, provided by the surface.
pub trait GridQuery {
    fn rows(&self) -> usize;
    fn columns(&self) -> usize;
    /// Whether the cell exists and is selectable.
    fn is_cell_enabled(&self, row: usize, column: usize) -> bool;
    /// Whether the row exists and is selectable.
    fn is_row_enabled(&self, row: usize) -> bool;
}

/// A grid backed by explicit disabled sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridMask {
    rows: usize,
    columns: usize,
    disabled_cells: Vec<(usize, usize)>,
    disabled_rows: Vec<usize>,
}

impl GridMask {
    /// A fully enabled grid.
    #[must_use]
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            disabled_cells: Vec::new(),
            disabled_rows: Vec::new(),
        }
    }

    /// Builder: disable one cell.
    #[must_use]
    pub fn with_disabled_cell(mut self, row: usize, column: usize) -> Self {
        self.disable_cell(row, column);
        self
    }

    /// Builder: disable a row (and every cell in it).
    #[must_use]
    pub fn with_disabled_row(mut self, row: usize) -> Self {
        self.disable_row(row);
        self
    }

    pub fn disable_cell(&mut self, row: usize, column: usize) {
        if !self.disabled_cells.contains(&(row, column)) {
            self.disabled_cells.push((row, column));
        }
    }

    pub fn disable_row(&mut self, row: usize) {
        if !self.disabled_rows.contains(&row) {
            self.disabled_rows.push(row);
        }
    }

    /// Change the grid size, keeping disabled marks that still fit.
    pub fn resize(&mut self, rows: usize, columns: usize) {
        self.rows = rows;
        self.columns = columns;
        self.disabled_cells.retain(|&(r, c)| r < rows && c < columns);
        self.disabled_rows.retain(|&r| r < rows);
    }
}

impl GridQuery for GridMask {
    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn is_cell_enabled(&self, row: usize, column: usize) -> bool {
        row < self.rows
            && column < self.columns
            && !self.disabled_rows.contains(&row)
            && !self.disabled_cells.contains(&(row, column))
    }

    fn is_row_enabled(&self, row: usize) -> bool {
        row < self.rows && !self.disabled_rows.contains(&row)
    }
}

impl<G: GridQuery + ?Sized> GridQuery for &G {
    fn rows(&self) -> usize {
        (**self).rows()
    }

    fn columns(&self) -> usize {
        (**self).columns()
    }

    fn is_cell_enabled(&self, row: usize, column: usize) -> bool {
        (**self).is_cell_enabled(row, column)
    }

    fn is_row_enabled(&self, row: usize) -> bool {
        (**self).is_row_enabled(row)
    }
}

fn offset(position: usize, delta: isize, limit: usize) -> Option<usize> {
    position.checked_add_signed(delta).filter(|&next| next < limit)
}

/// Next enabled cell from `(row, column)` stepping by `(d_row, d_col)`.
///
/// Returns `None` when the walk leaves the grid without finding one, or
/// when both deltas are zero.
#[must_use]
pub fn step_cell<G: GridQuery + ?Sized>(
    grid: &G,
    row: usize,
    column: usize,
    d_row: isize,
    d_col: isize,
) -> Option<(usize, usize)> {
    if d_row == 0 && d_col == 0 {
        return None;
    }
    let (rows, columns) = (grid.rows(), grid.columns());
    let mut row = offset(row, d_row, rows)?;
    let mut column = offset(column, d_col, columns)?;

    loop {
        if grid.is_cell_enabled(row, column) {
            return Some((row, column));
        }
        if d_row == 0 {
            if let Some(r) = (0..row).rev().find(|&r| grid.is_cell_enabled(r, column)) {
                return Some((r, column));
            }
        } else if d_col == 0
            && let Some(c) = (0..column).rev().find(|&c| grid.is_cell_enabled(row, c))
        {
            return Some((row, c));
        }
        row = offset(row, d_row, rows)?;
        column = offset(column, d_col, columns)?;
    }
}

/// Next enabled row from `row` stepping by `d_row`.
#[must_use]
pub fn step_row<G: GridQuery + ?Sized>(grid: &G, row: usize, d_row: isize) -> Option<usize> {
    if d_row == 0 {
        return None;
    }
    let rows = grid.rows();
    let mut row = offset(row, d_row, rows)?;
    loop {
        if grid.is_row_enabled(row) {
            return Some(row);
        }
        row = offset(row, d_row, rows)?;
    }
}

/// First enabled cell in row-major order.
#[must_use]
pub fn first_enabled_cell<G: GridQuery + ?Sized>(grid: &G) -> Option<(usize, usize)> {
    let columns = grid.columns();
    (0..grid.rows())
        .flat_map(|row| (0..columns).map(move |column| (row, column)))
        .find(|&(row, column)| grid.is_cell_enabled(row, column))
}

/// Last enabled cell in row-major order.
#[must_use]
pub fn last_enabled_cell<G: GridQuery + ?Sized>(grid: &G) -> Option<(usize, usize)> {
    let columns = grid.columns();
    (0..grid.rows())
        .rev()
        .flat_map(|row| (0..columns).rev().map(move |column| (row, column)))
        .find(|&(row, column)| grid.is_cell_enabled(row, column))
}

/// First enabled row.
#[must_use]
pub fn first_enabled_row<G: GridQuery + ?Sized>(grid: &G) -> Option<usize> {
    (0..grid.rows()).find(|&row| grid.is_row_enabled(row))
}

/// Last enabled row.
#[must_use]
pub fn last_enabled_row<G: GridQuery + ?Sized>(grid: &G) -> Option<usize> {
    (0..grid.rows()).rev().find(|&row| grid.is_row_enabled(row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_steps() {
        let grid = GridMask::new(3, 3);
        assert_eq!(step_cell(&grid, 1, 1, 1, 0), Some((2, 1)));
        assert_eq!(step_cell(&grid, 1, 1, -1, 0), Some((0, 1)));
        assert_eq!(step_cell(&grid, 1, 1, 0, 1), Some((1, 2)));
        assert_eq!(step_cell(&grid, 1, 1, 0, -1), Some((1, 0)));
    }

    #[test]
    fn stops_at_edges() {
        let grid = GridMask::new(3, 3);
        assert_eq!(step_cell(&grid, 0, 0, -1, 0), None);
        assert_eq!(step_cell(&grid, 0, 0, 0, -1), None);
        assert_eq!(step_cell(&grid, 2, 2, 1, 0), None);
        assert_eq!(step_cell(&grid, 2, 2, 0, 1), None);
        assert_eq!(step_cell(&grid, 1, 1, 0, 0), None);
    }

    #[test]
    fn down_skips_to_enabled_cell_two_rows_further() {
        // Column 0 has nothing to the left, so the search continues down.
        let grid = GridMask::new(4, 3).with_disabled_cell(1, 0);
        assert_eq!(step_cell(&grid, 0, 0, 1, 0), Some((2, 0)));
    }

    #[test]
    fn down_prefers_earlier_column_of_target_row() {
        let grid = GridMask::new(3, 3).with_disabled_cell(1, 2);
        assert_eq!(step_cell(&grid, 0, 2, 1, 0), Some((1, 1)));
    }

    #[test]
    fn right_searches_earlier_rows_of_target_column() {
        let grid = GridMask::new(3, 3).with_disabled_cell(2, 1);
        assert_eq!(step_cell(&grid, 2, 0, 0, 1), Some((1, 1)));
    }

    #[test]
    fn never_searches_diagonally() {
        // Down from (0,1): row 1 is disabled and row 2 only has column 2,
        // which is neither in-column nor behind it.
        let grid = GridMask::new(3, 3)
            .with_disabled_row(1)
            .with_disabled_cell(2, 0)
            .with_disabled_cell(2, 1);
        assert_eq!(step_cell(&grid, 0, 1, 1, 0), None);
    }

    #[test]
    fn row_stepping_skips_disabled_rows() {
        let grid = GridMask::new(5, 2).with_disabled_row(1).with_disabled_row(2);
        assert_eq!(step_row(&grid, 0, 1), Some(3));
        assert_eq!(step_row(&grid, 3, -1), Some(0));
        assert_eq!(step_row(&grid, 4, 1), None);
        assert_eq!(step_row(&grid, 0, 0), None);
    }

    #[test]
    fn first_and_last_skip_disabled() {
        let grid = GridMask::new(2, 2)
            .with_disabled_cell(0, 0)
            .with_disabled_cell(1, 1);
        assert_eq!(first_enabled_cell(&grid), Some((0, 1)));
        assert_eq!(last_enabled_cell(&grid), Some((1, 0)));

        let rows = GridMask::new(3, 1).with_disabled_row(0);
        assert_eq!(first_enabled_row(&rows), Some(1));
        assert_eq!(last_enabled_row(&rows), Some(2));
    }

    #[test]
    fn empty_grid() {
        let grid = GridMask::new(0, 0);
        assert_eq!(first_enabled_cell(&grid), None);
        assert_eq!(last_enabled_row(&grid), None);
        assert_eq!(step_cell(&grid, 0, 0, 1, 0), None);
    }

    #[test]
    fn resize_drops_out_of_range_marks() {
        let mut grid = GridMask::new(4, 4).with_disabled_cell(3, 3).with_disabled_row(1);
        grid.resize(2, 2);
        assert!(grid.is_cell_enabled(0, 0));
        assert!(!grid.is_row_enabled(1));
        grid.resize(4, 4);
        assert!(grid.is_cell_enabled(3, 3));
    }
}
