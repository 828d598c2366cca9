#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rui_nav::{GridMask, GridQuery, step_cell, step_row};

#[derive(Debug, Arbitrary)]
struct Input {
    rows: u8,
    columns: u8,
    disabled_cells: Vec<(u8, u8)>,
    disabled_rows: Vec<u8>,
    steps: Vec<(u8, u8, i8, i8)>,
}

fuzz_target!(|input: Input| {
    let rows = usize::from(input.rows % 32);
    let columns = usize::from(input.columns % 32);
    let mut grid = GridMask::new(rows, columns);
    for (r, c) in input.disabled_cells {
        grid.disable_cell(usize::from(r), usize::from(c));
    }
    for r in input.disabled_rows {
        grid.disable_row(usize::from(r));
    }

    for (r, c, dr, dc) in input.steps {
        let (row, column) = (usize::from(r), usize::from(c));
        let (dr, dc) = (isize::from(dr.signum()), isize::from(dc.signum()));
        if let Some((nr, nc)) = step_cell(&grid, row, column, dr, dc) {
            assert!(grid.is_cell_enabled(nr, nc), "landed on disabled cell");
        }
        if let Some(nr) = step_row(&grid, row, dr) {
            assert!(grid.is_row_enabled(nr), "landed on disabled row");
        }
    }
});
