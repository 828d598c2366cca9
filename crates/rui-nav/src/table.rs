#![forbid(unsafe_code)]

//! Table view cursor.
//!
//! A table selects either whole rows or single cells; the mode is fixed
//! when the cursor is created. Element ids are `<table>-<row>` for rows and
//! `<table>-<row>-<column>` for cells.
//!
//! # Emitted records
//!
//! | trigger                        | record                         |
//! |--------------------------------|--------------------------------|
//! | cell cursor moves              | `currentCell{id,row,column}`   |
//! | row cursor moves               | `currentRow{id,row}`           |
//! | Enter/Space or click on a cell | `cellClick{id,row,column}`     |
//! | Enter/Space or click on a row  | `rowClick{id,row}`             |

use rui_wire::{MessageSink, Record};

use crate::grid::{
    GridQuery, first_enabled_cell, first_enabled_row, last_enabled_cell, last_enabled_row,
    step_cell, step_row,
};
use crate::key::NavKey;
use crate::visual::{CursorStyles, CursorVisual, CursorVisuals};
use crate::wire_number;

/// What a table cursor selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TableMode {
    /// No cursor; clicks are still reported.
    #[default]
    None,
    Row,
    Cell,
}

/// Current position of a table cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TablePosition {
    Row(usize),
    Cell { row: usize, column: usize },
}

impl TablePosition {
    #[must_use]
    pub const fn row(self) -> usize {
        match self {
            Self::Row(row) | Self::Cell { row, .. } => row,
        }
    }
}

/// Split a cell element id into `(table, row, column)`.
///
/// Splits from the right so table ids may contain `-`.
#[must_use]
pub fn parse_cell_id(element_id: &str) -> Option<(&str, usize, usize)> {
    let (rest, column) = element_id.rsplit_once('-')?;
    let (table, row) = rest.rsplit_once('-')?;
    if table.is_empty() {
        return None;
    }
    Some((table, row.parse().ok()?, column.parse().ok()?))
}

/// Split a row element id into `(table, row)`.
#[must_use]
pub fn parse_row_id(element_id: &str) -> Option<(&str, usize)> {
    let (table, row) = element_id.rsplit_once('-')?;
    if table.is_empty() {
        return None;
    }
    Some((table, row.parse().ok()?))
}

/// Cursor of one table view.
#[derive(Debug, Clone)]
pub struct TableCursor {
    id: String,
    mode: TableMode,
    current: Option<TablePosition>,
    has_focus: bool,
    styles: CursorStyles,
}

impl TableCursor {
    #[must_use]
    pub fn new(id: impl Into<String>, mode: TableMode) -> Self {
        Self {
            id: id.into(),
            mode,
            current: None,
            has_focus: false,
            styles: CursorStyles::table(),
        }
    }

    /// Builder: override the marker classes.
    #[must_use]
    pub fn with_styles(mut self, styles: CursorStyles) -> Self {
        self.styles = styles;
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn mode(&self) -> TableMode {
        self.mode
    }

    #[must_use]
    pub const fn current(&self) -> Option<TablePosition> {
        self.current
    }

    #[must_use]
    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    #[must_use]
    pub fn row_element_id(&self, row: usize) -> String {
        format!("{}-{row}", self.id)
    }

    #[must_use]
    pub fn cell_element_id(&self, row: usize, column: usize) -> String {
        format!("{}-{row}-{column}", self.id)
    }

    fn element_id(&self, position: TablePosition) -> String {
        match position {
            TablePosition::Row(row) => self.row_element_id(row),
            TablePosition::Cell { row, column } => self.cell_element_id(row, column),
        }
    }

    /// Move the cell cursor. Returns `false` (and changes nothing) when the
    /// cell is disabled, out of range, or the table is not in cell mode.
    pub fn set_cell<G, V, S>(
        &mut self,
        row: usize,
        column: usize,
        grid: &G,
        visuals: &mut V,
        sink: &mut S,
    ) -> bool
    where
        G: GridQuery + ?Sized,
        V: CursorVisuals + ?Sized,
        S: MessageSink + ?Sized,
    {
        if self.mode != TableMode::Cell || !grid.is_cell_enabled(row, column) {
            return false;
        }
        self.move_to(Some(TablePosition::Cell { row, column }), visuals);
        sink.submit(
            Record::new("currentCell")
                .with_bare("id", self.id.as_str())
                .with_int("row", wire_number(row))
                .with_int("column", wire_number(column)),
        );
        #[cfg(feature = "tracing")]
        self.log_move("set_cell");
        true
    }

    /// Move the row cursor. Returns `false` when the row is disabled, out of
    /// range, or the table is not in row mode.
    pub fn set_row<G, V, S>(&mut self, row: usize, grid: &G, visuals: &mut V, sink: &mut S) -> bool
    where
        G: GridQuery + ?Sized,
        V: CursorVisuals + ?Sized,
        S: MessageSink + ?Sized,
    {
        if self.mode != TableMode::Row || !grid.is_row_enabled(row) {
            return false;
        }
        self.move_to(Some(TablePosition::Row(row)), visuals);
        sink.submit(
            Record::new("currentRow")
                .with_bare("id", self.id.as_str())
                .with_int("row", wire_number(row)),
        );
        #[cfg(feature = "tracing")]
        self.log_move("set_row");
        true
    }

    /// Server-driven placement. `column` is ignored in row mode.
    ///
    /// When the target cannot take the cursor, the current cursor is
    /// cleared instead.
    pub fn set_cursor_by_server<G, V, S>(
        &mut self,
        row: usize,
        column: usize,
        grid: &G,
        visuals: &mut V,
        sink: &mut S,
    ) where
        G: GridQuery + ?Sized,
        V: CursorVisuals + ?Sized,
        S: MessageSink + ?Sized,
    {
        let placed = match self.mode {
            TableMode::Cell => self.set_cell(row, column, grid, visuals, sink),
            TableMode::Row => self.set_row(row, grid, visuals, sink),
            TableMode::None => false,
        };
        if !placed {
            self.move_to(None, visuals);
            #[cfg(feature = "tracing")]
            self.log_move("server_clear");
        }
    }

    /// Handle a navigation key. Returns `true` when the key was consumed.
    pub fn handle_key<G, V, S>(&mut self, key: NavKey, grid: &G, visuals: &mut V, sink: &mut S) -> bool
    where
        G: GridQuery + ?Sized,
        V: CursorVisuals + ?Sized,
        S: MessageSink + ?Sized,
    {
        match self.mode {
            TableMode::None => false,
            TableMode::Cell => self.handle_cell_key(key, grid, visuals, sink),
            TableMode::Row => self.handle_row_key(key, grid, visuals, sink),
        }
    }

    fn handle_cell_key<G, V, S>(&mut self, key: NavKey, grid: &G, visuals: &mut V, sink: &mut S) -> bool
    where
        G: GridQuery + ?Sized,
        V: CursorVisuals + ?Sized,
        S: MessageSink + ?Sized,
    {
        let Some(TablePosition::Cell { row, column }) = self.current else {
            if !key.is_navigation() {
                return false;
            }
            if let Some((row, column)) = first_enabled_cell(grid) {
                self.set_cell(row, column, grid, visuals, sink);
            }
            return true;
        };

        let target = match key {
            NavKey::Activate => {
                sink.submit(self.cell_click_record(row, column));
                return true;
            }
            NavKey::Left => step_cell(grid, row, column, 0, -1),
            NavKey::Right => step_cell(grid, row, column, 0, 1),
            NavKey::Up => step_cell(grid, row, column, -1, 0),
            NavKey::Down => step_cell(grid, row, column, 1, 0),
            NavKey::Home => first_enabled_cell(grid),
            NavKey::End => last_enabled_cell(grid),
            NavKey::PageUp | NavKey::PageDown => None,
        };
        if let Some((r, c)) = target
            && (r, c) != (row, column)
        {
            self.set_cell(r, c, grid, visuals, sink);
        }
        true
    }

    fn handle_row_key<G, V, S>(&mut self, key: NavKey, grid: &G, visuals: &mut V, sink: &mut S) -> bool
    where
        G: GridQuery + ?Sized,
        V: CursorVisuals + ?Sized,
        S: MessageSink + ?Sized,
    {
        let Some(TablePosition::Row(row)) = self.current else {
            if !key.is_navigation() {
                return false;
            }
            if let Some(row) = first_enabled_row(grid) {
                self.set_row(row, grid, visuals, sink);
            }
            return true;
        };

        let target = match key {
            NavKey::Activate => {
                sink.submit(self.row_click_record(row));
                return true;
            }
            NavKey::Left | NavKey::Right => return false,
            NavKey::Up => step_row(grid, row, -1),
            NavKey::Down => step_row(grid, row, 1),
            NavKey::Home => first_enabled_row(grid),
            NavKey::End => last_enabled_row(grid),
            NavKey::PageUp | NavKey::PageDown => None,
        };
        if let Some(target) = target
            && target != row
        {
            self.set_row(target, grid, visuals, sink);
        }
        true
    }

    /// Primary click on a cell. Moves the cursor in cell mode; always
    /// reports `cellClick`.
    pub fn cell_click<G, V, S>(
        &mut self,
        row: usize,
        column: usize,
        grid: &G,
        visuals: &mut V,
        sink: &mut S,
    ) where
        G: GridQuery + ?Sized,
        V: CursorVisuals + ?Sized,
        S: MessageSink + ?Sized,
    {
        if self.mode == TableMode::Cell && self.current != Some(TablePosition::Cell { row, column }) {
            self.set_cell(row, column, grid, visuals, sink);
        }
        sink.submit(self.cell_click_record(row, column));
    }

    /// Primary click on a row. Moves the cursor in row mode; always
    /// reports `rowClick`.
    pub fn row_click<G, V, S>(&mut self, row: usize, grid: &G, visuals: &mut V, sink: &mut S)
    where
        G: GridQuery + ?Sized,
        V: CursorVisuals + ?Sized,
        S: MessageSink + ?Sized,
    {
        if self.mode == TableMode::Row && self.current != Some(TablePosition::Row(row)) {
            self.set_row(row, grid, visuals, sink);
        }
        sink.submit(self.row_click_record(row));
    }

    /// The table gained input focus.
    pub fn focus<V: CursorVisuals + ?Sized>(&mut self, visuals: &mut V) {
        self.has_focus = true;
        self.refresh(visuals);
    }

    /// The table lost input focus.
    pub fn blur<V: CursorVisuals + ?Sized>(&mut self, visuals: &mut V) {
        self.has_focus = false;
        self.refresh(visuals);
    }

    fn refresh<V: CursorVisuals + ?Sized>(&self, visuals: &mut V) {
        if let Some(position) = self.current {
            let target = self.element_id(position);
            visuals.apply_cursor_visual(&target, CursorVisual::for_focus(self.has_focus), &self.styles);
        }
    }

    fn move_to<V: CursorVisuals + ?Sized>(&mut self, position: Option<TablePosition>, visuals: &mut V) {
        if let Some(previous) = self.current.take() {
            let target = self.element_id(previous);
            visuals.apply_cursor_visual(&target, CursorVisual::Cleared, &self.styles);
        }
        if let Some(position) = position {
            let target = self.element_id(position);
            visuals.apply_cursor_visual(&target, CursorVisual::for_focus(self.has_focus), &self.styles);
            visuals.reveal(&target);
            self.current = Some(position);
        }
    }

    fn cell_click_record(&self, row: usize, column: usize) -> Record {
        Record::new("cellClick")
            .with_bare("id", self.id.as_str())
            .with_int("row", wire_number(row))
            .with_int("column", wire_number(column))
    }

    fn row_click_record(&self, row: usize) -> Record {
        Record::new("rowClick")
            .with_bare("id", self.id.as_str())
            .with_int("row", wire_number(row))
    }

    #[cfg(feature = "tracing")]
    fn log_move(&self, action: &str) {
        tracing::debug!(
            message = "table.cursor",
            table = %self.id,
            action,
            row = self.current.map(TablePosition::row),
            focused = self.has_focus
        );
    }
}
