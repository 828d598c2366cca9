#![forbid(unsafe_code)]

//! Spatial navigation and cursor controllers for the rui browser client.
//!
//! - [`spatial`]: directional selection over a 2D item collection.
//! - [`grid`]: row/cell stepping over table grids.
//! - [`ListCursor`], [`TableCursor`], [`TabsCursor`]: stateful cursors that
//!   combine navigation results with visual markers and report changes as
//!   records through a [`rui_wire::MessageSink`].
//!
//! Geometry and enablement come from the rendering surface through
//! [`GeometryQuery`] and [`GridQuery`]; visuals go back through
//! [`CursorVisuals`] and [`TabVisuals`]. Nothing here retains surface state
//! between calls.
//!
//! # Feature flags
//!
//! - `tracing`: debug events for every cursor move.
//! - `serde`: (de)serialize styles, geometry, and grid masks.

pub mod geometry;
pub mod grid;
pub mod key;
pub mod list;
pub mod recording;
pub mod spatial;
pub mod table;
pub mod tabs;
pub mod visual;

pub use geometry::{GeometryQuery, ItemGeometry};
pub use grid::{GridMask, GridQuery, step_cell, step_row};
pub use key::NavKey;
pub use list::ListCursor;
pub use recording::{VisualChange, VisualLog};
pub use spatial::{Direction, navigate, navigate_from};
pub use table::{TableCursor, TableMode, TablePosition, parse_cell_id, parse_row_id};
pub use tabs::TabsCursor;
pub use visual::{CursorStyles, CursorVisual, CursorVisuals, TabStyles, TabVisual, TabVisuals};

/// Index as a wire integer.
pub(crate) fn wire_number(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}
