#![forbid(unsafe_code)]

//! Spatial navigation: directional item selection over a 2D collection.
//!
//! # Algorithm
//!
//! 1. Candidates are the enabled items strictly beyond the reference point
//!    on the travel axis (`left >= x` for Right, `left < x` for Left,
//!    `top >= y` for Down, `top < y` for Up).
//! 2. Pick the candidate with the smallest perpendicular distance
//!    (`|top - y|` for horizontal moves, `|left - x|` for vertical ones).
//! 3. Break ties by the smaller travel distance, then by collection order.
//!
//! This keeps the cursor in its visual row or column before it considers
//! proximity.
//!
//! # Invariants
//!
//! - Disabled items are never returned.
//! - No candidate yields `None`; callers must leave the cursor in place.
//! - Deterministic: the same geometry and point give the same answer.

use crate::geometry::{GeometryQuery, ItemGeometry};

/// Travel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];
}

/// Point a move in `dir` starts from, given the current item.
///
/// Right and Down start at the far edge of the item so that the item itself
/// is not a candidate.
#[must_use]
pub const fn reference_point(item: &ItemGeometry, dir: Direction) -> (i32, i32) {
    match dir {
        Direction::Left | Direction::Up => (item.left, item.top),
        Direction::Right => (item.right(), item.top),
        Direction::Down => (item.left, item.bottom()),
    }
}

/// Best enabled item beyond `(x, y)` in `dir`.
#[must_use]
pub fn navigate<G: GeometryQuery + ?Sized>(
    items: &G,
    x: i32,
    y: i32,
    dir: Direction,
) -> Option<usize> {
    let mut best: Option<(usize, (i64, i64))> = None;

    for index in 0..items.item_count() {
        let Some(item) = items.query_geometry(index) else {
            continue;
        };
        if !item.enabled {
            continue;
        }
        let Some(score) = score(&item, x, y, dir) else {
            continue;
        };
        if best.is_none_or(|(_, best_score)| score < best_score) {
            best = Some((index, score));
        }
    }

    best.map(|(index, _)| index)
}

/// Best enabled item in `dir` from item `current`.
#[must_use]
pub fn navigate_from<G: GeometryQuery + ?Sized>(
    items: &G,
    current: usize,
    dir: Direction,
) -> Option<usize> {
    let origin = items.query_geometry(current)?;
    let (x, y) = reference_point(&origin, dir);
    navigate(items, x, y, dir)
}

/// First enabled item in collection order.
#[must_use]
pub fn first_enabled<G: GeometryQuery + ?Sized>(items: &G) -> Option<usize> {
    (0..items.item_count()).find(|&index| items.is_enabled(index))
}

/// Last enabled item in collection order.
#[must_use]
pub fn last_enabled<G: GeometryQuery + ?Sized>(items: &G) -> Option<usize> {
    (0..items.item_count())
        .rev()
        .find(|&index| items.is_enabled(index))
}

/// `(perpendicular, travel)` distance, or `None` when the item is not
/// beyond the point.
fn score(item: &ItemGeometry, x: i32, y: i32, dir: Direction) -> Option<(i64, i64)> {
    let (left, top) = (i64::from(item.left), i64::from(item.top));
    let (x, y) = (i64::from(x), i64::from(y));
    match dir {
        Direction::Right if left >= x => Some(((top - y).abs(), left - x)),
        Direction::Left if left < x => Some(((top - y).abs(), x - left)),
        Direction::Down if top >= y => Some(((left - x).abs(), top - y)),
        Direction::Up if top < y => Some(((left - x).abs(), y - top)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(left: i32, top: i32) -> ItemGeometry {
        ItemGeometry::new(left, top, 10, 10)
    }

    /// Layout:
    /// ```text
    ///   [0]  [1]  [2]
    ///   [3]  [4]  [5]
    ///   [6]  [7]  [8]
    /// ```
    fn grid_3x3() -> Vec<ItemGeometry> {
        let mut items = Vec::new();
        for row in 0..3 {
            for col in 0..3 {
                items.push(item(col * 12, row * 12));
            }
        }
        items
    }

    #[test]
    fn nearest_in_lane_then_distance() {
        // A(10,0) B(20,0) C(20,5); Right from the origin picks A.
        let items = vec![item(10, 0), item(20, 0), item(20, 5)];
        assert_eq!(navigate(&items, 0, 0, Direction::Right), Some(0));
    }

    #[test]
    fn lane_beats_proximity() {
        // Close but off-lane item loses to a far, in-lane one.
        let items = vec![item(12, 6), item(100, 0)];
        assert_eq!(navigate(&items, 10, 0, Direction::Right), Some(1));
    }

    #[test]
    fn moves_within_grid() {
        let items = grid_3x3();
        assert_eq!(navigate_from(&items, 0, Direction::Right), Some(1));
        assert_eq!(navigate_from(&items, 2, Direction::Left), Some(1));
        assert_eq!(navigate_from(&items, 0, Direction::Down), Some(3));
        assert_eq!(navigate_from(&items, 6, Direction::Up), Some(3));
        assert_eq!(navigate_from(&items, 4, Direction::Right), Some(5));
    }

    #[test]
    fn edges_yield_none() {
        let items = grid_3x3();
        assert_eq!(navigate_from(&items, 0, Direction::Left), None);
        assert_eq!(navigate_from(&items, 0, Direction::Up), None);
        assert_eq!(navigate_from(&items, 2, Direction::Right), None);
        assert_eq!(navigate_from(&items, 8, Direction::Down), None);
    }

    #[test]
    fn disabled_items_are_skipped() {
        let mut items = grid_3x3();
        items[1].enabled = false;
        assert_eq!(navigate_from(&items, 0, Direction::Right), Some(2));
    }

    #[test]
    fn wraps_to_next_row_when_lane_is_empty() {
        // Single column list; Right from the last row has nothing in lane.
        let items = vec![item(0, 0), item(0, 12), item(0, 24)];
        assert_eq!(navigate_from(&items, 0, Direction::Right), None);
        // A horizontal flow: next row starts back at the left edge.
        let flow = vec![item(0, 0), item(12, 0), item(0, 12)];
        assert_eq!(navigate_from(&flow, 1, Direction::Down), Some(2));
    }

    #[test]
    fn full_tie_keeps_collection_order() {
        let items = vec![item(20, 0), item(20, 0)];
        assert_eq!(navigate(&items, 0, 0, Direction::Right), Some(0));
    }

    #[test]
    fn home_end_skip_disabled() {
        let mut items = grid_3x3();
        items[0].enabled = false;
        items[8].enabled = false;
        assert_eq!(first_enabled(&items), Some(1));
        assert_eq!(last_enabled(&items), Some(7));
    }

    #[test]
    fn empty_collection() {
        let items: Vec<ItemGeometry> = Vec::new();
        for dir in Direction::ALL {
            assert_eq!(navigate(&items, 0, 0, dir), None);
        }
        assert_eq!(first_enabled(&items), None);
        assert_eq!(navigate_from(&items, 0, Direction::Down), None);
    }

    #[test]
    fn left_and_up_use_near_edge() {
        let current = item(24, 24);
        assert_eq!(reference_point(&current, Direction::Left), (24, 24));
        assert_eq!(reference_point(&current, Direction::Up), (24, 24));
        assert_eq!(reference_point(&current, Direction::Right), (34, 24));
        assert_eq!(reference_point(&current, Direction::Down), (24, 34));
    }
}
