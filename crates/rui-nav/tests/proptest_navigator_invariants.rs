//! Property-based invariant tests for spatial navigation and grid stepping.
//!
//! 1. Navigation only ever returns enabled items beyond the reference point
//! 2. Navigation is deterministic
//! 3. The returned item has the minimal (perpendicular, travel) score
//! 4. Grid stepping only lands on enabled cells, never diagonally
//! 5. A list cursor never rests on a disabled item after keyboard input

use proptest::prelude::*;
use rui_nav::spatial::{first_enabled, last_enabled};
use rui_nav::{
    Direction, GridMask, GridQuery, ItemGeometry, ListCursor, NavKey, VisualLog, navigate,
    step_cell,
};
use rui_wire::Record;

// ── Strategies ──────────────────────────────────────────────────────────

fn item_strategy() -> impl Strategy<Value = ItemGeometry> {
    (0i32..400, 0i32..400, 1i32..80, 1i32..40, prop::bool::weighted(0.8)).prop_map(
        |(left, top, width, height, enabled)| {
            ItemGeometry::new(left, top, width, height).with_enabled(enabled)
        },
    )
}

fn items_strategy() -> impl Strategy<Value = Vec<ItemGeometry>> {
    prop::collection::vec(item_strategy(), 0..40)
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::ALL.to_vec())
}

fn key_strategy() -> impl Strategy<Value = NavKey> {
    prop::sample::select(vec![
        NavKey::Activate,
        NavKey::Left,
        NavKey::Right,
        NavKey::Up,
        NavKey::Down,
        NavKey::Home,
        NavKey::End,
        NavKey::PageUp,
        NavKey::PageDown,
    ])
}

fn grid_strategy() -> impl Strategy<Value = GridMask> {
    (1usize..8, 1usize..8)
        .prop_flat_map(|(rows, columns)| {
            (
                Just((rows, columns)),
                prop::collection::vec((0..rows, 0..columns), 0..20),
            )
        })
        .prop_map(|((rows, columns), disabled)| {
            disabled
                .into_iter()
                .fold(GridMask::new(rows, columns), |grid, (r, c)| {
                    grid.with_disabled_cell(r, c)
                })
        })
}

fn beyond(item: &ItemGeometry, x: i32, y: i32, dir: Direction) -> bool {
    match dir {
        Direction::Right => item.left >= x,
        Direction::Left => item.left < x,
        Direction::Down => item.top >= y,
        Direction::Up => item.top < y,
    }
}

fn score(item: &ItemGeometry, x: i32, y: i32, dir: Direction) -> (i64, i64) {
    let (dx, dy) = (
        (i64::from(item.left) - i64::from(x)).abs(),
        (i64::from(item.top) - i64::from(y)).abs(),
    );
    match dir {
        Direction::Left | Direction::Right => (dy, dx),
        Direction::Up | Direction::Down => (dx, dy),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 1-3. Spatial navigation
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn result_is_enabled_and_beyond(
        items in items_strategy(),
        x in -10i32..410,
        y in -10i32..410,
        dir in direction_strategy(),
    ) {
        if let Some(index) = navigate(&items, x, y, dir) {
            prop_assert!(items[index].enabled);
            prop_assert!(beyond(&items[index], x, y, dir));
        } else {
            prop_assert!(!items.iter().any(|item| item.enabled && beyond(item, x, y, dir)));
        }
    }

    #[test]
    fn navigation_is_deterministic(
        items in items_strategy(),
        x in 0i32..400,
        y in 0i32..400,
        dir in direction_strategy(),
    ) {
        prop_assert_eq!(navigate(&items, x, y, dir), navigate(&items, x, y, dir));
    }

    #[test]
    fn result_has_minimal_score(
        items in items_strategy(),
        x in 0i32..400,
        y in 0i32..400,
        dir in direction_strategy(),
    ) {
        if let Some(index) = navigate(&items, x, y, dir) {
            let best = score(&items[index], x, y, dir);
            for (other, item) in items.iter().enumerate() {
                if item.enabled && beyond(item, x, y, dir) {
                    let candidate = score(item, x, y, dir);
                    prop_assert!(best <= candidate);
                    if candidate == best {
                        prop_assert!(index <= other);
                    }
                }
            }
        }
    }

    #[test]
    fn home_end_are_enabled(items in items_strategy()) {
        for found in [first_enabled(&items), last_enabled(&items)].into_iter().flatten() {
            prop_assert!(items[found].enabled);
        }
        prop_assert_eq!(first_enabled(&items).is_some(), items.iter().any(|item| item.enabled));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Grid stepping
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn grid_steps_land_on_enabled_cells(
        grid in grid_strategy(),
        start in (0usize..8, 0usize..8),
        delta in prop::sample::select(vec![(1isize, 0isize), (-1, 0), (0, 1), (0, -1)]),
    ) {
        let (row, column) = (start.0 % grid.rows(), start.1 % grid.columns());
        if let Some((r, c)) = step_cell(&grid, row, column, delta.0, delta.1) {
            prop_assert!(grid.is_cell_enabled(r, c));
            if delta.0 == 0 {
                // Horizontal moves only fall back to earlier rows.
                prop_assert!(r <= row);
                prop_assert!(c != column);
            } else {
                prop_assert!(c <= column);
                prop_assert!(r != row);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5. List cursor
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn list_cursor_rests_on_enabled_items(
        items in items_strategy(),
        keys in prop::collection::vec(key_strategy(), 1..30),
    ) {
        let mut list = ListCursor::new("list");
        let mut visuals = VisualLog::new();
        let mut sink: Vec<Record> = Vec::new();
        for key in keys {
            prop_assert!(list.handle_key(key, &items, &mut visuals, &mut sink));
            if let Some(current) = list.current() {
                prop_assert!(items[current].enabled);
            }
        }
        for record in &sink {
            prop_assert!(matches!(record.tag(), "itemSelected" | "itemClick"));
        }
    }
}
