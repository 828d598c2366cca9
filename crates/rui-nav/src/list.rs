#![forbid(unsafe_code)]

//! List view cursor.
//!
//! A list has at most one current item. Item element ids are
//! `<list-id>-<index>`; the wire `number` of an item is its index.
//!
//! # Emitted records
//!
//! | trigger                         | record                       |
//! |---------------------------------|------------------------------|
//! | cursor moves to an item         | `itemSelected{id,number}`    |
//! | cursor cleared                  | `itemUnselected{id}`         |
//! | Enter/Space, or click on item   | `itemClick{id,number}`       |
//!
//! Server-driven moves ([`ListCursor::set_current`]) emit nothing.

use rui_wire::{MessageSink, Record};

use crate::geometry::GeometryQuery;
use crate::key::NavKey;
use crate::spatial::{Direction, first_enabled, last_enabled, navigate_from};
use crate::visual::{CursorStyles, CursorVisual, CursorVisuals};
use crate::wire_number;

/// Selection cursor of one list view.
#[derive(Debug, Clone)]
pub struct ListCursor {
    id: String,
    current: Option<usize>,
    has_focus: bool,
    styles: CursorStyles,
}

impl ListCursor {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            current: None,
            has_focus: false,
            styles: CursorStyles::list(),
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

    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    #[must_use]
    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    #[must_use]
    pub fn styles(&self) -> &CursorStyles {
        &self.styles
    }

    /// Element id of item `index`.
    #[must_use]
    pub fn item_element_id(&self, index: usize) -> String {
        format!("{}-{index}", self.id)
    }

    /// Move the cursor and report it.
    ///
    /// Emits exactly one record: `itemSelected` for `Some`, `itemUnselected`
    /// for `None` when an item was current, nothing otherwise.
    pub fn select<V, S>(&mut self, index: Option<usize>, visuals: &mut V, sink: &mut S)
    where
        V: CursorVisuals + ?Sized,
        S: MessageSink + ?Sized,
    {
        let had_current = self.current.is_some();
        self.move_to(index, visuals);
        let record = match index {
            Some(index) => Some(
                Record::new("itemSelected")
                    .with_bare("id", self.id.as_str())
                    .with_int("number", wire_number(index)),
            ),
            None if had_current => {
                Some(Record::new("itemUnselected").with_bare("id", self.id.as_str()))
            }
            None => None,
        };
        if let Some(record) = record {
            sink.submit(record);
        }
    }

    /// Server-driven cursor placement. Updates visuals only.
    pub fn set_current<V: CursorVisuals + ?Sized>(&mut self, index: Option<usize>, visuals: &mut V) {
        self.move_to(index, visuals);
        #[cfg(feature = "tracing")]
        self.log_move("server");
    }

    /// Handle a navigation key. Returns `true` when the key was consumed.
    pub fn handle_key<G, V, S>(&mut self, key: NavKey, items: &G, visuals: &mut V, sink: &mut S) -> bool
    where
        G: GeometryQuery + ?Sized,
        V: CursorVisuals + ?Sized,
        S: MessageSink + ?Sized,
    {
        let Some(current) = self.current else {
            if let Some(first) = first_enabled(items) {
                self.select(Some(first), visuals, sink);
                #[cfg(feature = "tracing")]
                self.log_move("keyboard_first");
            }
            return true;
        };

        let target = match key {
            NavKey::Activate => {
                sink.submit(self.click_record(current));
                return true;
            }
            NavKey::Left => navigate_from(items, current, Direction::Left),
            NavKey::Right => navigate_from(items, current, Direction::Right),
            NavKey::Up => navigate_from(items, current, Direction::Up),
            NavKey::Down => navigate_from(items, current, Direction::Down),
            NavKey::Home => first_enabled(items),
            NavKey::End => last_enabled(items),
            NavKey::PageUp | NavKey::PageDown => None,
        };

        if let Some(target) = target
            && target != current
        {
            self.select(Some(target), visuals, sink);
            #[cfg(feature = "tracing")]
            self.log_move("keyboard_move");
        }
        true
    }

    /// Primary click on item `index`. Returns `false` for disabled items.
    pub fn click<G, V, S>(&mut self, index: usize, items: &G, visuals: &mut V, sink: &mut S) -> bool
    where
        G: GeometryQuery + ?Sized,
        V: CursorVisuals + ?Sized,
        S: MessageSink + ?Sized,
    {
        if !items.is_enabled(index) {
            return false;
        }
        if self.current != Some(index) {
            self.select(Some(index), visuals, sink);
            #[cfg(feature = "tracing")]
            self.log_move("click");
        }
        sink.submit(self.click_record(index));
        true
    }

    /// The list gained input focus.
    pub fn focus<V: CursorVisuals + ?Sized>(&mut self, visuals: &mut V) {
        self.has_focus = true;
        self.refresh(visuals);
    }

    /// The list lost input focus.
    pub fn blur<V: CursorVisuals + ?Sized>(&mut self, visuals: &mut V) {
        self.has_focus = false;
        self.refresh(visuals);
    }

    fn refresh<V: CursorVisuals + ?Sized>(&self, visuals: &mut V) {
        if let Some(current) = self.current {
            let target = self.item_element_id(current);
            visuals.apply_cursor_visual(&target, CursorVisual::for_focus(self.has_focus), &self.styles);
        }
    }

    fn move_to<V: CursorVisuals + ?Sized>(&mut self, index: Option<usize>, visuals: &mut V) {
        if let Some(previous) = self.current.take() {
            let target = self.item_element_id(previous);
            visuals.apply_cursor_visual(&target, CursorVisual::Cleared, &self.styles);
        }
        if let Some(index) = index {
            let target = self.item_element_id(index);
            visuals.apply_cursor_visual(&target, CursorVisual::for_focus(self.has_focus), &self.styles);
            visuals.reveal(&target);
            self.current = Some(index);
        }
    }

    fn click_record(&self, index: usize) -> Record {
        Record::new("itemClick")
            .with_bare("id", self.id.as_str())
            .with_int("number", wire_number(index))
    }

    #[cfg(feature = "tracing")]
    fn log_move(&self, action: &str) {
        tracing::debug!(
            message = "list.cursor",
            list = %self.id,
            action,
            current = self.current,
            focused = self.has_focus
        );
    }
}
