#![forbid(unsafe_code)]

//! Tabs layout cursor.
//!
//! Tab element ids are `<layout>-<number>`. Activating a tab swaps the
//! active/inactive visuals of the old and new tab and reports
//! `tabClick{id,number}`; the close button reports `tabCloseClick`.

use rui_wire::{MessageSink, Record};

use crate::key::NavKey;
use crate::visual::{TabStyles, TabVisual, TabVisuals};
use crate::wire_number;

/// Current tab of one tabs layout.
#[derive(Debug, Clone)]
pub struct TabsCursor {
    id: String,
    current: usize,
    styles: TabStyles,
}

impl TabsCursor {
    #[must_use]
    pub fn new(id: impl Into<String>, current: usize) -> Self {
        Self {
            id: id.into(),
            current,
            styles: TabStyles::default(),
        }
    }

    #[must_use]
    pub fn with_styles(mut self, styles: TabStyles) -> Self {
        self.styles = styles;
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn tab_element_id(&self, number: usize) -> String {
        format!("{}-{number}", self.id)
    }

    /// Switch tabs without reporting. Used for server-driven changes.
    pub fn set_current<V: TabVisuals + ?Sized>(&mut self, number: usize, visuals: &mut V) {
        if number == self.current {
            return;
        }
        let previous = self.tab_element_id(self.current);
        visuals.apply_tab_visual(&previous, TabVisual::Inactive, &self.styles);
        let next = self.tab_element_id(number);
        visuals.apply_tab_visual(&next, TabVisual::Active, &self.styles);
        self.current = number;
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "tabs.switch", tabs = %self.id, current = number);
    }

    /// User activated tab `number` (click or Enter/Space).
    pub fn activate<V, S>(&mut self, number: usize, visuals: &mut V, sink: &mut S)
    where
        V: TabVisuals + ?Sized,
        S: MessageSink + ?Sized,
    {
        self.set_current(number, visuals);
        sink.submit(
            Record::new("tabClick")
                .with_bare("id", self.id.as_str())
                .with_int("number", wire_number(number)),
        );
    }

    /// Key pressed on tab `number`. Only Enter/Space activate.
    pub fn handle_key<V, S>(&mut self, number: usize, key: NavKey, visuals: &mut V, sink: &mut S) -> bool
    where
        V: TabVisuals + ?Sized,
        S: MessageSink + ?Sized,
    {
        if key != NavKey::Activate {
            return false;
        }
        self.activate(number, visuals, sink);
        true
    }

    /// Close button of tab `number` clicked.
    pub fn close_clicked<S: MessageSink + ?Sized>(&self, number: usize, sink: &mut S) {
        sink.submit(
            Record::new("tabCloseClick")
                .with_bare("id", self.id.as_str())
                .with_int("number", wire_number(number)),
        );
    }
}
