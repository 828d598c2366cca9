#![forbid(unsafe_code)]

//! Recording surface for headless hosts.

use crate::visual::{CursorStyles, CursorVisual, CursorVisuals, TabStyles, TabVisual, TabVisuals};

/// One visual change requested by a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualChange {
    Cursor {
        target: String,
        visual: CursorVisual,
        class: Option<String>,
    },
    Reveal {
        target: String,
    },
    Tab {
        tab: String,
        visual: TabVisual,
        class: String,
    },
}

/// Surface that records every change instead of drawing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisualLog {
    changes: Vec<VisualChange>,
}

impl VisualLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn changes(&self) -> &[VisualChange] {
        &self.changes
    }

    /// Take the recorded changes, leaving the log empty.
    pub fn drain(&mut self) -> Vec<VisualChange> {
        std::mem::take(&mut self.changes)
    }

    /// Latest cursor state recorded for `target`.
    #[must_use]
    pub fn cursor_state(&self, target: &str) -> Option<CursorVisual> {
        self.changes.iter().rev().find_map(|change| match change {
            VisualChange::Cursor {
                target: t, visual, ..
            } if t == target => Some(*visual),
            _ => None,
        })
    }

    /// Latest tab state recorded for `tab`.
    #[must_use]
    pub fn tab_state(&self, tab: &str) -> Option<TabVisual> {
        self.changes.iter().rev().find_map(|change| match change {
            VisualChange::Tab { tab: t, visual, .. } if t == tab => Some(*visual),
            _ => None,
        })
    }
}

impl CursorVisuals for VisualLog {
    fn apply_cursor_visual(&mut self, target: &str, visual: CursorVisual, styles: &CursorStyles) {
        self.changes.push(VisualChange::Cursor {
            target: target.to_owned(),
            visual,
            class: styles.class_for(visual).map(str::to_owned),
        });
    }

    fn reveal(&mut self, target: &str) {
        self.changes.push(VisualChange::Reveal {
            target: target.to_owned(),
        });
    }
}

impl TabVisuals for VisualLog {
    fn apply_tab_visual(&mut self, tab: &str, visual: TabVisual, styles: &TabStyles) {
        self.changes.push(VisualChange::Tab {
            tab: tab.to_owned(),
            visual,
            class: styles.class_for(visual).to_owned(),
        });
    }
}
