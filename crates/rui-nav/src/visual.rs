#![forbid(unsafe_code)]

//! Cursor and tab visual states.
//!
//! Controllers decide *which* visual state an element is in; the surface
//! decides what that looks like. The style table travels with every call so
//! the surface never looks styles up by attribute name.
//!
//! | state     | list default class    | table default class          |
//! |-----------|-----------------------|------------------------------|
//! | `Focused` | `ruiListItemFocused`  | `ruiCurrentTableCellFocused` |
//! | `Blurred` | `ruiListItemSelected` | `ruiCurrentTableCell`        |
//! | `Cleared` | neither               | neither                      |

/// Visual state of a cursor target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorVisual {
    /// Current item of a container that holds input focus.
    Focused,
    /// Current item of a container without input focus.
    Blurred,
    /// Not the current item.
    Cleared,
}

impl CursorVisual {
    /// Marker state for a current item.
    #[must_use]
    pub const fn for_focus(has_focus: bool) -> Self {
        if has_focus {
            Self::Focused
        } else {
            Self::Blurred
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Focused => "focused",
            Self::Blurred => "blurred",
            Self::Cleared => "cleared",
        }
    }
}

/// Class names for the two marker states.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CursorStyles {
    pub focused: String,
    pub blurred: String,
}

impl CursorStyles {
    #[must_use]
    pub fn new(focused: impl Into<String>, blurred: impl Into<String>) -> Self {
        Self {
            focused: focused.into(),
            blurred: blurred.into(),
        }
    }

    /// Defaults for list views.
    #[must_use]
    pub fn list() -> Self {
        Self::new("ruiListItemFocused", "ruiListItemSelected")
    }

    /// Defaults for table views.
    #[must_use]
    pub fn table() -> Self {
        Self::new("ruiCurrentTableCellFocused", "ruiCurrentTableCell")
    }

    /// Class for a state; `None` means both classes are removed.
    #[must_use]
    pub fn class_for(&self, visual: CursorVisual) -> Option<&str> {
        match visual {
            CursorVisual::Focused => Some(&self.focused),
            CursorVisual::Blurred => Some(&self.blurred),
            CursorVisual::Cleared => None,
        }
    }
}

impl Default for CursorStyles {
    fn default() -> Self {
        Self::list()
    }
}

/// Surface capability for cursor visuals.
pub trait CursorVisuals {
    /// Put element `target` into `visual`, removing the other marker class.
    fn apply_cursor_visual(&mut self, target: &str, visual: CursorVisual, styles: &CursorStyles);

    /// Scroll element `target` into view if needed.
    fn reveal(&mut self, target: &str);
}

/// Visual state of a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabVisual {
    Active,
    Inactive,
}

/// Class names for tab states.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TabStyles {
    pub active: String,
    pub inactive: String,
}

impl TabStyles {
    #[must_use]
    pub fn new(active: impl Into<String>, inactive: impl Into<String>) -> Self {
        Self {
            active: active.into(),
            inactive: inactive.into(),
        }
    }

    #[must_use]
    pub fn class_for(&self, visual: TabVisual) -> &str {
        match visual {
            TabVisual::Active => &self.active,
            TabVisual::Inactive => &self.inactive,
        }
    }
}

impl Default for TabStyles {
    fn default() -> Self {
        Self::new("ruiCurrentTab", "ruiTab")
    }
}

/// Surface capability for tab visuals.
///
/// An inactive tab's page is hidden, an active tab's page is shown.
pub trait TabVisuals {
    fn apply_tab_visual(&mut self, tab: &str, visual: TabVisual, styles: &TabStyles);
}
