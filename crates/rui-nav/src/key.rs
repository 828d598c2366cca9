#![forbid(unsafe_code)]

//! Navigation keys recognized by cursor controllers.

/// A key that drives a list or table cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavKey {
    /// Enter or Space.
    Activate,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
}

impl NavKey {
    /// Map a DOM `key` value, falling back to the legacy `keyCode` when the
    /// browser reports no key name.
    #[must_use]
    pub fn from_dom(key: Option<&str>, key_code: u32) -> Option<Self> {
        match key.filter(|key| !key.is_empty()) {
            Some(key) => Self::from_key_name(key),
            None => Self::from_key_code(key_code),
        }
    }

    fn from_key_name(key: &str) -> Option<Self> {
        Some(match key {
            " " | "Enter" => Self::Activate,
            "ArrowLeft" => Self::Left,
            "ArrowRight" => Self::Right,
            "ArrowUp" => Self::Up,
            "ArrowDown" => Self::Down,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            _ => return None,
        })
    }

    fn from_key_code(code: u32) -> Option<Self> {
        Some(match code {
            13 | 32 => Self::Activate,
            33 => Self::PageUp,
            34 => Self::PageDown,
            35 => Self::End,
            36 => Self::Home,
            37 => Self::Left,
            38 => Self::Up,
            39 => Self::Right,
            40 => Self::Down,
            _ => return None,
        })
    }

    /// Arrow keys and Home/End/PageUp/PageDown.
    #[must_use]
    pub const fn is_navigation(self) -> bool {
        !matches!(self, Self::Activate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names() {
        assert_eq!(NavKey::from_dom(Some("Enter"), 0), Some(NavKey::Activate));
        assert_eq!(NavKey::from_dom(Some(" "), 0), Some(NavKey::Activate));
        assert_eq!(NavKey::from_dom(Some("ArrowDown"), 0), Some(NavKey::Down));
        assert_eq!(NavKey::from_dom(Some("a"), 40), None);
    }

    #[test]
    fn legacy_key_codes() {
        assert_eq!(NavKey::from_dom(None, 13), Some(NavKey::Activate));
        assert_eq!(NavKey::from_dom(Some(""), 36), Some(NavKey::Home));
        assert_eq!(NavKey::from_dom(None, 39), Some(NavKey::Right));
        assert_eq!(NavKey::from_dom(None, 65), None);
    }

    #[test]
    fn navigation_classification() {
        assert!(!NavKey::Activate.is_navigation());
        assert!(NavKey::PageDown.is_navigation());
    }
}
