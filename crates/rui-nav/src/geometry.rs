#![forbid(unsafe_code)]

//! Read-only geometry of a navigable collection.
//!
//! Items are addressed by their index in collection order. Coordinates are
//! integer pixels in the collection's local space, supplied by the
//! rendering surface; nothing here walks a containment hierarchy.

/// Bounding box and enablement of one item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemGeometry {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    pub enabled: bool,
}

impl ItemGeometry {
    /// An enabled item.
    #[must_use]
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
            enabled: true,
        }
    }

    /// Builder: set enablement.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[inline]
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.left.saturating_add(self.width)
    }

    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.top.saturating_add(self.height)
    }
}

/// Geometry capability provided by the rendering surface.
pub trait GeometryQuery {
    /// Number of items in collection order.
    fn item_count(&self) -> usize;

    /// Geometry of item `index`, or `None` if the item no longer exists.
    fn query_geometry(&self, index: usize) -> Option<ItemGeometry>;

    /// Whether item `index` exists and is enabled.
    fn is_enabled(&self, index: usize) -> bool {
        self.query_geometry(index).is_some_and(|item| item.enabled)
    }
}

impl GeometryQuery for [ItemGeometry] {
    fn item_count(&self) -> usize {
        self.len()
    }

    fn query_geometry(&self, index: usize) -> Option<ItemGeometry> {
        self.get(index).copied()
    }
}

impl GeometryQuery for Vec<ItemGeometry> {
    fn item_count(&self) -> usize {
        self.len()
    }

    fn query_geometry(&self, index: usize) -> Option<ItemGeometry> {
        self.get(index).copied()
    }
}

impl<G: GeometryQuery + ?Sized> GeometryQuery for &G {
    fn item_count(&self) -> usize {
        (**self).item_count()
    }

    fn query_geometry(&self, index: usize) -> Option<ItemGeometry> {
        (**self).query_geometry(index)
    }
}
