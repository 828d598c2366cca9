#![forbid(unsafe_code)]

//! View geometry reporting.
//!
//! The server lays out views against the sizes the browser reports. After
//! every layout pass the surface takes a snapshot of the root view and of
//! each resizable view; [`ViewGeometryTracker::scan`] compares it with what
//! was last reported and produces at most two records:
//!
//! - `root-size{width,height}` when the root box changed,
//! - `resize{views=[view{id,x,y,width,height,scroll-x,scroll-y,scroll-width,scroll-height},…]}`
//!   listing only views whose box changed.
//!
//! Boxes with a zero or negative extent are never reported and never
//! remembered: a hidden view reports again once it becomes visible.

use std::collections::HashMap;

use rui_wire::{Record, Value};

/// Layout box in client coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewRect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the box covers any area.
    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Scroll offset and scrollable extent of a view.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewScroll {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Geometry of one view at scan time.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub id: String,
    pub rect: ViewRect,
    pub scroll: ViewScroll,
    /// Views marked `data-noresize` are skipped.
    pub no_resize: bool,
}

impl ViewSnapshot {
    #[must_use]
    pub fn new(id: impl Into<String>, rect: ViewRect) -> Self {
        Self {
            id: id.into(),
            rect,
            scroll: ViewScroll::default(),
            no_resize: false,
        }
    }

    #[must_use]
    pub fn with_scroll(mut self, scroll: ViewScroll) -> Self {
        self.scroll = scroll;
        self
    }

    #[must_use]
    pub fn with_no_resize(mut self, no_resize: bool) -> Self {
        self.no_resize = no_resize;
        self
    }

    fn to_value(&self) -> Value {
        Value::Record(
            Record::new("view")
                .with_bare("id", self.id.as_str())
                .with_float("x", self.rect.x)
                .with_float("y", self.rect.y)
                .with_float("width", self.rect.width)
                .with_float("height", self.rect.height)
                .with_float("scroll-x", self.scroll.x)
                .with_float("scroll-y", self.scroll.y)
                .with_float("scroll-width", self.scroll.width)
                .with_float("scroll-height", self.scroll.height),
        )
    }
}

/// Last reported geometry per view.
#[derive(Debug, Clone, Default)]
pub struct ViewGeometryTracker {
    root: Option<(f64, f64)>,
    views: HashMap<String, ViewRect>,
}

impl ViewGeometryTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Root size last reported, if any.
    #[must_use]
    pub fn root_size(&self) -> Option<(f64, f64)> {
        self.root
    }

    /// Box last reported for view `id`.
    #[must_use]
    pub fn reported(&self, id: &str) -> Option<ViewRect> {
        self.views.get(id).copied()
    }

    /// Number of views with a remembered box.
    #[must_use]
    pub fn tracked_views(&self) -> usize {
        self.views.len()
    }

    /// Drop the remembered box of a view removed from the page.
    pub fn forget(&mut self, id: &str) {
        self.views.remove(id);
    }

    /// Forget everything; the next scan reports every visible view.
    pub fn reset(&mut self) {
        self.root = None;
        self.views.clear();
    }

    /// Compare a snapshot with the last report and return the records to
    /// send, root size first.
    pub fn scan(&mut self, root: Option<ViewRect>, views: &[ViewSnapshot]) -> Vec<Record> {
        let mut records = Vec::with_capacity(2);

        if let Some(root) = root
            && root.is_visible()
            && self.root != Some((root.width, root.height))
        {
            self.root = Some((root.width, root.height));
            records.push(
                Record::new("root-size")
                    .with_float("width", root.width)
                    .with_float("height", root.height),
            );
        }

        let mut changed = Vec::new();
        for view in views {
            if view.no_resize || !view.rect.is_visible() {
                continue;
            }
            if self.views.get(&view.id) == Some(&view.rect) {
                continue;
            }
            self.views.insert(view.id.clone(), view.rect);
            changed.push(view.to_value());
        }
        if !changed.is_empty() {
            tracing::debug!(message = "geometry.resize", views = changed.len());
            records.push(Record::new("resize").with_list("views", changed));
        }
        records
    }
}
