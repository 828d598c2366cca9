#![forbid(unsafe_code)]

//! DOM-backed surface capabilities.
//!
//! Each adapter reads the document on demand: nothing is cached between
//! calls, so geometry always reflects the current layout.

use rui_nav::{
    CursorStyles, CursorVisual, CursorVisuals, GridQuery, ItemGeometry, TabStyles, TabVisual,
    TabVisuals,
};
use rui_session::{DocumentLocation, EnvironmentFacts};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

use crate::resize::{ViewRect, ViewScroll, ViewSnapshot};

const ROOT_VIEW_ID: &str = "ruiRootView";
const VIEW_CLASS: &str = "ruiView";

fn is_disabled(element: &Element) -> bool {
    element.get_attribute("data-disabled").as_deref() == Some("1")
}

fn numeric_attribute(element: &Element, name: &str) -> usize {
    element
        .get_attribute(name)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

/// Cursor and tab markers applied as CSS classes.
#[derive(Debug, Clone)]
pub struct DomVisuals {
    document: Document,
}

impl DomVisuals {
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl CursorVisuals for DomVisuals {
    fn apply_cursor_visual(&mut self, target: &str, visual: CursorVisual, styles: &CursorStyles) {
        let Some(element) = self.document.get_element_by_id(target) else {
            return;
        };
        let classes = element.class_list();
        let _ = classes.remove_2(&styles.focused, &styles.blurred);
        if let Some(class) = styles.class_for(visual) {
            let _ = classes.add_1(class);
        }
    }

    fn reveal(&mut self, target: &str) {
        if let Some(element) = self.document.get_element_by_id(target) {
            element.scroll_into_view_with_bool(false);
        }
    }
}

impl TabVisuals for DomVisuals {
    fn apply_tab_visual(&mut self, tab: &str, visual: TabVisual, styles: &TabStyles) {
        let Some(element) = self.document.get_element_by_id(tab) else {
            return;
        };
        element.set_class_name(styles.class_for(visual));
        let page = element
            .get_attribute("data-view")
            .and_then(|view| self.document.get_element_by_id(&view))
            .and_then(|page| page.dyn_into::<HtmlElement>().ok());
        if let Some(page) = page {
            let visibility = match visual {
                TabVisual::Active => "",
                TabVisual::Inactive => "hidden",
            };
            let _ = page.style().set_property("visibility", visibility);
        }
    }
}

/// Item boxes of a list view, in collection order.
///
/// Items are the children of the list's first child element; coordinates
/// are offsets inside that container.
#[must_use]
pub fn list_items(document: &Document, list_id: &str) -> Vec<ItemGeometry> {
    let Some(container) = document
        .get_element_by_id(list_id)
        .and_then(|list| list.first_element_child())
    else {
        return Vec::new();
    };
    let children = container.children();
    (0..children.length())
        .filter_map(|index| children.item(index))
        .filter_map(|child| child.dyn_into::<HtmlElement>().ok())
        .map(|item| {
            ItemGeometry::new(
                item.offset_left(),
                item.offset_top(),
                item.offset_width(),
                item.offset_height(),
            )
            .with_enabled(!is_disabled(&item))
        })
        .collect()
}

/// Grid enablement read from cell and row elements of a table view.
#[derive(Debug, Clone)]
pub struct DomGrid {
    document: Document,
    table_id: String,
    rows: usize,
    columns: usize,
}

impl DomGrid {
    /// Grid of table `table_id`, sized by its `data-rows`/`data-columns`.
    #[must_use]
    pub fn read(document: &Document, table_id: &str) -> Self {
        let (rows, columns) = document
            .get_element_by_id(table_id)
            .map(|table| {
                (
                    numeric_attribute(&table, "data-rows"),
                    numeric_attribute(&table, "data-columns"),
                )
            })
            .unwrap_or_default();
        Self {
            document: document.clone(),
            table_id: table_id.to_owned(),
            rows,
            columns,
        }
    }

    fn enabled(&self, element_id: &str) -> bool {
        self.document
            .get_element_by_id(element_id)
            .is_some_and(|element| !is_disabled(&element))
    }
}

impl GridQuery for DomGrid {
    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn is_cell_enabled(&self, row: usize, column: usize) -> bool {
        row < self.rows
            && column < self.columns
            && self.enabled(&format!("{}-{row}-{column}", self.table_id))
    }

    fn is_row_enabled(&self, row: usize) -> bool {
        row < self.rows && self.enabled(&format!("{}-{row}", self.table_id))
    }
}

fn client_rect(element: &Element) -> ViewRect {
    let rect = element.get_bounding_client_rect();
    ViewRect::new(rect.left(), rect.top(), rect.width(), rect.height())
}

/// Scroll offsets and extent of an element.
#[must_use]
pub fn scroll_of(element: &Element) -> ViewScroll {
    ViewScroll {
        x: f64::from(element.scroll_left()),
        y: f64::from(element.scroll_top()),
        width: f64::from(element.scroll_width()),
        height: f64::from(element.scroll_height()),
    }
}

/// Root box and every `ruiView` element, for geometry reporting.
#[must_use]
pub fn view_snapshots(document: &Document) -> (Option<ViewRect>, Vec<ViewSnapshot>) {
    let root = document.get_element_by_id(ROOT_VIEW_ID).map(|root| client_rect(&root));
    let views = document.get_elements_by_class_name(VIEW_CLASS);
    let snapshots = (0..views.length())
        .filter_map(|index| views.item(index))
        .filter(|view| !view.id().is_empty())
        .map(|view| {
            ViewSnapshot::new(view.id(), client_rect(&view))
                .with_scroll(scroll_of(&view))
                .with_no_resize(view.has_attribute("data-noresize"))
        })
        .collect();
    (root, snapshots)
}

/// Location of the current page.
#[must_use]
pub fn document_location(window: &Window) -> DocumentLocation {
    let location = window.location();
    let port = location
        .port()
        .ok()
        .and_then(|port| port.parse::<u16>().ok());
    DocumentLocation::new(
        location.protocol().unwrap_or_else(|_| "http:".to_owned()),
        location.hostname().unwrap_or_default(),
        port,
        location.pathname().unwrap_or_else(|_| "/".to_owned()),
    )
}

/// Facts reported in `startSession`, read fresh on every call.
#[must_use]
pub fn environment_facts(window: &Window) -> EnvironmentFacts {
    let navigator = window.navigator();
    let document = window.document();

    let touch = document
        .as_ref()
        .and_then(Document::document_element)
        .is_some_and(|root| {
            js_sys::Reflect::has(&root, &wasm_bindgen::JsValue::from_str("ontouchstart"))
                .unwrap_or(false)
        })
        || navigator.max_touch_points() > 0;

    let direction = document
        .as_ref()
        .and_then(Document::body)
        .and_then(|body| window.get_computed_style(&body).ok().flatten())
        .and_then(|style| style.get_property_value("direction").ok())
        .filter(|direction| !direction.is_empty());

    let languages = navigator
        .languages()
        .iter()
        .filter_map(|language| language.as_string())
        .collect();

    let dark = window
        .match_media("(prefers-color-scheme: dark)")
        .ok()
        .flatten()
        .is_some_and(|query| query.matches());

    let pixel_ratio = window.device_pixel_ratio();

    let mut storage = Vec::new();
    if let Ok(Some(local)) = window.local_storage() {
        let length = local.length().unwrap_or(0);
        for index in 0..length {
            if let Ok(Some(key)) = local.key(index)
                && let Ok(Some(value)) = local.get_item(&key)
            {
                storage.push((key, value));
            }
        }
    }

    EnvironmentFacts {
        touch,
        direction,
        language: navigator.language(),
        languages,
        user_agent: navigator.user_agent().ok(),
        dark,
        pixel_ratio: (pixel_ratio > 0.0).then_some(pixel_ratio),
        storage,
    }
}
