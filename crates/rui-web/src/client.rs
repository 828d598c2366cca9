#![forbid(unsafe_code)]

//! Page-level client: one session plus the cursors of the views on the page.
//!
//! Cursor controllers are registered by element id when the server creates
//! a list, table, or tabs layout. DOM handlers then forward input here by
//! id; unknown ids are ignored so handlers of views removed mid-flight do
//! nothing. Every record produced by a controller goes through the session,
//! which adds the session id and queues it while disconnected.

use std::collections::HashMap;

use rui_nav::{
    CursorVisuals, GeometryQuery, GridQuery, ListCursor, NavKey, TableCursor, TabVisuals,
    TabsCursor, parse_cell_id, parse_row_id,
};
use rui_session::{ConnectionState, Session, Transport};
use rui_wire::event::{
    details_open, file_loaded, file_loading_error, file_selected, focus_event, lost_focus_event,
    scroll_event, text_changed,
};
use rui_wire::{
    CommandInterpreter, FileInfo, InboundCommand, KeyInput, MouseInput, PointerInput, Record,
    TouchInput, parse_record,
};

use crate::error::ClientError;
use crate::resize::{ViewGeometryTracker, ViewRect, ViewScroll, ViewSnapshot};

/// Client state for one page.
pub struct WebClient<T: Transport> {
    session: Session<T>,
    lists: HashMap<String, ListCursor>,
    tables: HashMap<String, TableCursor>,
    tabs: HashMap<String, TabsCursor>,
    geometry: ViewGeometryTracker,
}

impl<T: Transport> core::fmt::Debug for WebClient<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebClient")
            .field("session", &self.session)
            .field("lists", &self.lists.len())
            .field("tables", &self.tables.len())
            .field("tabs", &self.tabs.len())
            .finish_non_exhaustive()
    }
}

fn unknown(kind: &'static str, id: &str) -> bool {
    tracing::debug!(message = "client.unknown_target", kind, id);
    false
}

impl<T: Transport> WebClient<T> {
    #[must_use]
    pub fn new(session: Session<T>) -> Self {
        Self {
            session,
            lists: HashMap::new(),
            tables: HashMap::new(),
            tabs: HashMap::new(),
            geometry: ViewGeometryTracker::new(),
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<T> {
        &mut self.session
    }

    #[must_use]
    pub fn geometry(&self) -> &ViewGeometryTracker {
        &self.geometry
    }

    // ── Session lifecycle ───────────────────────────────────────────────

    pub fn start(&mut self, now_ms: u64) {
        self.session.start(now_ms);
    }

    /// Pending inbound commands, after processing transport events and
    /// timers.
    pub fn poll(&mut self, now_ms: u64) -> Vec<InboundCommand> {
        self.session.poll(now_ms)
    }

    pub fn pump<I>(&mut self, now_ms: u64, interpreter: &mut I) -> usize
    where
        I: CommandInterpreter + ?Sized,
    {
        self.session.pump(now_ms, interpreter)
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.session.next_deadline()
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.session.state()
    }

    pub fn window_focus(&mut self, now_ms: u64) {
        self.session.focus_gained(now_ms);
    }

    pub fn window_blur(&mut self, now_ms: u64) {
        self.session.focus_lost(now_ms);
    }

    pub fn unload(&mut self, now_ms: u64) {
        self.session.unload(now_ms);
    }

    pub fn close(&mut self, now_ms: u64) {
        self.session.close(now_ms);
    }

    /// Submit a record written by a page script.
    ///
    /// The text is parsed first so malformed input never reaches the
    /// server; any `session` field is replaced with the current id.
    pub fn send_text(&mut self, text: &str) -> Result<(), ClientError> {
        let record = parse_record(text)?;
        self.session.submit(record)?;
        Ok(())
    }

    /// Submit an already built record.
    pub fn send(&mut self, record: Record) -> Result<(), ClientError> {
        self.session.submit(record)?;
        Ok(())
    }

    // ── Registry ────────────────────────────────────────────────────────

    /// Register a list cursor under its element id, replacing any previous one.
    pub fn register_list(&mut self, cursor: ListCursor) -> Option<ListCursor> {
        self.lists.insert(cursor.id().to_owned(), cursor)
    }

    pub fn register_table(&mut self, cursor: TableCursor) -> Option<TableCursor> {
        self.tables.insert(cursor.id().to_owned(), cursor)
    }

    pub fn register_tabs(&mut self, cursor: TabsCursor) -> Option<TabsCursor> {
        self.tabs.insert(cursor.id().to_owned(), cursor)
    }

    /// Forget everything known about view `id`. Returns `true` if a cursor
    /// was registered under it.
    pub fn unregister(&mut self, id: &str) -> bool {
        self.geometry.forget(id);
        let list = self.lists.remove(id).is_some();
        let table = self.tables.remove(id).is_some();
        let tabs = self.tabs.remove(id).is_some();
        list || table || tabs
    }

    #[must_use]
    pub fn list(&self, id: &str) -> Option<&ListCursor> {
        self.lists.get(id)
    }

    #[must_use]
    pub fn table(&self, id: &str) -> Option<&TableCursor> {
        self.tables.get(id)
    }

    #[must_use]
    pub fn tabs(&self, id: &str) -> Option<&TabsCursor> {
        self.tabs.get(id)
    }

    // ── Focus ───────────────────────────────────────────────────────────

    /// Element `id` gained input focus. Updates cursor markers of a
    /// registered list or table and reports `focus-event`.
    pub fn element_focus<V>(&mut self, id: &str, visuals: &mut V)
    where
        V: CursorVisuals + ?Sized,
    {
        if let Some(list) = self.lists.get_mut(id) {
            list.focus(visuals);
        } else if let Some(table) = self.tables.get_mut(id) {
            table.focus(visuals);
        }
        self.report(focus_event(id));
    }

    /// Element `id` lost input focus.
    pub fn element_blur<V>(&mut self, id: &str, visuals: &mut V)
    where
        V: CursorVisuals + ?Sized,
    {
        if let Some(list) = self.lists.get_mut(id) {
            list.blur(visuals);
        } else if let Some(table) = self.tables.get_mut(id) {
            table.blur(visuals);
        }
        self.report(lost_focus_event(id));
    }

    // ── Lists ───────────────────────────────────────────────────────────

    /// Navigation key on list `id`. Returns `true` when consumed.
    pub fn list_key<G, V>(&mut self, id: &str, key: NavKey, items: &G, visuals: &mut V) -> bool
    where
        G: GeometryQuery + ?Sized,
        V: CursorVisuals + ?Sized,
    {
        let Some(list) = self.lists.get_mut(id) else {
            return unknown("list", id);
        };
        list.handle_key(key, items, visuals, &mut self.session)
    }

    /// Click on the item with element id `<list>-<index>`.
    pub fn list_item_click<G, V>(&mut self, item_id: &str, items: &G, visuals: &mut V) -> bool
    where
        G: GeometryQuery + ?Sized,
        V: CursorVisuals + ?Sized,
    {
        let Some((id, index)) = parse_row_id(item_id) else {
            return unknown("list item", item_id);
        };
        let Some(list) = self.lists.get_mut(id) else {
            return unknown("list", id);
        };
        list.click(index, items, visuals, &mut self.session)
    }

    /// Server-driven cursor placement on list `id`.
    pub fn set_list_current<V>(&mut self, id: &str, index: Option<usize>, visuals: &mut V) -> bool
    where
        V: CursorVisuals + ?Sized,
    {
        let Some(list) = self.lists.get_mut(id) else {
            return unknown("list", id);
        };
        list.set_current(index, visuals);
        true
    }

    // ── Tables ──────────────────────────────────────────────────────────

    /// Navigation key on table `id`. Returns `true` when consumed.
    pub fn table_key<G, V>(&mut self, id: &str, key: NavKey, grid: &G, visuals: &mut V) -> bool
    where
        G: GridQuery + ?Sized,
        V: CursorVisuals + ?Sized,
    {
        let Some(table) = self.tables.get_mut(id) else {
            return unknown("table", id);
        };
        table.handle_key(key, grid, visuals, &mut self.session)
    }

    /// Click on a table cell (`<table>-<row>-<column>`) or row
    /// (`<table>-<row>`).
    ///
    /// The cell form is tried first; a row id whose table id itself ends in
    /// `-<number>` resolves to a row only when no table matches the cell
    /// reading.
    pub fn table_click<G, V>(&mut self, element_id: &str, grid: &G, visuals: &mut V) -> bool
    where
        G: GridQuery + ?Sized,
        V: CursorVisuals + ?Sized,
    {
        if let Some((id, row, column)) = parse_cell_id(element_id)
            && let Some(table) = self.tables.get_mut(id)
        {
            table.cell_click(row, column, grid, visuals, &mut self.session);
            return true;
        }
        if let Some((id, row)) = parse_row_id(element_id)
            && let Some(table) = self.tables.get_mut(id)
        {
            table.row_click(row, grid, visuals, &mut self.session);
            return true;
        }
        unknown("table element", element_id)
    }

    /// Server-driven cursor placement on table `id`.
    pub fn set_table_cursor<G, V>(
        &mut self,
        id: &str,
        row: usize,
        column: usize,
        grid: &G,
        visuals: &mut V,
    ) -> bool
    where
        G: GridQuery + ?Sized,
        V: CursorVisuals + ?Sized,
    {
        let Some(table) = self.tables.get_mut(id) else {
            return unknown("table", id);
        };
        table.set_cursor_by_server(row, column, grid, visuals, &mut self.session);
        true
    }

    // ── Tabs ────────────────────────────────────────────────────────────

    /// Click on the tab with element id `<layout>-<number>`.
    pub fn tab_click<V>(&mut self, tab_id: &str, visuals: &mut V) -> bool
    where
        V: TabVisuals + ?Sized,
    {
        let Some((id, number)) = parse_row_id(tab_id) else {
            return unknown("tab", tab_id);
        };
        let Some(tabs) = self.tabs.get_mut(id) else {
            return unknown("tabs", id);
        };
        tabs.activate(number, visuals, &mut self.session);
        true
    }

    /// Key on a tab. Only Enter/Space activate.
    pub fn tab_key<V>(&mut self, tab_id: &str, key: NavKey, visuals: &mut V) -> bool
    where
        V: TabVisuals + ?Sized,
    {
        let Some((id, number)) = parse_row_id(tab_id) else {
            return unknown("tab", tab_id);
        };
        let Some(tabs) = self.tabs.get_mut(id) else {
            return unknown("tabs", id);
        };
        tabs.handle_key(number, key, visuals, &mut self.session)
    }

    /// Close button of a tab clicked.
    pub fn tab_close_click(&mut self, tab_id: &str) -> bool {
        let Some((id, number)) = parse_row_id(tab_id) else {
            return unknown("tab", tab_id);
        };
        let Some(tabs) = self.tabs.get(id) else {
            return unknown("tabs", id);
        };
        tabs.close_clicked(number, &mut self.session);
        true
    }

    /// Server-driven tab switch.
    pub fn set_current_tab<V>(&mut self, id: &str, number: usize, visuals: &mut V) -> bool
    where
        V: TabVisuals + ?Sized,
    {
        let Some(tabs) = self.tabs.get_mut(id) else {
            return unknown("tabs", id);
        };
        tabs.set_current(number, visuals);
        true
    }

    // ── Input and geometry reports ──────────────────────────────────────

    fn report(&mut self, record: Record) {
        if let Err(err) = self.session.submit(record) {
            tracing::debug!(message = "client.report_dropped", error = %err);
        }
    }

    pub fn report_key(&mut self, input: &KeyInput) {
        self.report(input.to_record());
    }

    pub fn report_mouse(&mut self, input: &MouseInput) {
        self.report(input.to_record());
    }

    pub fn report_pointer(&mut self, input: &PointerInput) {
        self.report(input.to_record());
    }

    pub fn report_touch(&mut self, input: &TouchInput) {
        self.report(input.to_record());
    }

    pub fn report_scroll(&mut self, id: &str, scroll: ViewScroll) {
        self.report(scroll_event(id, scroll.x, scroll.y, scroll.width, scroll.height));
    }

    pub fn report_details_open(&mut self, id: &str, open: bool) {
        self.report(details_open(id, open));
    }

    pub fn report_text_changed(&mut self, id: &str, text: &str) {
        self.report(text_changed(id, text));
    }

    pub fn report_files_selected(&mut self, id: &str, files: &[FileInfo]) {
        self.report(file_selected(id, files));
    }

    pub fn report_file_loaded(&mut self, id: &str, index: i64, file: &FileInfo, data: &str) {
        self.report(file_loaded(id, index, file, data));
    }

    pub fn report_file_loading_error(&mut self, id: &str, index: i64, error: &str) {
        self.report(file_loading_error(id, index, error));
    }

    /// Report changed root and view geometry. Returns the number of records
    /// submitted (0, 1, or 2).
    pub fn report_geometry(&mut self, root: Option<ViewRect>, views: &[ViewSnapshot]) -> usize {
        let records = self.geometry.scan(root, views);
        let count = records.len();
        for record in records {
            self.report(record);
        }
        count
    }

    /// Connection summary for host diagnostics.
    #[must_use]
    pub fn status_json(&self) -> serde_json::Value {
        let stats = self.session.stats();
        serde_json::json!({
            "state": self.session.state().as_str(),
            "session_id": self.session.session_id(),
            "next_deadline_ms": self.session.next_deadline(),
            "sent": stats.sent,
            "queued": stats.queued,
            "reconnect_attempts": stats.reconnect_attempts,
            "inbound_commands": stats.inbound_commands,
            "closes": stats.closes,
            "lists": self.lists.len(),
            "tables": self.tables.len(),
            "tabs": self.tabs.len(),
        })
    }
}
