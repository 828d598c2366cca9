#![forbid(unsafe_code)]

//! `wasm-bindgen` surface of the client bundle.
//!
//! The page owns the event loop: DOM handlers call into [`RuiClient`], and
//! the page calls [`RuiClient::poll`] whenever the socket wakes it or the
//! reconnect deadline passes. Inbound command scripts are handed to the
//! evaluator function given at construction.

use js_sys::{Array, Function};
use rui_nav::{
    ListCursor, NavKey, TableCursor, TableMode, TabsCursor, parse_cell_id, parse_row_id,
};
use rui_session::{Session, SessionConfig};
use rui_wire::{
    KeyInput, KeyPhase, Modifiers, MouseData, MouseInput, MouseKind, PointerInput, PointerKind,
    TouchInput, TouchKind, TouchPoint,
};
use wasm_bindgen::prelude::*;
use web_sys::{Document, KeyboardEvent, MouseEvent, PointerEvent, TouchEvent, Window};
use web_time::Instant;

use crate::client::WebClient;
use crate::dom::{
    DomGrid, DomVisuals, document_location, environment_facts, list_items, scroll_of,
    view_snapshots,
};
use crate::files::{parse_file_info, parse_file_list};
use crate::socket::WebSocketTransport;

fn js_error(err: impl core::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn mouse_kind(event_type: &str) -> Option<MouseKind> {
    Some(match event_type {
        "mousedown" => MouseKind::Down,
        "mouseup" => MouseKind::Up,
        "mousemove" => MouseKind::Move,
        "mouseover" => MouseKind::Over,
        "mouseout" => MouseKind::Out,
        "click" => MouseKind::Click,
        "dblclick" => MouseKind::DoubleClick,
        "contextmenu" => MouseKind::ContextMenu,
        _ => return None,
    })
}

fn pointer_kind(event_type: &str) -> Option<PointerKind> {
    Some(match event_type {
        "pointerdown" => PointerKind::Down,
        "pointerup" => PointerKind::Up,
        "pointermove" => PointerKind::Move,
        "pointercancel" => PointerKind::Cancel,
        "pointerover" => PointerKind::Over,
        "pointerout" => PointerKind::Out,
        _ => return None,
    })
}

fn touch_kind(event_type: &str) -> Option<TouchKind> {
    Some(match event_type {
        "touchstart" => TouchKind::Start,
        "touchend" => TouchKind::End,
        "touchmove" => TouchKind::Move,
        "touchcancel" => TouchKind::Cancel,
        _ => return None,
    })
}

fn nav_key(event: &KeyboardEvent) -> Option<NavKey> {
    let key = event.key();
    NavKey::from_dom(Some(key.as_str()), event.key_code())
}

fn table_mode(mode: &str) -> TableMode {
    match mode {
        "row" => TableMode::Row,
        "cell" => TableMode::Cell,
        _ => TableMode::None,
    }
}

/// Browser client bound to the page's location.
#[wasm_bindgen]
pub struct RuiClient {
    client: WebClient<WebSocketTransport>,
    evaluator: Function,
    document: Document,
    visuals: DomVisuals,
    epoch: Instant,
}

impl RuiClient {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Top-left corner of element `id` in client coordinates.
    fn origin(&self, id: &str) -> (f64, f64) {
        self.document
            .get_element_by_id(id)
            .map(|element| {
                let rect = element.get_bounding_client_rect();
                (rect.left(), rect.top())
            })
            .unwrap_or_default()
    }

    fn mouse_data(&self, id: &str, event: &MouseEvent) -> MouseData {
        let (left, top) = self.origin(id);
        let client_x = f64::from(event.client_x());
        let client_y = f64::from(event.client_y());
        MouseData {
            time_stamp: event.time_stamp(),
            button: i64::from(event.button()),
            buttons: i64::from(event.buttons()),
            x: client_x - left,
            y: client_y - top,
            client_x,
            client_y,
            screen_x: f64::from(event.screen_x()),
            screen_y: f64::from(event.screen_y()),
            mods: Modifiers::from_dom(
                event.ctrl_key(),
                event.shift_key(),
                event.alt_key(),
                event.meta_key(),
            ),
        }
    }

    fn table_id_of<'a>(&self, element_id: &'a str) -> Option<&'a str> {
        if let Some((id, _, _)) = parse_cell_id(element_id)
            && self.client.table(id).is_some()
        {
            return Some(id);
        }
        parse_row_id(element_id).map(|(id, _)| id)
    }
}

#[wasm_bindgen]
impl RuiClient {
    /// Create a client for the current page. `evaluator` receives each
    /// inbound command script; `wake` is called after every socket event.
    #[wasm_bindgen(constructor)]
    pub fn new(evaluator: Function, wake: Option<Function>) -> Result<RuiClient, JsValue> {
        let window: Window = web_sys::window().ok_or_else(|| js_error("no window"))?;
        let document = window.document().ok_or_else(|| js_error("no document"))?;
        let mut transport = WebSocketTransport::new();
        if let Some(wake) = wake {
            transport = transport.with_wake(wake);
        }
        let location = document_location(&window);
        let probe_window = window.clone();
        let session = Session::new(
            transport,
            SessionConfig::default(),
            &location,
            move || environment_facts(&probe_window),
        );
        Ok(Self {
            client: WebClient::new(session),
            evaluator,
            visuals: DomVisuals::new(document.clone()),
            document,
            epoch: Instant::now(),
        })
    }

    pub fn start(&mut self) {
        let now = self.now_ms();
        self.client.start(now);
    }

    /// Process socket events and timers, then evaluate inbound commands in
    /// order. Returns the number of commands evaluated.
    pub fn poll(&mut self) -> u32 {
        let now = self.now_ms();
        let commands = self.client.poll(now);
        let mut evaluated = 0u32;
        for command in &commands {
            match self
                .evaluator
                .call1(&JsValue::NULL, &JsValue::from_str(command.script()))
            {
                Ok(_) => evaluated += 1,
                Err(err) => tracing::warn!(
                    message = "client.command_failed",
                    seq = command.seq(),
                    error = ?err
                ),
            }
        }
        evaluated
    }

    /// Milliseconds until the reconnect timer is due, if one is pending.
    #[wasm_bindgen(js_name = nextDeadline)]
    pub fn next_deadline(&self) -> Option<f64> {
        let deadline = self.client.next_deadline()?;
        Some(deadline.saturating_sub(self.now_ms()) as f64)
    }

    #[wasm_bindgen(js_name = windowFocus)]
    pub fn window_focus(&mut self) {
        let now = self.now_ms();
        self.client.window_focus(now);
    }

    #[wasm_bindgen(js_name = windowBlur)]
    pub fn window_blur(&mut self) {
        let now = self.now_ms();
        self.client.window_blur(now);
    }

    pub fn unload(&mut self) {
        let now = self.now_ms();
        self.client.unload(now);
    }

    pub fn close(&mut self) {
        let now = self.now_ms();
        self.client.close(now);
    }

    /// Called by the server's `sessionID(...)` command.
    #[wasm_bindgen(js_name = setSessionId)]
    pub fn set_session_id(&mut self, id: String) {
        self.client.session_mut().assign_session_id(id);
    }

    /// Called by the server's `restartSession()` command.
    #[wasm_bindgen(js_name = restartSession)]
    pub fn restart_session(&mut self) {
        let now = self.now_ms();
        self.client.session_mut().restart(now);
    }

    /// Submit a record written by a page script.
    #[wasm_bindgen(js_name = sendMessage)]
    pub fn send_message(&mut self, text: &str) -> Result<(), JsValue> {
        self.client.send_text(text).map_err(js_error)
    }

    // -- registry ----------------------------------------------------------

    #[wasm_bindgen(js_name = registerList)]
    pub fn register_list(&mut self, id: String) {
        self.client.register_list(ListCursor::new(id));
    }

    /// `mode` is `"row"`, `"cell"`, or anything else for no cursor.
    #[wasm_bindgen(js_name = registerTable)]
    pub fn register_table(&mut self, id: String, mode: &str) {
        self.client.register_table(TableCursor::new(id, table_mode(mode)));
    }

    #[wasm_bindgen(js_name = registerTabs)]
    pub fn register_tabs(&mut self, id: String, current: u32) {
        self.client.register_tabs(TabsCursor::new(id, current as usize));
    }

    pub fn unregister(&mut self, id: &str) -> bool {
        self.client.unregister(id)
    }

    // -- focus -------------------------------------------------------------

    #[wasm_bindgen(js_name = elementFocus)]
    pub fn element_focus(&mut self, id: &str) {
        self.client.element_focus(id, &mut self.visuals);
    }

    #[wasm_bindgen(js_name = elementBlur)]
    pub fn element_blur(&mut self, id: &str) {
        self.client.element_blur(id, &mut self.visuals);
    }

    // -- lists -------------------------------------------------------------

    /// Returns `true` when the key was consumed; the page then calls
    /// `preventDefault`.
    #[wasm_bindgen(js_name = listKeyDown)]
    pub fn list_key_down(&mut self, id: &str, event: &KeyboardEvent) -> bool {
        let Some(key) = nav_key(event) else {
            return false;
        };
        let items = list_items(&self.document, id);
        self.client.list_key(id, key, &items, &mut self.visuals)
    }

    #[wasm_bindgen(js_name = listItemClick)]
    pub fn list_item_click(&mut self, item_id: &str) -> bool {
        let Some((id, _)) = parse_row_id(item_id) else {
            return false;
        };
        let items = list_items(&self.document, id);
        self.client.list_item_click(item_id, &items, &mut self.visuals)
    }

    /// Server-driven selection; a negative index clears it.
    #[wasm_bindgen(js_name = setListCurrent)]
    pub fn set_list_current(&mut self, id: &str, index: i32) -> bool {
        let index = usize::try_from(index).ok();
        self.client.set_list_current(id, index, &mut self.visuals)
    }

    // -- tables ------------------------------------------------------------

    #[wasm_bindgen(js_name = tableKeyDown)]
    pub fn table_key_down(&mut self, id: &str, event: &KeyboardEvent) -> bool {
        let Some(key) = nav_key(event) else {
            return false;
        };
        let grid = DomGrid::read(&self.document, id);
        self.client.table_key(id, key, &grid, &mut self.visuals)
    }

    #[wasm_bindgen(js_name = tableClick)]
    pub fn table_click(&mut self, element_id: &str) -> bool {
        let Some(table_id) = self.table_id_of(element_id) else {
            return false;
        };
        let grid = DomGrid::read(&self.document, table_id);
        self.client.table_click(element_id, &grid, &mut self.visuals)
    }

    #[wasm_bindgen(js_name = setTableCursor)]
    pub fn set_table_cursor(&mut self, id: &str, row: u32, column: u32) -> bool {
        let grid = DomGrid::read(&self.document, id);
        self.client
            .set_table_cursor(id, row as usize, column as usize, &grid, &mut self.visuals)
    }

    // -- tabs --------------------------------------------------------------

    #[wasm_bindgen(js_name = tabClick)]
    pub fn tab_click(&mut self, tab_id: &str) -> bool {
        self.client.tab_click(tab_id, &mut self.visuals)
    }

    #[wasm_bindgen(js_name = tabKeyDown)]
    pub fn tab_key_down(&mut self, tab_id: &str, event: &KeyboardEvent) -> bool {
        nav_key(event).is_some_and(|key| self.client.tab_key(tab_id, key, &mut self.visuals))
    }

    #[wasm_bindgen(js_name = tabCloseClick)]
    pub fn tab_close_click(&mut self, tab_id: &str) -> bool {
        self.client.tab_close_click(tab_id)
    }

    #[wasm_bindgen(js_name = setCurrentTab)]
    pub fn set_current_tab(&mut self, id: &str, number: u32) -> bool {
        self.client.set_current_tab(id, number as usize, &mut self.visuals)
    }

    // -- input reports -----------------------------------------------------

    /// `keydown` / `keyup` on element `id`.
    #[wasm_bindgen(js_name = keyEvent)]
    pub fn key_event(&mut self, id: &str, event: &KeyboardEvent) {
        let phase = match event.type_().as_str() {
            "keydown" => KeyPhase::Down,
            "keyup" => KeyPhase::Up,
            _ => return,
        };
        self.client.report_key(&KeyInput {
            phase,
            id: id.to_owned(),
            time_stamp: event.time_stamp(),
            key: event.key(),
            code: event.code(),
            repeat: event.repeat(),
            mods: Modifiers::from_dom(
                event.ctrl_key(),
                event.shift_key(),
                event.alt_key(),
                event.meta_key(),
            ),
        });
    }

    #[wasm_bindgen(js_name = mouseEvent)]
    pub fn mouse_event(&mut self, id: &str, event: &MouseEvent) {
        let Some(kind) = mouse_kind(&event.type_()) else {
            return;
        };
        let data = self.mouse_data(id, event);
        self.client.report_mouse(&MouseInput {
            kind,
            id: id.to_owned(),
            data,
        });
    }

    #[wasm_bindgen(js_name = pointerEvent)]
    pub fn pointer_event(&mut self, id: &str, event: &PointerEvent) {
        let Some(kind) = pointer_kind(&event.type_()) else {
            return;
        };
        let data = self.mouse_data(id, event);
        self.client.report_pointer(&PointerInput {
            kind,
            id: id.to_owned(),
            data,
            pointer_id: i64::from(event.pointer_id()),
            width: f64::from(event.width()),
            height: f64::from(event.height()),
            pressure: f64::from(event.pressure()),
            tangential_pressure: f64::from(event.tangential_pressure()),
            tilt_x: f64::from(event.tilt_x()),
            tilt_y: f64::from(event.tilt_y()),
            twist: f64::from(event.twist()),
            pointer_type: event.pointer_type(),
            is_primary: event.is_primary(),
        });
    }

    #[wasm_bindgen(js_name = touchEvent)]
    pub fn touch_event(&mut self, id: &str, event: &TouchEvent) {
        let Some(kind) = touch_kind(&event.type_()) else {
            return;
        };
        let (left, top) = self.origin(id);
        let list = event.touches();
        let touches = (0..list.length())
            .filter_map(|index| list.get(index))
            .map(|touch| {
                let client_x = f64::from(touch.client_x());
                let client_y = f64::from(touch.client_y());
                TouchPoint {
                    identifier: i64::from(touch.identifier()),
                    x: client_x - left,
                    y: client_y - top,
                    client_x,
                    client_y,
                    screen_x: f64::from(touch.screen_x()),
                    screen_y: f64::from(touch.screen_y()),
                    radius_x: f64::from(touch.radius_x()),
                    radius_y: f64::from(touch.radius_y()),
                    rotation_angle: f64::from(touch.rotation_angle()),
                    force: f64::from(touch.force()),
                }
            })
            .collect();
        self.client.report_touch(&TouchInput {
            kind,
            id: id.to_owned(),
            time_stamp: event.time_stamp(),
            touches,
            mods: Modifiers::from_dom(
                event.ctrl_key(),
                event.shift_key(),
                event.alt_key(),
                event.meta_key(),
            ),
        });
    }

    #[wasm_bindgen(js_name = scrollEvent)]
    pub fn scroll_event(&mut self, id: &str) {
        if let Some(element) = self.document.get_element_by_id(id) {
            self.client.report_scroll(id, scroll_of(&element));
        }
    }

    #[wasm_bindgen(js_name = detailsOpen)]
    pub fn details_open(&mut self, id: &str, open: bool) {
        self.client.report_details_open(id, open);
    }

    #[wasm_bindgen(js_name = textChanged)]
    pub fn text_changed(&mut self, id: &str, text: &str) {
        self.client.report_text_changed(id, text);
    }

    /// `files_json` is an array of `{name, lastModified, size, type}`.
    #[wasm_bindgen(js_name = fileSelected)]
    pub fn file_selected(&mut self, id: &str, files_json: &str) -> Result<(), JsValue> {
        let files = parse_file_list(files_json).map_err(js_error)?;
        self.client.report_files_selected(id, &files);
        Ok(())
    }

    #[wasm_bindgen(js_name = fileLoaded)]
    pub fn file_loaded(
        &mut self,
        id: &str,
        index: i32,
        file_json: &str,
        data: &str,
    ) -> Result<(), JsValue> {
        let file = parse_file_info(file_json).map_err(js_error)?;
        self.client.report_file_loaded(id, i64::from(index), &file, data);
        Ok(())
    }

    #[wasm_bindgen(js_name = fileLoadingError)]
    pub fn file_loading_error(&mut self, id: &str, index: i32, error: &str) {
        self.client.report_file_loading_error(id, i64::from(index), error);
    }

    /// Report root and view sizes that changed since the last scan.
    #[wasm_bindgen(js_name = scanGeometry)]
    pub fn scan_geometry(&mut self) -> u32 {
        let (root, views) = view_snapshots(&self.document);
        self.client.report_geometry(root, &views) as u32
    }

    // -- diagnostics -------------------------------------------------------

    /// Connection summary as JSON text.
    pub fn status(&self) -> String {
        self.client.status_json().to_string()
    }

    /// Drain the session transition log as JSONL lines.
    #[wasm_bindgen(js_name = transitionsJsonl)]
    pub fn transitions_jsonl(&mut self, run_id: &str) -> Array {
        let lines = self.client.session_mut().drain_transition_jsonl(run_id);
        let array = Array::new_with_length(lines.len() as u32);
        for (index, line) in lines.iter().enumerate() {
            array.set(index as u32, JsValue::from_str(line));
        }
        array
    }
}
