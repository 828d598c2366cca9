#![forbid(unsafe_code)]
#![cfg(feature = "tracing")]

//! Cursor controllers emit one debug event per move.
//!
//! Run:
//!   cargo test -p rui-nav --features tracing --test tracing_cursor_events

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rui_nav::{
    GridMask, ItemGeometry, ListCursor, NavKey, TableCursor, TableMode, TabsCursor, VisualLog,
};
use rui_wire::Record;
use tracing_subscriber::layer::SubscriberExt;

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
    fields: HashMap<String, String>,
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let mut fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.remove("message").unwrap_or_default();
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields,
        });
    }
}

fn capture<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: Arc::clone(&events),
    };
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

fn named<'a>(events: &'a [CapturedEvent], message: &str) -> Vec<&'a CapturedEvent> {
    events.iter().filter(|e| e.message == message).collect()
}

// ============================================================================
// List
// ============================================================================

#[test]
fn list_moves_are_logged_with_action() {
    let items = vec![
        ItemGeometry::new(0, 0, 10, 10),
        ItemGeometry::new(0, 12, 10, 10),
    ];
    let events = capture(|| {
        let mut list = ListCursor::new("files");
        let (mut visuals, mut sink) = (VisualLog::new(), Vec::<Record>::new());
        list.handle_key(NavKey::Down, &items, &mut visuals, &mut sink);
        list.handle_key(NavKey::Down, &items, &mut visuals, &mut sink);
        list.set_current(None, &mut visuals);
    });

    let moves = named(&events, "list.cursor");
    assert_eq!(moves.len(), 3);
    assert!(moves.iter().all(|e| e.level == tracing::Level::DEBUG));
    let actions: Vec<&str> = moves
        .iter()
        .filter_map(|e| e.fields.get("action").map(String::as_str))
        .collect();
    assert_eq!(actions, ["keyboard_first", "keyboard_move", "server"]);
    assert_eq!(moves[0].fields.get("list").map(String::as_str), Some("files"));
}

#[test]
fn unmoved_list_logs_nothing() {
    let items = vec![ItemGeometry::new(0, 0, 10, 10)];
    let events = capture(|| {
        let mut list = ListCursor::new("files");
        let (mut visuals, mut sink) = (VisualLog::new(), Vec::<Record>::new());
        list.handle_key(NavKey::Home, &items, &mut visuals, &mut sink);
        list.handle_key(NavKey::Up, &items, &mut visuals, &mut sink);
        list.handle_key(NavKey::PageDown, &items, &mut visuals, &mut sink);
    });
    assert_eq!(named(&events, "list.cursor").len(), 1);
}

// ============================================================================
// Table and tabs
// ============================================================================

#[test]
fn table_moves_and_server_clear_are_logged() {
    let grid = GridMask::new(2, 2).with_disabled_cell(1, 1);
    let events = capture(|| {
        let mut table = TableCursor::new("grid", TableMode::Cell);
        let (mut visuals, mut sink) = (VisualLog::new(), Vec::<Record>::new());
        table.set_cell(0, 0, &grid, &mut visuals, &mut sink);
        table.set_cursor_by_server(1, 1, &grid, &mut visuals, &mut sink);
    });

    let moves = named(&events, "table.cursor");
    let actions: Vec<&str> = moves
        .iter()
        .filter_map(|e| e.fields.get("action").map(String::as_str))
        .collect();
    assert_eq!(actions, ["set_cell", "server_clear"]);
    assert_eq!(moves[0].fields.get("table").map(String::as_str), Some("grid"));
}

#[test]
fn tab_switch_is_logged_once() {
    let events = capture(|| {
        let mut tabs = TabsCursor::new("tabs", 0);
        let (mut visuals, mut sink) = (VisualLog::new(), Vec::<Record>::new());
        tabs.activate(2, &mut visuals, &mut sink);
        tabs.activate(2, &mut visuals, &mut sink);
    });
    let switches = named(&events, "tabs.switch");
    assert_eq!(switches.len(), 1);
    assert_eq!(switches[0].fields.get("current").map(String::as_str), Some("2"));
}
