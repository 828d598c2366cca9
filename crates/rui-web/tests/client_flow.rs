#![forbid(unsafe_code)]

//! Page-level flows through the client over the in-memory transport.
//!
//! Run:
//!   cargo test -p rui-web --test client_flow

use pretty_assertions::assert_eq;
use rui_nav::{
    CursorVisual, GridMask, ItemGeometry, ListCursor, NavKey, TabVisual, TableCursor, TableMode,
    TabsCursor, VisualLog,
};
use rui_session::{
    ConnectionState, EnvironmentFacts, MemoryHandle, MemoryTransport, Session, SessionConfig,
};
use rui_web::{ViewRect, ViewSnapshot, WebClient};
use rui_wire::{KeyInput, KeyPhase, Modifiers};

fn client() -> (WebClient<MemoryTransport>, MemoryHandle) {
    let (transport, remote) = MemoryTransport::new();
    let session = Session::with_url(
        transport,
        SessionConfig::default(),
        "ws://page/ws",
        EnvironmentFacts::default(),
    );
    let mut client = WebClient::new(session);
    client.start(0);
    remote.open();
    client.poll(1);
    client.session_mut().assign_session_id("42");
    remote.take_sent();
    (client, remote)
}

fn row(n: i32) -> ItemGeometry {
    ItemGeometry::new(0, n * 20, 200, 20)
}

#[test]
fn list_navigation_reports_and_marks() {
    let (mut client, remote) = client();
    client.register_list(ListCursor::new("files"));
    let items = vec![row(0), row(1).with_enabled(false), row(2)];
    let mut visuals = VisualLog::new();

    client.element_focus("files", &mut visuals);
    assert!(client.list_key("files", NavKey::Down, &items, &mut visuals));
    assert!(client.list_key("files", NavKey::Down, &items, &mut visuals));
    assert!(client.list_key("files", NavKey::Activate, &items, &mut visuals));

    assert_eq!(
        remote.take_sent(),
        [
            "focus-event{session=42,id=files}",
            "itemSelected{session=42,id=files,number=0}",
            "itemSelected{session=42,id=files,number=2}",
            "itemClick{session=42,id=files,number=2}",
        ]
    );
    assert_eq!(visuals.cursor_state("files-2"), Some(CursorVisual::Focused));
    assert_eq!(visuals.cursor_state("files-0"), Some(CursorVisual::Cleared));

    client.element_blur("files", &mut visuals);
    assert_eq!(visuals.cursor_state("files-2"), Some(CursorVisual::Blurred));
    assert_eq!(remote.take_sent(), ["lost-focus-event{session=42,id=files}"]);
}

#[test]
fn disabled_item_click_is_not_reported() {
    let (mut client, remote) = client();
    client.register_list(ListCursor::new("files"));
    let items = vec![row(0).with_enabled(false)];
    let mut visuals = VisualLog::new();
    assert!(!client.list_item_click("files-0", &items, &mut visuals));
    assert!(remote.sent().is_empty());
}

#[test]
fn input_during_outage_is_delivered_after_reconnect() {
    let (mut client, remote) = client();
    client.register_table(TableCursor::new("grid", TableMode::Cell));
    let grid = GridMask::new(2, 2);
    let mut visuals = VisualLog::new();

    remote.drop_connection(false);
    client.poll(100);
    assert_eq!(client.state(), ConnectionState::Disconnected);

    assert!(client.table_key("grid", NavKey::Down, &grid, &mut visuals));
    client.report_key(&KeyInput {
        phase: KeyPhase::Down,
        id: "grid".into(),
        time_stamp: 0.0,
        key: "a".into(),
        code: "KeyA".into(),
        repeat: false,
        mods: Modifiers::CTRL,
    });
    assert!(remote.sent().is_empty());
    assert_eq!(client.state(), ConnectionState::Connecting);

    remote.open();
    client.poll(200);
    assert_eq!(
        remote.take_sent(),
        [
            "reconnect{session=42}",
            "currentCell{session=42,id=grid,row=0,column=0}",
            "key-down-event{session=42,id=grid,key=\"a\",code=\"KeyA\",ctrlKey=1}",
        ]
    );
}

#[test]
fn tabs_switch_and_close() {
    let (mut client, remote) = client();
    client.register_tabs(TabsCursor::new("layout", 0));
    let mut visuals = VisualLog::new();

    assert!(client.tab_click("layout-1", &mut visuals));
    assert!(!client.tab_key("layout-1", NavKey::Left, &mut visuals));
    assert!(client.tab_close_click("layout-1"));
    assert_eq!(
        remote.take_sent(),
        [
            "tabClick{session=42,id=layout,number=1}",
            "tabCloseClick{session=42,id=layout,number=1}",
        ]
    );
    assert_eq!(visuals.tab_state("layout-0"), Some(TabVisual::Inactive));
    assert_eq!(visuals.tab_state("layout-1"), Some(TabVisual::Active));
    assert_eq!(client.tabs("layout").map(TabsCursor::current), Some(1));
}

#[test]
fn geometry_reports_only_changes() {
    let (mut client, remote) = client();
    let root = Some(ViewRect::new(0.0, 0.0, 1024.0, 768.0));
    let views = [
        ViewSnapshot::new("a", ViewRect::new(0.0, 0.0, 512.0, 768.0)),
        ViewSnapshot::new("b", ViewRect::new(512.0, 0.0, 512.0, 768.0)),
    ];
    assert_eq!(client.report_geometry(root, &views), 2);
    assert_eq!(client.report_geometry(root, &views), 0);

    let narrower = [
        ViewSnapshot::new("a", ViewRect::new(0.0, 0.0, 400.0, 768.0)),
        views[1].clone(),
    ];
    assert_eq!(client.report_geometry(root, &narrower), 1);

    let sent = remote.take_sent();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0], "root-size{session=42,width=1024,height=768}");
    assert!(sent[2].starts_with("resize{session=42,views=[view{id=a,x=0,y=0,width=400,"));
}

#[test]
fn server_driven_placement_does_not_report_lists() {
    let (mut client, remote) = client();
    client.register_list(ListCursor::new("files"));
    let mut visuals = VisualLog::new();
    assert!(client.set_list_current("files", Some(1), &mut visuals));
    assert_eq!(client.list("files").and_then(ListCursor::current), Some(1));
    assert!(remote.sent().is_empty());
}
