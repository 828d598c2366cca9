#![forbid(unsafe_code)]

//! Typed input-event payloads.
//!
//! Each input type normalizes one family of browser events into a value
//! that renders to the record the server expects. The `session` field is
//! not part of these payloads; the session prepends it at submit time.
//!
//! # Encoding rules
//!
//! - Numeric fields the browser reports as `0` when unset are omitted.
//! - Modifier keys are presence flags in the fixed order `ctrlKey`,
//!   `shiftKey`, `altKey`, `metaKey`.
//! - Coordinates relative to the target element (`x`, `y`) are supplied by
//!   the caller; this module never computes layout.

use bitflags::bitflags;

use crate::record::{Record, Value};

bitflags! {
    /// Modifier keys held during an input event.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const META  = 0b1000;
    }
}

impl Modifiers {
    /// Build from the four DOM event booleans.
    #[must_use]
    pub fn from_dom(ctrl: bool, shift: bool, alt: bool, meta: bool) -> Self {
        let mut mods = Self::empty();
        mods.set(Self::CTRL, ctrl);
        mods.set(Self::SHIFT, shift);
        mods.set(Self::ALT, alt);
        mods.set(Self::META, meta);
        mods
    }

    fn write(self, record: Record) -> Record {
        record
            .with_flag("ctrlKey", self.contains(Self::CTRL))
            .with_flag("shiftKey", self.contains(Self::SHIFT))
            .with_flag("altKey", self.contains(Self::ALT))
            .with_flag("metaKey", self.contains(Self::META))
    }
}

fn element_record(tag: &str, id: &str) -> Record {
    Record::new(tag).with_bare("id", id)
}

/// Key press direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPhase {
    Down,
    Up,
}

impl KeyPhase {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Down => "key-down-event",
            Self::Up => "key-up-event",
        }
    }
}

/// Keyboard event.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyInput {
    pub phase: KeyPhase,
    pub id: String,
    pub time_stamp: f64,
    /// DOM `key` value (`"a"`, `"Enter"`, `"\""`).
    pub key: String,
    /// DOM `code` value (`"KeyA"`).
    pub code: String,
    pub repeat: bool,
    pub mods: Modifiers,
}

impl KeyInput {
    #[must_use]
    pub fn to_record(&self) -> Record {
        let mut record =
            element_record(self.phase.tag(), &self.id).with_nonzero_float("timeStamp", self.time_stamp);
        record = match self.key.as_str() {
            "" => record,
            // The server reads these two keys from the raw form.
            "\"" | "\\" => record.with_raw("key", self.key.as_str()),
            key => record.with_text("key", key),
        };
        let record = record
            .with_opt_text("code", Some(self.code.as_str()))
            .with_flag("repeat", self.repeat);
        self.mods.write(record)
    }
}

/// Mouse event family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseKind {
    Down,
    Up,
    Move,
    Over,
    Out,
    Click,
    DoubleClick,
    ContextMenu,
}

impl MouseKind {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Down => "mouse-down",
            Self::Up => "mouse-up",
            Self::Move => "mouse-move",
            Self::Over => "mouse-over",
            Self::Out => "mouse-out",
            Self::Click => "click-event",
            Self::DoubleClick => "double-click-event",
            Self::ContextMenu => "context-menu-event",
        }
    }
}

/// Fields shared by mouse and pointer events.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseData {
    pub time_stamp: f64,
    pub button: i64,
    pub buttons: i64,
    /// Position relative to the target element, resolved by the surface.
    pub x: f64,
    pub y: f64,
    pub client_x: f64,
    pub client_y: f64,
    pub screen_x: f64,
    pub screen_y: f64,
    pub mods: Modifiers,
}

impl MouseData {
    fn write(&self, mut record: Record) -> Record {
        record = record.with_nonzero_float("timeStamp", self.time_stamp);
        if self.button != 0 {
            record = record.with_int("button", self.button);
        }
        if self.buttons != 0 {
            record = record.with_int("buttons", self.buttons);
        }
        // Local coordinates travel with their client counterpart.
        if self.client_x != 0.0 {
            record = record.with_float("x", self.x).with_float("clientX", self.client_x);
        }
        if self.client_y != 0.0 {
            record = record.with_float("y", self.y).with_float("clientY", self.client_y);
        }
        let record = record
            .with_nonzero_float("screenX", self.screen_x)
            .with_nonzero_float("screenY", self.screen_y);
        self.mods.write(record)
    }
}

/// Mouse event.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseInput {
    pub kind: MouseKind,
    pub id: String,
    pub data: MouseData,
}

impl MouseInput {
    #[must_use]
    pub fn to_record(&self) -> Record {
        self.data.write(element_record(self.kind.tag(), &self.id))
    }
}

/// Pointer event family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Down,
    Up,
    Move,
    Cancel,
    Over,
    Out,
}

impl PointerKind {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Down => "pointer-down",
            Self::Up => "pointer-up",
            Self::Move => "pointer-move",
            Self::Cancel => "pointer-cancel",
            Self::Over => "pointer-over",
            Self::Out => "pointer-out",
        }
    }
}

/// Pointer event: mouse fields plus contact geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerInput {
    pub kind: PointerKind,
    pub id: String,
    pub data: MouseData,
    pub pointer_id: i64,
    pub width: f64,
    pub height: f64,
    pub pressure: f64,
    pub tangential_pressure: f64,
    pub tilt_x: f64,
    pub tilt_y: f64,
    pub twist: f64,
    /// `mouse`, `pen`, or `touch`.
    pub pointer_type: String,
    pub is_primary: bool,
}

impl PointerInput {
    #[must_use]
    pub fn to_record(&self) -> Record {
        let mut record = self.data.write(element_record(self.kind.tag(), &self.id));
        if self.pointer_id != 0 {
            record = record.with_int("pointerId", self.pointer_id);
        }
        record
            .with_nonzero_float("width", self.width)
            .with_nonzero_float("height", self.height)
            .with_nonzero_float("pressure", self.pressure)
            .with_nonzero_float("tangentialPressure", self.tangential_pressure)
            .with_nonzero_float("tiltX", self.tilt_x)
            .with_nonzero_float("tiltY", self.tilt_y)
            .with_nonzero_float("twist", self.twist)
            .with_opt_bare("pointerType", Some(self.pointer_type.as_str()))
            .with_flag("isPrimary", self.is_primary)
    }
}

/// Touch event family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchKind {
    Start,
    End,
    Move,
    Cancel,
}

impl TouchKind {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Start => "touch-start",
            Self::End => "touch-end",
            Self::Move => "touch-move",
            Self::Cancel => "touch-cancel",
        }
    }
}

/// One active touch. Every field is always written.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TouchPoint {
    pub identifier: i64,
    pub x: f64,
    pub y: f64,
    pub client_x: f64,
    pub client_y: f64,
    pub screen_x: f64,
    pub screen_y: f64,
    pub radius_x: f64,
    pub radius_y: f64,
    pub rotation_angle: f64,
    pub force: f64,
}

impl TouchPoint {
    fn to_value(self) -> Value {
        Value::Record(
            Record::new("touch")
                .with_int("identifier", self.identifier)
                .with_float("x", self.x)
                .with_float("y", self.y)
                .with_float("clientX", self.client_x)
                .with_float("clientY", self.client_y)
                .with_float("screenX", self.screen_x)
                .with_float("screenY", self.screen_y)
                .with_float("radiusX", self.radius_x)
                .with_float("radiusY", self.radius_y)
                .with_float("rotationAngle", self.rotation_angle)
                .with_float("force", self.force),
        )
    }
}

/// Touch event.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchInput {
    pub kind: TouchKind,
    pub id: String,
    pub time_stamp: f64,
    pub touches: Vec<TouchPoint>,
    pub mods: Modifiers,
}

impl TouchInput {
    #[must_use]
    pub fn to_record(&self) -> Record {
        let mut record = element_record(self.kind.tag(), &self.id)
            .with_nonzero_float("timeStamp", self.time_stamp);
        if !self.touches.is_empty() {
            let touches = self.touches.iter().map(|touch| touch.to_value()).collect();
            record = record.with_list("touches", touches);
        }
        self.mods.write(record)
    }
}

/// Element gained input focus.
#[must_use]
pub fn focus_event(id: &str) -> Record {
    element_record("focus-event", id)
}

/// Element lost input focus.
#[must_use]
pub fn lost_focus_event(id: &str) -> Record {
    element_record("lost-focus-event", id)
}

/// Scroll position and scrollable extent of an element.
#[must_use]
pub fn scroll_event(id: &str, x: f64, y: f64, width: f64, height: f64) -> Record {
    element_record("scroll", id)
        .with_float("x", x)
        .with_float("y", y)
        .with_float("width", width)
        .with_float("height", height)
}

/// `<details>` element toggled.
#[must_use]
pub fn details_open(id: &str, open: bool) -> Record {
    element_record("details-open", id).with_int("open", i64::from(open))
}

/// Edit view content changed.
#[must_use]
pub fn text_changed(id: &str, text: &str) -> Record {
    element_record("textChanged", id).with_text("text", text)
}

/// Metadata of a file picked by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    /// Milliseconds since the Unix epoch.
    pub last_modified: i64,
    pub size: i64,
    pub mime_type: String,
}

impl FileInfo {
    fn write(&self, record: Record) -> Record {
        record
            .with_text("name", self.name.as_str())
            .with_int("last-modified", self.last_modified)
            .with_int("size", self.size)
            .with_text("mime-type", self.mime_type.as_str())
    }
}

/// Files picked in a file picker.
#[must_use]
pub fn file_selected(id: &str, files: &[FileInfo]) -> Record {
    let files = files
        .iter()
        .map(|file| Value::Record(file.write(Record::anonymous())))
        .collect();
    element_record("fileSelected", id).with_list("files", files)
}

/// Contents of a picked file, as a data URL.
#[must_use]
pub fn file_loaded(id: &str, index: i64, file: &FileInfo, data: &str) -> Record {
    file.write(element_record("fileLoaded", id).with_int("index", index))
        .with_raw("data", data)
}

/// A picked file could not be read.
#[must_use]
pub fn file_loading_error(id: &str, index: i64, error: &str) -> Record {
    element_record("fileLoadingError", id)
        .with_int("index", index)
        .with_raw("error", error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(key: &str, mods: Modifiers) -> KeyInput {
        KeyInput {
            phase: KeyPhase::Down,
            id: "edit1".to_owned(),
            time_stamp: 1234.5,
            key: key.to_owned(),
            code: "KeyA".to_owned(),
            repeat: false,
            mods,
        }
    }

    #[test]
    fn key_event_with_modifiers_in_fixed_order() {
        let input = key("a", Modifiers::META | Modifiers::SHIFT | Modifiers::CTRL);
        assert_eq!(
            input.to_record().encode(),
            r#"key-down-event{id=edit1,timeStamp=1234.5,key="a",code="KeyA",ctrlKey=1,shiftKey=1,metaKey=1}"#
        );
    }

    #[test]
    fn quote_and_backslash_keys_use_raw_form() {
        assert_eq!(
            key("\"", Modifiers::empty()).to_record().text("key"),
            Some("\"")
        );
        let encoded = key("\\", Modifiers::empty()).to_record().encode();
        assert!(encoded.contains("key=`\\`"), "{encoded}");
        let encoded = key("\"", Modifiers::empty()).to_record().encode();
        assert!(encoded.contains("key=`\"`"), "{encoded}");
    }

    #[test]
    fn key_up_with_repeat_and_no_code() {
        let mut input = key("Enter", Modifiers::empty());
        input.phase = KeyPhase::Up;
        input.code.clear();
        input.repeat = true;
        input.time_stamp = 0.0;
        assert_eq!(
            input.to_record().encode(),
            r#"key-up-event{id=edit1,key="Enter",repeat=1}"#
        );
    }

    #[test]
    fn modifiers_from_dom() {
        assert_eq!(
            Modifiers::from_dom(true, false, true, false),
            Modifiers::CTRL | Modifiers::ALT
        );
    }

    #[test]
    fn mouse_event_omits_zero_fields() {
        let input = MouseInput {
            kind: MouseKind::Click,
            id: "button1".to_owned(),
            data: MouseData {
                time_stamp: 10.0,
                x: 4.0,
                y: 6.0,
                client_x: 104.0,
                client_y: 0.0,
                screen_x: 300.0,
                ..MouseData::default()
            },
        };
        assert_eq!(
            input.to_record().encode(),
            "click-event{id=button1,timeStamp=10,x=4,clientX=104,screenX=300}"
        );
    }

    #[test]
    fn pointer_event_adds_contact_fields() {
        let input = PointerInput {
            kind: PointerKind::Down,
            id: "canvas".to_owned(),
            data: MouseData {
                buttons: 1,
                ..MouseData::default()
            },
            pointer_id: 7,
            width: 1.0,
            height: 1.0,
            pressure: 0.5,
            tangential_pressure: 0.0,
            tilt_x: 0.0,
            tilt_y: 0.0,
            twist: 0.0,
            pointer_type: "pen".to_owned(),
            is_primary: true,
        };
        assert_eq!(
            input.to_record().encode(),
            "pointer-down{id=canvas,buttons=1,pointerId=7,width=1,height=1,pressure=0.5,pointerType=pen,isPrimary=1}"
        );
    }

    #[test]
    fn touch_event_lists_every_point() {
        let input = TouchInput {
            kind: TouchKind::Start,
            id: "pad".to_owned(),
            time_stamp: 0.0,
            touches: vec![
                TouchPoint {
                    identifier: 1,
                    x: 2.0,
                    force: 1.0,
                    ..TouchPoint::default()
                },
                TouchPoint {
                    identifier: 2,
                    ..TouchPoint::default()
                },
            ],
            mods: Modifiers::ALT,
        };
        let record = input.to_record();
        let touches = record.list("touches").unwrap();
        assert_eq!(touches.len(), 2);
        assert_eq!(
            touches[0].as_record().unwrap().encode(),
            "touch{identifier=1,x=2,y=0,clientX=0,clientY=0,screenX=0,screenY=0,radiusX=0,radiusY=0,rotationAngle=0,force=1}"
        );
        assert!(record.encode().ends_with(",altKey=1}"));
    }

    #[test]
    fn touch_event_without_points_has_no_list() {
        let input = TouchInput {
            kind: TouchKind::End,
            id: "pad".to_owned(),
            time_stamp: 5.0,
            touches: Vec::new(),
            mods: Modifiers::empty(),
        };
        assert_eq!(input.to_record().encode(), "touch-end{id=pad,timeStamp=5}");
    }

    #[test]
    fn simple_events() {
        assert_eq!(focus_event("a").encode(), "focus-event{id=a}");
        assert_eq!(lost_focus_event("a").encode(), "lost-focus-event{id=a}");
        assert_eq!(
            scroll_event("list", 0.0, 120.0, 300.0, 2000.0).encode(),
            "scroll{id=list,x=0,y=120,width=300,height=2000}"
        );
        assert_eq!(details_open("d", true).encode(), "details-open{id=d,open=1}");
        assert_eq!(details_open("d", false).encode(), "details-open{id=d,open=0}");
        assert_eq!(
            text_changed("e", "a \"b\"").encode(),
            r#"textChanged{id=e,text="a \"b\""}"#
        );
    }

    #[test]
    fn file_events() {
        let file = FileInfo {
            name: "notes.txt".to_owned(),
            last_modified: 1_700_000_000_000,
            size: 42,
            mime_type: "text/plain".to_owned(),
        };
        assert_eq!(
            file_selected("picker", std::slice::from_ref(&file)).encode(),
            r#"fileSelected{id=picker,files=[_{name="notes.txt",last-modified=1700000000000,size=42,mime-type="text/plain"}]}"#
        );
        assert_eq!(
            file_loaded("picker", 0, &file, "data:text/plain;base64,aGk=").encode(),
            r#"fileLoaded{id=picker,index=0,name="notes.txt",last-modified=1700000000000,size=42,mime-type="text/plain",data=`data:text/plain;base64,aGk=`}"#
        );
        assert_eq!(
            file_loading_error("picker", 3, "File not found").encode(),
            "fileLoadingError{id=picker,index=3,error=`File not found`}"
        );
    }
}
