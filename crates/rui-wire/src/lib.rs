#![forbid(unsafe_code)]

//! Line-oriented record codec for the rui browser client.
//!
//! Outbound, the browser reports input and geometry as tagged records:
//!
//! ```text
//! key-down-event{session=12,id=edit1,key="a",code="KeyA",ctrlKey=1}
//! ```
//!
//! Inbound, the server pushes whole command scripts; this crate only frames
//! them ([`InboundCommand`]) and hands them to a [`CommandInterpreter`].
//! [`parse_record`] reads the record syntax back for data the server sends
//! as records (themes, resources, tests).
//!
//! # Example
//!
//! ```
//! use rui_wire::{Record, parse_record};
//!
//! let record = Record::new("textChanged")
//!     .with_bare("id", "edit1")
//!     .with_text("text", "say \"hi\"");
//! let wire = record.encode();
//! assert_eq!(wire, r#"textChanged{id=edit1,text="say \"hi\""}"#);
//! assert_eq!(parse_record(&wire).unwrap().text("text"), Some("say \"hi\""));
//! ```

pub mod error;
pub mod escape;
pub mod event;
pub mod frame;
pub mod parse;
pub mod record;

pub use error::WireError;
pub use escape::{escape, is_bare_token, unescape};
pub use event::{
    FileInfo, KeyInput, KeyPhase, Modifiers, MouseData, MouseInput, MouseKind, PointerInput,
    PointerKind, TouchInput, TouchKind, TouchPoint,
};
pub use frame::{CommandInterpreter, InboundCommand, MessageSink};
pub use parse::parse_record;
pub use record::{ANONYMOUS_TAG, Record, Value};
