#![forbid(unsafe_code)]

//! Connection and session lifecycle for the rui browser client.
//!
//! - [`SessionMachine`]: sans-IO state machine. Owns the session id, window
//!   focus, the outbound FIFO, and the single reconnect timer.
//! - [`Session`]: driver that executes machine actions against a
//!   [`Transport`] and feeds transport notifications back through a channel.
//!
//! # Example
//!
//! ```
//! use rui_session::{DocumentLocation, EnvironmentFacts, MemoryTransport, Session, SessionConfig};
//! use rui_wire::Record;
//!
//! let (transport, remote) = MemoryTransport::new();
//! let location = DocumentLocation::new("https:", "example.com", None, "/");
//! let mut session = Session::new(transport, SessionConfig::default(), &location, EnvironmentFacts::default());
//!
//! session.start(0);
//! remote.open();
//! session.poll(1);
//! session.assign_session_id("17");
//! session.submit(Record::new("focus-event").with_bare("id", "name")).unwrap();
//!
//! assert_eq!(remote.connects(), ["wss://example.com/ws"]);
//! assert_eq!(remote.sent(), ["startSession{touch=0}", "focus-event{session=17,id=name}"]);
//! ```

pub mod config;
pub mod environment;
pub mod error;
pub mod location;
pub mod machine;
pub mod session;
pub mod transport;

pub use config::SessionConfig;
pub use environment::{EnvironmentFacts, EnvironmentProbe};
pub use error::{SessionError, TransportError};
pub use location::DocumentLocation;
pub use machine::{
    ConnectionState, FrameKind, OutboundFrame, SessionAction, SessionEvent, SessionEventKind,
    SessionMachine, SessionStats, SessionTransition, UNASSIGNED_SESSION_ID,
};
pub use session::Session;
pub use transport::{MemoryHandle, MemoryTransport, Transport, TransportEvent, TransportEvents};
