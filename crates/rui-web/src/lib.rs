#![forbid(unsafe_code)]

//! Browser bundle of the rui client.
//!
//! [`WebClient`] ties one [`rui_session::Session`] to the cursor controllers
//! of the views on a page and turns DOM input into wire records.
//! [`ViewGeometryTracker`] reports layout changes. Both are plain Rust and
//! run natively under test with [`rui_session::MemoryTransport`].
//!
//! On `wasm32` the crate also exports `RuiClient` through `wasm-bindgen`,
//! backed by a browser `WebSocket` and DOM adapters.
//!
//! # Example
//!
//! ```
//! use rui_nav::{ItemGeometry, ListCursor, NavKey, VisualLog};
//! use rui_session::{EnvironmentFacts, MemoryTransport, Session, SessionConfig};
//! use rui_web::WebClient;
//!
//! let (transport, remote) = MemoryTransport::new();
//! let session = Session::with_url(transport, SessionConfig::default(), "ws://h/ws", EnvironmentFacts::default());
//! let mut client = WebClient::new(session);
//! client.start(0);
//! remote.open();
//! client.poll(1);
//! client.session_mut().assign_session_id("3");
//!
//! client.register_list(ListCursor::new("files"));
//! let items = vec![ItemGeometry::new(0, 0, 100, 20), ItemGeometry::new(0, 20, 100, 20)];
//! let mut visuals = VisualLog::new();
//! assert!(client.list_key("files", NavKey::Down, &items, &mut visuals));
//! assert_eq!(remote.sent().last().map(String::as_str), Some("itemSelected{session=3,id=files,number=0}"));
//! ```

pub mod client;
pub mod error;
pub mod files;
pub mod resize;

#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod socket;
#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use client::WebClient;
pub use error::ClientError;
pub use files::{parse_file_info, parse_file_list};
pub use resize::{ViewGeometryTracker, ViewRect, ViewScroll, ViewSnapshot};

#[cfg(target_arch = "wasm32")]
pub use socket::WebSocketTransport;
#[cfg(target_arch = "wasm32")]
pub use wasm::RuiClient;
