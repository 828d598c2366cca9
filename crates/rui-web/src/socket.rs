#![forbid(unsafe_code)]

//! [`Transport`] over the browser `WebSocket`.
//!
//! Socket callbacks only post [`TransportEvent`]s to the session channel and
//! optionally call a wake function so the page polls promptly. A replaced
//! socket is closed if still live and its handlers are detached before the
//! next socket is created, so the server never keeps an orphaned connection
//! and a late close from the old one is never attributed to the new one.

use rui_session::{Transport, TransportError, TransportEvent, TransportEvents};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

struct SocketHandlers {
    open: Closure<dyn FnMut(Event)>,
    message: Closure<dyn FnMut(MessageEvent)>,
    close: Closure<dyn FnMut(CloseEvent)>,
    error: Closure<dyn FnMut(Event)>,
}

fn js_reason(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// `CONNECTING` or `OPEN`: the socket still holds a server connection.
fn is_live(ready_state: u16) -> bool {
    ready_state == WebSocket::CONNECTING || ready_state == WebSocket::OPEN
}

fn wake(function: Option<&js_sys::Function>) {
    if let Some(function) = function {
        let _ = function.call0(&JsValue::NULL);
    }
}

/// WebSocket transport. At most one socket is live at a time.
#[derive(Default)]
pub struct WebSocketTransport {
    socket: Option<WebSocket>,
    handlers: Option<SocketHandlers>,
    wake: Option<js_sys::Function>,
}

impl core::fmt::Debug for WebSocketTransport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebSocketTransport")
            .field("ready_state", &self.socket.as_ref().map(WebSocket::ready_state))
            .finish_non_exhaustive()
    }
}

impl WebSocketTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: function called (without arguments) after every socket event.
    #[must_use]
    pub fn with_wake(mut self, wake: js_sys::Function) -> Self {
        self.wake = Some(wake);
        self
    }

    /// Release the current socket: close it if it is still live, then
    /// clear its handlers so nothing it reports later reaches the session.
    /// The socket of the current connection, if any.
    #[must_use]
    pub fn socket(&self) -> Option<&WebSocket> {
        self.socket.as_ref()
    }

    fn detach(&mut self) {
        if let Some(socket) = &self.socket {
            if is_live(socket.ready_state()) {
                let _ = socket.close();
            }
            socket.set_onopen(None);
            socket.set_onmessage(None);
            socket.set_onclose(None);
            socket.set_onerror(None);
        }
        self.handlers = None;
        self.socket = None;
    }

    fn handlers(&self, events: &TransportEvents) -> SocketHandlers {
        let (tx, waker) = (events.clone(), self.wake.clone());
        let open = Closure::wrap(Box::new(move |_: Event| {
            let _ = tx.send(TransportEvent::Opened);
            wake(waker.as_ref());
        }) as Box<dyn FnMut(_)>);

        let (tx, waker) = (events.clone(), self.wake.clone());
        let message = Closure::wrap(Box::new(move |event: MessageEvent| {
            match event.data().as_string() {
                Some(text) => {
                    let _ = tx.send(TransportEvent::Message(text));
                    wake(waker.as_ref());
                }
                None => tracing::warn!(message = "socket.binary_frame_ignored"),
            }
        }) as Box<dyn FnMut(_)>);

        let (tx, waker) = (events.clone(), self.wake.clone());
        let close = Closure::wrap(Box::new(move |event: CloseEvent| {
            let _ = tx.send(TransportEvent::Closed {
                clean: event.was_clean(),
                code: event.code(),
                reason: event.reason(),
            });
            wake(waker.as_ref());
        }) as Box<dyn FnMut(_)>);

        let (tx, waker) = (events.clone(), self.wake.clone());
        let error = Closure::wrap(Box::new(move |event: Event| {
            let _ = tx.send(TransportEvent::Error(event.type_()));
            wake(waker.as_ref());
        }) as Box<dyn FnMut(_)>);

        SocketHandlers {
            open,
            message,
            close,
            error,
        }
    }
}

impl Transport for WebSocketTransport {
    fn connect(&mut self, url: &str, events: TransportEvents) -> Result<(), TransportError> {
        self.detach();
        let socket = WebSocket::new(url).map_err(|err| TransportError::Connect {
            url: url.to_owned(),
            reason: js_reason(&err),
        })?;
        let handlers = self.handlers(&events);
        socket.set_onopen(Some(handlers.open.as_ref().unchecked_ref()));
        socket.set_onmessage(Some(handlers.message.as_ref().unchecked_ref()));
        socket.set_onclose(Some(handlers.close.as_ref().unchecked_ref()));
        socket.set_onerror(Some(handlers.error.as_ref().unchecked_ref()));
        tracing::debug!(message = "socket.connect", url);
        self.socket = Some(socket);
        self.handlers = Some(handlers);
        Ok(())
    }

    fn send(&mut self, text: &str) -> Result<(), TransportError> {
        let socket = self
            .socket
            .as_ref()
            .filter(|socket| socket.ready_state() == WebSocket::OPEN)
            .ok_or(TransportError::NotConnected)?;
        socket.send_with_str(text).map_err(|err| TransportError::Send {
            reason: js_reason(&err),
        })
    }

    fn close(&mut self) {
        // Keep handlers: the session waits for the close event.
        if let Some(socket) = &self.socket {
            let _ = socket.close();
        }
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        self.detach();
    }
}

