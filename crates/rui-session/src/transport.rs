#![forbid(unsafe_code)]

//! Transport capability.
//!
//! A transport is one bidirectional, message-oriented connection. It never
//! calls back into the session: lifecycle notifications and inbound frames
//! are posted as [`TransportEvent`]s on the channel handed to
//! [`Transport::connect`], and the session consumes them on its next poll.
//!
//! Every connect gets its own [`TransportEvents`] stamped with a connection
//! epoch. Events still in flight from an earlier connection carry an older
//! epoch and are discarded by the session.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::{Receiver, Sender, channel};

use crate::error::TransportError;

/// Notification posted by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Message(String),
    Closed { clean: bool, code: u16, reason: String },
    Error(String),
}

/// Sending half of the transport event channel, bound to one connection.
#[derive(Debug, Clone)]
pub struct TransportEvents {
    epoch: u64,
    tx: Sender<(u64, TransportEvent)>,
}

impl TransportEvents {
    #[must_use]
    pub fn new(epoch: u64, tx: Sender<(u64, TransportEvent)>) -> Self {
        Self { epoch, tx }
    }

    /// A sender for `epoch` together with its receiving end.
    #[must_use]
    pub fn channel(epoch: u64) -> (Self, Receiver<(u64, TransportEvent)>) {
        let (tx, rx) = channel();
        (Self::new(epoch, tx), rx)
    }

    /// Connection epoch stamped on every posted event.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Post one event. Returns `false` once the session is gone.
    pub fn send(&self, event: TransportEvent) -> bool {
        self.tx.send((self.epoch, event)).is_ok()
    }
}

/// A message-oriented connection owned by the session driver.
pub trait Transport {
    /// Start connecting to `url`. Completion is reported as
    /// [`TransportEvent::Opened`] or [`TransportEvent::Closed`] on `events`.
    fn connect(&mut self, url: &str, events: TransportEvents) -> Result<(), TransportError>;

    /// Write one text frame.
    fn send(&mut self, text: &str) -> Result<(), TransportError>;

    /// Close the connection. The close itself is reported on the channel.
    fn close(&mut self);
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn connect(&mut self, url: &str, events: TransportEvents) -> Result<(), TransportError> {
        (**self).connect(url, events)
    }

    fn send(&mut self, text: &str) -> Result<(), TransportError> {
        (**self).send(text)
    }

    fn close(&mut self) {
        (**self).close();
    }
}

// ---------------------------------------------------------------------------
// In-memory transport
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemoryState {
    connects: Vec<String>,
    sent: Vec<String>,
    events: Option<TransportEvents>,
    connected: bool,
    close_calls: usize,
    fail_connects: usize,
    fail_sends: usize,
}

/// Scriptable in-process transport for hosts without a network and for
/// tests.
///
/// Nothing happens on its own: the paired [`MemoryHandle`] decides when the
/// connection opens, closes, or receives a frame.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    state: Rc<RefCell<MemoryState>>,
}

/// Control side of a [`MemoryTransport`].
#[derive(Debug, Clone)]
pub struct MemoryHandle {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryTransport {
    #[must_use]
    pub fn new() -> (Self, MemoryHandle) {
        let state = Rc::new(RefCell::new(MemoryState::default()));
        let handle = MemoryHandle {
            state: Rc::clone(&state),
        };
        (Self { state }, handle)
    }
}

impl Transport for MemoryTransport {
    fn connect(&mut self, url: &str, events: TransportEvents) -> Result<(), TransportError> {
        let mut state = self.state.borrow_mut();
        state.connects.push(url.to_owned());
        if state.fail_connects > 0 {
            state.fail_connects -= 1;
            return Err(TransportError::Connect {
                url: url.to_owned(),
                reason: "refused".to_owned(),
            });
        }
        state.events = Some(events);
        Ok(())
    }

    fn send(&mut self, text: &str) -> Result<(), TransportError> {
        let mut state = self.state.borrow_mut();
        if !state.connected {
            return Err(TransportError::NotConnected);
        }
        if state.fail_sends > 0 {
            state.fail_sends -= 1;
            return Err(TransportError::Send {
                reason: "buffer full".to_owned(),
            });
        }
        state.sent.push(text.to_owned());
        Ok(())
    }

    fn close(&mut self) {
        self.state.borrow_mut().close_calls += 1;
    }
}

impl MemoryHandle {
    fn post(&self, event: TransportEvent) {
        if let Some(events) = &self.state.borrow().events {
            events.send(event);
        }
    }

    /// Complete the pending connect.
    pub fn open(&self) {
        self.state.borrow_mut().connected = true;
        self.post(TransportEvent::Opened);
    }

    /// Deliver an inbound frame.
    pub fn receive(&self, frame: impl Into<String>) {
        self.post(TransportEvent::Message(frame.into()));
    }

    /// Drop the connection from the remote side.
    pub fn drop_connection(&self, clean: bool) {
        self.state.borrow_mut().connected = false;
        let code = if clean { 1000 } else { 1006 };
        self.post(TransportEvent::Closed {
            clean,
            code,
            reason: String::new(),
        });
    }

    /// Report a transport-level error without closing.
    pub fn error(&self, message: impl Into<String>) {
        self.post(TransportEvent::Error(message.into()));
    }

    /// Make the next `count` connect calls fail synchronously.
    pub fn fail_next_connects(&self, count: usize) {
        self.state.borrow_mut().fail_connects = count;
    }

    /// Make the next `count` sends fail while connected.
    pub fn fail_next_sends(&self, count: usize) {
        self.state.borrow_mut().fail_sends = count;
    }

    /// URLs passed to `connect`, in call order.
    #[must_use]
    pub fn connects(&self) -> Vec<String> {
        self.state.borrow().connects.clone()
    }

    /// Frames written so far, in send order.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        self.state.borrow().sent.clone()
    }

    /// Take the written frames, leaving the log empty.
    pub fn take_sent(&self) -> Vec<String> {
        std::mem::take(&mut self.state.borrow_mut().sent)
    }

    #[must_use]
    pub fn close_calls(&self) -> usize {
        self.state.borrow().close_calls
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state.borrow().connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_transport_posts_scripted_events() {
        let (mut transport, handle) = MemoryTransport::new();
        let (tx, rx) = TransportEvents::channel(3);
        transport.connect("ws://h/ws", tx).unwrap();
        assert_eq!(transport.send("x"), Err(TransportError::NotConnected));

        handle.open();
        transport.send("a{}").unwrap();
        handle.receive("cmd()");
        handle.drop_connection(false);

        let events: Vec<(u64, TransportEvent)> = rx.try_iter().collect();
        assert!(events.iter().all(|(epoch, _)| *epoch == 3));
        let events: Vec<TransportEvent> = events.into_iter().map(|(_, event)| event).collect();
        assert_eq!(
            events,
            [
                TransportEvent::Opened,
                TransportEvent::Message("cmd()".into()),
                TransportEvent::Closed {
                    clean: false,
                    code: 1006,
                    reason: String::new()
                },
            ]
        );
        assert_eq!(handle.sent(), ["a{}"]);
        assert_eq!(handle.connects(), ["ws://h/ws"]);
    }

    #[test]
    fn scripted_failures_are_consumed() {
        let (mut transport, handle) = MemoryTransport::new();
        handle.fail_next_connects(1);
        let (tx, _rx) = TransportEvents::channel(0);
        assert!(transport.connect("u", tx.clone()).is_err());
        assert!(transport.connect("u", tx).is_ok());

        handle.open();
        handle.fail_next_sends(1);
        assert!(matches!(transport.send("a"), Err(TransportError::Send { .. })));
        assert!(transport.send("b").is_ok());
        assert_eq!(handle.take_sent(), ["b"]);
        assert!(handle.sent().is_empty());
    }

    #[test]
    fn reconnect_rebinds_events_to_the_new_epoch() {
        let (mut transport, handle) = MemoryTransport::new();
        let (tx, rx) = channel();
        transport.connect("u", TransportEvents::new(1, tx.clone())).unwrap();
        transport.connect("u", TransportEvents::new(2, tx)).unwrap();
        handle.open();
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), [(2, TransportEvent::Opened)]);
    }
}
