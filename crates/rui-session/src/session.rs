#![forbid(unsafe_code)]

//! Session driver: runs a [`SessionMachine`] against a [`Transport`].
//!
//! The driver owns the transport exclusively. Transport notifications arrive
//! on an `mpsc` channel and are turned into machine events on
//! [`Session::poll`]; the resulting actions are executed immediately.
//! Time is supplied by the host on every call.
//!
//! Each `OpenTransport` starts a new connection epoch. Only events stamped
//! with the current epoch reach the machine, so a close still queued from a
//! replaced connection cannot tear down its successor.

use std::sync::mpsc::{Receiver, Sender, channel};

use rui_wire::{CommandInterpreter, InboundCommand, MessageSink, Record};

use crate::config::SessionConfig;
use crate::environment::EnvironmentProbe;
use crate::error::SessionError;
use crate::location::DocumentLocation;
use crate::machine::{
    ConnectionState, SessionAction, SessionEvent, SessionMachine, SessionStats,
    SessionTransition,
};
use crate::transport::{Transport, TransportEvent, TransportEvents};

/// A client session bound to one transport.
pub struct Session<T: Transport> {
    machine: SessionMachine,
    transport: T,
    events_tx: Sender<(u64, TransportEvent)>,
    events_rx: Receiver<(u64, TransportEvent)>,
    epoch: u64,
    inbound: Vec<InboundCommand>,
    clock_ms: u64,
}

impl<T: Transport> core::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("machine", &self.machine)
            .field("epoch", &self.epoch)
            .field("pending_inbound", &self.inbound.len())
            .field("clock_ms", &self.clock_ms)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Session<T> {
    /// Session for the page at `location`.
    pub fn new<P>(transport: T, config: SessionConfig, location: &DocumentLocation, probe: P) -> Self
    where
        P: EnvironmentProbe + 'static,
    {
        let url = location.socket_url(&config.socket_suffix);
        Self::with_url(transport, config, url, probe)
    }

    /// Session connecting to an explicit socket URL.
    pub fn with_url<P>(transport: T, config: SessionConfig, url: impl Into<String>, probe: P) -> Self
    where
        P: EnvironmentProbe + 'static,
    {
        let (events_tx, events_rx) = channel();
        Self {
            machine: SessionMachine::new(config, url, Box::new(probe)),
            transport,
            events_tx,
            events_rx,
            epoch: 0,
            inbound: Vec::new(),
            clock_ms: 0,
        }
    }

    #[must_use]
    pub fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.machine.state()
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.machine.session_id()
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.machine.stats()
    }

    /// Epoch of the most recent connection attempt (0 before the first).
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// When the host should poll next, if a timer is pending.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.machine.reconnect_deadline()
    }

    /// Open the first connection.
    pub fn start(&mut self, now_ms: u64) {
        self.dispatch(now_ms, SessionEvent::Start);
    }

    /// Submit an event record; `session=<id>` is added as its first field.
    pub fn submit(&mut self, record: Record) -> Result<(), SessionError> {
        self.submit_event(SessionEvent::Submit(record))
    }

    /// Submit a record without adding the session field.
    pub fn submit_raw(&mut self, record: Record) -> Result<(), SessionError> {
        self.submit_event(SessionEvent::SubmitRaw(record))
    }

    fn submit_event(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        if self.machine.is_terminated() {
            return Err(SessionError::Terminated);
        }
        self.dispatch(self.clock_ms, event);
        Ok(())
    }

    pub fn focus_gained(&mut self, now_ms: u64) {
        self.dispatch(now_ms, SessionEvent::FocusGained);
    }

    pub fn focus_lost(&mut self, now_ms: u64) {
        self.dispatch(now_ms, SessionEvent::FocusLost);
    }

    /// Page unload: best-effort `session-close`, then close locally.
    pub fn unload(&mut self, now_ms: u64) {
        self.dispatch(now_ms, SessionEvent::Unload);
    }

    /// Explicit teardown. Later submissions fail with
    /// [`SessionError::Terminated`].
    pub fn close(&mut self, now_ms: u64) {
        self.dispatch(now_ms, SessionEvent::CloseRequested);
    }

    /// Record the id the server assigned to this session.
    pub fn assign_session_id(&mut self, id: impl Into<String>) {
        self.dispatch(self.clock_ms, SessionEvent::SessionAssigned(id.into()));
    }

    /// Send a fresh `startSession` handshake.
    pub fn restart(&mut self, now_ms: u64) {
        self.dispatch(now_ms, SessionEvent::RestartRequested);
    }

    /// Consume pending transport events, fire due timers, and return the
    /// inbound commands received since the last poll.
    pub fn poll(&mut self, now_ms: u64) -> Vec<InboundCommand> {
        while let Ok((epoch, event)) = self.events_rx.try_recv() {
            if epoch != self.epoch {
                tracing::debug!(
                    message = "session.stale_event",
                    epoch,
                    current = self.epoch,
                    event = ?event
                );
                continue;
            }
            let event = match event {
                TransportEvent::Opened => SessionEvent::TransportOpened,
                TransportEvent::Message(frame) => SessionEvent::TransportMessage(frame),
                TransportEvent::Closed {
                    clean,
                    code,
                    reason,
                } => SessionEvent::TransportClosed {
                    clean,
                    code,
                    reason,
                },
                TransportEvent::Error(reason) => SessionEvent::TransportError(reason),
            };
            self.dispatch(now_ms, event);
        }
        self.dispatch(now_ms, SessionEvent::Tick);
        std::mem::take(&mut self.inbound)
    }

    /// [`Session::poll`], handing each command to `interpreter`. Returns the
    /// number of commands executed.
    pub fn pump<I>(&mut self, now_ms: u64, interpreter: &mut I) -> usize
    where
        I: CommandInterpreter + ?Sized,
    {
        let commands = self.poll(now_ms);
        for command in &commands {
            interpreter.execute(command);
        }
        commands.len()
    }

    /// Drain the machine's transition log as JSONL.
    pub fn drain_transition_jsonl(&mut self, run_id: &str) -> Vec<String> {
        self.machine.drain_transition_jsonl(run_id)
    }

    fn dispatch(&mut self, now_ms: u64, event: SessionEvent) {
        self.clock_ms = self.clock_ms.max(now_ms);
        let transition = self.machine.handle_event(self.clock_ms, event);
        self.execute(transition);
    }

    fn execute(&mut self, transition: SessionTransition) {
        let mut unsent = Vec::new();
        let mut failure = None;

        for action in transition.actions {
            match action {
                SessionAction::Send(frame) => {
                    if failure.is_some() {
                        unsent.push(frame);
                    } else if let Err(err) = self.transport.send(frame.as_str()) {
                        failure = Some(err.to_string());
                        unsent.push(frame);
                    }
                }
                SessionAction::OpenTransport { url } => {
                    self.epoch += 1;
                    let events = TransportEvents::new(self.epoch, self.events_tx.clone());
                    if let Err(err) = self.transport.connect(&url, events.clone()) {
                        tracing::warn!(message = "session.connect_failed", url = %url, error = %err);
                        // Fed back as an unclean close on the next poll.
                        events.send(TransportEvent::Error(err.to_string()));
                        events.send(TransportEvent::Closed {
                            clean: false,
                            code: 1006,
                            reason: err.to_string(),
                        });
                    }
                }
                SessionAction::CloseTransport => self.transport.close(),
                SessionAction::Deliver(command) => self.inbound.push(command),
                // The machine keeps the deadline; `poll` fires it.
                SessionAction::ArmReconnectTimer { .. } | SessionAction::CancelReconnectTimer => {}
            }
        }

        if let Some(reason) = failure {
            self.dispatch(self.clock_ms, SessionEvent::SendFailed { unsent, reason });
        }
    }
}

impl<T: Transport> MessageSink for Session<T> {
    fn submit(&mut self, record: Record) {
        if let Err(err) = Session::submit(self, record) {
            tracing::warn!(message = "session.submit_rejected", error = %err);
        }
    }
}
