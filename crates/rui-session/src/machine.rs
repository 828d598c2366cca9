#![forbid(unsafe_code)]

//! Sans-IO session state machine.
//!
//! [`SessionMachine::handle_event`] consumes one [`SessionEvent`] at a host
//! supplied time and returns a [`SessionTransition`] listing the
//! [`SessionAction`]s the driver must perform. The machine never touches a
//! transport or a clock itself.
//!
//! # States
//!
//! ```text
//!   Disconnected --connect--> Connecting --opened--> Open
//!        ^                        |                   |
//!        +-------closed-----------+-------closed------+
//!        |                                            |
//!        +------closed------ Closing <--local close---+
//! ```
//!
//! # Invariants
//!
//! - Outbound messages leave in submission order. A message is either sent
//!   or queued, never both; failed sends go back to the head of the queue.
//! - At most one reconnect timer is pending.
//! - Every connection that opens with a known session id sends exactly one
//!   `reconnect{session=<id>}` before anything else.
//! - After [`SessionEvent::CloseRequested`] no connection is opened again.

use std::collections::VecDeque;

use rui_wire::{InboundCommand, Record, Value};

use crate::config::SessionConfig;
use crate::environment::EnvironmentProbe;

/// Session id used on the wire before the server assigns one.
pub const UNASSIGNED_SESSION_ID: &str = "0";

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Open,
    Closing,
}

impl ConnectionState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closing => "closing",
        }
    }
}

/// Input to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Page loaded: open the first connection.
    Start,
    /// Outbound event record; gets `session=<id>` as its first field.
    Submit(Record),
    /// Outbound record sent as is.
    SubmitRaw(Record),
    TransportOpened,
    TransportMessage(String),
    TransportClosed {
        clean: bool,
        code: u16,
        reason: String,
    },
    TransportError(String),
    /// Frames the driver could not write, in their original order.
    SendFailed {
        unsent: Vec<OutboundFrame>,
        reason: String,
    },
    FocusGained,
    FocusLost,
    /// The page is going away.
    Unload,
    /// Explicit teardown. Terminal.
    CloseRequested,
    /// Time advanced; fires a due reconnect timer.
    Tick,
    /// The server told us our session id.
    SessionAssigned(String),
    /// The server asked for a fresh `startSession` handshake.
    RestartRequested,
}

/// Payload-free name of a [`SessionEvent`], used in transitions and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEventKind {
    Start,
    Submit,
    SubmitRaw,
    TransportOpened,
    TransportMessage,
    TransportClosed,
    TransportError,
    SendFailed,
    FocusGained,
    FocusLost,
    Unload,
    CloseRequested,
    Tick,
    SessionAssigned,
    RestartRequested,
}

impl SessionEventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Submit => "submit",
            Self::SubmitRaw => "submit_raw",
            Self::TransportOpened => "transport_opened",
            Self::TransportMessage => "transport_message",
            Self::TransportClosed => "transport_closed",
            Self::TransportError => "transport_error",
            Self::SendFailed => "send_failed",
            Self::FocusGained => "focus_gained",
            Self::FocusLost => "focus_lost",
            Self::Unload => "unload",
            Self::CloseRequested => "close_requested",
            Self::Tick => "tick",
            Self::SessionAssigned => "session_assigned",
            Self::RestartRequested => "restart_requested",
        }
    }
}

impl SessionEvent {
    #[must_use]
    pub const fn kind(&self) -> SessionEventKind {
        match self {
            Self::Start => SessionEventKind::Start,
            Self::Submit(_) => SessionEventKind::Submit,
            Self::SubmitRaw(_) => SessionEventKind::SubmitRaw,
            Self::TransportOpened => SessionEventKind::TransportOpened,
            Self::TransportMessage(_) => SessionEventKind::TransportMessage,
            Self::TransportClosed { .. } => SessionEventKind::TransportClosed,
            Self::TransportError(_) => SessionEventKind::TransportError,
            Self::SendFailed { .. } => SessionEventKind::SendFailed,
            Self::FocusGained => SessionEventKind::FocusGained,
            Self::FocusLost => SessionEventKind::FocusLost,
            Self::Unload => SessionEventKind::Unload,
            Self::CloseRequested => SessionEventKind::CloseRequested,
            Self::Tick => SessionEventKind::Tick,
            Self::SessionAssigned(_) => SessionEventKind::SessionAssigned,
            Self::RestartRequested => SessionEventKind::RestartRequested,
        }
    }
}

/// Role of an outbound frame, carried next to its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// `reconnect{session=<id>}` opening a resumed connection.
    Reconnect,
    /// `startSession{...}` handshake.
    StartSession,
    /// Everything submitted by the page or the session itself.
    Message,
}

/// One encoded outbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    pub kind: FrameKind,
    pub text: String,
}

impl OutboundFrame {
    #[must_use]
    pub fn new(kind: FrameKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn message(text: impl Into<String>) -> Self {
        Self::new(FrameKind::Message, text)
    }

    #[must_use]
    pub const fn is_handshake(&self) -> bool {
        matches!(self.kind, FrameKind::Reconnect | FrameKind::StartSession)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Work the driver performs after a transition, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    OpenTransport { url: String },
    Send(OutboundFrame),
    CloseTransport,
    ArmReconnectTimer { deadline_ms: u64 },
    CancelReconnectTimer,
    Deliver(InboundCommand),
}

impl SessionAction {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::OpenTransport { .. } => "open_transport",
            Self::Send(_) => "send",
            Self::CloseTransport => "close_transport",
            Self::ArmReconnectTimer { .. } => "arm_reconnect_timer",
            Self::CancelReconnectTimer => "cancel_reconnect_timer",
            Self::Deliver(_) => "deliver",
        }
    }
}

/// Result of one [`SessionMachine::handle_event`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTransition {
    pub seq: u64,
    pub at_ms: u64,
    pub event: SessionEventKind,
    pub from_state: ConnectionState,
    pub to_state: ConnectionState,
    pub session_id: Option<String>,
    pub clean_close: Option<bool>,
    pub close_code: Option<u16>,
    pub reason: Option<String>,
    pub actions: Vec<SessionAction>,
}

impl SessionTransition {
    /// Frames this transition asks the driver to send.
    pub fn sends(&self) -> impl Iterator<Item = &str> + '_ {
        self.actions.iter().filter_map(|action| match action {
            SessionAction::Send(frame) => Some(frame.as_str()),
            _ => None,
        })
    }
}

/// Running counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames handed to the transport and not reported failed.
    pub sent: u64,
    /// Messages that had to wait in the queue.
    pub queued: u64,
    /// Connection attempts after the first successful open.
    pub reconnect_attempts: u64,
    pub inbound_commands: u64,
    pub closes: u64,
}

#[derive(Debug, Default)]
struct Outcome {
    actions: Vec<SessionAction>,
    clean_close: Option<bool>,
    close_code: Option<u16>,
    reason: Option<String>,
}

/// Session identity, outbound queue, and connection lifecycle.
pub struct SessionMachine {
    config: SessionConfig,
    url: String,
    probe: Box<dyn EnvironmentProbe>,
    state: ConnectionState,
    session_id: Option<String>,
    window_focus: bool,
    queue: VecDeque<OutboundFrame>,
    resume_pending: bool,
    start_pending: bool,
    reconnect_deadline: Option<u64>,
    ever_opened: bool,
    terminated: bool,
    next_seq: u64,
    inbound_seq: u64,
    stats: SessionStats,
    log: VecDeque<SessionTransition>,
}

impl core::fmt::Debug for SessionMachine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionMachine")
            .field("url", &self.url)
            .field("state", &self.state)
            .field("session_id", &self.session_id)
            .field("window_focus", &self.window_focus)
            .field("queued", &self.queue.len())
            .field("reconnect_deadline", &self.reconnect_deadline)
            .field("terminated", &self.terminated)
            .finish_non_exhaustive()
    }
}

impl SessionMachine {
    /// A disconnected machine that will connect to `url`.
    #[must_use]
    pub fn new(
        config: SessionConfig,
        url: impl Into<String>,
        probe: Box<dyn EnvironmentProbe>,
    ) -> Self {
        Self {
            config,
            url: url.into(),
            probe,
            state: ConnectionState::Disconnected,
            session_id: None,
            window_focus: true,
            queue: VecDeque::new(),
            resume_pending: false,
            start_pending: false,
            reconnect_deadline: None,
            ever_opened: false,
            terminated: false,
            next_seq: 0,
            inbound_seq: 0,
            stats: SessionStats::default(),
            log: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Server-assigned session id, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Session id as written on the wire (`"0"` until assigned).
    #[must_use]
    pub fn wire_session_id(&self) -> &str {
        self.session_id.as_deref().unwrap_or(UNASSIGNED_SESSION_ID)
    }

    #[must_use]
    pub const fn has_window_focus(&self) -> bool {
        self.window_focus
    }

    #[must_use]
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    /// Deadline of the pending reconnect timer.
    #[must_use]
    pub const fn reconnect_deadline(&self) -> Option<u64> {
        self.reconnect_deadline
    }

    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        self.terminated
    }

    #[must_use]
    pub const fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Logged transitions, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &SessionTransition> + '_ {
        self.log.iter()
    }

    /// Apply one event.
    pub fn handle_event(&mut self, now_ms: u64, event: SessionEvent) -> SessionTransition {
        let kind = event.kind();
        let from_state = self.state;
        let mut out = Outcome::default();

        match event {
            SessionEvent::Start => self.on_start(&mut out),
            SessionEvent::Submit(record) => self.on_submit(record, true, &mut out),
            SessionEvent::SubmitRaw(record) => self.on_submit(record, false, &mut out),
            SessionEvent::TransportOpened => self.on_opened(&mut out),
            SessionEvent::TransportMessage(frame) => self.on_message(frame, &mut out),
            SessionEvent::TransportClosed {
                clean,
                code,
                reason,
            } => self.on_closed(now_ms, clean, code, reason, &mut out),
            SessionEvent::TransportError(reason) => {
                tracing::warn!(
                    message = "session.transport_error",
                    state = self.state.as_str(),
                    error = %reason
                );
                out.reason = Some(reason);
            }
            SessionEvent::SendFailed { unsent, reason } => {
                self.on_send_failed(now_ms, unsent, reason, &mut out);
            }
            SessionEvent::FocusGained => self.on_focus_gained(&mut out),
            SessionEvent::FocusLost => self.on_focus_lost(&mut out),
            SessionEvent::Unload => self.on_unload(&mut out),
            SessionEvent::CloseRequested => self.on_close_requested(&mut out),
            SessionEvent::Tick => self.on_tick(now_ms, &mut out),
            SessionEvent::SessionAssigned(id) => self.session_id = Some(id),
            SessionEvent::RestartRequested => self.on_restart(&mut out),
        }

        let transition = SessionTransition {
            seq: self.next_seq,
            at_ms: now_ms,
            event: kind,
            from_state,
            to_state: self.state,
            session_id: self.session_id.clone(),
            clean_close: out.clean_close,
            close_code: out.close_code,
            reason: out.reason,
            actions: out.actions,
        };
        self.next_seq += 1;

        tracing::debug!(
            message = "session.transition",
            seq = transition.seq,
            event = kind.as_str(),
            from = from_state.as_str(),
            to = self.state.as_str(),
            actions = transition.actions.len(),
            queued = self.queue.len()
        );
        self.remember(&transition);
        transition
    }

    /// Drain the transition log as JSONL lines tagged with `run_id`.
    pub fn drain_transition_jsonl(&mut self, run_id: &str) -> Vec<String> {
        self.log
            .drain(..)
            .map(|transition| {
                let actions: Vec<&str> = transition.actions.iter().map(SessionAction::kind).collect();
                serde_json::json!({
                    "schema_version": "rui-session-v1",
                    "type": "session_transition",
                    "run_id": run_id,
                    "seq": transition.seq,
                    "at_ms": transition.at_ms,
                    "event": transition.event.as_str(),
                    "from_state": transition.from_state.as_str(),
                    "to_state": transition.to_state.as_str(),
                    "session_id": transition.session_id,
                    "clean_close": transition.clean_close,
                    "close_code": transition.close_code,
                    "reason": transition.reason,
                    "actions": actions,
                })
                .to_string()
            })
            .collect()
    }

    fn remember(&mut self, transition: &SessionTransition) {
        let capacity = self.config.transition_log_capacity;
        if capacity == 0 {
            return;
        }
        while self.log.len() >= capacity {
            self.log.pop_front();
        }
        self.log.push_back(transition.clone());
    }

    // -- handlers ----------------------------------------------------------

    fn on_start(&mut self, out: &mut Outcome) {
        if self.terminated {
            out.reason = Some("terminated".to_owned());
            return;
        }
        if self.state == ConnectionState::Disconnected {
            self.start_pending = true;
            self.connect(out);
        }
    }

    fn on_submit(&mut self, mut record: Record, with_session: bool, out: &mut Outcome) {
        if self.terminated {
            out.reason = Some("terminated".to_owned());
            return;
        }
        if with_session {
            record.insert_first("session", Value::Bare(self.wire_session_id().to_owned()));
        }
        self.send_or_queue(OutboundFrame::message(record.encode()), out);
    }

    fn on_opened(&mut self, out: &mut Outcome) {
        if self.state != ConnectionState::Connecting {
            out.reason = Some("stale open".to_owned());
            return;
        }
        self.state = ConnectionState::Open;
        self.ever_opened = true;

        if let Some(id) = self.session_id.clone() {
            let reconnect = Record::new("reconnect").with_bare("session", id);
            self.send(OutboundFrame::new(FrameKind::Reconnect, reconnect.encode()), out);
        } else {
            self.start_pending = true;
        }
        if std::mem::take(&mut self.start_pending) {
            self.send(self.start_session_frame(), out);
        }
        if std::mem::take(&mut self.resume_pending) {
            let resume = self.session_record("session-resume");
            self.send(OutboundFrame::message(resume.encode()), out);
        }
        while let Some(frame) = self.queue.pop_front() {
            self.send(frame, out);
        }
    }

    fn on_message(&mut self, frame: String, out: &mut Outcome) {
        if let Some(command) = InboundCommand::from_frame(self.inbound_seq, frame) {
            self.inbound_seq += 1;
            self.stats.inbound_commands += 1;
            out.actions.push(SessionAction::Deliver(command));
        }
    }

    fn on_closed(&mut self, now_ms: u64, clean: bool, code: u16, reason: String, out: &mut Outcome) {
        out.clean_close = Some(clean);
        out.close_code = Some(code);
        out.reason = (!reason.is_empty()).then_some(reason);
        self.stats.closes += 1;
        tracing::info!(
            message = "session.closed",
            clean,
            code,
            state = self.state.as_str(),
            focused = self.window_focus
        );

        match self.state {
            ConnectionState::Disconnected => {}
            ConnectionState::Closing => self.state = ConnectionState::Disconnected,
            ConnectionState::Connecting | ConnectionState::Open => {
                self.state = ConnectionState::Disconnected;
                if !clean {
                    self.arm_reconnect(now_ms, out);
                }
            }
        }
    }

    fn on_send_failed(
        &mut self,
        now_ms: u64,
        unsent: Vec<OutboundFrame>,
        reason: String,
        out: &mut Outcome,
    ) {
        let count = unsent.len() as u64;
        tracing::warn!(
            message = "session.send_failed",
            unsent = count,
            error = %reason
        );
        out.reason = Some(reason);
        self.stats.sent = self.stats.sent.saturating_sub(count);
        // Handshake frames are rebuilt by the next open, never replayed.
        let mut requeue = Vec::with_capacity(unsent.len());
        for frame in unsent {
            match frame.kind {
                FrameKind::Reconnect => {}
                FrameKind::StartSession => self.start_pending = true,
                FrameKind::Message => requeue.push(frame),
            }
        }
        self.stats.queued += requeue.len() as u64;
        for frame in requeue.into_iter().rev() {
            self.queue.push_front(frame);
        }
        if self.state == ConnectionState::Open {
            self.state = ConnectionState::Disconnected;
            out.actions.push(SessionAction::CloseTransport);
            self.arm_reconnect(now_ms, out);
        }
    }

    fn on_focus_gained(&mut self, out: &mut Outcome) {
        self.window_focus = true;
        if self.terminated {
            return;
        }
        match self.state {
            ConnectionState::Open => {
                let resume = self.session_record("session-resume");
                self.send_or_queue(OutboundFrame::message(resume.encode()), out);
            }
            ConnectionState::Disconnected => {
                self.resume_pending = true;
                self.connect(out);
            }
            ConnectionState::Connecting | ConnectionState::Closing => self.resume_pending = true,
        }
    }

    fn on_focus_lost(&mut self, out: &mut Outcome) {
        self.window_focus = false;
        self.resume_pending = false;
        if self.terminated {
            return;
        }
        let pause = self.session_record("session-pause");
        self.send_or_queue(OutboundFrame::message(pause.encode()), out);
    }

    fn on_unload(&mut self, out: &mut Outcome) {
        self.cancel_reconnect(out);
        match self.state {
            ConnectionState::Open => {
                let close = self.session_record("session-close");
                self.send(OutboundFrame::message(close.encode()), out);
                out.actions.push(SessionAction::CloseTransport);
                self.state = ConnectionState::Closing;
            }
            ConnectionState::Connecting => {
                out.actions.push(SessionAction::CloseTransport);
                self.state = ConnectionState::Closing;
            }
            ConnectionState::Disconnected | ConnectionState::Closing => {}
        }
    }

    fn on_close_requested(&mut self, out: &mut Outcome) {
        self.terminated = true;
        self.cancel_reconnect(out);
        self.resume_pending = false;
        self.start_pending = false;
        let dropped = self.queue.len();
        self.queue.clear();
        if dropped > 0 {
            tracing::info!(message = "session.terminated", dropped);
        }
        if matches!(self.state, ConnectionState::Open | ConnectionState::Connecting) {
            out.actions.push(SessionAction::CloseTransport);
            self.state = ConnectionState::Closing;
        }
        out.reason = Some("closed by host".to_owned());
    }

    fn on_tick(&mut self, now_ms: u64, out: &mut Outcome) {
        let Some(deadline) = self.reconnect_deadline else {
            return;
        };
        if now_ms < deadline {
            return;
        }
        self.reconnect_deadline = None;
        if self.state == ConnectionState::Disconnected && !self.terminated {
            self.connect(out);
        }
    }

    fn on_restart(&mut self, out: &mut Outcome) {
        if self.terminated {
            out.reason = Some("terminated".to_owned());
            return;
        }
        match self.state {
            ConnectionState::Open => {
                let handshake = self.start_session_frame();
                self.send_or_queue(handshake, out);
            }
            ConnectionState::Disconnected => {
                self.start_pending = true;
                self.connect(out);
            }
            ConnectionState::Connecting | ConnectionState::Closing => self.start_pending = true,
        }
    }

    // -- helpers -----------------------------------------------------------

    fn session_record(&self, tag: &str) -> Record {
        Record::new(tag).with_bare("session", self.wire_session_id())
    }

    fn start_session_frame(&self) -> OutboundFrame {
        let handshake = self.probe.environment_facts().start_session_record();
        OutboundFrame::new(FrameKind::StartSession, handshake.encode())
    }

    fn send(&mut self, frame: OutboundFrame, out: &mut Outcome) {
        self.stats.sent += 1;
        out.actions.push(SessionAction::Send(frame));
    }

    fn send_or_queue(&mut self, frame: OutboundFrame, out: &mut Outcome) {
        if self.state == ConnectionState::Open && self.queue.is_empty() {
            self.send(frame, out);
            return;
        }
        self.queue.push_back(frame);
        self.stats.queued += 1;
        if self.state == ConnectionState::Disconnected {
            self.connect(out);
        }
    }

    fn connect(&mut self, out: &mut Outcome) {
        if self.terminated {
            return;
        }
        self.cancel_reconnect(out);
        if self.ever_opened {
            self.stats.reconnect_attempts += 1;
        }
        self.state = ConnectionState::Connecting;
        out.actions.push(SessionAction::OpenTransport {
            url: self.url.clone(),
        });
    }

    fn arm_reconnect(&mut self, now_ms: u64, out: &mut Outcome) {
        if self.terminated
            || !self.window_focus
            || self.reconnect_deadline.is_some()
            || self.state == ConnectionState::Connecting
        {
            return;
        }
        let deadline_ms = now_ms.saturating_add(self.config.reconnect_delay_ms);
        self.reconnect_deadline = Some(deadline_ms);
        out.actions.push(SessionAction::ArmReconnectTimer { deadline_ms });
        tracing::debug!(message = "session.reconnect_armed", deadline_ms);
    }

    fn cancel_reconnect(&mut self, out: &mut Outcome) {
        if self.reconnect_deadline.take().is_some() {
            out.actions.push(SessionAction::CancelReconnectTimer);
        }
    }
}
