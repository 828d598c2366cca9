#![forbid(unsafe_code)]

//! Inbound framing and outbound sinks.
//!
//! The server pushes whole command scripts, one per transport message. The
//! codec only frames them: it never looks inside, it just hands each one to
//! a [`CommandInterpreter`] in arrival order.

use crate::record::Record;

/// One complete command script received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    seq: u64,
    script: String,
}

impl InboundCommand {
    /// Frame a transport message.
    ///
    /// Returns `None` for blank messages (keep-alives), which carry no
    /// command.
    #[must_use]
    pub fn from_frame(seq: u64, frame: impl Into<String>) -> Option<Self> {
        let script = frame.into();
        if script.trim().is_empty() {
            return None;
        }
        Some(Self { seq, script })
    }

    /// Arrival sequence number, monotonically increasing per session.
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    /// The opaque script text.
    #[must_use]
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Consume the command and return the script text.
    #[must_use]
    pub fn into_script(self) -> String {
        self.script
    }
}

/// Executes inbound command scripts.
///
/// Implemented by the host page; the command set is owned by the server.
pub trait CommandInterpreter {
    /// Run one command.
    fn execute(&mut self, command: &InboundCommand);
}

impl<F> CommandInterpreter for F
where
    F: FnMut(&InboundCommand),
{
    fn execute(&mut self, command: &InboundCommand) {
        self(command);
    }
}

/// Accepts outbound records.
pub trait MessageSink {
    /// Submit one record for delivery.
    fn submit(&mut self, record: Record);
}

impl MessageSink for Vec<Record> {
    fn submit(&mut self, record: Record) {
        self.push(record);
    }
}

impl<S: MessageSink + ?Sized> MessageSink for &mut S {
    fn submit(&mut self, record: Record) {
        (**self).submit(record);
    }
}
