#![forbid(unsafe_code)]

//! Transport and session errors.

/// Failures reported by a [`crate::Transport`].
///
/// None of these reach the caller of [`crate::Session::submit`]: the session
/// recovers by queueing and reconnecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The connection could not be created.
    Connect { url: String, reason: String },
    /// A frame could not be written.
    Send { reason: String },
    /// `send` was called without an open connection.
    NotConnected,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Connect { url, reason } => write!(f, "cannot connect to {url}: {reason}"),
            Self::Send { reason } => write!(f, "send failed: {reason}"),
            Self::NotConnected => f.write_str("transport is not connected"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Errors returned to callers of the session driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The session was closed explicitly and accepts no further messages.
    Terminated,
}

impl core::fmt::Display for SessionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Terminated => f.write_str("session has been terminated"),
        }
    }
}

impl std::error::Error for SessionError {}
