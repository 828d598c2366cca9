#![forbid(unsafe_code)]

//! Client bundle errors.

use rui_session::SessionError;
use rui_wire::WireError;

/// Errors surfaced by [`crate::WebClient`] to page scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// A page script handed over text that is not a record.
    Wire(WireError),
    /// The session was closed by the host.
    Session(SessionError),
}

impl core::fmt::Display for ClientError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Wire(err) => write!(f, "malformed record: {err}"),
            Self::Session(err) => write!(f, "session unavailable: {err}"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wire(err) => Some(err),
            Self::Session(err) => Some(err),
        }
    }
}

impl From<WireError> for ClientError {
    fn from(err: WireError) -> Self {
        Self::Wire(err)
    }
}

impl From<SessionError> for ClientError {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}
