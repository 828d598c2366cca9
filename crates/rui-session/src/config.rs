#![forbid(unsafe_code)]

//! Session tuning knobs.

/// Default delay before reconnecting after an unclean close.
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 10_000;

/// Default path segment appended to the document path for the socket.
pub const DEFAULT_SOCKET_SUFFIX: &str = "ws";

/// Default number of transitions kept in the transition log.
pub const DEFAULT_TRANSITION_LOG_CAPACITY: usize = 256;

/// Configuration of a [`crate::SessionMachine`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Delay between an unclean close and the single reconnect attempt.
    pub reconnect_delay_ms: u64,

    /// Appended verbatim to the document pathname to form the socket path.
    pub socket_suffix: String,

    /// Ring size of the transition log. Zero disables the log.
    pub transition_log_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            socket_suffix: DEFAULT_SOCKET_SUFFIX.to_owned(),
            transition_log_capacity: DEFAULT_TRANSITION_LOG_CAPACITY,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_reconnect_delay_ms(mut self, delay_ms: u64) -> Self {
        self.reconnect_delay_ms = delay_ms;
        self
    }

    #[must_use]
    pub fn with_socket_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.socket_suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn with_transition_log_capacity(mut self, capacity: usize) -> Self {
        self.transition_log_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.reconnect_delay_ms, 10_000);
        assert_eq!(config.socket_suffix, "ws");
        assert_eq!(config.transition_log_capacity, 256);
    }

    #[test]
    fn builders_override() {
        let config = SessionConfig::default()
            .with_reconnect_delay_ms(250)
            .with_socket_suffix("socket")
            .with_transition_log_capacity(0);
        assert_eq!(config.reconnect_delay_ms, 250);
        assert_eq!(config.socket_suffix, "socket");
        assert_eq!(config.transition_log_capacity, 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_fills_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"reconnect_delay_ms":500}"#).unwrap();
        assert_eq!(config.reconnect_delay_ms, 500);
        assert_eq!(config.socket_suffix, "ws");
    }
}
