#![forbid(unsafe_code)]

//! Socket URL derivation from the document location.
//!
//! The socket lives on the same host and port as the page, under the page
//! path with a fixed suffix appended: `https://host:8080/app/` becomes
//! `wss://host:8080/app/ws`.

/// The parts of `document.location` the socket URL depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLocation {
    /// Scheme with trailing colon, as the browser reports it (`"https:"`).
    pub protocol: String,
    pub hostname: String,
    pub port: Option<u16>,
    pub pathname: String,
}

impl DocumentLocation {
    #[must_use]
    pub fn new(
        protocol: impl Into<String>,
        hostname: impl Into<String>,
        port: Option<u16>,
        pathname: impl Into<String>,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            hostname: hostname.into(),
            port,
            pathname: pathname.into(),
        }
    }

    /// Split an absolute URL such as `https://host:8080/app/?q=1`.
    ///
    /// Credentials, query, and fragment are dropped. Returns `None` when
    /// there is no scheme or host, or the port is not a number.
    #[must_use]
    pub fn parse(href: &str) -> Option<Self> {
        let (scheme, rest) = href.split_once("://")?;
        if scheme.is_empty() {
            return None;
        }
        let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let (authority, tail) = rest.split_at(authority_end);
        let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

        let (hostname, port) = match authority.rfind(':') {
            // `[::1]` has colons inside the brackets; only a colon after `]`
            // starts a port.
            Some(colon) if !authority[colon..].contains(']') => {
                let port = &authority[colon + 1..];
                let port = if port.is_empty() {
                    None
                } else {
                    Some(port.parse().ok()?)
                };
                (&authority[..colon], port)
            }
            _ => (authority, None),
        };
        if hostname.is_empty() {
            return None;
        }

        let path_end = tail.find(['?', '#']).unwrap_or(tail.len());
        let pathname = match &tail[..path_end] {
            "" => "/",
            path => path,
        };

        Some(Self::new(
            format!("{}:", scheme.to_ascii_lowercase()),
            hostname,
            port,
            pathname,
        ))
    }

    /// Whether the page was served over TLS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.protocol.eq_ignore_ascii_case("https:")
    }

    /// Socket URL for this page: `wss://` for `https:` pages, `ws://`
    /// otherwise, then host, `:port` when present, pathname and `suffix`.
    ///
    /// The suffix is appended directly, without inserting a separator.
    #[must_use]
    pub fn socket_url(&self, suffix: &str) -> String {
        let scheme = if self.is_secure() { "wss://" } else { "ws://" };
        let mut url = format!("{scheme}{}", self.hostname);
        if let Some(port) = self.port {
            url.push(':');
            url.push_str(&port.to_string());
        }
        url.push_str(&self.pathname);
        url.push_str(suffix);
        url
    }
}
