//! HTTP server configuration object.

use std::net::SocketAddr;

use edunexus::inbound::http::session_config::SessionSettings;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Construct a server configuration from session settings and a bind
    /// address.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self { session, bind_addr }
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
