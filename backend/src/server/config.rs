//! HTTP server configuration object and helpers.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

use hello_assistant::outbound::gemini::AssistantSettings;
use hello_assistant::outbound::persistence::DbPool;
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Listener settings loaded via OrthoConfig.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SERVER")]
pub struct ServerSettings {
    /// Interface to bind.
    pub host: Option<String>,
    /// TCP port to bind.
    pub port: Option<u16>,
}

impl ServerSettings {
    /// Resolve the configured host and port into a socket address.
    ///
    /// # Errors
    ///
    /// Returns an error when the host cannot be resolved.
    pub fn bind_addr(&self) -> io::Result<SocketAddr> {
        let host = self.host.as_deref().unwrap_or(DEFAULT_HOST);
        let port = self.port.unwrap_or(DEFAULT_PORT);
        (host, port).to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no address found for {host}:{port}"),
            )
        })
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) assistant: AssistantSettings,
}

impl ServerConfig {
    /// Construct a server configuration for `bind_addr`.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, assistant: AssistantSettings) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            assistant,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without a pool the greeting endpoint serves the fixture greeting.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
