//! `SocketmonServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → registry/game.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use socketmon_game::{GridConfig, Orchestrator};
use socketmon_protocol::{Codec, JsonCodec};
use socketmon_registry::ConnectionRegistry;
use socketmon_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::SocketmonError;

/// How long a connection may go without sending any frame, heartbeat
/// pongs included, before it's dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Shared server state passed to each connection handler task.
///
/// Lock order is always `orchestrator` then `registry`. Events are pushed
/// into the registry's channels while the orchestrator is still locked,
/// so two moves in the same game can't have their replies interleaved.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) orchestrator: Mutex<Orchestrator>,
    pub(crate) registry: Mutex<ConnectionRegistry>,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Socketmon server.
///
/// # Example
///
/// ```rust,ignore
/// let server = SocketmonServerBuilder::new()
///     .bind("0.0.0.0:3001")
///     .grid(GridConfig::new(8)?)
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct SocketmonServerBuilder {
    bind_addr: String,
    grid: GridConfig,
    idle_timeout: Duration,
}

impl SocketmonServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".to_string(),
            grid: GridConfig::default(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the grid every game is played on.
    pub fn grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    /// Sets how long a connection that sends nothing, not even pongs, is
    /// kept open.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<SocketmonServer<JsonCodec>, SocketmonError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            orchestrator: Mutex::new(Orchestrator::new(self.grid)),
            registry: Mutex::new(ConnectionRegistry::new()),
            codec: JsonCodec,
            idle_timeout: self.idle_timeout,
        });

        Ok(SocketmonServer { transport, state })
    }
}

impl Default for SocketmonServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Socketmon server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct SocketmonServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl SocketmonServer<JsonCodec> {
    /// Shorthand for [`SocketmonServerBuilder::new`].
    pub fn builder() -> SocketmonServerBuilder {
        SocketmonServerBuilder::new()
    }
}

impl<C: Codec> SocketmonServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), SocketmonError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` resolves.
    ///
    /// Connection tasks already spawned keep running until their clients
    /// leave; no new connections are accepted.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), SocketmonError> {
        tracing::info!("Socketmon server running");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested, no longer accepting connections");
                    return Ok(());
                }
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }
    }
}
