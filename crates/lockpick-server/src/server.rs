//! `LockpickServer` builder and accept loop.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, error, info};

use lockpick_protocol::JsonCodec;
use lockpick_rooms::{RoomStore, StoreConfig};
use lockpick_transport::{Transport, WebSocketTransport};

use crate::ServerError;
use crate::handler::handle_connection;
use crate::registry::Registry;

/// Gateway-level tunables; room-level ones live in [`StoreConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Pause between a transport drop and the automatic leave, giving
    /// a reconnecting client time to rebind.
    pub disconnect_leave_delay: Duration,
    /// A connection silent this long is treated as dead. Clients ping
    /// well inside this window.
    pub recv_idle_timeout: Duration,
    /// How often the maintenance sweep runs.
    pub sweep_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            disconnect_leave_delay: Duration::from_secs(10),
            recv_idle_timeout: Duration::from_secs(30),
            sweep_interval: Duration::from_secs(30),
        }
    }
}

/// Shared state handed to every connection task.
pub(crate) struct ServerState {
    pub(crate) store: Mutex<RoomStore>,
    pub(crate) registry: Registry,
    pub(crate) codec: JsonCodec,
    pub(crate) config: ServerConfig,
}

/// Builder for a [`LockpickServer`].
///
/// ```rust,ignore
/// let server = LockpickServer::builder()
///     .bind("0.0.0.0:3001")
///     .store_config(store_config)
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct LockpickServerBuilder {
    bind_addr: String,
    server_config: ServerConfig,
    store_config: StoreConfig,
}

impl LockpickServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".to_string(),
            server_config: ServerConfig::default(),
            store_config: StoreConfig::default(),
        }
    }

    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    pub fn server_config(mut self, config: ServerConfig) -> Self {
        self.server_config = config;
        self
    }

    pub fn store_config(mut self, config: StoreConfig) -> Self {
        self.store_config = config;
        self
    }

    /// Binds the listener and restores any room snapshots.
    pub async fn build(self) -> Result<LockpickServer, ServerError> {
        let transport =
            WebSocketTransport::bind(&self.bind_addr).await?;

        let mut store = RoomStore::new(self.store_config);
        let restored = store.load_snapshots().await?;
        if restored > 0 {
            info!(rooms = restored, "restored rooms from snapshots");
        }

        Ok(LockpickServer {
            transport,
            state: Arc::new(ServerState {
                store: Mutex::new(store),
                registry: Registry::default(),
                codec: JsonCodec,
                config: self.server_config,
            }),
        })
    }
}

impl Default for LockpickServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound, ready-to-run gateway.
pub struct LockpickServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl LockpickServer {
    pub fn builder() -> LockpickServerBuilder {
        LockpickServerBuilder::new()
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Accepts connections until the process ends. Each connection
    /// gets its own task; a background task runs the periodic sweep.
    pub async fn run(mut self) -> Result<(), ServerError> {
        info!("lockpick server running");
        spawn_sweeper(Arc::clone(&self.state));

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        handle_connection(conn, state).await;
                    });
                }
                Err(e) => {
                    error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Periodic housekeeping: expired reservations, stale disconnects,
/// dead rooms. Departure broadcasts are queued while the store lock is
/// held, like every other broadcast.
fn spawn_sweeper(state: Arc<ServerState>) {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(state.config.sweep_interval);
        interval.tick().await; // first tick fires immediately
        loop {
            interval.tick().await;
            let mut store = state.store.lock().await;
            let report = store.sweep();
            if report.departures.is_empty()
                && report.removed_rooms.is_empty()
            {
                continue;
            }
            debug!(
                departures = report.departures.len(),
                removed_rooms = report.removed_rooms.len(),
                "sweep pass"
            );
            for left in &report.departures {
                state
                    .registry
                    .broadcast(
                        &left.remaining,
                        &lockpick_protocol::ServerEvent::PlayerLeft {
                            player_name: left.player_name.clone(),
                            players: left.roster.clone(),
                            new_host_id: left.new_host_id.clone(),
                        },
                    )
                    .await;
            }
        }
    });
}
