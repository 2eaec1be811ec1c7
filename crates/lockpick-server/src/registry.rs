//! Outbound event routing.
//!
//! Each connection task owns the receiving half of an unbounded
//! channel; the registry holds the sending halves. Dispatch pushes
//! events into these channels while the room-store lock is held, which
//! is what guarantees every client sees broadcasts in the same order
//! the store applied them. The per-connection writer tasks drain the
//! channels onto the sockets without holding any lock.

use std::collections::HashMap;

use tokio::sync::{Mutex, mpsc};
use tracing::trace;

use lockpick_protocol::ServerEvent;
use lockpick_transport::ConnectionId;

#[derive(Debug, Default)]
pub(crate) struct Registry {
    senders:
        Mutex<HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>>,
}

impl Registry {
    /// Registers a connection and returns the receiving half its
    /// writer task should drain.
    pub(crate) async fn register(
        &self,
        conn: ConnectionId,
    ) -> mpsc::UnboundedReceiver<ServerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.lock().await.insert(conn, tx);
        rx
    }

    pub(crate) async fn unregister(&self, conn: ConnectionId) {
        self.senders.lock().await.remove(&conn);
    }

    /// Queues an event for one connection. Unknown or closed
    /// connections are skipped; their participant entry is the room
    /// store's concern, not ours.
    pub(crate) async fn send(
        &self,
        conn: ConnectionId,
        event: ServerEvent,
    ) {
        if let Some(tx) = self.senders.lock().await.get(&conn) {
            if tx.send(event).is_err() {
                trace!(%conn, "dropping event for closed connection");
            }
        }
    }

    /// Queues an event for every listed connection.
    pub(crate) async fn broadcast(
        &self,
        conns: &[ConnectionId],
        event: &ServerEvent,
    ) {
        let senders = self.senders.lock().await;
        for conn in conns {
            if let Some(tx) = senders.get(conn) {
                if tx.send(event.clone()).is_err() {
                    trace!(%conn, "dropping event for closed connection");
                }
            }
        }
    }
}
