//! The Lockpick realtime gateway.
//!
//! Accepts WebSocket connections, decodes [`ClientRequest`]s, applies
//! them to the shared [`RoomStore`], and fans the resulting
//! [`ServerEvent`]s back out. One store, one lock; per-connection
//! writer tasks keep slow sockets from stalling anyone else.
//!
//! [`ClientRequest`]: lockpick_protocol::ClientRequest
//! [`ServerEvent`]: lockpick_protocol::ServerEvent
//! [`RoomStore`]: lockpick_rooms::RoomStore

mod error;
mod handler;
mod registry;
mod server;

pub use error::ServerError;
pub use server::{LockpickServer, LockpickServerBuilder, ServerConfig};
