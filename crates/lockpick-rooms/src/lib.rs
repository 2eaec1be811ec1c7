//! Room and session management for Lockpick.
//!
//! The [`RoomStore`] is the single source of truth for every room: who
//! is in it, whether a game is running, which names are reserved, and
//! when cleanup is due. The gateway crate wraps one store in a mutex
//! and drives it from connection handlers; everything in here is
//! synchronous except snapshot I/O.
//!
//! Participants are keyed by connection, identified by [`PlayerId`].
//! A dropped connection leaves its participant in place (marked
//! disconnected) so a rejoin with the same identity lands back in the
//! same seat — mid-game reconnection is the main design constraint
//! throughout.
//!
//! [`PlayerId`]: lockpick_protocol::PlayerId

mod config;
mod error;
mod participant;
mod persist;
mod room;
mod store;

pub use config::StoreConfig;
pub use error::RoomError;
pub use participant::{Participant, Role};
pub use persist::{SavedRoom, SnapshotStore};
pub use room::Room;
pub use store::{
    CreatedRoom, JoinOutcome, JoinedRoom, LeftRoom, NameCheck,
    PendingReservation, PlayedCard, ReservedName, RoomStore, SortedHand,
    StartedGame, SweepReport, TurnBroadcast,
};
