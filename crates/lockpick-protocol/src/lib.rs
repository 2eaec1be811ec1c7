//! Wire types and codec for the Lockpick realtime protocol.
//!
//! Everything a client and server exchange is defined here: durable
//! identities ([`PlayerId`], [`RoomCode`]), the tagged request/event
//! enums ([`ClientRequest`], [`ServerEvent`]), and the [`Codec`] that
//! turns them into bytes.
//!
//! The JSON shape is part of the contract: enum tags are kebab-case
//! under a `"type"` key and field names are camelCase, so a payload
//! reads as `{"type":"play-card","roomCode":"A3K9QZ","card":14,...}`.

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ClientRequest, ParticipantInfo, PlayerId, RoomCode, ServerEvent,
};
