//! The messages and identities that travel on the wire.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use lockpick_game::{Card, GameState};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A player's durable identity, issued by the server and stored by the
/// client so it survives reconnects.
///
/// The value is an opaque 32-character lowercase hex token (128 random
/// bits). Serializes as a plain JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Generates a fresh random identity.
    pub fn generate() -> Self {
        Self(format!("{:032x}", rand::rng().random::<u128>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A six-character room code, the human-shareable handle for a room.
///
/// Codes are drawn from uppercase A–Z and 0–9. Construction normalizes
/// to uppercase so codes typed by players match regardless of case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

/// Code alphabet: 36 symbols, 6 positions, ~2.2 billion codes.
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ROOM_CODE_LEN: usize = 6;

impl RoomCode {
    /// Wraps a client-supplied code, normalizing to uppercase.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
    }

    /// Generates a random code. Uniqueness against live rooms is the
    /// caller's job.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let code = (0..ROOM_CODE_LEN)
            .map(|_| {
                let i = rng.random_range(0..ROOM_CODE_ALPHABET.len());
                ROOM_CODE_ALPHABET[i] as char
            })
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Participant snapshots
// ---------------------------------------------------------------------------

/// A participant as clients see them in roster broadcasts.
///
/// `seat` is `None` for spectators; for players it is the seat index
/// that maps onto `GameState::player_hands` once a game starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    pub player_id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub is_connected: bool,
    pub seat: Option<usize>,
}

// ---------------------------------------------------------------------------
// Requests and events
// ---------------------------------------------------------------------------

/// Everything a client may send.
///
/// Tagged as `{"type": "<kebab-case tag>", ...camelCase fields}`.
/// Requests that act on a room repeat the room code even though the
/// server tracks which room a connection is in; the redundancy lets the
/// server reject messages from a stale client after a room change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientRequest {
    /// Open a new room and join it as host. `player_id` is supplied
    /// when the client holds a stored identity.
    CreateRoom {
        player_name: String,
        player_id: Option<PlayerId>,
    },

    /// Join (or rejoin) an existing room.
    JoinRoom {
        room_code: RoomCode,
        player_name: String,
        player_id: Option<PlayerId>,
    },

    /// Reserve a name in a room ahead of joining; answers with
    /// [`ServerEvent::NameReserved`] carrying the identity to join with.
    ReserveName {
        room_code: RoomCode,
        player_name: String,
    },

    /// Ask whether a name is available without reserving it.
    ValidateName {
        room_code: RoomCode,
        player_name: String,
    },

    /// Host-only: deal and begin the game.
    StartGame { room_code: RoomCode },

    /// Place a card from the acting player's hand onto a pile.
    PlayCard {
        room_code: RoomCode,
        card: Card,
        pile_index: usize,
    },

    /// Finish the turn and draw back up.
    EndTurn { room_code: RoomCode },

    /// Declare that no legal play exists; broadcast-only, the state is
    /// untouched.
    CantPlay { room_code: RoomCode },

    /// Sort the acting player's hand ascending.
    SortHand { room_code: RoomCode },

    /// Leave the room immediately (no disconnect grace).
    LeaveRoom { room_code: RoomCode },

    /// Connection-health probe; answered with [`ServerEvent::Pong`].
    Ping,
}

/// Everything the server may send.
///
/// State-bearing events carry the full [`GameState`] plus the derived
/// status line, so clients never patch state incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// To the creator: the room exists and they are its host.
    RoomCreated {
        room_code: RoomCode,
        player_id: PlayerId,
        players: Vec<ParticipantInfo>,
    },

    /// To the joiner: acknowledgment with the room's current state.
    /// `game_state` is present when a game is already running (the
    /// joiner entered as a spectator or reconnected mid-game).
    RoomJoined {
        room_code: RoomCode,
        player_id: PlayerId,
        players: Vec<ParticipantInfo>,
        game_state: Option<GameState>,
        status: Option<String>,
    },

    /// To the rest of the room: someone arrived (or reconnected).
    PlayerJoined {
        player_name: String,
        players: Vec<ParticipantInfo>,
    },

    /// To the room: someone left. `new_host_id` is set when host
    /// authority moved.
    PlayerLeft {
        player_name: String,
        players: Vec<ParticipantInfo>,
        new_host_id: Option<PlayerId>,
    },

    /// Reply to [`ClientRequest::ReserveName`].
    NameReserved {
        player_id: PlayerId,
        expires_in_secs: u64,
    },

    /// Reply to [`ClientRequest::ValidateName`].
    NameValidated { valid: bool, is_taken: bool },

    /// To the room: cards are dealt, play begins.
    GameStarted {
        game_state: GameState,
        status: String,
        players: Vec<ParticipantInfo>,
    },

    /// To the room: a card landed on a pile.
    CardPlayed {
        game_state: GameState,
        status: String,
        player_name: String,
        card: Card,
        pile_index: usize,
    },

    /// To the room: the turn passed to the next seat.
    TurnEnded {
        game_state: GameState,
        status: String,
        player_name: String,
    },

    /// To the room: the acting player declared they cannot play.
    CantPlay {
        game_state: GameState,
        status: String,
        player_name: String,
    },

    /// To the sorter only.
    HandSorted {
        game_state: GameState,
        status: String,
    },

    /// A request failed; `message` is shown to the player verbatim.
    Error { message: String },

    /// Reply to [`ClientRequest::Ping`].
    Pong,
}
