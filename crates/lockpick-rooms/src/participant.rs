use std::time::Instant;

use serde::{Deserialize, Serialize};

use lockpick_protocol::{ParticipantInfo, PlayerId};

/// What a participant is allowed to do in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Role {
    /// Holds a seat and plays cards. `seat` indexes into
    /// `GameState::player_hands` once a game starts.
    Player { seat: usize, is_host: bool },
    /// Watches; receives every broadcast but may not act.
    Spectator,
}

/// One person in a room, keyed in the store by their current
/// connection. Identity (`player_id`) outlives the connection; the
/// store rebinds a reconnecting participant to their new key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub player_id: PlayerId,
    pub name: String,
    pub connected: bool,
    #[serde(flatten)]
    pub role: Role,
    /// Last moment this participant was known to be live. Drives the
    /// disconnected-prune sweep; not persisted.
    #[serde(skip, default = "Instant::now")]
    pub last_seen: Instant,
}

impl Participant {
    pub fn new_player(
        player_id: PlayerId,
        name: String,
        seat: usize,
        is_host: bool,
    ) -> Self {
        Self {
            player_id,
            name,
            connected: true,
            role: Role::Player { seat, is_host },
            last_seen: Instant::now(),
        }
    }

    pub fn new_spectator(player_id: PlayerId, name: String) -> Self {
        Self {
            player_id,
            name,
            connected: true,
            role: Role::Spectator,
            last_seen: Instant::now(),
        }
    }

    pub fn seat(&self) -> Option<usize> {
        match self.role {
            Role::Player { seat, .. } => Some(seat),
            Role::Spectator => None,
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self.role, Role::Player { is_host: true, .. })
    }

    pub fn is_player(&self) -> bool {
        matches!(self.role, Role::Player { .. })
    }

    /// Wire snapshot of this participant.
    pub fn info(&self) -> ParticipantInfo {
        ParticipantInfo {
            player_id: self.player_id.clone(),
            name: self.name.clone(),
            is_host: self.is_host(),
            is_connected: self.connected,
            seat: self.seat(),
        }
    }
}

/// Canonical form used for name-uniqueness checks: trimmed and
/// lowercased, so "Ada" and " ada " collide.
pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
