use std::collections::HashMap;
use std::time::Instant;

use lockpick_game::GameState;
use lockpick_protocol::{ParticipantInfo, PlayerId, RoomCode};
use lockpick_transport::ConnectionId;

use crate::participant::{Participant, Role, normalize_name};

/// One live room: its roster, its game (if started), and the
/// timestamps the cleanup sweeps run on.
///
/// Participants are keyed by their current connection. A disconnected
/// participant keeps their last key until they reconnect (the store
/// rebinds them) or the prune sweep removes them.
#[derive(Debug)]
pub struct Room {
    pub code: RoomCode,
    pub participants: HashMap<ConnectionId, Participant>,
    pub game: Option<GameState>,
    /// Wall-clock birth, in epoch millis so it survives snapshots.
    pub created_at_ms: u64,
    /// Last join/leave/game action; drives the idle sweep.
    pub last_activity: Instant,
}

impl Room {
    pub fn new(code: RoomCode) -> Self {
        Self {
            code,
            participants: HashMap::new(),
            game: None,
            created_at_ms: epoch_millis(),
            last_activity: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn player_count(&self) -> usize {
        self.participants.values().filter(|p| p.is_player()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn get(&self, conn: ConnectionId) -> Option<&Participant> {
        self.participants.get(&conn)
    }

    pub fn get_mut(
        &mut self,
        conn: ConnectionId,
    ) -> Option<&mut Participant> {
        self.participants.get_mut(&conn)
    }

    /// Finds the connection key of the participant holding `player_id`.
    pub fn find_by_player_id(
        &self,
        player_id: &PlayerId,
    ) -> Option<ConnectionId> {
        self.participants
            .iter()
            .find(|(_, p)| &p.player_id == player_id)
            .map(|(&conn, _)| conn)
    }

    /// Whether `name` collides with any participant other than
    /// `exclude` (names are compared in normalized form).
    pub fn name_in_use(
        &self,
        name: &str,
        exclude: Option<&PlayerId>,
    ) -> bool {
        let wanted = normalize_name(name);
        self.participants.values().any(|p| {
            Some(&p.player_id) != exclude
                && normalize_name(&p.name) == wanted
        })
    }

    /// Next free seat: one past the highest taken, so seats never
    /// recycle while a game could still reference them.
    pub fn next_seat(&self) -> usize {
        self.participants
            .values()
            .filter_map(Participant::seat)
            .max()
            .map_or(0, |s| s + 1)
    }

    /// Roster in broadcast order: players by seat, then spectators by
    /// name.
    pub fn roster(&self) -> Vec<ParticipantInfo> {
        let mut players: Vec<&Participant> = self
            .participants
            .values()
            .filter(|p| p.is_player())
            .collect();
        players.sort_by_key(|p| p.seat());

        let mut spectators: Vec<&Participant> = self
            .participants
            .values()
            .filter(|p| !p.is_player())
            .collect();
        spectators.sort_by(|a, b| a.name.cmp(&b.name));

        players
            .into_iter()
            .chain(spectators)
            .map(Participant::info)
            .collect()
    }

    /// Hands host authority to the remaining player with the lowest
    /// seat. Returns the new host's identity, or `None` if a host is
    /// still present or no players remain.
    pub fn reassign_host(&mut self) -> Option<PlayerId> {
        if self.participants.values().any(Participant::is_host) {
            return None;
        }
        let successor = self
            .participants
            .iter()
            .filter_map(|(&conn, p)| p.seat().map(|seat| (seat, conn)))
            .min_by_key(|&(seat, _)| seat)
            .map(|(_, conn)| conn)?;
        let p = self.participants.get_mut(&successor)?;
        if let Role::Player { seat, .. } = p.role {
            p.role = Role::Player { seat, is_host: true };
        }
        Some(p.player_id.clone())
    }

    /// Compacts player seats to `0..n` in ascending seat order and
    /// returns the player count. Run before dealing so every seat maps
    /// onto a hand.
    pub fn compact_seats(&mut self) -> usize {
        let mut seated: Vec<ConnectionId> = self
            .participants
            .iter()
            .filter(|(_, p)| p.is_player())
            .map(|(&conn, _)| conn)
            .collect();
        seated.sort_by_key(|conn| {
            self.participants[conn].seat().unwrap_or(usize::MAX)
        });

        for (new_seat, conn) in seated.iter().enumerate() {
            if let Some(p) = self.participants.get_mut(conn) {
                if let Role::Player { is_host, .. } = p.role {
                    p.role = Role::Player { seat: new_seat, is_host };
                }
            }
        }
        seated.len()
    }

    /// Age since creation, in milliseconds of wall-clock time.
    pub fn age_ms(&self) -> u64 {
        epoch_millis().saturating_sub(self.created_at_ms)
    }
}

/// Milliseconds since the Unix epoch.
pub(crate) fn epoch_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
