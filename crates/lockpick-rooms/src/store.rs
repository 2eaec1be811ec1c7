//! The room store: every room, who is in it, and every transition.
//!
//! One `RoomStore` holds all server state behind a single lock owned by
//! the gateway. Operations validate, mutate, and hand back an outcome
//! struct with everything the caller needs to broadcast, so no event is
//! ever built from state read outside the lock.

use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use lockpick_game::{Card, GameState, PlayOutcome};
use lockpick_protocol::{ParticipantInfo, PlayerId, RoomCode};
use lockpick_transport::ConnectionId;

use crate::config::StoreConfig;
use crate::error::RoomError;
use crate::participant::{Participant, Role, normalize_name};
use crate::persist::{SavedRoom, SnapshotStore};
use crate::room::Room;

/// A name held for a joiner who has not connected yet. Reserving the
/// same name again replaces the previous hold.
#[derive(Debug, Clone)]
pub struct PendingReservation {
    pub player_id: PlayerId,
    pub name: String,
    pub created_at: Instant,
}

impl PendingReservation {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

// ---------------------------------------------------------------------------
// Operation outcomes
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct CreatedRoom {
    pub room_code: RoomCode,
    pub player_id: PlayerId,
    pub roster: Vec<ParticipantInfo>,
}

#[derive(Debug)]
pub enum JoinOutcome {
    /// The connection is already in this room; nothing changed.
    AlreadyInRoom,
    Joined(JoinedRoom),
}

#[derive(Debug)]
pub struct JoinedRoom {
    pub room_code: RoomCode,
    pub player_id: PlayerId,
    pub player_name: String,
    /// `true` when an existing identity was rebound to this connection.
    pub reconnected: bool,
    pub spectator: bool,
    pub roster: Vec<ParticipantInfo>,
    pub game_state: Option<GameState>,
    pub status: Option<String>,
    /// Everyone else in the room, for the joined-broadcast.
    pub others: Vec<ConnectionId>,
}

#[derive(Debug)]
pub struct LeftRoom {
    pub room_code: RoomCode,
    pub player_name: String,
    pub new_host_id: Option<PlayerId>,
    pub room_empty: bool,
    pub roster: Vec<ParticipantInfo>,
    pub remaining: Vec<ConnectionId>,
}

#[derive(Debug)]
pub struct ReservedName {
    pub player_id: PlayerId,
    pub expires_in_secs: u64,
}

#[derive(Debug, PartialEq, Eq)]
pub struct NameCheck {
    pub valid: bool,
    pub is_taken: bool,
}

#[derive(Debug)]
pub struct StartedGame {
    pub room_code: RoomCode,
    pub game_state: GameState,
    pub status: String,
    pub roster: Vec<ParticipantInfo>,
    pub recipients: Vec<ConnectionId>,
}

#[derive(Debug)]
pub struct PlayedCard {
    pub room_code: RoomCode,
    pub game_state: GameState,
    pub status: String,
    pub player_name: String,
    pub card: Card,
    pub pile_index: usize,
    pub recipients: Vec<ConnectionId>,
}

/// Shared shape of the end-turn and cant-play broadcasts.
#[derive(Debug)]
pub struct TurnBroadcast {
    pub room_code: RoomCode,
    pub game_state: GameState,
    pub status: String,
    pub player_name: String,
    pub recipients: Vec<ConnectionId>,
}

#[derive(Debug)]
pub struct SortedHand {
    pub game_state: GameState,
    pub status: String,
}

/// What a maintenance sweep did.
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Disconnected participants that were pruned; each needs a
    /// player-left broadcast.
    pub departures: Vec<LeftRoom>,
    pub removed_rooms: Vec<RoomCode>,
}

// ---------------------------------------------------------------------------
// The store
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct RoomStore {
    config: StoreConfig,
    rooms: HashMap<RoomCode, Room>,
    /// Which room each live connection is in.
    connections: HashMap<ConnectionId, RoomCode>,
    /// Per-room held names, keyed by normalized name.
    reservations: HashMap<RoomCode, HashMap<String, PendingReservation>>,
    snapshots: Option<SnapshotStore>,
    /// Keys for participants restored from snapshots. These count down
    /// from `u64::MAX` so they can never collide with transport-issued
    /// connection ids, which count up from zero.
    next_restored_key: u64,
}

impl RoomStore {
    pub fn new(config: StoreConfig) -> Self {
        let snapshots =
            config.snapshot_dir.clone().map(SnapshotStore::new);
        Self {
            config,
            rooms: HashMap::new(),
            connections: HashMap::new(),
            reservations: HashMap::new(),
            snapshots,
            next_restored_key: u64::MAX,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// The room a connection currently belongs to, if any.
    pub fn room_of(&self, conn: ConnectionId) -> Option<RoomCode> {
        self.connections.get(&conn).cloned()
    }

    // -- room lifecycle -----------------------------------------------------

    /// Opens a new room with the caller as its host.
    ///
    /// A connection already in a room gets that room back unchanged, so
    /// a retried create is harmless.
    pub fn create_room(
        &mut self,
        conn: ConnectionId,
        player_name: &str,
        player_id: Option<PlayerId>,
    ) -> Result<CreatedRoom, RoomError> {
        let name = player_name.trim();
        if name.is_empty() {
            return Err(RoomError::NameRequired);
        }

        if let Some(code) = self.connections.get(&conn).cloned() {
            if let Some(room) = self.rooms.get(&code) {
                if let Some(existing) = room.get(conn) {
                    return Ok(CreatedRoom {
                        room_code: code,
                        player_id: existing.player_id.clone(),
                        roster: room.roster(),
                    });
                }
            }
        }

        let code = loop {
            let candidate = RoomCode::generate();
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
        };

        let player_id = player_id.unwrap_or_else(PlayerId::generate);
        let mut room = Room::new(code.clone());
        room.participants.insert(
            conn,
            Participant::new_player(
                player_id.clone(),
                name.to_string(),
                0,
                true,
            ),
        );
        let roster = room.roster();
        self.rooms.insert(code.clone(), room);
        self.connections.insert(conn, code.clone());

        info!(room_code = %code, player_id = %player_id, %conn, "room created");
        self.snapshot(&code);

        Ok(CreatedRoom { room_code: code, player_id, roster })
    }

    /// Joins a room, in order of precedence: rejoin by identity
    /// (reconnection), claim a reservation, or enter fresh. Fresh
    /// entrants take a seat while no game runs and seats remain;
    /// otherwise they become spectators.
    pub fn join_room(
        &mut self,
        conn: ConnectionId,
        code: &RoomCode,
        player_name: &str,
        player_id: Option<PlayerId>,
    ) -> Result<JoinOutcome, RoomError> {
        let name = player_name.trim();
        if code.as_str().is_empty() || name.is_empty() {
            return Err(RoomError::MissingFields);
        }
        if self.connections.get(&conn) == Some(code) {
            return Ok(JoinOutcome::AlreadyInRoom);
        }

        enum Plan {
            Rebind(ConnectionId),
            Fresh {
                player_id: PlayerId,
                claim_reservation: bool,
                as_player: bool,
                is_host: bool,
                seat: usize,
            },
        }

        let norm = normalize_name(name);
        let plan = {
            let room =
                self.rooms.get(code).ok_or(RoomError::RoomNotFound)?;

            let existing = player_id
                .as_ref()
                .and_then(|pid| room.find_by_player_id(pid));
            if let Some(old_conn) = existing {
                let holder = room
                    .get(old_conn)
                    .ok_or(RoomError::RoomNotFound)?;
                if holder.connected && old_conn != conn {
                    return Err(RoomError::AlreadyConnected);
                }
                Plan::Rebind(old_conn)
            } else {
                if room.name_in_use(name, None) {
                    return Err(RoomError::NameTaken);
                }

                let reservation = self
                    .reservations
                    .get(code)
                    .and_then(|held| held.get(&norm))
                    .filter(|r| {
                        !r.is_expired(self.config.reservation_ttl)
                    });
                let (resolved_id, claim_reservation) = match reservation
                {
                    Some(r)
                        if player_id.as_ref()
                            == Some(&r.player_id) =>
                    {
                        (r.player_id.clone(), true)
                    }
                    // Someone else holds this name.
                    Some(_) => return Err(RoomError::NameTaken),
                    None if self.config.require_reservation => {
                        return Err(RoomError::NameNotReserved);
                    }
                    None => (
                        player_id.unwrap_or_else(PlayerId::generate),
                        false,
                    ),
                };

                let as_player = room.game.is_none()
                    && room.player_count() < self.config.max_players;
                let is_host = as_player
                    && !room
                        .participants
                        .values()
                        .any(Participant::is_host);
                Plan::Fresh {
                    player_id: resolved_id,
                    claim_reservation,
                    as_player,
                    is_host,
                    seat: room.next_seat(),
                }
            }
        };

        let outcome = match plan {
            Plan::Rebind(old_conn) => {
                let room = self
                    .rooms
                    .get_mut(code)
                    .ok_or(RoomError::RoomNotFound)?;
                let mut part = room
                    .participants
                    .remove(&old_conn)
                    .ok_or(RoomError::RoomNotFound)?;
                part.connected = true;
                part.last_seen = Instant::now();
                let player_id = part.player_id.clone();
                let joined_name = part.name.clone();
                let spectator = !part.is_player();
                room.participants.insert(conn, part);
                room.touch();
                self.connections.remove(&old_conn);
                self.connections.insert(conn, code.clone());

                info!(
                    room_code = %code,
                    player_id = %player_id,
                    %conn,
                    "player reconnected"
                );
                joined_outcome(room, conn, player_id, joined_name, true, spectator)
            }
            Plan::Fresh {
                player_id,
                claim_reservation,
                as_player,
                is_host,
                seat,
            } => {
                if claim_reservation {
                    if let Some(held) = self.reservations.get_mut(code)
                    {
                        held.remove(&norm);
                    }
                }
                let room = self
                    .rooms
                    .get_mut(code)
                    .ok_or(RoomError::RoomNotFound)?;
                let part = if as_player {
                    Participant::new_player(
                        player_id.clone(),
                        name.to_string(),
                        seat,
                        is_host,
                    )
                } else {
                    Participant::new_spectator(
                        player_id.clone(),
                        name.to_string(),
                    )
                };
                room.participants.insert(conn, part);
                room.touch();
                self.connections.insert(conn, code.clone());

                info!(
                    room_code = %code,
                    player_id = %player_id,
                    %conn,
                    spectator = !as_player,
                    "player joined"
                );
                joined_outcome(
                    room,
                    conn,
                    player_id,
                    name.to_string(),
                    false,
                    !as_player,
                )
            }
        };

        self.snapshot(code);
        Ok(JoinOutcome::Joined(outcome))
    }

    /// Removes a connection's participant from their room. Returns
    /// `None` if the connection is in no room.
    pub fn leave_room(
        &mut self,
        conn: ConnectionId,
    ) -> Option<LeftRoom> {
        let code = self.connections.get(&conn)?.clone();
        self.remove_participant(&code, conn)
    }

    fn remove_participant(
        &mut self,
        code: &RoomCode,
        conn: ConnectionId,
    ) -> Option<LeftRoom> {
        self.connections.remove(&conn);
        let room = self.rooms.get_mut(code)?;
        let part = room.participants.remove(&conn)?;
        let new_host_id = room.reassign_host();
        room.touch();

        let left = LeftRoom {
            room_code: code.clone(),
            player_name: part.name,
            new_host_id,
            room_empty: room.is_empty(),
            roster: room.roster(),
            remaining: room.participants.keys().copied().collect(),
        };
        info!(
            room_code = %code,
            player = %left.player_name,
            room_empty = left.room_empty,
            "player left"
        );
        self.snapshot(code);
        Some(left)
    }

    /// Deletes a room if it is still empty. Called after the
    /// empty-room grace window has passed.
    pub fn purge_empty_room(&mut self, code: &RoomCode) -> bool {
        match self.rooms.get(code) {
            Some(room) if room.is_empty() => {
                self.delete_room(code);
                true
            }
            _ => false,
        }
    }

    /// Flags a participant as disconnected without removing them, so a
    /// quick reconnect finds their seat intact. Returns the room they
    /// are in.
    pub fn mark_player_disconnected(
        &mut self,
        conn: ConnectionId,
    ) -> Option<RoomCode> {
        let code = self.connections.get(&conn)?.clone();
        let room = self.rooms.get_mut(&code)?;
        let part = room.get_mut(conn)?;
        part.connected = false;
        part.last_seen = Instant::now();
        debug!(room_code = %code, %conn, "participant marked disconnected");
        self.snapshot(&code);
        Some(code)
    }

    // -- names and reservations ---------------------------------------------

    /// Holds a name in a room and mints the identity to join with.
    /// Re-reserving the same name replaces the earlier hold.
    pub fn reserve_name(
        &mut self,
        code: &RoomCode,
        player_name: &str,
    ) -> Result<ReservedName, RoomError> {
        let name = player_name.trim();
        if name.is_empty() {
            return Err(RoomError::NameRequired);
        }
        let room = self.rooms.get(code).ok_or(RoomError::RoomNotFound)?;
        if room.name_in_use(name, None) {
            return Err(RoomError::NameTaken);
        }

        let player_id = PlayerId::generate();
        self.reservations.entry(code.clone()).or_default().insert(
            normalize_name(name),
            PendingReservation {
                player_id: player_id.clone(),
                name: name.to_string(),
                created_at: Instant::now(),
            },
        );
        debug!(room_code = %code, name, "name reserved");

        Ok(ReservedName {
            player_id,
            expires_in_secs: self.config.reservation_ttl.as_secs(),
        })
    }

    /// Availability check for a name; reserved names count as taken.
    pub fn validate_name(
        &self,
        code: &RoomCode,
        player_name: &str,
    ) -> Result<NameCheck, RoomError> {
        let name = player_name.trim();
        let room = self.rooms.get(code).ok_or(RoomError::RoomNotFound)?;
        if name.is_empty() {
            return Ok(NameCheck { valid: false, is_taken: false });
        }

        let reserved = self
            .reservations
            .get(code)
            .and_then(|held| held.get(&normalize_name(name)))
            .is_some_and(|r| !r.is_expired(self.config.reservation_ttl));
        let is_taken = room.name_in_use(name, None) || reserved;
        Ok(NameCheck { valid: !is_taken, is_taken })
    }

    // -- game operations ----------------------------------------------------

    /// Host-only: compacts seats, deals, and starts the game.
    pub fn start_game(
        &mut self,
        conn: ConnectionId,
        code: &RoomCode,
    ) -> Result<StartedGame, RoomError> {
        let room =
            self.rooms.get_mut(code).ok_or(RoomError::RoomNotFound)?;
        let caller = room.get(conn).ok_or(RoomError::NotAPlayer)?;
        if !caller.is_host() {
            return Err(RoomError::NotHost);
        }
        if room.game.is_some() {
            return Err(RoomError::GameAlreadyStarted);
        }
        let players = room.player_count();
        if players < 2 {
            return Err(RoomError::NotEnoughPlayers);
        }

        room.compact_seats();
        let game_state = GameState::new(players);
        let status = game_state.status();
        room.game = Some(game_state.clone());
        room.touch();

        let outcome = StartedGame {
            room_code: code.clone(),
            game_state,
            status,
            roster: room.roster(),
            recipients: room.participants.keys().copied().collect(),
        };
        info!(room_code = %code, players, "game started");
        self.snapshot(code);
        Ok(outcome)
    }

    /// Plays one card for the turn-owning player. `Ok(None)` means the
    /// card was not in their hand; nothing changed and nothing should
    /// be broadcast.
    pub fn play_card(
        &mut self,
        conn: ConnectionId,
        code: &RoomCode,
        card: Card,
        pile_index: usize,
    ) -> Result<Option<PlayedCard>, RoomError> {
        let room =
            self.rooms.get_mut(code).ok_or(RoomError::RoomNotFound)?;
        if room.game.is_none() {
            return Err(RoomError::GameNotStarted);
        }
        let (seat, player_name) = acting_player(room, conn)?;
        let game =
            room.game.as_mut().ok_or(RoomError::GameNotStarted)?;
        if game.current_player != seat {
            return Err(RoomError::NotYourTurn);
        }

        match game.play_card(card, pile_index)? {
            PlayOutcome::NotInHand => {
                debug!(
                    room_code = %code,
                    card,
                    "play ignored: card not in hand"
                );
                return Ok(None);
            }
            PlayOutcome::Played => {}
        }

        let game_state = game.clone();
        let status = game_state.status();
        if game_state.game_won {
            info!(room_code = %code, "game won");
        }
        room.touch();

        let outcome = PlayedCard {
            room_code: code.clone(),
            game_state,
            status,
            player_name,
            card,
            pile_index,
            recipients: room.participants.keys().copied().collect(),
        };
        self.snapshot(code);
        Ok(Some(outcome))
    }

    /// Ends the turn-owning player's turn.
    pub fn end_turn(
        &mut self,
        conn: ConnectionId,
        code: &RoomCode,
    ) -> Result<TurnBroadcast, RoomError> {
        let room =
            self.rooms.get_mut(code).ok_or(RoomError::RoomNotFound)?;
        if room.game.is_none() {
            return Err(RoomError::GameNotStarted);
        }
        let (seat, player_name) = acting_player(room, conn)?;
        let game =
            room.game.as_mut().ok_or(RoomError::GameNotStarted)?;
        if game.current_player != seat {
            return Err(RoomError::NotYourTurn);
        }

        game.end_turn()?;
        let game_state = game.clone();
        let status = game_state.status();
        room.touch();

        let outcome = TurnBroadcast {
            room_code: code.clone(),
            game_state,
            status,
            player_name,
            recipients: room.participants.keys().copied().collect(),
        };
        self.snapshot(code);
        Ok(outcome)
    }

    /// The turn owner declares no legal play exists. State is
    /// untouched; the room just hears about it.
    pub fn cant_play(
        &mut self,
        conn: ConnectionId,
        code: &RoomCode,
    ) -> Result<TurnBroadcast, RoomError> {
        let room =
            self.rooms.get(code).ok_or(RoomError::RoomNotFound)?;
        if room.game.is_none() {
            return Err(RoomError::GameNotStarted);
        }
        let (seat, player_name) = acting_player(room, conn)?;
        let game =
            room.game.as_ref().ok_or(RoomError::GameNotStarted)?;
        if game.current_player != seat {
            return Err(RoomError::NotYourTurn);
        }

        info!(room_code = %code, player = %player_name, "player cannot play");
        Ok(TurnBroadcast {
            room_code: code.clone(),
            game_state: game.clone(),
            status: game.status(),
            player_name,
            recipients: room.participants.keys().copied().collect(),
        })
    }

    /// Sorts the calling player's own hand. Allowed off-turn.
    pub fn sort_hand(
        &mut self,
        conn: ConnectionId,
        code: &RoomCode,
    ) -> Result<SortedHand, RoomError> {
        let room =
            self.rooms.get_mut(code).ok_or(RoomError::RoomNotFound)?;
        if room.game.is_none() {
            return Err(RoomError::GameNotStarted);
        }
        let (seat, _) = acting_player(room, conn)?;
        let game =
            room.game.as_mut().ok_or(RoomError::GameNotStarted)?;

        game.sort_hand(seat)?;
        let game_state = game.clone();
        let status = game_state.status();
        self.snapshot(code);
        Ok(SortedHand { game_state, status })
    }

    // -- maintenance --------------------------------------------------------

    /// One pass of background housekeeping: drops expired reservations,
    /// prunes long-disconnected participants, and deletes rooms that
    /// are aged out or empty past their idle allowance.
    pub fn sweep(&mut self) -> SweepReport {
        let mut report = SweepReport::default();

        let ttl = self.config.reservation_ttl;
        for held in self.reservations.values_mut() {
            held.retain(|_, r| !r.is_expired(ttl));
        }
        self.reservations.retain(|_, held| !held.is_empty());

        let prune_after = self.config.disconnected_prune_after;
        let stale: Vec<(RoomCode, ConnectionId)> = self
            .rooms
            .iter()
            .flat_map(|(code, room)| {
                room.participants
                    .iter()
                    .filter(|(_, p)| {
                        !p.connected
                            && p.last_seen.elapsed() >= prune_after
                    })
                    .map(|(&c, _)| (code.clone(), c))
                    .collect::<Vec<_>>()
            })
            .collect();
        for (code, conn) in stale {
            if let Some(left) = self.remove_participant(&code, conn) {
                report.departures.push(left);
            }
        }

        let idle_max = self.config.empty_room_idle_max;
        let max_age = self.config.room_max_age;
        let doomed: Vec<RoomCode> = self
            .rooms
            .iter()
            .filter(|(_, room)| {
                let aged =
                    Duration::from_millis(room.age_ms()) >= max_age;
                let idle = room.is_empty()
                    && room.last_activity.elapsed() >= idle_max;
                aged || idle
            })
            .map(|(code, _)| code.clone())
            .collect();
        for code in doomed {
            self.delete_room(&code);
            report.removed_rooms.push(code);
        }

        report
    }

    fn delete_room(&mut self, code: &RoomCode) {
        self.rooms.remove(code);
        self.reservations.remove(code);
        self.connections.retain(|_, c| c != code);
        if let Some(snapshots) = &self.snapshots {
            snapshots.spawn_delete(code.clone());
        }
        info!(room_code = %code, "room deleted");
    }

    // -- persistence --------------------------------------------------------

    /// Restores rooms from snapshot files. Every restored participant
    /// starts disconnected; reconnecting by `playerId` rebinds them.
    pub async fn load_snapshots(&mut self) -> io::Result<usize> {
        let Some(snapshots) = self.snapshots.clone() else {
            return Ok(0);
        };

        let mut restored = 0;
        for saved in snapshots.load_all().await? {
            if self.rooms.contains_key(&saved.room_code) {
                continue;
            }
            let mut room = Room::new(saved.room_code.clone());
            room.created_at_ms = saved.created_at_ms;
            room.game = saved.game_state;
            for mut part in saved.participants {
                part.connected = false;
                part.last_seen = Instant::now();
                let key = ConnectionId::new(self.next_restored_key);
                self.next_restored_key -= 1;
                room.participants.insert(key, part);
            }
            info!(room_code = %room.code, "room restored from snapshot");
            self.rooms.insert(room.code.clone(), room);
            restored += 1;
        }
        Ok(restored)
    }

    fn snapshot(&self, code: &RoomCode) {
        let Some(snapshots) = &self.snapshots else { return };
        let Some(room) = self.rooms.get(code) else { return };
        snapshots.spawn_save(SavedRoom::of(room));
    }
}

/// The joiner's acknowledgment payload, built from the room as it
/// stands after the join.
fn joined_outcome(
    room: &Room,
    conn: ConnectionId,
    player_id: PlayerId,
    player_name: String,
    reconnected: bool,
    spectator: bool,
) -> JoinedRoom {
    JoinedRoom {
        room_code: room.code.clone(),
        player_id,
        player_name,
        reconnected,
        spectator,
        roster: room.roster(),
        game_state: room.game.clone(),
        status: room.game.as_ref().map(GameState::status),
        others: room
            .participants
            .keys()
            .copied()
            .filter(|&c| c != conn)
            .collect(),
    }
}

/// Seat and name of the caller, who must hold a seat in this room.
fn acting_player(
    room: &Room,
    conn: ConnectionId,
) -> Result<(usize, String), RoomError> {
    let part = room.get(conn).ok_or(RoomError::NotAPlayer)?;
    match part.role {
        Role::Player { seat, .. } => Ok((seat, part.name.clone())),
        Role::Spectator => Err(RoomError::NotAPlayer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relaxed_config() -> StoreConfig {
        StoreConfig {
            require_reservation: false,
            ..StoreConfig::default()
        }
    }

    #[test]
    fn test_create_room_is_idempotent_per_connection() {
        let mut store = RoomStore::new(relaxed_config());
        let conn = ConnectionId::new(1);

        let first = store.create_room(conn, "Ada", None).unwrap();
        let second = store.create_room(conn, "Ada", None).unwrap();

        assert_eq!(first.room_code, second.room_code);
        assert_eq!(first.player_id, second.player_id);
        assert_eq!(store.room_count(), 1);
    }

    #[test]
    fn test_create_room_rejects_blank_name() {
        let mut store = RoomStore::new(relaxed_config());
        let err = store
            .create_room(ConnectionId::new(1), "   ", None)
            .unwrap_err();
        assert_eq!(err, RoomError::NameRequired);
        assert_eq!(err.to_string(), "Player name is required");
    }

    #[test]
    fn test_join_unknown_room_fails() {
        let mut store = RoomStore::new(relaxed_config());
        let err = store
            .join_room(
                ConnectionId::new(1),
                &RoomCode::new("ZZZZZZ"),
                "Ada",
                None,
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "Room not found");
    }

    #[test]
    fn test_reservation_expiry_is_ttl_driven() {
        let mut store = RoomStore::new(StoreConfig {
            reservation_ttl: Duration::ZERO,
            ..relaxed_config()
        });
        let created = store
            .create_room(ConnectionId::new(1), "Ada", None)
            .unwrap();
        store.reserve_name(&created.room_code, "Grace").unwrap();

        // TTL zero: the hold lapses immediately, so the name validates
        // as available again.
        let check = store
            .validate_name(&created.room_code, "Grace")
            .unwrap();
        assert!(check.valid);

        store.sweep();
        assert!(store.reservations.is_empty());
    }

    #[test]
    fn test_sweep_prunes_disconnected_after_deadline() {
        let mut store = RoomStore::new(StoreConfig {
            disconnected_prune_after: Duration::ZERO,
            ..relaxed_config()
        });
        let host = ConnectionId::new(1);
        let guest = ConnectionId::new(2);
        let created = store.create_room(host, "Ada", None).unwrap();
        store
            .join_room(guest, &created.room_code, "Grace", None)
            .unwrap();
        store.mark_player_disconnected(guest);

        let report = store.sweep();
        assert_eq!(report.departures.len(), 1);
        assert_eq!(report.departures[0].player_name, "Grace");
        assert!(report.removed_rooms.is_empty());
        assert_eq!(store.room_of(guest), None);
    }

    #[test]
    fn test_sweep_keeps_recent_disconnects() {
        let mut store = RoomStore::new(relaxed_config());
        let host = ConnectionId::new(1);
        let guest = ConnectionId::new(2);
        let created = store.create_room(host, "Ada", None).unwrap();
        store
            .join_room(guest, &created.room_code, "Grace", None)
            .unwrap();
        store.mark_player_disconnected(guest);

        // Default 30 s deadline has not passed.
        let report = store.sweep();
        assert!(report.departures.is_empty());
    }

    #[test]
    fn test_sweep_deletes_empty_idle_rooms() {
        let mut store = RoomStore::new(StoreConfig {
            empty_room_idle_max: Duration::ZERO,
            ..relaxed_config()
        });
        let conn = ConnectionId::new(1);
        let created = store.create_room(conn, "Ada", None).unwrap();
        store.leave_room(conn).unwrap();

        let report = store.sweep();
        assert_eq!(report.removed_rooms, vec![created.room_code]);
        assert_eq!(store.room_count(), 0);
    }

    #[test]
    fn test_sweep_deletes_rooms_past_max_age_even_if_occupied() {
        let mut store = RoomStore::new(StoreConfig {
            room_max_age: Duration::ZERO,
            ..relaxed_config()
        });
        let conn = ConnectionId::new(1);
        let created = store.create_room(conn, "Ada", None).unwrap();

        let report = store.sweep();
        assert_eq!(report.removed_rooms, vec![created.room_code]);
        assert_eq!(store.room_of(conn), None);
    }

    #[test]
    fn test_purge_empty_room_spares_reoccupied_rooms() {
        let mut store = RoomStore::new(relaxed_config());
        let conn = ConnectionId::new(1);
        let created = store.create_room(conn, "Ada", None).unwrap();
        store.leave_room(conn).unwrap();

        let rejoiner = ConnectionId::new(2);
        store
            .join_room(rejoiner, &created.room_code, "Grace", None)
            .unwrap();

        assert!(!store.purge_empty_room(&created.room_code));
        assert_eq!(store.room_count(), 1);
    }
}
