//! Best-effort room snapshots on disk, one JSON file per room.
//!
//! Snapshots exist so a restarted server comes back with its rooms
//! intact and clients can rejoin by `playerId`. Writes are
//! fire-and-forget: a failed write is logged and the game carries on.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use lockpick_game::GameState;
use lockpick_protocol::RoomCode;

use crate::participant::Participant;
use crate::room::{Room, epoch_millis};

/// The on-disk form of a room. Connection keys are transient, so only
/// the participants themselves are stored; the loader re-keys them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRoom {
    pub room_code: RoomCode,
    pub participants: Vec<Participant>,
    pub game_state: Option<GameState>,
    pub created_at_ms: u64,
    pub saved_at_ms: u64,
}

impl SavedRoom {
    pub fn of(room: &Room) -> Self {
        Self {
            room_code: room.code.clone(),
            participants: room.participants.values().cloned().collect(),
            game_state: room.game.clone(),
            created_at_ms: room.created_at_ms,
            saved_at_ms: epoch_millis(),
        }
    }
}

/// Writes, reads, and removes `room-<CODE>.json` files in one
/// directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_path(&self, code: &RoomCode) -> PathBuf {
        self.dir.join(format!("room-{code}.json"))
    }

    /// Writes one room's snapshot.
    pub async fn save(&self, saved: &SavedRoom) -> io::Result<()> {
        let json =
            serde_json::to_vec_pretty(saved).map_err(io::Error::other)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.file_path(&saved.room_code), json).await?;
        debug!(room_code = %saved.room_code, "room snapshot written");
        Ok(())
    }

    /// Fire-and-forget [`save`](Self::save); failures are logged.
    pub fn spawn_save(&self, saved: SavedRoom) {
        let store = self.clone();
        tokio::spawn(async move {
            if let Err(error) = store.save(&saved).await {
                warn!(
                    room_code = %saved.room_code,
                    %error,
                    "failed to write room snapshot"
                );
            }
        });
    }

    /// Removes a room's snapshot file. Missing files are not an error.
    pub async fn delete(&self, code: &RoomCode) -> io::Result<()> {
        match tokio::fs::remove_file(self.file_path(code)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Fire-and-forget [`delete`](Self::delete); failures are logged.
    pub fn spawn_delete(&self, code: RoomCode) {
        let store = self.clone();
        tokio::spawn(async move {
            if let Err(error) = store.delete(&code).await {
                warn!(room_code = %code, %error, "failed to delete room snapshot");
            }
        });
    }

    /// Reads every parseable snapshot in the directory. Corrupt files
    /// are logged and skipped.
    pub async fn load_all(&self) -> io::Result<Vec<SavedRoom>> {
        let mut rooms = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(rooms);
            }
            Err(e) => return Err(e),
        };

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !name.starts_with("room-") || !name.ends_with(".json") {
                continue;
            }
            let bytes = tokio::fs::read(entry.path()).await?;
            match serde_json::from_slice::<SavedRoom>(&bytes) {
                Ok(saved) => rooms.push(saved),
                Err(error) => {
                    warn!(file = %name, %error, "skipping unreadable room snapshot");
                }
            }
        }
        Ok(rooms)
    }
}
