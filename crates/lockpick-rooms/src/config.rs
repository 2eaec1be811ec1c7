use std::path::PathBuf;
use std::time::Duration;

/// Tunables for the room store.
///
/// Defaults match production behavior. Tests shrink the durations to
/// zero (sweeps fire immediately) or stretch them to an hour (sweeps
/// never fire) instead of mocking a clock.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Seats per room; later joiners become spectators.
    pub max_players: usize,

    /// How long a reserved name is held before it lapses.
    pub reservation_ttl: Duration,

    /// When `true`, `join_room` for a fresh identity demands a prior
    /// reservation for that name. `false` is the relaxed mode used by
    /// tests and trusted clients.
    pub require_reservation: bool,

    /// Disconnected participants older than this are removed by the
    /// sweep.
    pub disconnected_prune_after: Duration,

    /// How long an emptied room lingers before it may be purged,
    /// so a briefly-dropped sole player can return.
    pub empty_room_grace: Duration,

    /// Empty rooms idle longer than this are deleted by the sweep.
    pub empty_room_idle_max: Duration,

    /// Rooms older than this are deleted regardless of occupancy.
    pub room_max_age: Duration,

    /// Directory for room snapshot files. `None` disables persistence.
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_players: 10,
            reservation_ttl: Duration::from_secs(60),
            require_reservation: true,
            disconnected_prune_after: Duration::from_secs(30),
            empty_room_grace: Duration::from_secs(5),
            empty_room_idle_max: Duration::from_secs(5 * 60),
            room_max_age: Duration::from_secs(24 * 60 * 60),
            snapshot_dir: None,
        }
    }
}
