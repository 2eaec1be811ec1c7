use lockpick_game::GameError;
use thiserror::Error;

/// Failures of room-store operations.
///
/// Display strings are shown to players verbatim, so they are phrased
/// as user-facing sentences rather than diagnostics.
#[derive(Debug, Error, PartialEq)]
pub enum RoomError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Player name is required")]
    NameRequired,

    #[error("Room code and player name are required")]
    MissingFields,

    #[error("That name is already in use in this room.")]
    NameTaken,

    #[error("That name has not been reserved in this room.")]
    NameNotReserved,

    #[error("That player is already connected in this room.")]
    AlreadyConnected,

    #[error("Only the host can start the game")]
    NotHost,

    #[error("At least 2 players are required to start the game")]
    NotEnoughPlayers,

    #[error("Game already started")]
    GameAlreadyStarted,

    #[error("Game not found or not started")]
    GameNotStarted,

    #[error("You are not a player in this game")]
    NotAPlayer,

    #[error("It is not your turn")]
    NotYourTurn,

    #[error(transparent)]
    Game(#[from] GameError),
}
