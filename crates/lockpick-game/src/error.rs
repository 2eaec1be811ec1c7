//! Error types for the game engine.

use crate::rules::{Card, PileType};

/// Errors returned by turn-engine operations.
///
/// Every variant is a validation failure: the operation was refused and
/// the [`GameState`](crate::GameState) is exactly as it was before the
/// call. The `Display` messages are shown verbatim to players.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GameError {
    /// The card is not legal on the chosen pile.
    #[error("Card {card} cannot be played on this {pile_type} pile")]
    IllegalPlay {
        /// The card the player tried to place.
        card: Card,
        /// Direction of the refusing pile.
        pile_type: PileType,
    },

    /// The pile index is outside `0..4`.
    #[error("Pile index {0} is out of range")]
    InvalidPile(usize),

    /// The turn's minimum play count has not been reached yet.
    #[error("You must play at least {required} cards this turn")]
    NotEnoughCardsPlayed {
        /// Cards the current player must place before ending the turn.
        required: u32,
    },

    /// The state is structurally broken (e.g. the turn pointer does not
    /// name an existing hand). Never produced by this crate's own
    /// transitions; guards against corrupted snapshots.
    #[error("invalid game state: {0}")]
    InvalidState(String),
}
