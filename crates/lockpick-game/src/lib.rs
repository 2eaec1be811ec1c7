//! Game engine for Lockpick, a cooperative shedding card game.
//!
//! The deck holds every integer card from 2 up to a maximum that scales
//! with the player count. Players take turns placing cards on four
//! discard piles — two ascending, two descending — and win together when
//! every card has been played.
//!
//! This crate is pure state and rules: no I/O, no async, no knowledge of
//! rooms or connections. The room layer owns a [`GameState`] per room
//! and drives it through [`GameState::play_card`], [`GameState::end_turn`]
//! and friends; failed operations leave the state untouched.

mod error;
mod rules;
mod state;

pub use error::GameError;
pub use rules::{
    Card, PileType, can_play_card, create_deck, descending_start_value,
    hand_size, is_game_won, max_card_value, shuffle_deck,
    total_card_count,
};
pub use state::{GameState, PlayOutcome};
