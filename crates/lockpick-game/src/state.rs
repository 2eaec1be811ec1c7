//! The turn engine: a single game's mutable state and its transitions.

use serde::{Deserialize, Serialize};

use crate::GameError;
use crate::rules::{self, Card};

/// Result of a [`GameState::play_card`] call that did not fail
/// validation.
///
/// `NotInHand` means the named card passed the pile check but is not in
/// the current player's hand; the state was left untouched. Callers
/// that care whether the play actually happened must check for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The card moved from the hand to the pile.
    Played,
    /// The card was not in the current player's hand; nothing changed.
    NotInHand,
}

/// Complete state of one Lockpick game.
///
/// Created by [`GameState::new`] and mutated only through the operation
/// methods. Every card dealt at creation is always in exactly one of
/// the hands, the piles, or the deck:
/// `Σ|hand| + Σ|pile| + |deck| == total_cards`.
///
/// Serializes with camelCase field names — this is the exact shape
/// broadcast to clients and written into room snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// One hand per seat, indexed by seat number.
    pub player_hands: Vec<Vec<Card>>,
    /// Seat whose turn it is. Always within `0..player_hands.len()`.
    pub current_player: usize,
    /// The four piles: indices 0–1 ascend, 2–3 descend.
    pub discard_piles: [Vec<Card>; 4],
    /// Undealt cards; the next draw comes from the front.
    pub deck: Vec<Card>,
    /// Cards the current player has placed since their turn began.
    pub cards_played_this_turn: u32,
    /// Whether the current player has met the turn's minimum.
    pub turn_complete: bool,
    /// Whether every card has been played.
    pub game_won: bool,
    /// Size of the full deck for this player count.
    pub total_cards: u32,
    /// Highest card value in this deck.
    pub max_card: Card,
    /// Conceptual starting value of the descending piles.
    pub descending_start: Card,
}

impl GameState {
    /// Deals a new game for `player_count` seats (expects at least 1).
    ///
    /// Builds a shuffled deck scaled to the player count, deals
    /// [`rules::hand_size`] cards to each seat in seat order, and hands
    /// the first turn to seat 0.
    pub fn new(player_count: usize) -> Self {
        debug_assert!(player_count >= 1, "a game needs at least one seat");

        let mut deck = rules::create_deck(player_count);
        let hand_size = rules::hand_size(player_count);

        let mut player_hands = Vec::with_capacity(player_count);
        for _ in 0..player_count {
            let take = hand_size.min(deck.len());
            player_hands.push(deck.drain(..take).collect());
        }

        Self {
            player_hands,
            current_player: 0,
            discard_piles: [vec![], vec![], vec![], vec![]],
            deck,
            cards_played_this_turn: 0,
            turn_complete: false,
            game_won: false,
            total_cards: rules::total_card_count(player_count),
            max_card: rules::max_card_value(player_count),
            descending_start: rules::descending_start_value(player_count),
        }
    }

    /// Number of seats in this game.
    pub fn player_count(&self) -> usize {
        self.player_hands.len()
    }

    /// Cards the current player must place before the turn may end:
    /// two while the deck lasts, one once it is empty.
    pub fn required_plays(&self) -> u32 {
        if self.deck.is_empty() { 1 } else { 2 }
    }

    /// Attempts to place `card` from the current player's hand onto
    /// pile `pile_index`.
    ///
    /// Validation failures (bad pile index, illegal card) return an
    /// error and leave the state untouched. A card that is legal on the
    /// pile but absent from the hand is a silent no-op — see
    /// [`PlayOutcome::NotInHand`].
    pub fn play_card(
        &mut self,
        card: Card,
        pile_index: usize,
    ) -> Result<PlayOutcome, GameError> {
        let pile_type = rules::PileType::of_index(pile_index)
            .ok_or(GameError::InvalidPile(pile_index))?;

        if !rules::can_play_card(
            card,
            &self.discard_piles[pile_index],
            pile_type,
        ) {
            return Err(GameError::IllegalPlay { card, pile_type });
        }

        let hand = self.current_hand()?;
        // First occurrence by value; hand order is cosmetic.
        let Some(position) = hand.iter().position(|&c| c == card) else {
            return Ok(PlayOutcome::NotInHand);
        };

        self.player_hands[self.current_player].remove(position);
        self.discard_piles[pile_index].push(card);
        self.cards_played_this_turn += 1;
        self.turn_complete =
            self.cards_played_this_turn >= self.required_plays();
        self.game_won =
            rules::is_game_won(&self.discard_piles, self.total_cards);

        Ok(PlayOutcome::Played)
    }

    /// Ends the current player's turn: refills their hand from the deck
    /// and passes the turn to the next seat.
    ///
    /// Fails if the turn's minimum play count has not been met.
    pub fn end_turn(&mut self) -> Result<(), GameError> {
        let required = self.required_plays();
        if self.cards_played_this_turn < required {
            return Err(GameError::NotEnoughCardsPlayed { required });
        }

        let target = rules::hand_size(self.player_count());
        let in_hand = self.current_hand()?.len();
        let to_draw = target.saturating_sub(in_hand).min(self.deck.len());
        let drawn: Vec<Card> = self.deck.drain(..to_draw).collect();
        self.player_hands[self.current_player].extend(drawn);

        self.current_player =
            (self.current_player + 1) % self.player_count();
        self.cards_played_this_turn = 0;
        self.turn_complete = false;

        Ok(())
    }

    /// Sorts one player's hand ascending. Works for any seat at any
    /// time. Pure convenience — no rule consults hand order.
    pub fn sort_hand(&mut self, seat: usize) -> Result<(), GameError> {
        let hand = self.player_hands.get_mut(seat).ok_or_else(|| {
            GameError::InvalidState(format!("seat {seat} has no hand"))
        })?;
        hand.sort_unstable();
        Ok(())
    }

    /// Human-readable turn/win summary.
    ///
    /// Derived entirely from the state — any client holding a snapshot
    /// could rebuild the same string, so it is broadcast purely as a
    /// convenience.
    pub fn status(&self) -> String {
        if self.game_won {
            return format!(
                "Congratulations! Player {} won! All {} cards have been \
                 played! (Max card {}, descending starts at {})",
                self.current_player + 1,
                self.total_cards,
                self.max_card,
                self.descending_start,
            );
        }

        let in_hand = self
            .player_hands
            .get(self.current_player)
            .map_or(0, Vec::len);
        let in_deck = self.deck.len();

        if self.turn_complete {
            return format!(
                "Player {}'s turn complete! End turn to draw new cards. \
                 ({in_hand} cards in hand, {in_deck} cards in deck)",
                self.current_player + 1,
            );
        }

        let remaining = self
            .required_plays()
            .saturating_sub(self.cards_played_this_turn);
        format!(
            "Player {}'s turn - Play {remaining} more card{} to complete \
             your turn ({in_hand} cards in hand, {in_deck} cards in deck)",
            self.current_player + 1,
            if remaining == 1 { "" } else { "s" },
        )
    }

    fn current_hand(&self) -> Result<&Vec<Card>, GameError> {
        let index = self.current_player;
        self.player_hands.get(index).ok_or_else(|| {
            GameError::InvalidState(format!(
                "current player {index} has no hand"
            ))
        })
    }
}
