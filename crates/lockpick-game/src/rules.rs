//! Deck arithmetic and card legality — the pure rules of Lockpick.
//!
//! Everything here is a free function of its arguments; the turn engine
//! in [`state`](crate::state) and any client UI can both call these
//! without sharing state.

use std::fmt;

use rand::seq::SliceRandom;

/// A card is just its face value. Cards run from 2 up to
/// [`max_card_value`] inclusive.
pub type Card = u32;

/// Direction of a discard pile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PileType {
    /// Grows upward from 1; accepts higher cards, or exactly top − 10.
    Ascending,
    /// Grows downward from [`descending_start_value`]; accepts lower
    /// cards, or exactly top + 10.
    Descending,
}

impl PileType {
    /// Maps a pile index to its direction: piles 0–1 ascend, 2–3 descend.
    pub fn of_index(index: usize) -> Option<Self> {
        match index {
            0 | 1 => Some(Self::Ascending),
            2 | 3 => Some(Self::Descending),
            _ => None,
        }
    }
}

impl fmt::Display for PileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "ascending"),
            Self::Descending => write!(f, "descending"),
        }
    }
}

/// Highest card in the deck: 99 for up to five players, plus 10 for
/// each player beyond the fifth.
pub fn max_card_value(player_count: usize) -> Card {
    99 + 10 * player_count.saturating_sub(5) as Card
}

/// Total number of cards dealt into a game (cards run 2..=max).
pub fn total_card_count(player_count: usize) -> u32 {
    max_card_value(player_count) - 1
}

/// Conceptual starting value of the descending piles: 100 for the base
/// deck, max + 1 once the deck grows past 99.
pub fn descending_start_value(player_count: usize) -> Card {
    let max_card = max_card_value(player_count);
    if max_card >= 100 { max_card + 1 } else { 100 }
}

/// Cards dealt to each player at the start of the game and refilled at
/// the end of every turn.
pub fn hand_size(player_count: usize) -> usize {
    match player_count {
        0 | 1 => 8,
        2 => 7,
        3..=5 => 6,
        6..=8 => 5,
        _ => 4,
    }
}

/// Builds a freshly shuffled deck sized for `player_count` players.
pub fn create_deck(player_count: usize) -> Vec<Card> {
    let mut deck: Vec<Card> = (2..=max_card_value(player_count)).collect();
    shuffle_deck(&mut deck);
    deck
}

/// Shuffles a deck in place (Fisher–Yates via `rand`). Each call draws
/// from the thread-local generator, so two decks shuffled in the same
/// process are independently random.
pub fn shuffle_deck(deck: &mut [Card]) {
    deck.shuffle(&mut rand::rng());
}

/// Whether `card` may be placed on `pile`.
///
/// An empty pile accepts anything. Otherwise an ascending pile wants a
/// strictly higher card — or exactly ten below the top, the "backwards
/// trick" that lets a stuck pile rewind. Descending piles mirror that.
/// Equal to the top is never legal.
pub fn can_play_card(card: Card, pile: &[Card], pile_type: PileType) -> bool {
    let Some(&top) = pile.last() else {
        return true;
    };
    match pile_type {
        PileType::Ascending => card > top || card + 10 == top,
        PileType::Descending => card < top || card == top + 10,
    }
}

/// The game is won when every card sits on a discard pile.
pub fn is_game_won(piles: &[Vec<Card>; 4], total_cards: u32) -> bool {
    piles.iter().map(|p| p.len() as u32).sum::<u32>() == total_cards
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_card_value_base_deck() {
        for players in 1..=5 {
            assert_eq!(max_card_value(players), 99, "{players} players");
        }
    }

    #[test]
    fn test_max_card_value_scales_past_five_players() {
        assert_eq!(max_card_value(6), 109);
        assert_eq!(max_card_value(8), 129);
        assert_eq!(max_card_value(10), 149);
    }

    #[test]
    fn test_total_card_count() {
        assert_eq!(total_card_count(2), 98);
        assert_eq!(total_card_count(6), 108);
    }

    #[test]
    fn test_descending_start_value() {
        assert_eq!(descending_start_value(2), 100);
        assert_eq!(descending_start_value(5), 100);
        assert_eq!(descending_start_value(6), 110);
        assert_eq!(descending_start_value(10), 150);
    }

    #[test]
    fn test_hand_size_table() {
        assert_eq!(hand_size(1), 8);
        assert_eq!(hand_size(2), 7);
        assert_eq!(hand_size(3), 6);
        assert_eq!(hand_size(5), 6);
        assert_eq!(hand_size(6), 5);
        assert_eq!(hand_size(8), 5);
        assert_eq!(hand_size(9), 4);
        assert_eq!(hand_size(10), 4);
    }

    #[test]
    fn test_create_deck_two_players_has_98_cards() {
        // Cards 2..=99 inclusive.
        let deck = create_deck(2);
        assert_eq!(deck.len(), 98);
        assert!(deck.contains(&2));
        assert!(deck.contains(&99));
        assert!(!deck.contains(&1));
        assert!(!deck.contains(&100));
    }

    #[test]
    fn test_create_deck_contains_each_card_once() {
        let mut deck = create_deck(7);
        deck.sort_unstable();
        let expected: Vec<Card> = (2..=max_card_value(7)).collect();
        assert_eq!(deck, expected);
    }

    #[test]
    fn test_shuffle_preserves_cards() {
        let original: Vec<Card> = (2..=99).collect();
        let mut shuffled = original.clone();
        shuffle_deck(&mut shuffled);
        let mut sorted = shuffled.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, original);
    }

    #[test]
    fn test_empty_pile_accepts_any_card() {
        assert!(can_play_card(2, &[], PileType::Ascending));
        assert!(can_play_card(99, &[], PileType::Ascending));
        assert!(can_play_card(50, &[], PileType::Descending));
    }

    #[test]
    fn test_ascending_pile_rules() {
        assert!(can_play_card(38, &[37], PileType::Ascending));
        assert!(!can_play_card(36, &[37], PileType::Ascending));
        // Equal to the top is never legal.
        assert!(!can_play_card(37, &[37], PileType::Ascending));
        // The minus-ten exception.
        assert!(can_play_card(27, &[37], PileType::Ascending));
        assert!(!can_play_card(28, &[37], PileType::Ascending));
    }

    #[test]
    fn test_descending_pile_rules() {
        assert!(can_play_card(36, &[37], PileType::Descending));
        assert!(!can_play_card(38, &[37], PileType::Descending));
        assert!(!can_play_card(37, &[37], PileType::Descending));
        // The plus-ten exception.
        assert!(can_play_card(47, &[37], PileType::Descending));
        assert!(!can_play_card(46, &[37], PileType::Descending));
    }

    #[test]
    fn test_legality_checks_only_the_top_card() {
        let pile = vec![10, 20, 30];
        assert!(can_play_card(31, &pile, PileType::Ascending));
        assert!(can_play_card(20, &pile, PileType::Ascending));
        assert!(!can_play_card(25, &pile, PileType::Ascending));
    }

    #[test]
    fn test_pile_type_of_index() {
        assert_eq!(PileType::of_index(0), Some(PileType::Ascending));
        assert_eq!(PileType::of_index(1), Some(PileType::Ascending));
        assert_eq!(PileType::of_index(2), Some(PileType::Descending));
        assert_eq!(PileType::of_index(3), Some(PileType::Descending));
        assert_eq!(PileType::of_index(4), None);
    }

    #[test]
    fn test_is_game_won() {
        let empty: [Vec<Card>; 4] = [vec![], vec![], vec![], vec![]];
        assert!(!is_game_won(&empty, 98));

        let partial = [vec![2, 3], vec![], vec![99], vec![]];
        assert!(!is_game_won(&partial, 98));

        // 98 cards spread across the piles wins regardless of layout.
        let full = [
            (2..=50).collect::<Vec<Card>>(),
            vec![],
            (51..=99).rev().collect::<Vec<Card>>(),
            vec![],
        ];
        assert!(is_game_won(&full, 98));
    }
}
