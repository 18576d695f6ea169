//! Core value types: cards, the deck, players, actions, and snapshots.

use rand::seq::SliceRandom;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use uuid::Uuid;

use super::constants::{self, DECK_SIZE};
use super::errors::InvariantViolation;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Club, Suit::Spade, Suit::Diamond, Suit::Heart];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// Card rank, 2..=14 with aces always high. Ace-low straights are a
/// hand-evaluation concern, not a card-representation concern.
pub type Rank = u8;

/// A card is a tuple of a rank (2u8 ... ace=14u8) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Rank, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rank = match self.0 {
            14 => "A".to_string(),
            13 => "K".to_string(),
            12 => "Q".to_string(),
            11 => "J".to_string(),
            r => r.to_string(),
        };
        write!(f, "{rank}{}", self.1)
    }
}

/// A shuffled deck for exactly one hand. Created at deal time, discarded at
/// hand end; there is no reshuffle mid-hand.
#[derive(Debug)]
pub struct Deck {
    cards: [Card; DECK_SIZE],
    next: usize,
}

impl Deck {
    /// All 52 cards in a freshly randomized order (Fisher-Yates via `rand`).
    #[must_use]
    pub fn shuffled() -> Self {
        let mut cards = [Card(2, Suit::Club); DECK_SIZE];
        let mut i = 0;
        for rank in 2..=14u8 {
            for suit in Suit::ALL {
                cards[i] = Card(rank, suit);
                i += 1;
            }
        }
        cards.shuffle(&mut rand::rng());
        Self { cards, next: 0 }
    }

    /// Remove and return the top card. A hand draws at most 23 cards
    /// (9 players x 2 hole cards + 5 board), so exhaustion indicates a
    /// sequencing defect rather than bad luck.
    pub fn draw(&mut self) -> Result<Card, InvariantViolation> {
        if self.next >= DECK_SIZE {
            return Err(InvariantViolation::DeckExhausted);
        }
        let card = self.cards[self.next];
        self.next += 1;
        Ok(card)
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        DECK_SIZE - self.next
    }
}

/// Type alias for whole chips. Stacks, bets, and pots are all integer chip
/// counts; there are no fractional chips anywhere in the engine.
pub type Chips = u32;

/// Type alias for seat positions. Seat order is turn order.
pub type SeatIndex = usize;

/// Stable identity of a player across a room's lifetime.
pub type PlayerId = Uuid;

/// Unique identifier of a room.
pub type RoomId = Uuid;

/// A sanitized display name: whitespace collapsed to underscores and
/// truncated, so names are safe to log and render anywhere.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(s: &str) -> Self {
        let mut name: String = s
            .chars()
            .map(|c| if c.is_ascii_whitespace() { '_' } else { c })
            .collect();
        name.truncate(constants::MAX_NAME_LENGTH);
        Self(name)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for DisplayName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<&str> for DisplayName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Blinds {
    pub small: Chips,
    pub big: Chips,
}

impl fmt::Display for Blinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.small, self.big)
    }
}

/// Betting phase tied to a stage of community-card reveal.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl Street {
    /// The street that follows this one, or `None` after the river.
    #[must_use]
    pub fn next(self) -> Option<Street> {
        match self {
            Self::Preflop => Some(Self::Flop),
            Self::Flop => Some(Self::Turn),
            Self::Turn => Some(Self::River),
            Self::River => None,
        }
    }

    /// Community cards revealed when entering this street.
    #[must_use]
    pub fn reveal_count(self) -> usize {
        match self {
            Self::Preflop => 0,
            Self::Flop => 3,
            Self::Turn | Self::River => 1,
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Preflop => "preflop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
        };
        write!(f, "{repr}")
    }
}

/// A player intent submitted to the betting engine. `Bet` and `Raise` carry
/// the target street commitment ("bet to" / "raise to"), not a delta.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Action {
    Fold,
    Check,
    Call,
    Bet(Chips),
    Raise(Chips),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Fold => "folds".to_string(),
            Self::Check => "checks".to_string(),
            Self::Call => "calls".to_string(),
            Self::Bet(amount) => format!("bets {amount}"),
            Self::Raise(amount) => format!("raises to {amount}"),
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PlayerStatus {
    /// In the hand and able to act.
    Active,
    /// Out of this hand; chips already committed stay in the pot.
    Folded,
    /// Whole stack committed; still eligible for pots up to their
    /// contribution but cannot act again this hand.
    AllIn,
    /// Seated but not dealt into hands (busted or opted out).
    SittingOut,
    /// Connection lost mid-hand; folded implicitly when action reaches them.
    Disconnected,
}

impl PlayerStatus {
    /// Whether the player still contests the pot.
    #[must_use]
    pub fn in_hand(self) -> bool {
        matches!(self, Self::Active | Self::AllIn | Self::Disconnected)
    }
}

/// A seated player. Mutated only by the betting engine and the room state
/// machine; everything external sees [`PlayerView`]s.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: DisplayName,
    pub stack: Chips,
    pub hole_cards: Vec<Card>,
    pub street_committed: Chips,
    pub hand_committed: Chips,
    pub status: PlayerStatus,
    pub revealed: bool,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, name: DisplayName, stack: Chips) -> Self {
        Self {
            id,
            name,
            stack,
            hole_cards: Vec::with_capacity(constants::HOLE_CARDS),
            street_committed: 0,
            hand_committed: 0,
            status: PlayerStatus::SittingOut,
            revealed: false,
        }
    }

    /// Move up to `amount` chips from the stack into this street's
    /// commitment, returning what actually moved. Emptying the stack flips
    /// the player to all-in.
    pub fn commit(&mut self, amount: Chips) -> Chips {
        let moved = amount.min(self.stack);
        self.stack -= moved;
        self.street_committed += moved;
        self.hand_committed += moved;
        if self.stack == 0 && self.status == PlayerStatus::Active {
            self.status = PlayerStatus::AllIn;
        }
        moved
    }

    /// Reset per-hand state. Busted players sit out until they rebuy.
    pub fn reset_for_hand(&mut self) {
        self.hole_cards.clear();
        self.street_committed = 0;
        self.hand_committed = 0;
        self.revealed = false;
        self.status = if self.stack > 0 {
            PlayerStatus::Active
        } else {
            PlayerStatus::SittingOut
        };
    }
}

/// One player's appearance in a snapshot. `hole_cards` is `None` when the
/// cards are hidden from the snapshot's observer.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: DisplayName,
    pub seat: SeatIndex,
    pub stack: Chips,
    pub street_committed: Chips,
    pub hand_committed: Chips,
    pub status: PlayerStatus,
    pub hole_cards: Option<Vec<Card>>,
}

/// Immutable, broadcast-safe view of a room. Each observer receives a
/// snapshot that exposes only their own hole cards until showdown.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub hand_no: u64,
    pub phase: String,
    pub street: Option<Street>,
    pub blinds: Blinds,
    pub dealer_seat: SeatIndex,
    pub acting_seat: Option<SeatIndex>,
    pub min_raise: Option<Chips>,
    pub board: Vec<Card>,
    pub pot_total: Chips,
    pub players: Vec<PlayerView>,
}

/// A settled win, broadcast after showdown or fold-out.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Payout {
    pub player: PlayerId,
    pub seat: SeatIndex,
    pub amount: Chips,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_deck_has_52_distinct_cards() {
        let mut deck = Deck::shuffled();
        let mut seen = HashSet::new();
        for _ in 0..DECK_SIZE {
            let card = deck.draw().unwrap();
            assert!(seen.insert(card), "duplicate card drawn: {card}");
        }
        assert_eq!(seen.len(), DECK_SIZE);
    }

    #[test]
    fn test_deck_exhaustion_is_an_error() {
        let mut deck = Deck::shuffled();
        for _ in 0..DECK_SIZE {
            deck.draw().unwrap();
        }
        assert_eq!(deck.draw(), Err(InvariantViolation::DeckExhausted));
        assert_eq!(deck.remaining(), 0);
    }

    #[test]
    fn test_card_display() {
        assert_eq!(Card(14, Suit::Spade).to_string(), "A♠");
        assert_eq!(Card(10, Suit::Heart).to_string(), "10♥");
        assert_eq!(Card(2, Suit::Club).to_string(), "2♣");
    }

    #[test]
    fn test_display_name_sanitization() {
        assert_eq!(DisplayName::new("alice bob").to_string(), "alice_bob");
        let long = "a".repeat(100);
        assert_eq!(
            DisplayName::new(&long).to_string().len(),
            constants::MAX_NAME_LENGTH
        );
    }

    #[test]
    fn test_street_progression() {
        assert_eq!(Street::Preflop.next(), Some(Street::Flop));
        assert_eq!(Street::Flop.next(), Some(Street::Turn));
        assert_eq!(Street::Turn.next(), Some(Street::River));
        assert_eq!(Street::River.next(), None);
        assert_eq!(Street::Flop.reveal_count(), 3);
        assert_eq!(Street::River.reveal_count(), 1);
    }

    #[test]
    fn test_commit_clamps_to_stack_and_flips_all_in() {
        let mut player = Player::new(Uuid::new_v4(), "alice".into(), 100);
        player.reset_for_hand();
        assert_eq!(player.commit(40), 40);
        assert_eq!(player.stack, 60);
        assert_eq!(player.status, PlayerStatus::Active);
        assert_eq!(player.commit(500), 60);
        assert_eq!(player.stack, 0);
        assert_eq!(player.status, PlayerStatus::AllIn);
        assert_eq!(player.hand_committed, 100);
    }

    #[test]
    fn test_reset_for_hand_marks_busted_players_sitting_out() {
        let mut player = Player::new(Uuid::new_v4(), "bob".into(), 0);
        player.reset_for_hand();
        assert_eq!(player.status, PlayerStatus::SittingOut);
    }
}
