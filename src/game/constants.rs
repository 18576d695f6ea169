//! Table-size and deck constants.

/// Number of cards in a standard deck.
pub const DECK_SIZE: usize = 52;

/// Maximum number of seats at a table.
pub const MAX_SEATS: usize = 9;

/// Minimum number of players needed to start a hand.
pub const MIN_PLAYERS: usize = 2;

/// Hole cards dealt to each player.
pub const HOLE_CARDS: usize = 2;

/// Community cards on a full board.
pub const BOARD_SIZE: usize = 5;

/// Maximum length of a player's display name.
pub const MAX_NAME_LENGTH: usize = 16;
