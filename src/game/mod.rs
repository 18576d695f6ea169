//! Deterministic Texas Hold'em engine.
//!
//! This module holds everything that does not touch the async runtime:
//! - Cards, decks, players, and views
//! - Seven-card hand evaluation
//! - Betting round validation and turn order
//! - Main/side pot decomposition and settlement
//! - The per-room hand lifecycle state machine
//!
//! The engine is pure state-in, state-out; the [`crate::room`] layer wraps
//! it in an actor and adds timers and broadcasting.

pub mod betting;
pub mod constants;
pub mod entities;
pub mod errors;
pub mod eval;
pub mod pots;
pub mod state_machine;

pub use betting::{BettingRound, RoundPhase, RoundStatus};
pub use entities::{
    Action, Blinds, Card, Chips, Deck, DisplayName, Payout, Player, PlayerId, PlayerStatus,
    PlayerView, Rank, RoomId, RoomSnapshot, SeatIndex, Street, Suit,
};
pub use errors::{InvariantViolation, RoomError, ValidationError};
pub use eval::{HandCategory, HandValue, evaluate};
pub use pots::{Contribution, Pot, PotBreakdown, build_pots, settle};
pub use state_machine::{ActionOutcome, GameSettings, JoinOutcome, Phase, RoomState};
