//! Error taxonomy for the room engine.
//!
//! `ValidationError` covers everything a misbehaving or merely unlucky caller
//! can trigger: the offending request is rejected, the room is untouched, and
//! play continues. `InvariantViolation` covers conditions that can only arise
//! from a defect in the engine itself; the room that observes one is frozen
//! so that player balances cannot be corrupted further.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::Chips;

/// Recoverable errors reported to the offending caller only.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum ValidationError {
    #[error("not your turn")]
    NotYourTurn,
    #[error("invalid action: {0}")]
    InvalidAction(String),
    #[error("no actions allowed in the current phase")]
    InvalidPhase,
    #[error("room is full")]
    RoomFull,
    #[error("room is closed")]
    RoomClosed,
    #[error("need 2+ players with chips")]
    NotEnoughPlayers,
    #[error("only the host can start a hand")]
    NotHost,
    #[error("hand already in progress")]
    HandInProgress,
    #[error("player is not seated in this room")]
    UnknownPlayer,
    #[error("player is already seated in this room")]
    AlreadySeated,
}

/// Defect indicators. A room that surfaces one of these stops accepting
/// actions entirely.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum InvariantViolation {
    #[error("deck exhausted")]
    DeckExhausted,
    #[error("no eligible players for pot")]
    NoEligiblePlayers,
    #[error("chip conservation violated: expected {expected}, found {actual}")]
    ChipConservation { expected: Chips, actual: Chips },
}

/// Combined error type for room operations.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum RoomError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("room frozen by invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
}
