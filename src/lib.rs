//! # Hold'em Rooms
//!
//! A server-authoritative Texas Hold'em room engine. Rooms are small,
//! host-started tables: players join, the host deals, and the room drives
//! betting rounds, showdowns, and payouts while each player only ever sees
//! their own hole cards.
//!
//! The crate splits into two layers:
//!
//! - [`game`]: the deterministic engine. Cards and decks, seven-card hand
//!   evaluation, betting validation with all-in and side-pot handling, and
//!   the per-room hand lifecycle state machine. No async, no timers.
//! - [`room`]: the hosting layer. One tokio task per room owns a
//!   [`game::RoomState`], serializes every request through an mpsc inbox,
//!   runs the action-timeout and auto-advance timers, and broadcasts
//!   personalized snapshots to subscribers.
//!
//! Chip conservation is enforced at runtime: if a hand's chips ever fail to
//! add up, the room freezes rather than continue with corrupted balances.
//!
//! ## Example
//!
//! ```ignore
//! use holdem_rooms::{DisplayName, RoomConfig, RoomRegistry};
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = RoomRegistry::new();
//!     let host = Uuid::new_v4();
//!     let room = registry
//!         .create_room(RoomConfig::default(), host, DisplayName::from("alice"))
//!         .await
//!         .unwrap();
//!
//!     let guest = Uuid::new_v4();
//!     room.join(guest, DisplayName::from("bob")).await.unwrap();
//!     let snapshot = room.start_hand(host).await.unwrap();
//!     assert_eq!(snapshot.players.len(), 2);
//! }
//! ```

/// Deterministic poker engine: cards, evaluation, betting, pots, lifecycle.
pub mod game;
pub use game::{
    Action, ActionOutcome, Blinds, Card, Chips, Deck, DisplayName, GameSettings, HandCategory,
    HandValue, InvariantViolation, JoinOutcome, Payout, Phase, PlayerId, PlayerStatus, PlayerView,
    Rank, RoomError, RoomId, RoomSnapshot, RoomState, SeatIndex, Street, Suit, ValidationError,
    constants, evaluate,
};

/// Async room hosting: actors, handles, events, and the registry.
pub mod room;
pub use room::{RoomConfig, RoomEvent, RoomHandle, RoomRegistry};
