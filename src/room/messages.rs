//! Room actor message types.

use tokio::sync::{mpsc, oneshot};

use crate::game::{
    Action, DisplayName, JoinOutcome, Payout, PlayerId, RoomError, RoomSnapshot, ValidationError,
};

/// Messages that can be sent to a [`crate::room::RoomActor`].
#[derive(Debug)]
pub enum RoomMessage {
    /// Seat a player, or queue them if a hand is in progress.
    Join {
        player: PlayerId,
        name: DisplayName,
        response: oneshot::Sender<Result<JoinOutcome, ValidationError>>,
    },

    /// Remove a player. Mid-hand this is treated as a disconnect.
    Leave {
        player: PlayerId,
        response: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Host request to deal the first hand from the lobby.
    StartHand {
        player: PlayerId,
        response: oneshot::Sender<Result<RoomSnapshot, RoomError>>,
    },

    /// A player betting action for the current hand.
    TakeAction {
        player: PlayerId,
        action: Action,
        response: oneshot::Sender<Result<RoomSnapshot, RoomError>>,
    },

    /// Fetch the room state as seen by `observer` (hole cards masked).
    GetSnapshot {
        observer: Option<PlayerId>,
        response: oneshot::Sender<RoomSnapshot>,
    },

    /// Subscribe to state change events. Events are personalized, so the
    /// subscriber's own hole cards are visible in the attached snapshots.
    Subscribe {
        player: PlayerId,
        sender: mpsc::Sender<RoomEvent>,
    },

    /// Stop receiving state change events.
    Unsubscribe { player: PlayerId },

    /// Shut the room down.
    Close {
        response: oneshot::Sender<()>,
    },
}

/// Events pushed to room subscribers. Every event carries a snapshot
/// personalized for the subscriber it is delivered to.
#[derive(Clone, Debug)]
pub enum RoomEvent {
    /// Seating changed: a join, a leave, or a queued change applied at a
    /// hand boundary.
    PlayersUpdated { snapshot: RoomSnapshot },

    /// A new hand was dealt.
    HandStarted { snapshot: RoomSnapshot },

    /// An action was applied or a street was dealt.
    StateUpdated { snapshot: RoomSnapshot },

    /// The hand settled, by showdown or fold-out.
    HandSettled {
        payouts: Vec<Payout>,
        snapshot: RoomSnapshot,
    },

    /// The room shut down; no further events will arrive.
    RoomClosed,
}
