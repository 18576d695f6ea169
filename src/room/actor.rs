//! Room actor with async message handling.
//!
//! Each room runs in its own tokio task and owns its [`RoomState`]
//! exclusively, so every join, action, and timeout for a room is applied on
//! one logical timeline. Callers talk to the task through a cloneable
//! [`RoomHandle`].

use log::{debug, info, warn};
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Duration, Instant, sleep_until};

use super::config::RoomConfig;
use super::messages::{RoomEvent, RoomMessage};
use crate::game::{
    Action, ActionOutcome, DisplayName, JoinOutcome, Payout, Phase, PlayerId, RoomError, RoomId,
    RoomSnapshot, RoomState, ValidationError,
};

/// Inbox depth per room. Bounded so a stalled room back-pressures callers
/// instead of buffering unboundedly.
const INBOX_CAPACITY: usize = 64;

/// Cloneable handle for sending requests to a room task.
#[derive(Clone, Debug)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
    room_id: RoomId,
}

impl RoomHandle {
    #[must_use]
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Whether the room task has stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RoomMessage,
    ) -> Result<T, ValidationError> {
        let (response, receiver) = oneshot::channel();
        self.sender
            .send(build(response))
            .await
            .map_err(|_| ValidationError::RoomClosed)?;
        receiver.await.map_err(|_| ValidationError::RoomClosed)
    }

    pub async fn join(
        &self,
        player: PlayerId,
        name: DisplayName,
    ) -> Result<JoinOutcome, ValidationError> {
        self.request(|response| RoomMessage::Join {
            player,
            name,
            response,
        })
        .await?
    }

    pub async fn leave(&self, player: PlayerId) -> Result<(), RoomError> {
        self.request(|response| RoomMessage::Leave { player, response })
            .await
            .map_err(RoomError::from)?
    }

    pub async fn start_hand(&self, player: PlayerId) -> Result<RoomSnapshot, RoomError> {
        self.request(|response| RoomMessage::StartHand { player, response })
            .await
            .map_err(RoomError::from)?
    }

    pub async fn take_action(
        &self,
        player: PlayerId,
        action: Action,
    ) -> Result<RoomSnapshot, RoomError> {
        self.request(|response| RoomMessage::TakeAction {
            player,
            action,
            response,
        })
        .await
        .map_err(RoomError::from)?
    }

    pub async fn snapshot(&self, observer: Option<PlayerId>) -> Result<RoomSnapshot, ValidationError> {
        self.request(|response| RoomMessage::GetSnapshot { observer, response })
            .await
    }

    /// Subscribe to room events. The returned receiver yields events with
    /// snapshots personalized for `player`.
    pub async fn subscribe(
        &self,
        player: PlayerId,
        buffer: usize,
    ) -> Result<mpsc::Receiver<RoomEvent>, ValidationError> {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        self.sender
            .send(RoomMessage::Subscribe { player, sender })
            .await
            .map_err(|_| ValidationError::RoomClosed)?;
        Ok(receiver)
    }

    pub async fn unsubscribe(&self, player: PlayerId) -> Result<(), ValidationError> {
        self.sender
            .send(RoomMessage::Unsubscribe { player })
            .await
            .map_err(|_| ValidationError::RoomClosed)
    }

    pub async fn close(&self) -> Result<(), ValidationError> {
        self.request(|response| RoomMessage::Close { response })
            .await
    }
}

/// Actor owning a single room.
pub struct RoomActor {
    config: RoomConfig,
    state: RoomState,
    inbox: mpsc::Receiver<RoomMessage>,
    subscribers: HashMap<PlayerId, mpsc::Sender<RoomEvent>>,
    /// When the acting player is auto-checked/folded.
    action_deadline: Option<Instant>,
    /// Player the deadline was armed for; a turn change re-arms it.
    acting: Option<PlayerId>,
    /// When the next hand is dealt after a payout.
    advance_at: Option<Instant>,
    shutting_down: bool,
}

impl RoomActor {
    pub fn new(
        id: RoomId,
        config: RoomConfig,
        host: PlayerId,
        host_name: DisplayName,
    ) -> (Self, RoomHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let state = RoomState::new(id, config.settings.clone(), host, host_name);
        let actor = Self {
            config,
            state,
            inbox,
            subscribers: HashMap::new(),
            action_deadline: None,
            acting: None,
            advance_at: None,
            shutting_down: false,
        };
        let handle = RoomHandle { sender, room_id: id };
        (actor, handle)
    }

    /// Run the room event loop until the room closes or every handle is
    /// dropped.
    pub async fn run(mut self) {
        info!("room {}: actor started", self.state.id());
        loop {
            let deadline = self.next_deadline();
            tokio::select! {
                message = self.inbox.recv() => {
                    let Some(message) = message else { break };
                    self.handle_message(message);
                }
                () = sleep_until(deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(86_400))), if deadline.is_some() => {
                    self.handle_deadline();
                }
            }
            self.rearm_timers();
            if self.shutting_down || self.state.phase() == Phase::Closed {
                break;
            }
        }
        self.broadcast_closed();
        info!("room {}: actor stopped", self.state.id());
    }

    fn handle_message(&mut self, message: RoomMessage) {
        match message {
            RoomMessage::Join {
                player,
                name,
                response,
            } => {
                let result = self.state.seat_player(player, name);
                let joined = result.is_ok();
                let _ = response.send(result);
                if joined {
                    self.broadcast(|snapshot| RoomEvent::PlayersUpdated { snapshot });
                }
            }

            RoomMessage::Leave { player, response } => {
                match self.state.remove_player(player) {
                    Ok(ActionOutcome::HandSettled(payouts)) => {
                        let _ = response.send(Ok(()));
                        self.broadcast_settled(payouts);
                    }
                    Ok(ActionOutcome::Continue) => {
                        let _ = response.send(Ok(()));
                        self.broadcast(|snapshot| RoomEvent::PlayersUpdated { snapshot });
                    }
                    Err(e) => {
                        let _ = response.send(Err(e));
                    }
                }
            }

            RoomMessage::StartHand { player, response } => {
                match self.state.start_hand(player) {
                    Ok(outcome) => {
                        let _ = response.send(Ok(self.state.snapshot_for(Some(player))));
                        self.broadcast(|snapshot| RoomEvent::HandStarted { snapshot });
                        // Blind all-ins can settle the hand before anyone acts.
                        if let ActionOutcome::HandSettled(payouts) = outcome {
                            self.broadcast_settled(payouts);
                        }
                    }
                    Err(e) => {
                        let _ = response.send(Err(e));
                    }
                }
            }

            RoomMessage::TakeAction {
                player,
                action,
                response,
            } => match self.state.apply_action(player, action) {
                Ok(outcome) => {
                    let _ = response.send(Ok(self.state.snapshot_for(Some(player))));
                    match outcome {
                        ActionOutcome::HandSettled(payouts) => self.broadcast_settled(payouts),
                        ActionOutcome::Continue => {
                            self.broadcast(|snapshot| RoomEvent::StateUpdated { snapshot });
                        }
                    }
                }
                Err(e) => {
                    let _ = response.send(Err(e));
                }
            },

            RoomMessage::GetSnapshot { observer, response } => {
                let _ = response.send(self.state.snapshot_for(observer));
            }

            RoomMessage::Subscribe { player, sender } => {
                debug!("room {}: player {player} subscribed", self.state.id());
                self.subscribers.insert(player, sender);
            }

            RoomMessage::Unsubscribe { player } => {
                debug!("room {}: player {player} unsubscribed", self.state.id());
                self.subscribers.remove(&player);
            }

            RoomMessage::Close { response } => {
                self.state.close();
                self.shutting_down = true;
                let _ = response.send(());
            }
        }
    }

    /// Fire whichever deadline elapsed: the payout auto-advance or the
    /// acting player's timeout.
    fn handle_deadline(&mut self) {
        let now = Instant::now();
        if self.advance_at.is_some_and(|at| at <= now) {
            self.advance_at = None;
            match self.state.advance_from_payout() {
                Ok(outcome) => {
                    if matches!(self.state.phase(), Phase::Betting(_) | Phase::Payout) {
                        self.broadcast(|snapshot| RoomEvent::HandStarted { snapshot });
                    } else {
                        self.broadcast(|snapshot| RoomEvent::PlayersUpdated { snapshot });
                    }
                    if let ActionOutcome::HandSettled(payouts) = outcome {
                        self.broadcast_settled(payouts);
                    }
                }
                Err(e) => warn!("room {}: auto-advance failed: {e}", self.state.id()),
            }
        } else if self.action_deadline.is_some_and(|at| at <= now) {
            self.action_deadline = None;
            self.acting = None;
            match self.state.apply_timeout_action() {
                Ok(ActionOutcome::HandSettled(payouts)) => self.broadcast_settled(payouts),
                Ok(ActionOutcome::Continue) => {
                    self.broadcast(|snapshot| RoomEvent::StateUpdated { snapshot });
                }
                Err(e) => warn!("room {}: timeout action failed: {e}", self.state.id()),
            }
        }
    }

    /// Recompute timers after every message or deadline. The action timer
    /// restarts only when the turn passes to a different player.
    fn rearm_timers(&mut self) {
        match self.state.phase() {
            Phase::Betting(_) => {
                self.advance_at = None;
                let acting = self.state.acting_player();
                if acting != self.acting {
                    self.acting = acting;
                    self.action_deadline =
                        acting.map(|_| Instant::now() + self.config.action_timeout);
                }
            }
            Phase::Payout => {
                self.acting = None;
                self.action_deadline = None;
                if self.advance_at.is_none() {
                    self.advance_at = Some(Instant::now() + self.config.auto_advance_delay);
                }
            }
            _ => {
                self.acting = None;
                self.action_deadline = None;
                self.advance_at = None;
            }
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        match (self.action_deadline, self.advance_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Push a personalized event to every subscriber. Slow subscribers drop
    /// events; disconnected ones are removed.
    fn broadcast<F>(&mut self, make: F)
    where
        F: Fn(RoomSnapshot) -> RoomEvent,
    {
        let state = &self.state;
        self.subscribers.retain(|player, sender| {
            let event = make(state.snapshot_for(Some(*player)));
            match sender.try_send(event) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!("room {}: subscriber {player} lagging, event dropped", state.id());
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
    }

    fn broadcast_settled(&mut self, payouts: Vec<Payout>) {
        self.broadcast(|snapshot| RoomEvent::HandSettled {
            payouts: payouts.clone(),
            snapshot,
        });
    }

    fn broadcast_closed(&mut self) {
        for sender in self.subscribers.values() {
            let _ = sender.try_send(RoomEvent::RoomClosed);
        }
        self.subscribers.clear();
    }
}
