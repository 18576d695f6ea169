//! Per-room hand lifecycle: lobby, dealing, betting streets, showdown,
//! payout, and the invariants that hold across all of them.
//!
//! [`RoomState`] is the single authoritative owner of a room's mutable
//! state. It is deliberately synchronous; the room actor serializes all
//! access to it, so nothing in here needs interior mutability or locking.

use log::{error, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use super::betting::{BettingRound, RoundPhase, RoundStatus};
use super::constants::{BOARD_SIZE, MAX_SEATS, MIN_PLAYERS};
use super::entities::{
    Action, Blinds, Card, Chips, Deck, DisplayName, Payout, Player, PlayerId, PlayerStatus,
    PlayerView, RoomId, RoomSnapshot, SeatIndex, Street,
};
use super::errors::{InvariantViolation, RoomError, ValidationError};
use super::eval::{HandValue, evaluate};
use super::pots::{self, Contribution};

/// Game rules configuration. Timing lives in [`crate::room::RoomConfig`];
/// everything the deterministic engine needs is here.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameSettings {
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub starting_stack: Chips,
    pub max_seats: usize,
    /// Whether a fold-out winner's hole cards are revealed. Default house
    /// rule: no reveal.
    pub reveal_on_fold_out: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            small_blind: 5,
            big_blind: 10,
            starting_stack: 1000,
            max_seats: MAX_SEATS,
            reveal_on_fold_out: false,
        }
    }
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.small_blind == 0 {
            return Err("small blind must be nonzero".into());
        }
        if self.big_blind <= self.small_blind {
            return Err("big blind must exceed small blind".into());
        }
        if self.starting_stack < self.big_blind {
            return Err("starting stack must cover the big blind".into());
        }
        if !(MIN_PLAYERS..=MAX_SEATS).contains(&self.max_seats) {
            return Err(format!("max seats must be {MIN_PLAYERS} to {MAX_SEATS}"));
        }
        Ok(())
    }
}

/// Room lifecycle phase. Dealing is instantaneous (hole cards, blinds, and
/// the preflop round are set up in one transition), so it never rests as an
/// observable phase.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Lobby,
    Betting(Street),
    /// Hand settled; waiting for the next-hand signal.
    Payout,
    /// Room emptied; terminal.
    Closed,
    /// An invariant violation was detected. No further actions are accepted
    /// so player balances cannot be corrupted further.
    Frozen,
}

impl Phase {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Lobby => "lobby",
            Self::Betting(_) => "betting",
            Self::Payout => "payout",
            Self::Closed => "closed",
            Self::Frozen => "frozen",
        }
    }
}

/// How a join request was absorbed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JoinOutcome {
    Seated(SeatIndex),
    /// Hand in progress; the player is admitted at the next hand boundary.
    Queued,
}

/// What an applied action did to the hand.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ActionOutcome {
    Continue,
    HandSettled(Vec<Payout>),
}

#[derive(Debug)]
pub struct RoomState {
    id: RoomId,
    settings: GameSettings,
    host: PlayerId,
    players: Vec<Player>,
    /// Joins received mid-hand, seated at the next hand boundary.
    pending_join: VecDeque<(PlayerId, DisplayName)>,
    /// Leaves received mid-hand, released at the next hand boundary. Seats
    /// are never removed while a betting round is live because the round
    /// tracks players by seat index.
    pending_leave: Vec<PlayerId>,
    dealer_seat: SeatIndex,
    deck: Option<Deck>,
    board: Vec<Card>,
    phase: Phase,
    round: Option<BettingRound>,
    hand_no: u64,
    /// Sum of all stacks at hand start; the conserved quantity.
    hand_start_total: Chips,
    last_payouts: Vec<Payout>,
}

impl RoomState {
    pub fn new(id: RoomId, settings: GameSettings, host: PlayerId, host_name: DisplayName) -> Self {
        let stack = settings.starting_stack;
        Self {
            id,
            settings,
            host,
            players: vec![Player::new(host, host_name, stack)],
            pending_join: VecDeque::new(),
            pending_leave: Vec::new(),
            dealer_seat: 0,
            deck: None,
            board: Vec::with_capacity(BOARD_SIZE),
            phase: Phase::Lobby,
            round: None,
            hand_no: 0,
            hand_start_total: 0,
            last_payouts: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> RoomId {
        self.id
    }

    #[must_use]
    pub fn host(&self) -> PlayerId {
        self.host
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.pending_join.is_empty()
    }

    /// The player whose turn it is, if a betting round is waiting on one.
    #[must_use]
    pub fn acting_player(&self) -> Option<PlayerId> {
        let seat = self.round.as_ref()?.acting_seat()?;
        Some(self.players[seat].id)
    }

    #[must_use]
    pub fn seated_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    /// Players able to fund another hand.
    #[must_use]
    pub fn funded_players(&self) -> usize {
        self.players.iter().filter(|p| p.stack > 0).count()
    }

    #[must_use]
    pub fn last_payouts(&self) -> &[Payout] {
        &self.last_payouts
    }

    fn seat_of(&self, player: PlayerId) -> Result<SeatIndex, ValidationError> {
        self.players
            .iter()
            .position(|p| p.id == player)
            .ok_or(ValidationError::UnknownPlayer)
    }

    fn reject_if_unavailable(&self) -> Result<(), ValidationError> {
        match self.phase {
            Phase::Closed | Phase::Frozen => Err(ValidationError::RoomClosed),
            _ => Ok(()),
        }
    }

    /// Seat a player, or queue them if a hand is running. Capacity counts
    /// queued joiners so a full table cannot be oversubscribed mid-hand.
    pub fn seat_player(
        &mut self,
        player: PlayerId,
        name: DisplayName,
    ) -> Result<JoinOutcome, ValidationError> {
        self.reject_if_unavailable()?;
        if self.players.iter().any(|p| p.id == player)
            || self.pending_join.iter().any(|(id, _)| *id == player)
        {
            return Err(ValidationError::AlreadySeated);
        }
        if self.players.len() + self.pending_join.len() >= self.settings.max_seats {
            return Err(ValidationError::RoomFull);
        }
        match self.phase {
            Phase::Lobby => {
                let stack = self.settings.starting_stack;
                self.players.push(Player::new(player, name, stack));
                Ok(JoinOutcome::Seated(self.players.len() - 1))
            }
            _ => {
                self.pending_join.push_back((player, name));
                Ok(JoinOutcome::Queued)
            }
        }
    }

    /// Remove a player. In the lobby the seat is released immediately. Every
    /// mid-hand leave is deferred to the next hand boundary, even for players
    /// already folded or not in the hand: the betting round and pots address
    /// players by seat index, so seats never shift while a hand is live. An
    /// in-hand leaver is marked disconnected (implicit fold on their turn,
    /// committed chips stay in the pot) until then.
    pub fn remove_player(&mut self, player: PlayerId) -> Result<ActionOutcome, RoomError> {
        if let Some(pos) = self.pending_join.iter().position(|(id, _)| *id == player) {
            self.pending_join.remove(pos);
            return Ok(ActionOutcome::Continue);
        }
        let seat = self.seat_of(player)?;
        match self.phase {
            Phase::Lobby | Phase::Payout | Phase::Closed | Phase::Frozen => {
                self.release_seat(seat);
                if self.is_empty() && self.phase != Phase::Frozen {
                    self.phase = Phase::Closed;
                }
                Ok(ActionOutcome::Continue)
            }
            Phase::Betting(_) => {
                info!(
                    "room {}: player {} left mid-hand, treating as disconnect",
                    self.id, self.players[seat].name
                );
                self.pending_leave.push(player);
                if !self.players[seat].status.in_hand() {
                    return Ok(ActionOutcome::Continue);
                }
                self.players[seat].status = PlayerStatus::Disconnected;
                let outcome = self.resolve_disconnected()?;
                self.verify_conservation()?;
                Ok(outcome)
            }
        }
    }

    fn release_seat(&mut self, seat: SeatIndex) {
        self.players.remove(seat);
        if self.dealer_seat > seat {
            self.dealer_seat -= 1;
        } else if self.dealer_seat >= self.players.len() {
            self.dealer_seat = 0;
        }
        if self.players.iter().all(|p| p.id != self.host)
            && let Some(first) = self.players.first()
        {
            // Host left: host duties pass to the longest-seated player.
            self.host = first.id;
        }
    }

    /// Host-triggered hand start from the lobby.
    pub fn start_hand(&mut self, requester: PlayerId) -> Result<ActionOutcome, RoomError> {
        self.reject_if_unavailable()?;
        if requester != self.host {
            return Err(ValidationError::NotHost.into());
        }
        if self.phase != Phase::Lobby {
            return Err(ValidationError::HandInProgress.into());
        }
        self.begin_hand()
    }

    /// Start the next hand without a host check; driven by the payout
    /// auto-advance timer. Falls back to the lobby when fewer than two
    /// players can fund a hand.
    pub fn advance_from_payout(&mut self) -> Result<ActionOutcome, RoomError> {
        if self.phase != Phase::Payout {
            return Ok(ActionOutcome::Continue);
        }
        self.phase = Phase::Lobby;
        match self.begin_hand() {
            Err(RoomError::Validation(ValidationError::NotEnoughPlayers)) => {
                Ok(ActionOutcome::Continue)
            }
            other => other,
        }
    }

    /// Seat queued joiners and release queued leavers at a hand boundary.
    fn absorb_pending(&mut self) {
        for player in std::mem::take(&mut self.pending_leave) {
            if let Ok(seat) = self.seat_of(player) {
                self.release_seat(seat);
            }
        }
        while let Some((player, name)) = self.pending_join.pop_front() {
            let stack = self.settings.starting_stack;
            self.players.push(Player::new(player, name, stack));
        }
        if self.players.is_empty() {
            self.phase = Phase::Closed;
        }
    }

    fn begin_hand(&mut self) -> Result<ActionOutcome, RoomError> {
        self.absorb_pending();
        for player in &mut self.players {
            player.reset_for_hand();
        }
        let active = self.active_seats();
        if active.len() < MIN_PLAYERS {
            return Err(ValidationError::NotEnoughPlayers.into());
        }

        self.hand_no += 1;
        self.hand_start_total = self.players.iter().map(|p| p.stack).sum();
        self.board.clear();
        self.last_payouts.clear();
        let mut deck = Deck::shuffled();

        // Rotate the button to the next active seat.
        self.dealer_seat = self.next_active_seat(self.dealer_seat + 1);

        // Heads-up the dealer posts the small blind and acts first preflop;
        // otherwise blinds sit left of the dealer and preflop action starts
        // after the big blind.
        let (sb_seat, bb_seat) = if active.len() == 2 {
            (self.dealer_seat, self.next_active_seat(self.dealer_seat + 1))
        } else {
            let sb = self.next_active_seat(self.dealer_seat + 1);
            (sb, self.next_active_seat(sb + 1))
        };
        // Fix the dealing order before the blinds go in; a blind that
        // consumes a whole stack flips that player all-in, and they are
        // still dealt a hand.
        let deal_order: Vec<SeatIndex> = active
            .iter()
            .copied()
            .filter(|&seat| seat > self.dealer_seat)
            .chain(active.iter().copied().filter(|&seat| seat <= self.dealer_seat))
            .collect();

        self.players[sb_seat].commit(self.settings.small_blind);
        self.players[bb_seat].commit(self.settings.big_blind);
        let first_to_act = self.next_active_seat(bb_seat + 1);

        // Two passes, as dealt at a live table.
        for _ in 0..2 {
            for &seat in &deal_order {
                let card = match deck.draw() {
                    Ok(card) => card,
                    Err(e) => return Err(self.freeze(e).into()),
                };
                self.players[seat].hole_cards.push(card);
            }
        }
        self.deck = Some(deck);

        let round = BettingRound::open(
            Street::Preflop,
            &self.players,
            first_to_act,
            self.settings.big_blind,
            self.settings.big_blind,
            Some(bb_seat),
        );
        self.phase = Phase::Betting(Street::Preflop);
        self.round = Some(round);
        info!(
            "room {}: hand {} started, dealer seat {}",
            self.id, self.hand_no, self.dealer_seat
        );

        // Blinds can put players all-in before anyone acts.
        let outcome = if self.round_complete() {
            self.on_round_complete()?
        } else {
            self.resolve_disconnected()?
        };
        self.verify_conservation()?;
        Ok(outcome)
    }

    /// Validate and apply one player action, then drive any resulting street
    /// or hand transitions.
    pub fn apply_action(
        &mut self,
        player: PlayerId,
        action: Action,
    ) -> Result<ActionOutcome, RoomError> {
        self.reject_if_unavailable()?;
        if !matches!(self.phase, Phase::Betting(_)) {
            return Err(ValidationError::InvalidPhase.into());
        }
        let seat = self.seat_of(player)?;
        let round = self.round.as_mut().ok_or(ValidationError::InvalidPhase)?;
        let status = round.apply(&mut self.players, seat, action)?;
        info!("room {}: seat {seat} {action:?}", self.id);
        let outcome = self.handle_round_status(status)?;
        self.verify_conservation()?;
        Ok(outcome)
    }

    /// Apply the timeout auto-action for the acting player: check when the
    /// bet is matched, fold otherwise.
    pub fn apply_timeout_action(&mut self) -> Result<ActionOutcome, RoomError> {
        if !matches!(self.phase, Phase::Betting(_)) {
            return Ok(ActionOutcome::Continue);
        }
        let Some(round) = self.round.as_mut() else {
            return Ok(ActionOutcome::Continue);
        };
        let Some(seat) = round.acting_seat() else {
            return Ok(ActionOutcome::Continue);
        };
        let action = if round.can_check(&self.players, seat) {
            Action::Check
        } else {
            Action::Fold
        };
        info!("room {}: seat {seat} timed out, auto {action:?}", self.id);
        let status = round.apply(&mut self.players, seat, action)?;
        let outcome = self.handle_round_status(status)?;
        self.verify_conservation()?;
        Ok(outcome)
    }

    fn handle_round_status(&mut self, status: RoundStatus) -> Result<ActionOutcome, RoomError> {
        match status {
            RoundStatus::InProgress(_) => self.resolve_disconnected(),
            RoundStatus::Complete => self.on_round_complete(),
            RoundStatus::FoldOut(winner) => {
                Ok(ActionOutcome::HandSettled(self.settle_fold_out(winner)))
            }
        }
    }

    /// Fold disconnected players the moment action reaches them.
    fn resolve_disconnected(&mut self) -> Result<ActionOutcome, RoomError> {
        loop {
            let Some(round) = self.round.as_mut() else {
                return Ok(ActionOutcome::Continue);
            };
            let Some(seat) = round.acting_seat() else {
                return Ok(ActionOutcome::Continue);
            };
            if self.players[seat].status != PlayerStatus::Disconnected {
                return Ok(ActionOutcome::Continue);
            }
            info!("room {}: auto-folding disconnected seat {seat}", self.id);
            let status = round.apply(&mut self.players, seat, Action::Fold)?;
            match status {
                RoundStatus::InProgress(_) => {}
                RoundStatus::Complete => return self.on_round_complete(),
                RoundStatus::FoldOut(winner) => {
                    return Ok(ActionOutcome::HandSettled(self.settle_fold_out(winner)));
                }
            }
        }
    }

    fn round_complete(&self) -> bool {
        self.round
            .as_ref()
            .is_some_and(|r| r.phase() == RoundPhase::RoundComplete)
    }

    /// Advance streets until someone can act again or the hand reaches
    /// showdown. Covers the all-in run-out, where every remaining betting
    /// round completes immediately.
    fn on_round_complete(&mut self) -> Result<ActionOutcome, RoomError> {
        loop {
            let street = self
                .round
                .as_ref()
                .ok_or(ValidationError::InvalidPhase)?
                .street();
            let Some(next) = street.next() else {
                return Ok(ActionOutcome::HandSettled(self.showdown()?));
            };
            for _ in 0..next.reveal_count() {
                let drawn = self
                    .deck
                    .as_mut()
                    .ok_or(ValidationError::InvalidPhase)?
                    .draw();
                let card = match drawn {
                    Ok(card) => card,
                    Err(e) => return Err(self.freeze(e).into()),
                };
                self.board.push(card);
            }
            for player in &mut self.players {
                player.street_committed = 0;
            }
            let first = self.next_active_seat(self.dealer_seat + 1);
            let round =
                BettingRound::open(next, &self.players, first, 0, self.settings.big_blind, None);
            self.phase = Phase::Betting(next);
            self.round = Some(round);
            info!("room {}: dealt {next:?}, board now {} cards", self.id, self.board.len());
            if self.round_complete() {
                continue;
            }
            return self.resolve_disconnected();
        }
    }

    /// Compare hands pot by pot and move every chip to its winner.
    fn showdown(&mut self) -> Result<Vec<Payout>, RoomError> {
        let mut hands: BTreeMap<SeatIndex, HandValue> = BTreeMap::new();
        for (seat, player) in self.players.iter_mut().enumerate() {
            if player.status.in_hand() {
                player.revealed = true;
                let mut cards = player.hole_cards.clone();
                cards.extend(self.board.iter().copied());
                hands.insert(seat, evaluate(&cards));
            }
        }
        let priority = self.priority_order();
        let breakdown = pots::build_pots(&self.contributions());
        let winnings = match pots::settle(&breakdown.pots, &hands, &priority) {
            Ok(winnings) => winnings,
            Err(e) => return Err(self.freeze(e).into()),
        };
        Ok(self.collect_hand(breakdown.refunds, winnings))
    }

    /// Everyone but one player folded: the survivor takes every pot without
    /// a comparison and, by default, without showing their cards.
    fn settle_fold_out(&mut self, winner: SeatIndex) -> Vec<Payout> {
        if self.settings.reveal_on_fold_out {
            self.players[winner].revealed = true;
        }
        let breakdown = pots::build_pots(&self.contributions());
        let total: Chips = breakdown.pots.iter().map(|p| p.amount).sum();
        let mut winnings: BTreeMap<SeatIndex, Chips> = BTreeMap::new();
        if total > 0 {
            winnings.insert(winner, total);
        }
        self.collect_hand(breakdown.refunds, winnings)
    }

    /// Zero the commitments, pay refunds and winnings, and enter Payout.
    fn collect_hand(
        &mut self,
        refunds: Vec<(SeatIndex, Chips)>,
        winnings: BTreeMap<SeatIndex, Chips>,
    ) -> Vec<Payout> {
        for player in &mut self.players {
            player.street_committed = 0;
            player.hand_committed = 0;
        }
        for (seat, amount) in refunds {
            self.players[seat].stack += amount;
        }
        let mut payouts = Vec::with_capacity(winnings.len());
        for (seat, amount) in winnings {
            self.players[seat].stack += amount;
            payouts.push(Payout {
                player: self.players[seat].id,
                seat,
                amount,
            });
            info!("room {}: seat {seat} wins {amount}", self.id);
        }
        self.deck = None;
        self.round = None;
        self.phase = Phase::Payout;
        self.last_payouts = payouts.clone();
        payouts
    }

    fn contributions(&self) -> Vec<Contribution> {
        self.players
            .iter()
            .enumerate()
            .map(|(seat, p)| Contribution {
                seat,
                committed: p.hand_committed,
                folded: !p.status.in_hand(),
            })
            .collect()
    }

    /// Seats in acting order, first seat left of the dealer first. Decides
    /// which tied winner receives an odd remainder chip.
    fn priority_order(&self) -> Vec<SeatIndex> {
        let n = self.players.len();
        (1..=n).map(|offset| (self.dealer_seat + offset) % n).collect()
    }

    fn active_seats(&self) -> Vec<SeatIndex> {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.status == PlayerStatus::Active)
            .map(|(seat, _)| seat)
            .collect()
    }

    /// Next seat at or after `start` (wrapping) holding an active player.
    fn next_active_seat(&self, start: SeatIndex) -> SeatIndex {
        let n = self.players.len();
        (0..n)
            .map(|offset| (start + offset) % n)
            .find(|&seat| self.players[seat].status == PlayerStatus::Active)
            .unwrap_or(start % n.max(1))
    }

    /// No chip may be created or destroyed within a hand: stacks plus
    /// committed-but-unsettled chips must always equal the hand-start total.
    fn verify_conservation(&mut self) -> Result<(), RoomError> {
        if !matches!(self.phase, Phase::Betting(_) | Phase::Payout) {
            return Ok(());
        }
        let actual: Chips = self
            .players
            .iter()
            .map(|p| p.stack + p.hand_committed)
            .sum();
        if actual != self.hand_start_total {
            let violation = InvariantViolation::ChipConservation {
                expected: self.hand_start_total,
                actual,
            };
            return Err(self.freeze(violation).into());
        }
        Ok(())
    }

    /// Freeze the room and surface the defect to operators.
    fn freeze(&mut self, violation: InvariantViolation) -> InvariantViolation {
        error!("room {}: {violation}, freezing room", self.id);
        self.phase = Phase::Frozen;
        violation
    }

    pub fn close(&mut self) {
        self.phase = Phase::Closed;
    }

    /// Build the immutable view broadcast to `observer`. Hole cards are
    /// exposed only to their owner until a showdown reveal.
    #[must_use]
    pub fn snapshot_for(&self, observer: Option<PlayerId>) -> RoomSnapshot {
        let players = self
            .players
            .iter()
            .enumerate()
            .map(|(seat, p)| {
                let visible = p.revealed || observer == Some(p.id);
                PlayerView {
                    id: p.id,
                    name: p.name.clone(),
                    seat,
                    stack: p.stack,
                    street_committed: p.street_committed,
                    hand_committed: p.hand_committed,
                    status: p.status,
                    hole_cards: if visible && !p.hole_cards.is_empty() {
                        Some(p.hole_cards.clone())
                    } else {
                        None
                    },
                }
            })
            .collect();
        let street = match self.phase {
            Phase::Betting(street) => Some(street),
            _ => None,
        };
        RoomSnapshot {
            room_id: self.id,
            hand_no: self.hand_no,
            phase: self.phase.label().to_string(),
            street,
            blinds: Blinds {
                small: self.settings.small_blind,
                big: self.settings.big_blind,
            },
            dealer_seat: self.dealer_seat,
            acting_seat: self.round.as_ref().and_then(|r| r.acting_seat()),
            min_raise: self.round.as_ref().map(|r| r.min_raise()),
            board: self.board.clone(),
            pot_total: self.players.iter().map(|p| p.hand_committed).sum(),
            players,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn room_with(n: usize) -> (RoomState, Vec<PlayerId>) {
        let ids: Vec<PlayerId> = (0..n).map(|_| Uuid::new_v4()).collect();
        let mut room = RoomState::new(
            Uuid::new_v4(),
            GameSettings::default(),
            ids[0],
            DisplayName::from("player_0"),
        );
        for (i, id) in ids.iter().enumerate().skip(1) {
            room.seat_player(*id, DisplayName::from(format!("player_{i}").as_str()))
                .unwrap();
        }
        (room, ids)
    }

    fn acting_id(room: &RoomState) -> PlayerId {
        room.acting_player().unwrap()
    }

    fn total_chips(room: &RoomState) -> Chips {
        room.snapshot_for(None)
            .players
            .iter()
            .map(|p| p.stack + p.hand_committed)
            .sum()
    }

    #[test]
    fn test_start_hand_requires_host() {
        let (mut room, ids) = room_with(3);
        let err = room.start_hand(ids[1]).unwrap_err();
        assert_eq!(err, RoomError::Validation(ValidationError::NotHost));
        room.start_hand(ids[0]).unwrap();
        assert!(matches!(room.phase(), Phase::Betting(Street::Preflop)));
    }

    #[test]
    fn test_start_hand_requires_two_players() {
        let (mut room, ids) = room_with(1);
        let err = room.start_hand(ids[0]).unwrap_err();
        assert_eq!(
            err,
            RoomError::Validation(ValidationError::NotEnoughPlayers)
        );
        assert_eq!(room.phase(), Phase::Lobby);
    }

    #[test]
    fn test_blinds_and_first_actor_three_handed() {
        let (mut room, _) = room_with(3);
        room.start_hand(room.host()).unwrap();
        let snapshot = room.snapshot_for(None);
        // Button rotates from seat 0 to seat 1 on the first deal, so the
        // blinds sit on seats 2 and 0 and the button acts first preflop.
        assert_eq!(snapshot.dealer_seat, 1);
        assert_eq!(snapshot.players[2].street_committed, 5);
        assert_eq!(snapshot.players[0].street_committed, 10);
        assert_eq!(snapshot.acting_seat, Some(1));
        assert_eq!(snapshot.pot_total, 15);
        assert!(
            snapshot
                .players
                .iter()
                .all(|p| p.status == PlayerStatus::Active)
        );
    }

    #[test]
    fn test_heads_up_dealer_posts_small_blind_and_acts_first() {
        let (mut room, _) = room_with(2);
        room.start_hand(room.host()).unwrap();
        let snapshot = room.snapshot_for(None);
        assert_eq!(snapshot.dealer_seat, 1);
        assert_eq!(snapshot.players[1].street_committed, 5);
        assert_eq!(snapshot.players[0].street_committed, 10);
        assert_eq!(snapshot.acting_seat, Some(1));
    }

    #[test]
    fn test_blind_all_in_player_is_still_dealt_hole_cards() {
        // A big blind equal to the whole stack flips seat 0 all-in before
        // the deal; they keep a two-card hand all the same.
        let settings = GameSettings {
            small_blind: 5,
            big_blind: 10,
            starting_stack: 10,
            ..GameSettings::default()
        };
        let ids: Vec<PlayerId> = (0..2).map(|_| Uuid::new_v4()).collect();
        let mut room = RoomState::new(
            Uuid::new_v4(),
            settings,
            ids[0],
            DisplayName::from("player_0"),
        );
        room.seat_player(ids[1], DisplayName::from("player_1"))
            .unwrap();
        room.start_hand(ids[0]).unwrap();

        let snapshot = room.snapshot_for(None);
        assert_eq!(snapshot.players[0].status, PlayerStatus::AllIn);
        for id in &ids {
            let own = room.snapshot_for(Some(*id));
            let me = own.players.iter().find(|p| p.id == *id).unwrap();
            assert_eq!(me.hole_cards.as_ref().map(Vec::len), Some(2));
        }
    }

    #[test]
    fn test_hole_cards_masked_from_other_players() {
        let (mut room, ids) = room_with(2);
        room.start_hand(room.host()).unwrap();
        let mine = room.snapshot_for(Some(ids[0]));
        assert_eq!(mine.players[0].hole_cards.as_ref().map(Vec::len), Some(2));
        assert!(mine.players[1].hole_cards.is_none());
        let observer = room.snapshot_for(None);
        assert!(observer.players.iter().all(|p| p.hole_cards.is_none()));
    }

    #[test]
    fn test_fold_out_awards_pot_without_reveal() {
        let (mut room, _) = room_with(2);
        room.start_hand(room.host()).unwrap();
        // Dealer/small blind folds preflop; big blind collects the blinds.
        let outcome = room.apply_action(acting_id(&room), Action::Fold).unwrap();
        match outcome {
            ActionOutcome::HandSettled(payouts) => {
                // The big blind wins the 10-chip matched pot; their own
                // uncalled 5 comes back as a refund, not a payout.
                assert_eq!(payouts.len(), 1);
                assert_eq!(payouts[0].seat, 0);
                assert_eq!(payouts[0].amount, 10);
            }
            ActionOutcome::Continue => panic!("hand should settle on fold-out"),
        }
        assert_eq!(room.phase(), Phase::Payout);
        let snapshot = room.snapshot_for(None);
        assert!(snapshot.players.iter().all(|p| p.hole_cards.is_none()));
        assert_eq!(snapshot.players[0].stack, 1005);
        assert_eq!(snapshot.players[1].stack, 995);
    }

    #[test]
    fn test_checked_down_hand_reaches_showdown() {
        let (mut room, _) = room_with(2);
        room.start_hand(room.host()).unwrap();
        room.apply_action(acting_id(&room), Action::Call).unwrap();
        let mut settled = None;
        // Check through: one check closes preflop, two per later street.
        for _ in 0..7 {
            let outcome = room.apply_action(acting_id(&room), Action::Check).unwrap();
            if let ActionOutcome::HandSettled(payouts) = outcome {
                settled = Some(payouts);
                break;
            }
        }
        let payouts = settled.unwrap();
        let total: Chips = payouts.iter().map(|p| p.amount).sum();
        assert_eq!(total, 20);
        assert_eq!(room.phase(), Phase::Payout);
        assert_eq!(room.snapshot_for(None).board.len(), 5);
        assert_eq!(total_chips(&room), 2000);
        // Showdown reveals both hands.
        assert!(
            room.snapshot_for(None)
                .players
                .iter()
                .all(|p| p.hole_cards.is_some())
        );
    }

    #[test]
    fn test_out_of_turn_action_rejected() {
        let (mut room, ids) = room_with(3);
        room.start_hand(room.host()).unwrap();
        let acting = acting_id(&room);
        let bystander = *ids.iter().find(|id| **id != acting).unwrap();
        let err = room.apply_action(bystander, Action::Call).unwrap_err();
        assert_eq!(err, RoomError::Validation(ValidationError::NotYourTurn));
    }

    #[test]
    fn test_join_mid_hand_is_queued_until_next_hand() {
        let (mut room, _) = room_with(2);
        room.start_hand(room.host()).unwrap();
        let late = Uuid::new_v4();
        let outcome = room
            .seat_player(late, DisplayName::from("late_joiner"))
            .unwrap();
        assert_eq!(outcome, JoinOutcome::Queued);
        assert_eq!(room.snapshot_for(None).players.len(), 2);

        room.apply_action(acting_id(&room), Action::Fold).unwrap();
        room.advance_from_payout().unwrap();
        let snapshot = room.snapshot_for(None);
        assert_eq!(snapshot.players.len(), 3);
        assert!(snapshot.players.iter().any(|p| p.id == late));
    }

    #[test]
    fn test_leave_mid_hand_folds_on_their_turn_and_frees_seat_later() {
        let (mut room, _) = room_with(3);
        room.start_hand(room.host()).unwrap();
        let leaver = acting_id(&room);
        let outcome = room.remove_player(leaver).unwrap();
        // Two players remain in the hand, so play continues.
        assert_eq!(outcome, ActionOutcome::Continue);
        assert!(matches!(room.phase(), Phase::Betting(_)));
        assert_eq!(room.snapshot_for(None).players.len(), 3);

        // Settle the hand; the seat is released at the boundary.
        room.apply_action(acting_id(&room), Action::Fold).unwrap();
        room.advance_from_payout().unwrap();
        assert_eq!(room.snapshot_for(None).players.len(), 2);
        assert!(room.seated_ids().iter().all(|id| *id != leaver));
    }

    #[test]
    fn test_timeout_checks_when_possible_folds_otherwise() {
        let (mut room, _) = room_with(2);
        room.start_hand(room.host()).unwrap();
        // Small blind owes chips, so the auto-action folds and the hand ends.
        let outcome = room.apply_timeout_action().unwrap();
        assert!(matches!(outcome, ActionOutcome::HandSettled(_)));
    }

    #[test]
    fn test_all_in_preflop_runs_out_the_board() {
        let (mut room, _) = room_with(2);
        room.start_hand(room.host()).unwrap();
        room.apply_action(acting_id(&room), Action::Raise(1000))
            .unwrap();
        let outcome = room.apply_action(acting_id(&room), Action::Call).unwrap();
        assert!(matches!(outcome, ActionOutcome::HandSettled(_)));
        assert_eq!(room.snapshot_for(None).board.len(), 5);
        assert_eq!(total_chips(&room), 2000);
    }

    #[test]
    fn test_room_closes_when_everyone_leaves() {
        let (mut room, ids) = room_with(2);
        room.remove_player(ids[1]).unwrap();
        room.remove_player(ids[0]).unwrap();
        assert_eq!(room.phase(), Phase::Closed);
        let late = Uuid::new_v4();
        let err = room
            .seat_player(late, DisplayName::from("too_late"))
            .unwrap_err();
        assert_eq!(err, ValidationError::RoomClosed);
    }

    #[test]
    fn test_settings_validation() {
        let mut bad = GameSettings::default();
        bad.big_blind = bad.small_blind;
        assert!(bad.validate().is_err());
        let mut short = GameSettings::default();
        short.starting_stack = 5;
        assert!(short.validate().is_err());
        assert!(GameSettings::default().validate().is_ok());
    }
}
