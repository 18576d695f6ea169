//! Per-street betting round engine.
//!
//! A [`BettingRound`] validates and applies exactly one player action at a
//! time against the current street state, mutating player stacks and
//! commitments, and reports when the round has closed. Turn order is seat
//! order; the round is complete when no player who can still act owes an
//! action, which is the set-based equivalent of "action wrapped back to the
//! last aggressor".

use std::collections::BTreeSet;

use super::entities::{Action, Chips, Player, PlayerStatus, SeatIndex, Street};
use super::errors::ValidationError;

/// Observable state of a betting round.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoundPhase {
    WaitingForAction(SeatIndex),
    RoundComplete,
}

/// Outcome of applying one action.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoundStatus {
    /// Action passed to the given seat.
    InProgress(SeatIndex),
    /// Betting for this street has closed with 2+ players still in the hand.
    Complete,
    /// Everyone else folded; the hand ends immediately in this seat's favor.
    FoldOut(SeatIndex),
}

#[derive(Debug)]
pub struct BettingRound {
    street: Street,
    acting: Option<SeatIndex>,
    /// Street commitment level every in-hand player must match.
    street_bet: Chips,
    /// Smallest delta by which the next raise must exceed `street_bet`.
    min_raise: Chips,
    /// Seats that still owe an action this round.
    to_act: BTreeSet<SeatIndex>,
    /// Seats facing a short all-in that did not re-open betting: they may
    /// call or fold but not raise.
    no_raise: BTreeSet<SeatIndex>,
    last_aggressor: Option<SeatIndex>,
}

impl BettingRound {
    /// Open a betting round. `first_to_act` is the preferred first seat;
    /// action starts at the first seat from there (in seat order) that can
    /// act. `street_bet` is non-zero only preflop, where blinds are already
    /// committed and the big blind seat retains its option.
    pub fn open(
        street: Street,
        players: &[Player],
        first_to_act: SeatIndex,
        street_bet: Chips,
        big_blind: Chips,
        last_aggressor: Option<SeatIndex>,
    ) -> Self {
        let mut to_act: BTreeSet<SeatIndex> = players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.status == PlayerStatus::Active || p.status == PlayerStatus::Disconnected)
            .map(|(seat, _)| seat)
            .collect();
        // With a single player able to act, betting is only meaningful if
        // that player still owes chips against an all-in.
        if to_act.len() == 1 {
            to_act.retain(|&seat| players[seat].street_committed < street_bet);
        }
        let mut round = Self {
            street,
            acting: None,
            street_bet,
            min_raise: big_blind,
            to_act,
            no_raise: BTreeSet::new(),
            last_aggressor,
        };
        round.acting = round.next_seat_from(players.len(), first_to_act);
        round
    }

    #[must_use]
    pub fn phase(&self) -> RoundPhase {
        match self.acting {
            Some(seat) => RoundPhase::WaitingForAction(seat),
            None => RoundPhase::RoundComplete,
        }
    }

    #[must_use]
    pub fn acting_seat(&self) -> Option<SeatIndex> {
        self.acting
    }

    #[must_use]
    pub fn street(&self) -> Street {
        self.street
    }

    #[must_use]
    pub fn street_bet(&self) -> Chips {
        self.street_bet
    }

    #[must_use]
    pub fn min_raise(&self) -> Chips {
        self.min_raise
    }

    #[must_use]
    pub fn last_aggressor(&self) -> Option<SeatIndex> {
        self.last_aggressor
    }

    /// Whether `seat` could legally check right now.
    #[must_use]
    pub fn can_check(&self, players: &[Player], seat: SeatIndex) -> bool {
        players
            .get(seat)
            .is_some_and(|p| p.street_committed >= self.street_bet)
    }

    /// Validate and apply one action for `seat`. On error the round and all
    /// players are left untouched.
    pub fn apply(
        &mut self,
        players: &mut [Player],
        seat: SeatIndex,
        action: Action,
    ) -> Result<RoundStatus, ValidationError> {
        if self.acting != Some(seat) {
            return Err(ValidationError::NotYourTurn);
        }
        let status = players[seat].status;
        match action {
            Action::Fold => {
                // Disconnected players are folded on their turn, by the room
                // acting on their behalf.
                if status != PlayerStatus::Active && status != PlayerStatus::Disconnected {
                    return Err(ValidationError::InvalidAction(format!(
                        "cannot fold while {status:?}"
                    )));
                }
                players[seat].status = PlayerStatus::Folded;
                self.to_act.remove(&seat);
            }
            Action::Check => {
                self.require_active(players, seat)?;
                if players[seat].street_committed < self.street_bet {
                    return Err(ValidationError::InvalidAction(
                        "cannot check facing an unmatched bet".into(),
                    ));
                }
                self.to_act.remove(&seat);
            }
            Action::Call => {
                self.require_active(players, seat)?;
                let owed = self.street_bet - players[seat].street_committed.min(self.street_bet);
                // A short stack calls with everything it has left.
                players[seat].commit(owed);
                self.to_act.remove(&seat);
            }
            Action::Bet(to) => {
                self.require_active(players, seat)?;
                if self.street_bet > 0 {
                    return Err(ValidationError::InvalidAction(
                        "a bet is already outstanding; raise instead".into(),
                    ));
                }
                self.place_raise(players, seat, to)?;
            }
            Action::Raise(to) => {
                self.require_active(players, seat)?;
                if self.street_bet == 0 {
                    return Err(ValidationError::InvalidAction(
                        "nothing to raise; bet instead".into(),
                    ));
                }
                self.place_raise(players, seat, to)?;
            }
        }

        let in_hand: Vec<SeatIndex> = players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.status.in_hand())
            .map(|(s, _)| s)
            .collect();
        if let [winner] = in_hand.as_slice() {
            self.acting = None;
            return Ok(RoundStatus::FoldOut(*winner));
        }

        self.acting = self.next_seat_from(players.len(), (seat + 1) % players.len());
        match self.acting {
            Some(next) => Ok(RoundStatus::InProgress(next)),
            None => Ok(RoundStatus::Complete),
        }
    }

    fn require_active(&self, players: &[Player], seat: SeatIndex) -> Result<(), ValidationError> {
        let status = players[seat].status;
        if status != PlayerStatus::Active {
            return Err(ValidationError::InvalidAction(format!(
                "cannot act while {status:?}"
            )));
        }
        Ok(())
    }

    /// Shared validation and bookkeeping for bet/raise to `to`.
    fn place_raise(
        &mut self,
        players: &mut [Player],
        seat: SeatIndex,
        to: Chips,
    ) -> Result<(), ValidationError> {
        if self.no_raise.contains(&seat) {
            return Err(ValidationError::InvalidAction(
                "betting was not re-opened by the short all-in".into(),
            ));
        }
        let player = &players[seat];
        if to <= self.street_bet {
            return Err(ValidationError::InvalidAction(format!(
                "must exceed the outstanding bet of {}",
                self.street_bet
            )));
        }
        let needed = to - player.street_committed.min(to);
        if needed == 0 || needed > player.stack {
            return Err(ValidationError::InvalidAction(
                "amount exceeds remaining stack".into(),
            ));
        }
        let all_in = needed == player.stack;
        let full_raise = to >= self.street_bet + self.min_raise;
        if !full_raise && !all_in {
            return Err(ValidationError::InvalidAction(format!(
                "raise must be at least {} or all-in",
                self.street_bet + self.min_raise
            )));
        }

        players[seat].commit(needed);
        if full_raise {
            self.min_raise = to - self.street_bet;
            self.no_raise.clear();
            self.last_aggressor = Some(seat);
            for (i, p) in players.iter().enumerate() {
                if i != seat
                    && (p.status == PlayerStatus::Active
                        || p.status == PlayerStatus::Disconnected)
                {
                    self.to_act.insert(i);
                }
            }
        } else {
            // All-in for less than a full raise: players who had already
            // settled their action must respond to the new amount, but it
            // does not re-open raising for them. Disconnected seats owe a
            // response too, which folds them on their turn.
            for (i, p) in players.iter().enumerate() {
                if i != seat && !self.to_act.contains(&i) {
                    match p.status {
                        PlayerStatus::Active => {
                            self.to_act.insert(i);
                            self.no_raise.insert(i);
                        }
                        PlayerStatus::Disconnected => {
                            self.to_act.insert(i);
                        }
                        _ => {}
                    }
                }
            }
        }
        self.street_bet = to;
        self.to_act.remove(&seat);
        Ok(())
    }

    /// First seat in `to_act`, scanning circularly from `start`.
    fn next_seat_from(&self, num_seats: usize, start: SeatIndex) -> Option<SeatIndex> {
        if num_seats == 0 {
            return None;
        }
        (0..num_seats)
            .map(|offset| (start + offset) % num_seats)
            .find(|seat| self.to_act.contains(seat))
    }
}
