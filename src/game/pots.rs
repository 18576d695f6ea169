//! Pot decomposition and settlement.
//!
//! At showdown (or fold-out) the per-player total-hand commitments are
//! converted into a main pot plus side pots by slicing the commitments at
//! each distinct all-in threshold. A tier with a single contributor is an
//! uncalled bet and is refunded rather than contested.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::entities::{Chips, SeatIndex};
use super::errors::InvariantViolation;
use super::eval::HandValue;

/// One committed stake going into pot decomposition.
#[derive(Clone, Copy, Debug)]
pub struct Contribution {
    pub seat: SeatIndex,
    pub committed: Chips,
    pub folded: bool,
}

/// A single pot with the set of seats that may win it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Pot {
    pub amount: Chips,
    pub eligible: Vec<SeatIndex>,
}

/// Result of slicing commitments into pots.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PotBreakdown {
    pub pots: Vec<Pot>,
    /// Uncalled portions returned to their owners before any comparison.
    pub refunds: Vec<(SeatIndex, Chips)>,
}

impl PotBreakdown {
    #[must_use]
    pub fn total(&self) -> Chips {
        let potted: Chips = self.pots.iter().map(|p| p.amount).sum();
        let refunded: Chips = self.refunds.iter().map(|(_, c)| c).sum();
        potted + refunded
    }
}

/// Slice per-seat commitments into main and side pots.
///
/// Distinct non-zero commitment levels, ascending, define the tiers. Each
/// tier's pot holds `(tier - previous tier) * contributors_at_tier` chips and
/// is winnable by the non-folded contributors at that tier.
#[must_use]
pub fn build_pots(contributions: &[Contribution]) -> PotBreakdown {
    let mut tiers: Vec<Chips> = contributions
        .iter()
        .filter(|c| c.committed > 0)
        .map(|c| c.committed)
        .collect();
    tiers.sort_unstable();
    tiers.dedup();

    let mut breakdown = PotBreakdown::default();
    let mut prev = 0;
    for tier in tiers {
        let contributors: Vec<&Contribution> = contributions
            .iter()
            .filter(|c| c.committed >= tier)
            .collect();
        let amount = (tier - prev) * contributors.len() as Chips;
        if contributors.len() == 1 {
            // Nobody matched this slice; it goes back to its owner.
            breakdown.refunds.push((contributors[0].seat, amount));
        } else {
            let eligible: Vec<SeatIndex> = contributors
                .iter()
                .filter(|c| !c.folded)
                .map(|c| c.seat)
                .collect();
            match breakdown.pots.last_mut() {
                // Every contributor at this tier folded; the slice rolls
                // into the pot below instead of standing uncontested.
                Some(last) if eligible.is_empty() => last.amount += amount,
                _ => breakdown.pots.push(Pot { amount, eligible }),
            }
        }
        prev = tier;
    }
    breakdown
}

/// Distribute every pot among the winners of that pot.
///
/// `hands` maps each seat still contesting the hand to its evaluated value;
/// `priority` lists seats in acting order (first active seat left of the
/// dealer first) and decides which tied winner receives the odd remainder
/// chip after an even split.
pub fn settle(
    pots: &[Pot],
    hands: &BTreeMap<SeatIndex, HandValue>,
    priority: &[SeatIndex],
) -> Result<BTreeMap<SeatIndex, Chips>, InvariantViolation> {
    let mut winnings: BTreeMap<SeatIndex, Chips> = BTreeMap::new();
    for pot in pots {
        let best = pot
            .eligible
            .iter()
            .filter_map(|seat| hands.get(seat))
            .max()
            .ok_or(InvariantViolation::NoEligiblePlayers)?;
        // Winners in priority order so the remainder assignment is
        // deterministic and documented: earliest-acting winner gets it.
        let winners: Vec<SeatIndex> = priority
            .iter()
            .copied()
            .filter(|seat| pot.eligible.contains(seat) && hands.get(seat) == Some(best))
            .collect();
        if winners.is_empty() {
            return Err(InvariantViolation::NoEligiblePlayers);
        }
        let share = pot.amount / winners.len() as Chips;
        let mut remainder = pot.amount % winners.len() as Chips;
        for seat in winners {
            let mut amount = share;
            if remainder > 0 {
                amount += 1;
                remainder -= 1;
            }
            *winnings.entry(seat).or_default() += amount;
        }
    }
    Ok(winnings)
}
