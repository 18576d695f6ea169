//! Hand evaluation: rank a 5-7 card set into a totally ordered value.
//!
//! Evaluation is a pure function of the card set. Seven-card inputs are
//! scored by exhausting every 5-card subset and keeping the best, so the
//! result never depends on deal order.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::entities::{Card, Rank};

/// Hand categories in ascending strength. Derived `Ord` gives the category
/// half of the total order.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum HandCategory {
    HighCard,
    Pair,
    TwoPair,
    Trips,
    Straight,
    Flush,
    FullHouse,
    Quads,
    StraightFlush,
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "high card",
            Self::Pair => "pair",
            Self::TwoPair => "two pair",
            Self::Trips => "three of a kind",
            Self::Straight => "straight",
            Self::Flush => "flush",
            Self::FullHouse => "full house",
            Self::Quads => "four of a kind",
            Self::StraightFlush => "straight flush",
        };
        write!(f, "{repr}")
    }
}

/// A comparable hand value: category first, then an ordered tiebreak key of
/// the ranks that decide same-category comparisons. Two values comparing
/// equal is a legitimate outcome (split pots).
#[derive(Clone, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HandValue {
    pub category: HandCategory,
    pub tiebreak: Vec<Rank>,
}

impl fmt::Display for HandValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category)
    }
}

/// Rank the best 5-card hand available in `cards`.
///
/// # Panics
///
/// Panics if fewer than 5 or more than 7 cards are supplied; callers always
/// evaluate 2 hole cards against a 3-5 card board.
#[must_use]
pub fn evaluate(cards: &[Card]) -> HandValue {
    assert!(
        (5..=7).contains(&cards.len()),
        "hand evaluation takes 5-7 cards, got {}",
        cards.len()
    );
    let n = cards.len();
    let mut best: Option<HandValue> = None;
    // At most C(7,5) = 21 subsets; brute force is cheap and obviously correct.
    for mask in 0u32..(1 << n) {
        if mask.count_ones() != 5 {
            continue;
        }
        let mut five = [cards[0]; 5];
        let mut k = 0;
        for (i, card) in cards.iter().enumerate() {
            if mask & (1 << i) != 0 {
                five[k] = *card;
                k += 1;
            }
        }
        let value = eval_five(five);
        if best.as_ref().is_none_or(|b| value > *b) {
            best = Some(value);
        }
    }
    // The mask loop always finds at least one 5-subset.
    best.unwrap_or(HandValue {
        category: HandCategory::HighCard,
        tiebreak: vec![],
    })
}

/// Score exactly five cards.
fn eval_five(mut cards: [Card; 5]) -> HandValue {
    cards.sort_by(|a, b| b.0.cmp(&a.0));
    let ranks: [Rank; 5] = [cards[0].0, cards[1].0, cards[2].0, cards[3].0, cards[4].0];
    let is_flush = cards.iter().all(|c| c.1 == cards[0].1);
    let straight_high = straight_high(&ranks);

    if let Some(high) = straight_high {
        return HandValue {
            category: if is_flush {
                HandCategory::StraightFlush
            } else {
                HandCategory::Straight
            },
            tiebreak: vec![high],
        };
    }

    // Group ranks into (count, rank) pairs, ordered by count then rank so
    // the tiebreak key falls straight out of the grouping.
    let mut groups: Vec<(u8, Rank)> = Vec::with_capacity(5);
    for &rank in &ranks {
        match groups.iter_mut().find(|(_, r)| *r == rank) {
            Some((count, _)) => *count += 1,
            None => groups.push((1, rank)),
        }
    }
    groups.sort_by(|a, b| b.cmp(a));

    let counts: Vec<u8> = groups.iter().map(|(c, _)| *c).collect();
    let category = match counts.as_slice() {
        [4, 1] => HandCategory::Quads,
        [3, 2] => HandCategory::FullHouse,
        [3, 1, 1] => HandCategory::Trips,
        [2, 2, 1] => HandCategory::TwoPair,
        [2, 1, 1, 1] => HandCategory::Pair,
        _ if is_flush => HandCategory::Flush,
        _ => HandCategory::HighCard,
    };
    let tiebreak = groups.into_iter().map(|(_, r)| r).collect();
    HandValue { category, tiebreak }
}

/// High card of a straight formed by `ranks` (sorted descending), if any.
/// The wheel (A-5-4-3-2) counts with the five high.
fn straight_high(ranks: &[Rank; 5]) -> Option<Rank> {
    if ranks.windows(2).all(|w| w[0] == w[1] + 1) {
        return Some(ranks[0]);
    }
    if *ranks == [14, 5, 4, 3, 2] {
        return Some(5);
    }
    None
}
