use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank};
use crate::draws::DrawFeatures;

/// Poker hand categories ordered strongest first, so the minimum of a set of
/// categories is the best hand among them.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum HandCategory {
    StraightFlush = 1,
    FourOfAKind = 2,
    FullHouse = 3,
    Flush = 4,
    Straight = 5,
    ThreeOfAKind = 6,
    TwoPair = 7,
    OnePair = 8,
    HighCard = 9,
}

impl HandCategory {
    /// Ordinal best-hand rank: 1 is a straight flush, 9 is high card.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            HandCategory::StraightFlush => "Straight Flush",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::FullHouse => "Full House",
            HandCategory::Flush => "Flush",
            HandCategory::Straight => "Straight",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::OnePair => "One Pair",
            HandCategory::HighCard => "High Card",
        }
    }
}

impl From<HandCategory> for u8 {
    fn from(c: HandCategory) -> Self {
        c.ordinal()
    }
}

impl TryFrom<u8> for HandCategory {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        let c = match v {
            1 => HandCategory::StraightFlush,
            2 => HandCategory::FourOfAKind,
            3 => HandCategory::FullHouse,
            4 => HandCategory::Flush,
            5 => HandCategory::Straight,
            6 => HandCategory::ThreeOfAKind,
            7 => HandCategory::TwoPair,
            8 => HandCategory::OnePair,
            9 => HandCategory::HighCard,
            _ => return Err(format!("invalid best hand rank {}", v)),
        };
        Ok(c)
    }
}

/// A set of rank values (2..=14, or 1 for the wheel straight), exposed
/// strongest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<u8>", from = "Vec<u8>")]
pub struct RankSet(BTreeSet<u8>);

impl RankSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(rank: u8) -> Self {
        let mut s = Self::new();
        s.insert(rank);
        s
    }

    pub fn insert(&mut self, rank: u8) {
        self.0.insert(rank);
    }

    pub fn contains(&self, rank: u8) -> bool {
        self.0.contains(&rank)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Highest value in the set.
    pub fn best(&self) -> Option<u8> {
        self.0.iter().next_back().copied()
    }

    pub fn union_with(&mut self, other: &RankSet) {
        self.0.extend(other.0.iter().copied());
    }

    /// Values sorted from strongest to weakest.
    pub fn descending(&self) -> Vec<u8> {
        self.0.iter().rev().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<u8>> for RankSet {
    fn from(v: Vec<u8>) -> Self {
        Self(v.into_iter().collect())
    }
}

impl From<RankSet> for Vec<u8> {
    fn from(s: RankSet) -> Self {
        s.descending()
    }
}

impl FromIterator<u8> for RankSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Made-hand classification of a 5-card hand.
///
/// Tie-break ranks are empty unless the matching flag is set. A two-pair hand
/// records both paired ranks in `pair_rank`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MadeHand {
    pub is_flush: bool,
    pub is_straight: bool,
    pub is_straight_flush: bool,
    pub is_pair: bool,
    pub is_two_pair: bool,
    pub is_trips: bool,
    pub is_quads: bool,
    pub is_full_house: bool,
    pub best_hand_rank: HandCategory,
    pub pair_rank: RankSet,
    pub set_rank: RankSet,
    pub flush_rank: RankSet,
    pub straight_rank: RankSet,
    pub full_house_pair_rank: RankSet,
}

/// Full per-hand classification: made hand plus draw potential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandFeatures {
    #[serde(flatten)]
    pub made: MadeHand,
    #[serde(flatten)]
    pub draws: DrawFeatures,
}

/// Classifies exactly five distinct cards.
pub fn classify_made(cards: &[Card; 5]) -> MadeHand {
    let mut rank_counts = [0u8; 15]; // 2..14 used
    for c in cards {
        rank_counts[rank_val(c.rank) as usize] += 1;
    }
    let first_suit = cards[0].suit;
    let is_flush = cards.iter().all(|c| c.suit == first_suit);

    let unique: Vec<u8> = (2..=14u8).filter(|&r| rank_counts[r as usize] > 0).collect();
    let straight_low = straight_low_rank(&unique);
    let is_straight = straight_low.is_some();
    let is_straight_flush = is_straight && is_flush;

    let ranks_with = |n: u8| -> RankSet {
        (2..=14u8)
            .filter(|&r| rank_counts[r as usize] == n)
            .collect()
    };
    let pairs = ranks_with(2);
    let trips = ranks_with(3);
    let is_pair = !pairs.is_empty();
    let is_trips = !trips.is_empty();
    let is_quads = !ranks_with(4).is_empty();
    let is_two_pair = is_pair && unique.len() == 3;
    let is_full_house = is_trips && is_pair;

    let best_hand_rank = if is_straight_flush {
        HandCategory::StraightFlush
    } else if is_quads {
        HandCategory::FourOfAKind
    } else if is_full_house {
        HandCategory::FullHouse
    } else if is_flush {
        HandCategory::Flush
    } else if is_straight {
        HandCategory::Straight
    } else if is_trips {
        HandCategory::ThreeOfAKind
    } else if is_two_pair {
        HandCategory::TwoPair
    } else if is_pair {
        HandCategory::OnePair
    } else {
        HandCategory::HighCard
    };

    let flush_rank = match (is_flush, unique.last()) {
        (true, Some(&high)) => RankSet::single(high),
        _ => RankSet::new(),
    };
    let straight_rank = straight_low.map(RankSet::single).unwrap_or_default();
    let full_house_pair_rank = if is_full_house {
        pairs.clone()
    } else {
        RankSet::new()
    };

    MadeHand {
        is_flush,
        is_straight,
        is_straight_flush,
        is_pair,
        is_two_pair,
        is_trips,
        is_quads,
        is_full_house,
        best_hand_rank,
        pair_rank: pairs,
        set_rank: trips,
        flush_rank,
        straight_rank,
        full_house_pair_rank,
    }
}

/// Returns the lowest rank of the straight formed by five distinct ranks,
/// with 1 standing for an ace-low (wheel) straight.
pub fn straight_low_rank(unique_ranks: &[u8]) -> Option<u8> {
    if unique_ranks.len() != 5 {
        return None;
    }
    let mut v = unique_ranks.to_vec();
    v.sort_unstable();
    if v[4] - v[0] == 4 {
        return Some(v[0]);
    }
    // Ace-low: remap 14 to 1 and test again
    if v[4] == rank_val(Rank::Ace) {
        let mut w: Vec<u8> = v.iter().map(|&r| if r == 14 { 1 } else { r }).collect();
        w.sort_unstable();
        if w[4] - w[0] == 4 {
            return Some(w[0]);
        }
    }
    None
}

/// Five-card key used by lookup tables: cards in canonical order, concatenated.
pub fn hand_key(cards: &[Card; 5]) -> String {
    let mut sorted = *cards;
    sorted.sort_unstable();
    sorted.iter().map(Card::to_string).collect()
}

fn rank_val(r: Rank) -> u8 {
    r as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    fn five(s: &str) -> [Card; 5] {
        let v = parse_cards(s).unwrap();
        [v[0], v[1], v[2], v[3], v[4]]
    }

    #[test]
    fn straight_flush_sets_all_three_flags() {
        let m = classify_made(&five("5s6s7s8s9s"));
        assert!(m.is_straight_flush && m.is_straight && m.is_flush);
        assert_eq!(m.best_hand_rank, HandCategory::StraightFlush);
        assert_eq!(m.straight_rank.best(), Some(5));
    }

    #[test]
    fn wheel_is_recognised_with_low_ace() {
        let m = classify_made(&five("Ad2h3c4s5h"));
        assert!(m.is_straight);
        assert!(!m.is_flush);
        assert_eq!(m.straight_rank.descending(), vec![1]);
        assert_eq!(m.best_hand_rank, HandCategory::Straight);
    }

    #[test]
    fn broadway_is_a_straight() {
        let m = classify_made(&five("AhKdQcJsTh"));
        assert!(m.is_straight);
        assert_eq!(m.straight_rank.best(), Some(10));
    }

    #[test]
    fn wraparound_is_not_a_straight() {
        let m = classify_made(&five("QhKdAc2s3h"));
        assert!(!m.is_straight);
        assert_eq!(m.best_hand_rank, HandCategory::HighCard);
    }

    #[test]
    fn full_house_reports_set_and_pair_ranks() {
        let m = classify_made(&five("9h9d9s6c6h"));
        assert!(m.is_full_house && m.is_trips && m.is_pair);
        assert!(!m.is_two_pair);
        assert_eq!(m.set_rank.descending(), vec![9]);
        assert_eq!(m.full_house_pair_rank.descending(), vec![6]);
        assert_eq!(m.best_hand_rank, HandCategory::FullHouse);
    }

    #[test]
    fn flush_rank_is_highest_card() {
        let m = classify_made(&five("2h4h6h8hTh"));
        assert!(m.is_flush);
        assert!(!m.is_straight);
        assert_eq!(m.flush_rank.descending(), vec![10]);
        assert_eq!(m.best_hand_rank, HandCategory::Flush);
    }

    #[test]
    fn two_pair_records_both_pairs() {
        let m = classify_made(&five("KhKd4c4s9h"));
        assert!(m.is_two_pair && m.is_pair);
        assert_eq!(m.pair_rank.descending(), vec![13, 4]);
        assert_eq!(m.best_hand_rank, HandCategory::TwoPair);
    }

    #[test]
    fn trips_without_pair_is_not_two_pair() {
        let m = classify_made(&five("7h7d7c2s9h"));
        assert!(m.is_trips);
        assert!(!m.is_pair && !m.is_two_pair && !m.is_full_house);
        assert_eq!(m.best_hand_rank, HandCategory::ThreeOfAKind);
    }

    #[test]
    fn quads_take_precedence() {
        let m = classify_made(&five("AhAdAcAs2h"));
        assert!(m.is_quads);
        assert!(!m.is_pair);
        assert_eq!(m.best_hand_rank, HandCategory::FourOfAKind);
    }

    #[test]
    fn one_pair_and_high_card() {
        let pair = classify_made(&five("JhJd4c8s2h"));
        assert_eq!(pair.best_hand_rank, HandCategory::OnePair);
        assert_eq!(pair.pair_rank.best(), Some(11));

        let high = classify_made(&five("Jh9d4c8s2h"));
        assert_eq!(high.best_hand_rank, HandCategory::HighCard);
        assert!(high.pair_rank.is_empty());
        assert!(high.flush_rank.is_empty());
    }

    #[test]
    fn category_serialises_as_ordinal() {
        assert_eq!(serde_json::to_string(&HandCategory::FullHouse).unwrap(), "3");
        let back: HandCategory = serde_json::from_str("7").unwrap();
        assert_eq!(back, HandCategory::TwoPair);
        assert!(serde_json::from_str::<HandCategory>("0").is_err());
    }

    #[test]
    fn hand_key_is_order_independent() {
        assert_eq!(hand_key(&five("AhKdQcJsTh")), hand_key(&five("ThJsQcKdAh")));
    }
}
