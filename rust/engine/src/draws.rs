//! Draw potential of a 5-card candidate hand.
//!
//! Flush draws are graded by how many unseen cards of the draw suit outrank
//! the holder's best suited hole card. Straight draws are reported as the set
//! of ranks whose arrival would complete a straight, plus the number of those
//! cards still unseen.

use serde::{Deserialize, Serialize};

use crate::cards::{all_ranks, all_suits, Card, Suit};
use crate::hand::{straight_low_rank, MadeHand, RankSet};

/// Flush-draw strength, strongest first so the minimum is the best draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum FlushDrawTier {
    Nut = 1,
    SecondNut = 2,
    ThirdNut = 3,
    Low = 4,
    /// No flush draw; encoded as 9 in reports and KPI comparisons.
    None = 9,
}

impl FlushDrawTier {
    pub fn value(self) -> u8 {
        self as u8
    }

    fn from_cards_above(above: usize) -> Self {
        match above {
            0 => FlushDrawTier::Nut,
            1 => FlushDrawTier::SecondNut,
            2 => FlushDrawTier::ThirdNut,
            _ => FlushDrawTier::Low,
        }
    }
}

impl From<FlushDrawTier> for u8 {
    fn from(t: FlushDrawTier) -> Self {
        t.value()
    }
}

impl TryFrom<u8> for FlushDrawTier {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(FlushDrawTier::Nut),
            2 => Ok(FlushDrawTier::SecondNut),
            3 => Ok(FlushDrawTier::ThirdNut),
            4 => Ok(FlushDrawTier::Low),
            9 => Ok(FlushDrawTier::None),
            _ => Err(format!("invalid flush draw tier {}", v)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawFeatures {
    pub flush_draw_tier: FlushDrawTier,
    pub straight_draw_ranks: RankSet,
    pub draw_outs: u8,
}

impl Default for DrawFeatures {
    fn default() -> Self {
        Self {
            flush_draw_tier: FlushDrawTier::None,
            straight_draw_ranks: RankSet::new(),
            draw_outs: 0,
        }
    }
}

/// Classifies draws for one candidate.
///
/// `visible` holds every card the holder can see (all hole cards and the full
/// board); it decides which cards are still live.
pub fn classify_draws(
    hole: [Card; 2],
    board: [Card; 3],
    made: &MadeHand,
    visible: &[Card],
) -> DrawFeatures {
    let flush_draw_tier = if made.is_flush {
        FlushDrawTier::None
    } else {
        flush_draw_tier(hole, board, visible)
    };
    let straight_draw_ranks = if made.is_straight {
        RankSet::new()
    } else {
        straight_draw_ranks(hole, board)
    };
    let draw_outs = count_outs(&straight_draw_ranks, visible);
    DrawFeatures {
        flush_draw_tier,
        straight_draw_ranks,
        draw_outs,
    }
}

/// Best flush-draw tier over all suits where the holder has two suited hole
/// cards and the board combination has at least two more.
pub fn flush_draw_tier(hole: [Card; 2], board: [Card; 3], visible: &[Card]) -> FlushDrawTier {
    let mut best = FlushDrawTier::None;
    for suit in all_suits() {
        let hole_in_suit: Vec<u8> = hole
            .iter()
            .filter(|c| c.suit == suit)
            .map(|c| c.rank.value())
            .collect();
        let board_in_suit = board.iter().filter(|c| c.suit == suit).count();
        if hole_in_suit.len() < 2 || board_in_suit < 2 {
            continue;
        }
        let Some(&top) = hole_in_suit.iter().max() else {
            continue;
        };
        let above = unseen_in_suit(suit, visible)
            .into_iter()
            .filter(|&r| r > top)
            .count();
        best = best.min(FlushDrawTier::from_cards_above(above));
    }
    best
}

fn unseen_in_suit(suit: Suit, visible: &[Card]) -> Vec<u8> {
    all_ranks()
        .iter()
        .filter(|&&r| !visible.contains(&Card::new(r, suit)))
        .map(|r| r.value())
        .collect()
}

/// Ranks that would complete a straight using both hole ranks and two of the
/// board ranks. Empty when the hole ranks are paired or span more than a
/// straight window.
pub fn straight_draw_ranks(hole: [Card; 2], board: [Card; 3]) -> RankSet {
    let mut out = RankSet::new();
    let h0 = hole[0].rank.value();
    let h1 = hole[1].rank.value();
    if h0 == h1 || hole_span(h0, h1) > 4 {
        return out;
    }

    let board_ranks: Vec<u8> = board.iter().map(|c| c.rank.value()).collect();
    for (i, j) in [(0, 1), (0, 2), (1, 2)] {
        let mut known = vec![h0, h1, board_ranks[i], board_ranks[j]];
        known.sort_unstable();
        known.dedup();
        if known.len() != 4 {
            continue;
        }
        for r in 2..=14u8 {
            if known.contains(&r) {
                continue;
            }
            let mut with_r = known.clone();
            with_r.push(r);
            if straight_low_rank(&with_r).is_some() {
                out.insert(r);
            }
        }
    }
    out
}

/// Span between two hole ranks, letting an ace play low when that is closer.
fn hole_span(a: u8, b: u8) -> u8 {
    let high = a.abs_diff(b);
    let low = |r: u8| if r == 14 { 1 } else { r };
    high.min(low(a).abs_diff(low(b)))
}

/// Unseen cards of every rank in `ranks`.
pub fn count_outs(ranks: &RankSet, visible: &[Card]) -> u8 {
    ranks
        .iter()
        .map(|r| {
            let seen = visible.iter().filter(|c| c.rank.value() == r).count() as u8;
            4u8.saturating_sub(seen)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;
    use crate::hand::classify_made;

    fn split(hole: &str, board: &str) -> ([Card; 2], [Card; 3]) {
        let h = parse_cards(hole).unwrap();
        let b = parse_cards(board).unwrap();
        ([h[0], h[1]], [b[0], b[1], b[2]])
    }

    fn draws(hole: &str, board: &str, full_board: &str) -> DrawFeatures {
        let (h, b) = split(hole, board);
        let made = classify_made(&[h[0], h[1], b[0], b[1], b[2]]);
        let mut visible = parse_cards(hole).unwrap();
        visible.extend(parse_cards(full_board).unwrap());
        classify_draws(h, b, &made, &visible)
    }

    #[test]
    fn ace_high_flush_draw_is_the_nuts() {
        let d = draws("AhTh", "2h7hKc", "2h7hKc");
        assert_eq!(d.flush_draw_tier, FlushDrawTier::Nut);
    }

    #[test]
    fn king_high_flush_draw_is_second_nut() {
        let d = draws("KhTh", "2h7h9c", "2h7h9c");
        assert_eq!(d.flush_draw_tier, FlushDrawTier::SecondNut);
    }

    #[test]
    fn king_high_with_ace_on_board_is_the_nuts() {
        let d = draws("KhTh", "2hAh9c", "2hAh9c");
        assert_eq!(d.flush_draw_tier, FlushDrawTier::Nut);
    }

    #[test]
    fn queen_high_is_third_nut_and_small_cards_are_low() {
        assert_eq!(
            draws("QhTh", "2h7h9c", "2h7h9c").flush_draw_tier,
            FlushDrawTier::ThirdNut
        );
        assert_eq!(
            draws("5h3h", "2h7h9c", "2h7h9c").flush_draw_tier,
            FlushDrawTier::Low
        );
    }

    #[test]
    fn made_flush_has_no_flush_draw() {
        let d = draws("AhTh", "2h7h9h", "2h7h9h");
        assert_eq!(d.flush_draw_tier, FlushDrawTier::None);
    }

    #[test]
    fn single_suited_hole_card_is_no_draw() {
        let d = draws("AhTd", "2h7h9h", "2h7h9h4c");
        assert_eq!(d.flush_draw_tier, FlushDrawTier::None);
    }

    #[test]
    fn open_ended_draw_has_two_ranks_and_eight_outs() {
        let d = draws("8c9d", "TsJh2c", "TsJh2c");
        assert_eq!(d.straight_draw_ranks.descending(), vec![12, 7]);
        assert_eq!(d.draw_outs, 8);
    }

    #[test]
    fn gutshot_has_one_rank() {
        let d = draws("5h7h", "8c4s2d", "8c4s2d");
        assert_eq!(d.straight_draw_ranks.descending(), vec![6]);
        assert_eq!(d.draw_outs, 4);
    }

    #[test]
    fn wheel_draw_uses_low_ace() {
        let d = draws("Ah2d", "3c4sKd", "3c4sKd");
        assert!(d.straight_draw_ranks.contains(5));
    }

    #[test]
    fn made_straight_reports_no_straight_draw() {
        let d = draws("8c9d", "TsJhQc", "TsJhQc");
        assert!(d.straight_draw_ranks.is_empty());
        assert_eq!(d.draw_outs, 0);
    }

    #[test]
    fn wide_or_paired_hole_cards_have_no_straight_draw() {
        assert!(draws("2c9d", "3s4h5c", "3s4h5c").straight_draw_ranks.is_empty());
        assert!(draws("9c9d", "TsJh2c", "TsJh2c").straight_draw_ranks.is_empty());
    }

    #[test]
    fn outs_exclude_visible_cards() {
        let ranks = RankSet::from(vec![7, 12]);
        let visible = parse_cards("7h7dQc2s").unwrap();
        assert_eq!(count_outs(&ranks, &visible), 2 + 3);
    }
}
