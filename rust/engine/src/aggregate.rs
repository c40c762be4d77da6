//! Collapses every candidate hand of a range entry into one row.
//!
//! Each feature is reduced with a single fold over the candidates:
//! flags are OR-ed, ordinal ranks keep their minimum (strongest), and rank
//! sets are unioned. Draw outs are recounted from the unioned ranks so one
//! rank is never counted twice.

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::draws::{count_outs, DrawFeatures};
use crate::hand::{HandFeatures, MadeHand, RankSet};
use crate::range::{Action, Board, RangeEntry, RowId};

/// One classified range entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRow {
    pub row: RowId,
    pub action: Action,
    pub weight: f64,
    pub hole_cards: Vec<Card>,
    pub community_cards: Vec<Card>,
    pub best_hand: String,
    #[serde(flatten)]
    pub features: HandFeatures,
}

fn any(acc: &mut bool, v: bool) {
    *acc |= v;
}

fn min<T: Ord + Copy>(acc: &mut T, v: T) {
    if v < *acc {
        *acc = v;
    }
}

fn union(acc: &mut RankSet, v: &RankSet) {
    acc.union_with(v);
}

impl MadeHand {
    fn absorb(&mut self, other: &MadeHand) {
        any(&mut self.is_flush, other.is_flush);
        any(&mut self.is_straight, other.is_straight);
        any(&mut self.is_straight_flush, other.is_straight_flush);
        any(&mut self.is_pair, other.is_pair);
        any(&mut self.is_two_pair, other.is_two_pair);
        any(&mut self.is_trips, other.is_trips);
        any(&mut self.is_quads, other.is_quads);
        any(&mut self.is_full_house, other.is_full_house);
        min(&mut self.best_hand_rank, other.best_hand_rank);
        union(&mut self.pair_rank, &other.pair_rank);
        union(&mut self.set_rank, &other.set_rank);
        union(&mut self.flush_rank, &other.flush_rank);
        union(&mut self.straight_rank, &other.straight_rank);
        union(&mut self.full_house_pair_rank, &other.full_house_pair_rank);
    }
}

impl DrawFeatures {
    fn absorb(&mut self, other: &DrawFeatures) {
        min(&mut self.flush_draw_tier, other.flush_draw_tier);
        union(&mut self.straight_draw_ranks, &other.straight_draw_ranks);
    }
}

/// Reduces candidate features into the features of their row.
///
/// Returns `None` for an empty candidate list. A single candidate comes back
/// unchanged as long as its outs were counted against the same `visible` cards.
pub fn aggregate_features<'a, I>(candidates: I, visible: &[Card]) -> Option<HandFeatures>
where
    I: IntoIterator<Item = &'a HandFeatures>,
{
    let mut iter = candidates.into_iter();
    let mut acc = iter.next()?.clone();
    for f in iter {
        acc.made.absorb(&f.made);
        acc.draws.absorb(&f.draws);
    }
    acc.draws.draw_outs = count_outs(&acc.draws.straight_draw_ranks, visible);
    Some(acc)
}

/// Every card visible to the holder of `entry`: all hole cards and the board.
pub fn visible_cards(entry: &RangeEntry, board: &Board) -> Vec<Card> {
    let mut visible = entry.hole_cards.clone();
    visible.extend_from_slice(board.cards());
    visible
}

/// Builds the row for `entry` from its candidates' features.
pub fn aggregate_row(
    entry: &RangeEntry,
    board: &Board,
    candidates: &[HandFeatures],
) -> Option<AggregatedRow> {
    let visible = visible_cards(entry, board);
    let features = aggregate_features(candidates, &visible)?;
    Some(AggregatedRow {
        row: entry.row,
        action: entry.action,
        weight: entry.weight,
        hole_cards: entry.hole_cards.clone(),
        community_cards: board.cards().to_vec(),
        best_hand: features.made.best_hand_rank.label().to_string(),
        features,
    })
}
