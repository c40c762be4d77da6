use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rangekpi_engine::cards::{all_suits, full_deck, Card, Rank};
use rangekpi_engine::draws::{classify_draws, FlushDrawTier};
use rangekpi_engine::enumerate::combinations;
use rangekpi_engine::hand::{classify_made, HandCategory};
use rangekpi_engine::lookup::DirectClassifier;
use rangekpi_engine::pipeline::classify_entry;
use rangekpi_engine::range::{Action, Board, RangeEntry, RowId};

/// Random hole cards and a 3 to 5 card board, all distinct.
fn random_deals(seed: u64, n: usize) -> Vec<([Card; 2], Vec<Card>)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut deck = full_deck();
    (0..n)
        .map(|_| {
            deck.shuffle(&mut rng);
            let board_len = rng.random_range(3..=5);
            ([deck[0], deck[1]], deck[2..2 + board_len].to_vec())
        })
        .collect()
}

#[test]
fn every_straight_flush_ranks_first() {
    for suit in all_suits() {
        // low card 1 is the wheel
        for low in 1u8..=10 {
            let cards: Vec<Card> = (low..low + 5)
                .map(|r| {
                    let rank = Rank::from_u8(if r == 1 { 14 } else { r }).unwrap();
                    Card::new(rank, suit)
                })
                .collect();
            let hand = [cards[0], cards[1], cards[2], cards[3], cards[4]];
            let m = classify_made(&hand);
            assert!(m.is_straight_flush && m.is_straight && m.is_flush, "{:?}", hand);
            assert_eq!(m.best_hand_rank, HandCategory::StraightFlush);
            assert_eq!(m.best_hand_rank.ordinal(), 1);
            assert_eq!(m.straight_rank.descending(), vec![low]);
        }
    }
}

#[test]
fn candidate_draws_respect_made_hand_and_out_bounds() {
    for (hole, board) in random_deals(29, 3_000) {
        let mut visible = hole.to_vec();
        visible.extend_from_slice(&board);
        for combo in combinations(&board, 3) {
            let combo = [combo[0], combo[1], combo[2]];
            let made = classify_made(&[hole[0], hole[1], combo[0], combo[1], combo[2]]);
            let draws = classify_draws(hole, combo, &made, &visible);

            if made.is_flush {
                assert_eq!(draws.flush_draw_tier, FlushDrawTier::None, "{:?} {:?}", hole, combo);
            }
            if made.is_straight {
                assert!(draws.straight_draw_ranks.is_empty());
            }
            assert!(
                usize::from(draws.draw_outs) <= 4 * draws.straight_draw_ranks.len(),
                "{:?} {:?} {:?}",
                hole,
                combo,
                draws
            );
        }
    }
}

#[test]
fn aggregated_outs_stay_within_bounds() {
    for (i, (hole, board_cards)) in random_deals(31, 1_500).into_iter().enumerate() {
        let board = Board::new(&board_cards).unwrap();
        let entry = RangeEntry {
            row: RowId { file: 0, line: i + 1 },
            weight: 1.0,
            hole_cards: hole.to_vec(),
            action: Action::Check,
        };
        let row = classify_entry(&entry, &board, &DirectClassifier).unwrap();
        let draws = &row.features.draws;
        assert!(usize::from(draws.draw_outs) <= 4 * draws.straight_draw_ranks.len());
        if draws.straight_draw_ranks.is_empty() {
            assert_eq!(draws.draw_outs, 0);
        }
    }
}
