use crate::cards::Card;
use crate::range::{Board, RangeEntry, RowId};

/// One concrete 5-card hand: two hole cards plus one 3-card board combination.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CandidateHand {
    pub row: RowId,
    pub hole: [Card; 2],
    pub board: [Card; 3],
}

impl CandidateHand {
    pub fn cards(&self) -> [Card; 5] {
        [
            self.hole[0],
            self.hole[1],
            self.board[0],
            self.board[1],
            self.board[2],
        ]
    }
}

/// All `k`-element combinations of `items`, in lexicographic index order.
pub fn combinations<T: Copy>(items: &[T], k: usize) -> Vec<Vec<T>> {
    let n = items.len();
    if k > n {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut idx: Vec<usize> = (0..k).collect();
    loop {
        out.push(idx.iter().map(|&i| items[i]).collect());
        // advance the rightmost index that still has room
        let mut i = k;
        loop {
            if i == 0 {
                return out;
            }
            i -= 1;
            if idx[i] != i + n - k {
                break;
            }
            if i == 0 {
                return out;
            }
        }
        idx[i] += 1;
        for j in i + 1..k {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

/// Expands a range entry into every 5-card hand formed by a 2-card subset of
/// its hole cards and a 3-card combination of the board.
pub fn enumerate_hands(entry: &RangeEntry, board: &Board) -> Vec<CandidateHand> {
    let hole_pairs = combinations(&entry.hole_cards, 2);
    let mut hands = Vec::with_capacity(hole_pairs.len() * board.combos().len());
    for pair in &hole_pairs {
        for combo in board.combos() {
            hands.push(CandidateHand {
                row: entry.row,
                hole: [pair[0], pair[1]],
                board: *combo,
            });
        }
    }
    hands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;
    use crate::range::Action;

    fn entry(hole: &str) -> RangeEntry {
        RangeEntry {
            row: RowId { file: 0, line: 1 },
            weight: 1.0,
            hole_cards: parse_cards(hole).unwrap(),
            action: Action::Check,
        }
    }

    #[test]
    fn combinations_counts_match_binomials() {
        let items = [1, 2, 3, 4, 5];
        assert_eq!(combinations(&items, 3).len(), 10);
        assert_eq!(combinations(&items, 2).len(), 10);
        assert_eq!(combinations(&items, 5).len(), 1);
        assert_eq!(combinations(&items[..3], 3), vec![vec![1, 2, 3]]);
        assert!(combinations(&items[..2], 3).is_empty());
    }

    #[test]
    fn combinations_of_zero_is_single_empty_set() {
        let items = [1, 2];
        assert_eq!(combinations(&items, 0), vec![Vec::<i32>::new()]);
    }

    #[test]
    fn river_board_yields_ten_candidates() {
        let board = Board::new(&parse_cards("Ah7d2c9s5h").unwrap()).unwrap();
        let hands = enumerate_hands(&entry("KsQs"), &board);
        assert_eq!(hands.len(), 10);
        assert!(hands.iter().all(|h| h.row == RowId { file: 0, line: 1 }));
    }

    #[test]
    fn flop_board_yields_one_candidate() {
        let board = Board::new(&parse_cards("Ah7d2c").unwrap()).unwrap();
        let hands = enumerate_hands(&entry("KsQs"), &board);
        assert_eq!(hands.len(), 1);
        let cards = hands[0].cards();
        assert_eq!(cards[0].to_string(), "Ks");
        assert_eq!(cards[4].to_string(), "2c");
    }

    #[test]
    fn four_card_holding_uses_every_hole_pair() {
        let board = Board::new(&parse_cards("Ah7d2c9s").unwrap()).unwrap();
        let hands = enumerate_hands(&entry("KsQsJdTd"), &board);
        assert_eq!(hands.len(), 6 * 4);
    }
}
