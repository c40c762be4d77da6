//! Optional lookup table for made-hand classification.
//!
//! The table maps a canonical 5-card string to its [`MadeHand`]. It only
//! avoids recomputation: classifying through the table and classifying
//! directly always give the same result.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::cards::Card;
use crate::hand::{classify_made, hand_key, MadeHand};

/// Source of made-hand classifications used by the pipeline.
pub trait MadeHandSource: Sync {
    fn made_hand(&self, cards: &[Card; 5]) -> MadeHand;
}

/// Classifies every hand from scratch.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectClassifier;

impl MadeHandSource for DirectClassifier {
    fn made_hand(&self, cards: &[Card; 5]) -> MadeHand {
        classify_made(cards)
    }
}

/// Memoising classifier, safe to share across worker threads.
#[derive(Debug, Default)]
pub struct LookupTable {
    entries: RwLock<HashMap<String, MadeHand>>,
}

impl LookupTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: BTreeMap<String, MadeHand>) -> Self {
        Self {
            entries: RwLock::new(entries.into_iter().collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted copy of the table, suitable for persisting.
    pub fn snapshot(&self) -> BTreeMap<String, MadeHand> {
        match self.entries.read() {
            Ok(e) => e.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Err(_) => BTreeMap::new(),
        }
    }
}

impl MadeHandSource for LookupTable {
    fn made_hand(&self, cards: &[Card; 5]) -> MadeHand {
        let key = hand_key(cards);
        if let Ok(entries) = self.entries.read() {
            if let Some(hit) = entries.get(&key) {
                return hit.clone();
            }
        }
        let made = classify_made(cards);
        // a poisoned lock only costs the memoisation
        if let Ok(mut entries) = self.entries.write() {
            entries.entry(key).or_insert_with(|| made.clone());
        }
        made
    }
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
    fn table_matches_direct_classification() {
        let table = LookupTable::new();
        for hand in ["5s6s7s8s9s", "9h9d9s6c6h", "Ad2h3c4s5h", "Jh9d4c8s2h"] {
            let cards = five(hand);
            assert_eq!(table.made_hand(&cards), DirectClassifier.made_hand(&cards));
        }
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn permutations_share_one_entry() {
        let table = LookupTable::new();
        table.made_hand(&five("AhKdQcJsTh"));
        table.made_hand(&five("ThJsQcKdAh"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn snapshot_round_trips() {
        let table = LookupTable::new();
        table.made_hand(&five("KhKd4c4s9h"));
        let restored = LookupTable::from_entries(table.snapshot());
        assert_eq!(restored.snapshot(), table.snapshot());
        assert!(!restored.is_empty());
    }
}
