//! Range entries, boards and scenario metadata.
//!
//! A scenario file is named after its board and the action taken by every
//! holding it lists (for example `Ah7d2c9s_bet50.txt`). Each non-blank line
//! of the file is a `weight:holecards` entry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cards::{parse_cards, Card};
use crate::errors::{CardError, ParseError};
use crate::enumerate::combinations;

/// The action declared for every holding of a scenario file.
///
/// Sized bets (`bet1` .. `bet999`) keep their size label so the bet-size
/// distribution can tell them apart.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Action {
    Fold,
    Check,
    Call,
    Bet,
    BetSized(u16),
    Raise,
}

impl Action {
    /// Returns true for `bet` and every sized bet.
    pub fn is_bet(self) -> bool {
        matches!(self, Action::Bet | Action::BetSized(_))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Fold => write!(f, "fold"),
            Action::Check => write!(f, "check"),
            Action::Call => write!(f, "call"),
            Action::Bet => write!(f, "bet"),
            Action::BetSized(size) => write!(f, "bet{}", size),
            Action::Raise => write!(f, "raise"),
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "fold" => Ok(Action::Fold),
            "check" => Ok(Action::Check),
            "call" => Ok(Action::Call),
            "bet" => Ok(Action::Bet),
            "raise" => Ok(Action::Raise),
            other => {
                let digits = other
                    .strip_prefix("bet")
                    .filter(|d| (1..=3).contains(&d.len()) && d.bytes().all(|b| b.is_ascii_digit()))
                    .ok_or_else(|| format!("unknown action '{}'", s))?;
                let size: u16 = digits
                    .parse()
                    .map_err(|_| format!("unknown action '{}'", s))?;
                if size == 0 {
                    return Err(format!("bet size must be positive in '{}'", s));
                }
                Ok(Action::BetSized(size))
            }
        }
    }
}

impl TryFrom<String> for Action {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.to_string()
    }
}

/// Identity of a source line, stable through every downstream stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct RowId {
    /// Index of the scenario file within the batch
    pub file: usize,
    /// 1-based line number inside that file
    pub line: usize,
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One weighted holding from a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeEntry {
    pub row: RowId,
    pub weight: f64,
    /// Two cards for Hold'em; larger holdings enumerate every 2-card sub-pair.
    pub hole_cards: Vec<Card>,
    pub action: Action,
}

/// The known community cards of a scenario together with every 3-card
/// combination of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cards: Vec<Card>,
    combos: Vec<[Card; 3]>,
}

impl Board {
    pub const MIN_CARDS: usize = 3;
    pub const MAX_CARDS: usize = 5;

    /// Builds a board from 3 to 5 cards. Duplicates are dropped, first
    /// occurrence wins.
    pub fn new(cards: &[Card]) -> Result<Self, ParseError> {
        let mut unique: Vec<Card> = Vec::with_capacity(cards.len());
        for &c in cards {
            if !unique.contains(&c) {
                unique.push(c);
            }
        }
        if !(Self::MIN_CARDS..=Self::MAX_CARDS).contains(&unique.len()) {
            return Err(ParseError::InvalidBoard(format!(
                "expected {}-{} distinct cards, got {}",
                Self::MIN_CARDS,
                Self::MAX_CARDS,
                unique.len()
            )));
        }
        let combos = combinations(&unique, 3)
            .into_iter()
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Ok(Self {
            cards: unique,
            combos,
        })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn combos(&self) -> &[[Card; 3]] {
        &self.combos
    }
}

/// Metadata carried by a scenario file name: the board and the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub board: Board,
    pub action: Action,
}

impl Scenario {
    /// Parses a file stem such as `Ah7d2c9s_bet50`.
    pub fn from_stem(stem: &str) -> Result<Self, ParseError> {
        let invalid = |reason: String| ParseError::InvalidScenarioName {
            name: stem.to_string(),
            reason,
        };
        let parts: Vec<&str> = stem.split('_').collect();
        let [cards_raw, action_raw] = parts.as_slice() else {
            return Err(invalid("expected <board>_<action>".into()));
        };
        let cards = parse_cards(cards_raw).map_err(|e| invalid(e.to_string()))?;
        let board = Board::new(&cards).map_err(|e| invalid(e.to_string()))?;
        let action = action_raw.parse().map_err(invalid)?;
        Ok(Self { board, action })
    }
}

/// Parses one `weight:holecards` line.
///
/// Whitespace and commas between hole cards are tolerated; anything else that
/// is not a card is rejected.
pub fn parse_range_line(row: RowId, text: &str, action: Action) -> Result<RangeEntry, ParseError> {
    let line = row.line;
    let malformed = |reason: &str| ParseError::MalformedRangeLine {
        line,
        reason: reason.to_string(),
    };

    if text.contains(char::REPLACEMENT_CHARACTER) {
        return Err(malformed("line is not valid UTF-8"));
    }
    let (weight_raw, hole_raw) = text
        .trim()
        .split_once(':')
        .ok_or_else(|| malformed("missing ':' between weight and hole cards"))?;
    let weight: f64 = weight_raw
        .trim()
        .parse()
        .map_err(|_| malformed("weight is not a number"))?;
    if !weight.is_finite() || weight < 0.0 {
        return Err(malformed("weight must be a non-negative finite number"));
    }

    let compact: String = hole_raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    let hole_cards = parse_cards(&compact).map_err(|e| match e {
        CardError::InvalidRank(rank) => ParseError::InvalidRank { line, rank },
        other => ParseError::MalformedRangeLine {
            line,
            reason: other.to_string(),
        },
    })?;
    if hole_cards.len() < 2 {
        return Err(malformed("at least two hole cards are required"));
    }
    for (i, card) in hole_cards.iter().enumerate() {
        if hole_cards[..i].contains(card) {
            return Err(malformed("duplicate hole card"));
        }
    }

    Ok(RangeEntry {
        row,
        weight,
        hole_cards,
        action,
    })
}

/// Parses every non-blank line of a scenario file, isolating failures per line.
pub fn parse_range_lines(
    file: usize,
    content: &str,
    action: Action,
) -> (Vec<RangeEntry>, Vec<(RowId, ParseError)>) {
    let mut entries = Vec::new();
    let mut failures = Vec::new();
    for (idx, text) in content.lines().enumerate() {
        if text.trim().is_empty() {
            continue;
        }
        let row = RowId {
            file,
            line: idx + 1,
        };
        match parse_range_line(row, text, action) {
            Ok(entry) => entries.push(entry),
            Err(e) => failures.push((row, e)),
        }
    }
    (entries, failures)
}
