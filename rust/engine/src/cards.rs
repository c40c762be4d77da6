use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CardError;

/// Represents one of the four suits in a standard 52-card deck.
/// Used as a component of [`Card`] to fully define a playing card.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Suit {
    /// Clubs suit (c)
    Clubs,
    /// Diamonds suit (d)
    Diamonds,
    /// Hearts suit (h)
    Hearts,
    /// Spades suit (s)
    Spades,
}

impl Suit {
    pub fn from_char(c: char) -> Result<Suit, CardError> {
        match c.to_ascii_lowercase() {
            'c' => Ok(Suit::Clubs),
            'd' => Ok(Suit::Diamonds),
            'h' => Ok(Suit::Hearts),
            's' => Ok(Suit::Spades),
            other => Err(CardError::InvalidSuit(other)),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Suit::Clubs => 'c',
            Suit::Diamonds => 'd',
            Suit::Hearts => 'h',
            Suit::Spades => 's',
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Suit::Clubs => 0,
            Suit::Diamonds => 1,
            Suit::Hearts => 2,
            Suit::Spades => 3,
        }
    }
}

/// Represents the rank (face value) of a playing card from Two through Ace.
/// Numeric values 2..=14 are used for ordering and classification.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Rank {
    /// Rank 2
    Two = 2,
    /// Rank 3
    Three,
    /// Rank 4
    Four,
    /// Rank 5
    Five,
    /// Rank 6
    Six,
    /// Rank 7
    Seven,
    /// Rank 8
    Eight,
    /// Rank 9
    Nine,
    /// Rank 10
    Ten,
    /// Jack (11)
    Jack,
    /// Queen (12)
    Queen,
    /// King (13)
    King,
    /// Ace (14)
    Ace,
}

impl Rank {
    /// Converts a numeric value in `2..=14` into a rank.
    pub fn from_u8(v: u8) -> Option<Rank> {
        let rank = match v {
            2 => Rank::Two,
            3 => Rank::Three,
            4 => Rank::Four,
            5 => Rank::Five,
            6 => Rank::Six,
            7 => Rank::Seven,
            8 => Rank::Eight,
            9 => Rank::Nine,
            10 => Rank::Ten,
            11 => Rank::Jack,
            12 => Rank::Queen,
            13 => Rank::King,
            14 => Rank::Ace,
            _ => return None,
        };
        Some(rank)
    }

    /// Parses the rank characters `2-9`, `T`, `J`, `Q`, `K`, `A` (case-insensitive).
    pub fn from_char(c: char) -> Result<Rank, CardError> {
        match c.to_ascii_uppercase() {
            '2' => Ok(Rank::Two),
            '3' => Ok(Rank::Three),
            '4' => Ok(Rank::Four),
            '5' => Ok(Rank::Five),
            '6' => Ok(Rank::Six),
            '7' => Ok(Rank::Seven),
            '8' => Ok(Rank::Eight),
            '9' => Ok(Rank::Nine),
            'T' => Ok(Rank::Ten),
            'J' => Ok(Rank::Jack),
            'Q' => Ok(Rank::Queen),
            'K' => Ok(Rank::King),
            'A' => Ok(Rank::Ace),
            _ => Err(CardError::InvalidRank(c)),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }
}

/// A single playing card. Cards order by rank first, suit only breaks ties
/// so that sorting and deduplication stay total.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }
}

impl Ord for Card {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.suit.cmp(&other.suit))
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.to_char(), self.suit.to_char())
    }
}

impl FromStr for Card {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(r), Some(su), None) => Ok(Card {
                rank: Rank::from_char(r)?,
                suit: Suit::from_char(su)?,
            }),
            _ => Err(CardError::Malformed(s.to_string())),
        }
    }
}

impl TryFrom<String> for Card {
    type Error = CardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}

/// Splits a concatenated card string such as `"Ah7d2c"` into cards.
pub fn parse_cards(s: &str) -> Result<Vec<Card>, CardError> {
    let chars: Vec<char> = s.trim().chars().collect();
    if chars.is_empty() || chars.len() % 2 != 0 {
        return Err(CardError::Malformed(s.to_string()));
    }
    chars
        .chunks(2)
        .map(|pair| {
            Ok(Card {
                rank: Rank::from_char(pair[0])?,
                suit: Suit::from_char(pair[1])?,
            })
        })
        .collect()
}

/// Joins cards back into their concatenated string form.
pub fn cards_to_string(cards: &[Card]) -> String {
    cards.iter().map(Card::to_string).collect()
}

pub fn all_suits() -> [Suit; 4] {
    [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades]
}

pub fn all_ranks() -> [Rank; 13] {
    [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ]
}

pub fn full_deck() -> Vec<Card> {
    let mut v = Vec::with_capacity(52);
    for &s in &all_suits() {
        for &r in &all_ranks() {
            v.push(Card { rank: r, suit: s });
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_cards() {
        let card: Card = "Td".parse().unwrap();
        assert_eq!(card, Card::new(Rank::Ten, Suit::Diamonds));
        assert_eq!(card.to_string(), "Td");
        assert_eq!("as".parse::<Card>().unwrap(), Card::new(Rank::Ace, Suit::Spades));
    }

    #[test]
    fn rejects_invalid_rank() {
        assert_eq!("1h".parse::<Card>(), Err(CardError::InvalidRank('1')));
        assert_eq!(parse_cards("AhXd"), Err(CardError::InvalidRank('X')));
    }

    #[test]
    fn rejects_odd_length_strings() {
        assert!(matches!(parse_cards("AhK"), Err(CardError::Malformed(_))));
        assert!(matches!(parse_cards(""), Err(CardError::Malformed(_))));
    }

    #[test]
    fn cards_order_by_rank_first() {
        let low_spade = Card::new(Rank::Two, Suit::Spades);
        let high_club = Card::new(Rank::King, Suit::Clubs);
        assert!(low_spade < high_club);
    }

    #[test]
    fn serde_uses_short_string_form() {
        let card = Card::new(Rank::Queen, Suit::Hearts);
        assert_eq!(serde_json::to_string(&card).unwrap(), "\"Qh\"");
        let back: Card = serde_json::from_str("\"Qh\"").unwrap();
        assert_eq!(back, card);
    }

    #[test]
    fn full_deck_has_52_unique_cards() {
        let mut deck = full_deck();
        deck.sort();
        deck.dedup();
        assert_eq!(deck.len(), 52);
    }
}
