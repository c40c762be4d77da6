//! Single-hand classification.

use std::io::Write;

use rangekpi_engine::cards::{parse_cards, Card};
use rangekpi_engine::draws::classify_draws;
use rangekpi_engine::hand::{classify_made, HandFeatures};

use crate::error::CliError;

/// Prints the features of one 5-card hand as JSON.
///
/// The first two cards are treated as hole cards and the remaining three as
/// the board when grading draws.
pub fn handle_classify_command(hand: &str, out: &mut dyn Write) -> Result<(), CliError> {
    let cards = parse_cards(hand)
        .map_err(|e| CliError::InvalidInput(format!("Invalid hand '{}': {}", hand, e)))?;
    let five: [Card; 5] = cards.as_slice().try_into().map_err(|_| {
        CliError::InvalidInput(format!("Expected 5 cards, got {}", cards.len()))
    })?;
    for (i, c) in five.iter().enumerate() {
        if five[..i].contains(c) {
            return Err(CliError::InvalidInput(format!("Duplicate card {}", c)));
        }
    }

    let made = classify_made(&five);
    let draws = classify_draws([five[0], five[1]], [five[2], five[3], five[4]], &made, &five);
    let best_hand = made.best_hand_rank.label();
    let features = HandFeatures { made, draws };

    let mut value = serde_json::to_value(&features).map_err(std::io::Error::other)?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("hand".into(), hand.into());
        obj.insert("best_hand".into(), best_hand.into());
    }
    let s = serde_json::to_string_pretty(&value).map_err(std::io::Error::other)?;
    writeln!(out, "{}", s)?;
    Ok(())
}
