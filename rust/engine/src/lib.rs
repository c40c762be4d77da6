//! # rangekpi-engine: Poker Range Classification Core
//!
//! Turns weighted poker ranges into per-holding hand features and splits the
//! resulting population into KPI buckets with their action frequencies.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and card-string parsing
//! - [`range`] - Actions, range entries, boards and scenario file names
//! - [`enumerate`] - Expansion of an entry into every 5-card candidate hand
//! - [`hand`] - Made-hand classification and tie-break ranks
//! - [`draws`] - Flush-draw tiers, straight-draw ranks and outs
//! - [`lookup`] - Memoising made-hand lookup table
//! - [`aggregate`] - Collapsing candidates into one row per entry
//! - [`kpi`] - KPI definitions and the first-match partition
//! - [`pipeline`] - Per-file parse/classify/aggregate driver
//! - [`errors`] - Error types for parsing, KPIs and the pipeline
//!
//! ## Quick Start
//!
//! ```rust
//! use rangekpi_engine::cards::parse_cards;
//! use rangekpi_engine::hand::{classify_made, HandCategory};
//!
//! let cards = parse_cards("9h9d9s6c6h").unwrap();
//! let made = classify_made(&[cards[0], cards[1], cards[2], cards[3], cards[4]]);
//! assert!(made.is_full_house);
//! assert_eq!(made.best_hand_rank, HandCategory::FullHouse);
//! ```
//!
//! ## Classifying a Scenario File
//!
//! ```rust
//! use rangekpi_engine::lookup::DirectClassifier;
//! use rangekpi_engine::pipeline::{process_file, PipelineOptions};
//! use rangekpi_engine::range::Scenario;
//!
//! let scenario = Scenario::from_stem("Th7h2c_check").unwrap();
//! let report = process_file(
//!     0,
//!     "Th7h2c_check.txt",
//!     &scenario,
//!     "0.5:AhKh\n1.0:9s8s\n",
//!     PipelineOptions::default(),
//!     &DirectClassifier,
//! )
//! .unwrap();
//! assert_eq!(report.rows.len(), 2);
//! ```

pub mod aggregate;
pub mod cards;
pub mod draws;
pub mod enumerate;
pub mod errors;
pub mod hand;
pub mod kpi;
pub mod lookup;
pub mod pipeline;
pub mod range;
