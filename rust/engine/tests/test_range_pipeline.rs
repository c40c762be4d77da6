use rangekpi_engine::cards::parse_cards;
use rangekpi_engine::draws::FlushDrawTier;
use rangekpi_engine::errors::{ParseError, PipelineError};
use rangekpi_engine::lookup::DirectClassifier;
use rangekpi_engine::pipeline::{process_file, PipelineOptions};
use rangekpi_engine::range::{parse_range_line, Action, RowId, Scenario};

fn run(stem: &str, content: &str) -> Result<rangekpi_engine::pipeline::FileReport, PipelineError> {
    let scenario = Scenario::from_stem(stem).unwrap();
    process_file(
        0,
        &format!("{}.txt", stem),
        &scenario,
        content,
        PipelineOptions::default(),
        &DirectClassifier,
    )
}

#[test]
fn scenario_name_carries_board_and_action() {
    let s = Scenario::from_stem("Ah7d2c9s_bet50").unwrap();
    assert_eq!(s.board.cards(), parse_cards("Ah7d2c9s").unwrap().as_slice());
    assert_eq!(s.board.combos().len(), 4);
    assert_eq!(s.action, Action::BetSized(50));
    assert!(s.action.is_bet());
}

#[test]
fn scenario_name_rejects_bad_boards_and_actions() {
    for stem in ["Ah7d_check", "Ah7d2c9s8h3c_check", "Ah7d2c_limp", "Ah7d2c", "Ah7d2c_bet0"] {
        assert!(
            matches!(Scenario::from_stem(stem), Err(ParseError::InvalidScenarioName { .. })),
            "{} should be rejected",
            stem
        );
    }
}

#[test]
fn invalid_rank_is_reported_with_its_line() {
    let row = RowId { file: 0, line: 7 };
    let err = parse_range_line(row, "0.5:Xh2c", Action::Check).unwrap_err();
    assert_eq!(err, ParseError::InvalidRank { line: 7, rank: 'X' });
}

#[test]
fn five_card_board_row_aggregates_ten_combinations() {
    let report = run("Th7h2c9sKd_check", "1:AhJh").unwrap();
    let row = &report.rows[0];
    assert_eq!(row.community_cards.len(), 5);
    assert_eq!(row.best_hand, "High Card");
    assert_eq!(row.features.draws.flush_draw_tier, FlushDrawTier::Nut);
    assert!(row.features.draws.straight_draw_ranks.contains(12));
}

#[test]
fn rows_follow_input_order_and_keep_weights() {
    let content = "0.1:AsKs\n0.2:QsJs\n0.3:8c8d\n0.4:5d4d\n";
    let report = run("Th7h2c_raise", content).unwrap();
    let weights: Vec<f64> = report.rows.iter().map(|r| r.weight).collect();
    assert_eq!(weights, vec![0.1, 0.2, 0.3, 0.4]);
    assert!(report.rows.iter().all(|r| r.action == Action::Raise));
}

#[test]
fn only_failures_means_empty_population() {
    let err = run("Th7h2c_call", "garbage\n0.5:Th2c\n").unwrap_err();
    assert!(matches!(err, PipelineError::EmptyInputPopulation { .. }));
}

#[test]
fn rows_serialise_with_flat_feature_columns() {
    let report = run("Th7h2c_check", "1:AhKh").unwrap();
    let value = serde_json::to_value(&report.rows[0]).unwrap();
    assert_eq!(value["flush_draw_tier"], 1);
    assert_eq!(value["best_hand_rank"], 9);
    assert_eq!(value["action"], "check");
    assert_eq!(value["hole_cards"][0], "Ah");
    let back: rangekpi_engine::aggregate::AggregatedRow = serde_json::from_value(value).unwrap();
    assert_eq!(back, report.rows[0]);
}
