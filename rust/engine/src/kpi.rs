//! KPI definitions and the first-match KPI partition.
//!
//! KPIs are evaluated in declaration order against a shrinking pool of
//! unmatched rows, so every row lands in at most one bucket. Reordering KPIs
//! with overlapping requirements changes the buckets.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregate::AggregatedRow;
use crate::errors::{KpiError, PipelineError};
use crate::range::{Action, RowId};

/// Fields of [`AggregatedRow`] that KPI requirements may inspect.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Action,
    Weight,
    HoleCards,
    CommunityCards,
    IsFlush,
    IsStraight,
    IsStraightFlush,
    IsPair,
    IsTwoPair,
    IsTrips,
    IsQuads,
    IsFullHouse,
    PairRank,
    FullHousePairRank,
    FlushRank,
    StraightRank,
    SetRank,
    BestHand,
    BestHandRank,
    FlushDrawTier,
    StraightDrawRanks,
    DrawOuts,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ColumnType {
    Bool,
    Int,
    Float,
    Text,
    IntList,
    TextList,
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::Action => "action",
            Column::Weight => "weight",
            Column::HoleCards => "hole_cards",
            Column::CommunityCards => "community_cards",
            Column::IsFlush => "is_flush",
            Column::IsStraight => "is_straight",
            Column::IsStraightFlush => "is_straight_flush",
            Column::IsPair => "is_pair",
            Column::IsTwoPair => "is_two_pair",
            Column::IsTrips => "is_trips",
            Column::IsQuads => "is_quads",
            Column::IsFullHouse => "is_full_house",
            Column::PairRank => "pair_rank",
            Column::FullHousePairRank => "full_house_pair_rank",
            Column::FlushRank => "flush_rank",
            Column::StraightRank => "straight_rank",
            Column::SetRank => "set_rank",
            Column::BestHand => "best_hand",
            Column::BestHandRank => "best_hand_rank",
            Column::FlushDrawTier => "flush_draw_tier",
            Column::StraightDrawRanks => "straight_draw_ranks",
            Column::DrawOuts => "draw_outs",
        }
    }

    pub fn column_type(self) -> ColumnType {
        match self {
            Column::Action | Column::BestHand => ColumnType::Text,
            Column::Weight => ColumnType::Float,
            Column::HoleCards | Column::CommunityCards => ColumnType::TextList,
            Column::IsFlush
            | Column::IsStraight
            | Column::IsStraightFlush
            | Column::IsPair
            | Column::IsTwoPair
            | Column::IsTrips
            | Column::IsQuads
            | Column::IsFullHouse => ColumnType::Bool,
            Column::PairRank
            | Column::FullHousePairRank
            | Column::FlushRank
            | Column::StraightRank
            | Column::SetRank
            | Column::StraightDrawRanks => ColumnType::IntList,
            Column::BestHandRank | Column::FlushDrawTier | Column::DrawOuts => ColumnType::Int,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    #[serde(alias = "in")]
    Includes,
    #[serde(alias = "ni")]
    NotIncludes,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Includes => "includes",
            Operator::NotIncludes => "not_includes",
        };
        f.write_str(s)
    }
}

/// Literal a requirement compares against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KpiValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for KpiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KpiValue::Bool(b) => write!(f, "{}", b),
            KpiValue::Int(i) => write!(f, "{}", i),
            KpiValue::Float(x) => write!(f, "{}", x),
            KpiValue::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiRequirement {
    pub column: Column,
    pub operator: Operator,
    pub value: KpiValue,
}

impl fmt::Display for KpiRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column {} {} {}", self.column, self.operator, self.value)
    }
}

/// A named conjunction of requirements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub display_name: String,
    #[serde(default)]
    pub requirements: Vec<KpiRequirement>,
}

/// Value of one column of one row.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    IntList(Vec<u8>),
    TextList(Vec<String>),
}

fn cell(row: &AggregatedRow, column: Column) -> Cell {
    let made = &row.features.made;
    let draws = &row.features.draws;
    match column {
        Column::Action => Cell::Text(row.action.to_string()),
        Column::Weight => Cell::Float(row.weight),
        Column::HoleCards => Cell::TextList(row.hole_cards.iter().map(|c| c.to_string()).collect()),
        Column::CommunityCards => {
            Cell::TextList(row.community_cards.iter().map(|c| c.to_string()).collect())
        }
        Column::IsFlush => Cell::Bool(made.is_flush),
        Column::IsStraight => Cell::Bool(made.is_straight),
        Column::IsStraightFlush => Cell::Bool(made.is_straight_flush),
        Column::IsPair => Cell::Bool(made.is_pair),
        Column::IsTwoPair => Cell::Bool(made.is_two_pair),
        Column::IsTrips => Cell::Bool(made.is_trips),
        Column::IsQuads => Cell::Bool(made.is_quads),
        Column::IsFullHouse => Cell::Bool(made.is_full_house),
        Column::PairRank => Cell::IntList(made.pair_rank.descending()),
        Column::FullHousePairRank => Cell::IntList(made.full_house_pair_rank.descending()),
        Column::FlushRank => Cell::IntList(made.flush_rank.descending()),
        Column::StraightRank => Cell::IntList(made.straight_rank.descending()),
        Column::SetRank => Cell::IntList(made.set_rank.descending()),
        Column::BestHand => Cell::Text(row.best_hand.clone()),
        Column::BestHandRank => Cell::Int(made.best_hand_rank.ordinal() as i64),
        Column::FlushDrawTier => Cell::Int(draws.flush_draw_tier.value() as i64),
        Column::StraightDrawRanks => Cell::IntList(draws.straight_draw_ranks.descending()),
        Column::DrawOuts => Cell::Int(draws.draw_outs as i64),
    }
}

fn as_number(v: &KpiValue) -> Option<f64> {
    match v {
        KpiValue::Int(i) => Some(*i as f64),
        KpiValue::Float(x) => Some(*x),
        _ => None,
    }
}

impl KpiRequirement {
    /// Checks that the operator and literal fit the column's type.
    fn check(&self) -> Result<(), String> {
        use ColumnType as T;
        use Operator as O;
        let ty = self.column.column_type();
        let value_fits = match (ty, &self.value) {
            (T::Bool, KpiValue::Bool(_)) => true,
            (T::Int, KpiValue::Int(_)) => true,
            (T::Float, KpiValue::Int(_) | KpiValue::Float(_)) => true,
            (T::Text | T::TextList, KpiValue::Text(_)) => true,
            (T::IntList, KpiValue::Int(_)) => true,
            _ => false,
        };
        let operator_fits = match self.operator {
            O::Eq | O::Ne => matches!(ty, T::Bool | T::Int | T::Float | T::Text),
            O::Gt | O::Gte | O::Lt | O::Lte => matches!(ty, T::Int | T::Float),
            O::Includes | O::NotIncludes => matches!(ty, T::Text | T::IntList | T::TextList),
        };
        if !operator_fits {
            return Err(format!("column is {:?}", ty));
        }
        if !value_fits {
            return Err(format!("value '{}' does not match column type {:?}", self.value, ty));
        }
        Ok(())
    }

    /// Evaluates the requirement against one row.
    pub fn matches(&self, row: &AggregatedRow) -> bool {
        let cell = cell(row, self.column);
        match self.operator {
            Operator::Eq => equals(&cell, &self.value),
            Operator::Ne => !equals(&cell, &self.value),
            Operator::Gt => compare(&cell, &self.value, |a, b| a > b),
            Operator::Gte => compare(&cell, &self.value, |a, b| a >= b),
            Operator::Lt => compare(&cell, &self.value, |a, b| a < b),
            Operator::Lte => compare(&cell, &self.value, |a, b| a <= b),
            Operator::Includes => includes(&cell, &self.value),
            Operator::NotIncludes => !includes(&cell, &self.value),
        }
    }
}

// Text comparisons ignore ASCII case for `eq`, `ne`, `includes` and
// `not_includes` alike.
fn equals(cell: &Cell, value: &KpiValue) -> bool {
    match (cell, value) {
        (Cell::Bool(a), KpiValue::Bool(b)) => a == b,
        (Cell::Text(a), KpiValue::Text(b)) => a.eq_ignore_ascii_case(b),
        (Cell::Int(a), v) => as_number(v).is_some_and(|b| (*a as f64) == b),
        (Cell::Float(a), v) => as_number(v).is_some_and(|b| *a == b),
        _ => false,
    }
}

fn compare(cell: &Cell, value: &KpiValue, op: impl Fn(f64, f64) -> bool) -> bool {
    let lhs = match cell {
        Cell::Int(a) => *a as f64,
        Cell::Float(a) => *a,
        _ => return false,
    };
    as_number(value).is_some_and(|rhs| op(lhs, rhs))
}

fn includes(cell: &Cell, value: &KpiValue) -> bool {
    match (cell, value) {
        (Cell::Text(a), KpiValue::Text(b)) => {
            a.to_ascii_lowercase().contains(&b.to_ascii_lowercase())
        }
        (Cell::IntList(list), KpiValue::Int(b)) => list.iter().any(|&r| r as i64 == *b),
        (Cell::TextList(list), KpiValue::Text(b)) => list.iter().any(|s| s.eq_ignore_ascii_case(b)),
        _ => false,
    }
}

/// KPI list that passed type validation, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KpiSet {
    kpis: Vec<Kpi>,
}

impl KpiSet {
    /// Validates every requirement before any data is processed.
    pub fn new(kpis: Vec<Kpi>) -> Result<Self, KpiError> {
        for kpi in &kpis {
            for req in &kpi.requirements {
                req.check().map_err(|reason| KpiError::ColumnTypeMismatch {
                    kpi: kpi.display_name.clone(),
                    column: req.column.to_string(),
                    operator: req.operator.to_string(),
                    reason,
                })?;
            }
        }
        Ok(Self { kpis })
    }

    pub fn kpis(&self) -> &[Kpi] {
        &self.kpis
    }

    pub fn is_empty(&self) -> bool {
        self.kpis.is_empty()
    }
}

/// Rows matched by one KPI and their action mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiBucket {
    pub display_name: String,
    /// Display name annotated with the matched share of the population.
    pub label: String,
    /// Matched weight as a percentage of the whole population's weight.
    pub matched_percentage: f64,
    /// Share of the bucket's weight per action; sums to 1 when non-empty.
    pub actions: BTreeMap<Action, f64>,
    pub rows: Vec<RowId>,
}

/// Split of a bucket's bet-type weight across bet sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetSizeBucket {
    pub display_name: String,
    pub label: String,
    /// Bet-type weight of the bucket as a percentage of the population.
    pub bet_percentage: f64,
    pub sizes: BTreeMap<Action, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub buckets: Vec<KpiBucket>,
    pub bet_sizes: Vec<BetSizeBucket>,
    /// Rows no KPI matched; excluded from every bucket.
    pub unclassified: Vec<RowId>,
}

fn label(name: &str, percentage: f64) -> String {
    format!("{}\n{:.2}%", name, percentage)
}

fn normalised(weights: &BTreeMap<Action, f64>) -> BTreeMap<Action, f64> {
    let total: f64 = weights.values().sum();
    weights
        .iter()
        .map(|(&a, &w)| (a, if total > 0.0 { w / total } else { 0.0 }))
        .collect()
}

/// Partitions `rows` over the KPIs in order, each KPI only seeing rows that
/// no earlier KPI matched.
pub fn partition(rows: &[AggregatedRow], kpis: &KpiSet) -> Result<Partition, PipelineError> {
    if rows.is_empty() {
        return Err(PipelineError::EmptyInputPopulation {
            source_name: "KPI partition".to_string(),
        });
    }

    let actions: BTreeSet<Action> = rows.iter().map(|r| r.action).collect();
    let bet_actions: BTreeSet<Action> = actions.iter().copied().filter(|a| a.is_bet()).collect();
    let total_weight: f64 = rows.iter().map(|r| r.weight).sum();
    let pct = |w: f64| {
        if total_weight > 0.0 {
            w / total_weight * 100.0
        } else {
            0.0
        }
    };

    let mut remaining: Vec<&AggregatedRow> = rows.iter().collect();
    let mut buckets = Vec::with_capacity(kpis.kpis().len());
    let mut bet_sizes = Vec::with_capacity(kpis.kpis().len());

    for kpi in kpis.kpis() {
        info!(kpi = %kpi.display_name, pool = remaining.len(), "Processing KPI");
        let mut matched: Vec<&AggregatedRow> = remaining.clone();
        for req in &kpi.requirements {
            debug!(requirement = %req, rows = matched.len(), "Processing requirement");
            matched.retain(|r| req.matches(r));
            debug!(rows = matched.len(), "Rows that match requirement");
        }

        if matched.is_empty() {
            warn!(kpi = %kpi.display_name, "No rows match the KPI requirements");
            buckets.push(KpiBucket {
                display_name: kpi.display_name.clone(),
                label: kpi.display_name.clone(),
                matched_percentage: 0.0,
                actions: actions.iter().map(|&a| (a, 0.0)).collect(),
                rows: Vec::new(),
            });
            bet_sizes.push(BetSizeBucket {
                display_name: kpi.display_name.clone(),
                label: kpi.display_name.clone(),
                bet_percentage: 0.0,
                sizes: bet_actions.iter().map(|&a| (a, 0.0)).collect(),
            });
            continue;
        }

        let mut by_action: BTreeMap<Action, f64> = actions.iter().map(|&a| (a, 0.0)).collect();
        for r in &matched {
            *by_action.entry(r.action).or_insert(0.0) += r.weight;
        }
        let matched_percentage = pct(by_action.values().sum());
        for (action, weight) in &by_action {
            debug!(action = %action, percentage = pct(*weight), "Action share");
        }

        let by_size: BTreeMap<Action, f64> = by_action
            .iter()
            .filter(|(a, _)| a.is_bet())
            .map(|(&a, &w)| (a, w))
            .collect();
        let bet_percentage = pct(by_size.values().sum());

        buckets.push(KpiBucket {
            display_name: kpi.display_name.clone(),
            label: label(&kpi.display_name, matched_percentage),
            matched_percentage,
            actions: normalised(&by_action),
            rows: matched.iter().map(|r| r.row).collect(),
        });
        bet_sizes.push(BetSizeBucket {
            display_name: kpi.display_name.clone(),
            label: label(&kpi.display_name, bet_percentage),
            bet_percentage,
            sizes: normalised(&by_size),
        });

        let taken: HashSet<RowId> = matched.iter().map(|r| r.row).collect();
        remaining.retain(|r| !taken.contains(&r.row));
    }

    Ok(Partition {
        buckets,
        bet_sizes,
        unclassified: remaining.iter().map(|r| r.row).collect(),
    })
}
