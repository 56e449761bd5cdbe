//! Change notifications broadcast after the chart is mutated.

use std::fmt;

use crate::domain::value_model::WeightMap;

use super::records::{AlternativeOrderRecord, ChangeKind, ObjectivesRecord, ScoreFunctionRecord};

/// Routing key for change handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeTopic {
    ScoreFunction,
    WeightMap,
    AlternativeOrder,
    Objectives,
    /// Alternatives were reordered by a live gesture or sort.
    AlternativeOrderChanged,
    /// The objective tree was reshaped by a live gesture.
    ObjectivesChanged,
}

impl ChangeTopic {
    pub const ALL: [ChangeTopic; 6] = [
        ChangeTopic::ScoreFunction,
        ChangeTopic::WeightMap,
        ChangeTopic::AlternativeOrder,
        ChangeTopic::Objectives,
        ChangeTopic::AlternativeOrderChanged,
        ChangeTopic::ObjectivesChanged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeTopic::ScoreFunction => "score_function",
            ChangeTopic::WeightMap => "weight_map",
            ChangeTopic::AlternativeOrder => "alternative_order",
            ChangeTopic::Objectives => "objectives",
            ChangeTopic::AlternativeOrderChanged => "alternative_order_changed",
            ChangeTopic::ObjectivesChanged => "objectives_changed",
        }
    }
}

impl From<ChangeKind> for ChangeTopic {
    fn from(kind: ChangeKind) -> Self {
        match kind {
            ChangeKind::ScoreFunctionChange => ChangeTopic::ScoreFunction,
            ChangeKind::WeightMapChange => ChangeTopic::WeightMap,
            ChangeKind::AlternativeOrderChange => ChangeTopic::AlternativeOrder,
            ChangeKind::ObjectivesChange => ChangeTopic::Objectives,
        }
    }
}

impl fmt::Display for ChangeTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A notification that some part of the chart changed.
///
/// The first four variants carry the state that was applied, whether by an
/// interaction or by undo/redo. The last two are flags with no payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartChange {
    ScoreFunction(ScoreFunctionRecord),
    WeightMap(WeightMap),
    AlternativeOrder {
        record: AlternativeOrderRecord,
        /// `permutation[i]` indexes the pre-change alternative array.
        permutation: Vec<usize>,
    },
    Objectives(ObjectivesRecord),
    AlternativeOrderChanged,
    ObjectivesChanged,
}

impl ChartChange {
    pub fn topic(&self) -> ChangeTopic {
        match self {
            ChartChange::ScoreFunction(_) => ChangeTopic::ScoreFunction,
            ChartChange::WeightMap(_) => ChangeTopic::WeightMap,
            ChartChange::AlternativeOrder { .. } => ChangeTopic::AlternativeOrder,
            ChartChange::Objectives(_) => ChangeTopic::Objectives,
            ChartChange::AlternativeOrderChanged => ChangeTopic::AlternativeOrderChanged,
            ChartChange::ObjectivesChanged => ChangeTopic::ObjectivesChanged,
        }
    }
}
