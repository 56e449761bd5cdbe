//! Memento records - immutable snapshots captured at edit start.
//!
//! ScoreFunction, WeightMap and ObjectiveTree snapshots are deep clones
//! since the live values are mutated in place. Domains inside the tree are
//! never mutated, so cloning them is only a copy of immutable data.

use std::collections::HashMap;
use std::fmt;

use crate::domain::foundation::{AlternativeId, ObjectiveId};
use crate::domain::value_model::{ObjectiveTree, ScoreFunction, ValueChart, WeightMap};

/// The four kinds of undoable change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    ScoreFunctionChange,
    WeightMapChange,
    AlternativeOrderChange,
    ObjectivesChange,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::ScoreFunctionChange => "score_function_change",
            ChangeKind::WeightMapChange => "weight_map_change",
            ChangeKind::AlternativeOrderChange => "alternative_order_change",
            ChangeKind::ObjectivesChange => "objectives_change",
        };
        write!(f, "{}", s)
    }
}

/// One objective's score function for the current user.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreFunctionRecord {
    pub objective_id: ObjectiveId,
    pub score_function: ScoreFunction,
}

impl ScoreFunctionRecord {
    pub fn new(objective_id: ObjectiveId, score_function: &ScoreFunction) -> Self {
        Self {
            objective_id,
            score_function: score_function.get_memento(),
        }
    }
}

/// Position of every alternative, keyed by identity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlternativeOrderRecord {
    positions: HashMap<AlternativeId, usize>,
}

impl AlternativeOrderRecord {
    pub fn capture(chart: &ValueChart) -> Self {
        Self::from_order(&chart.alternative_order())
    }

    pub fn from_order(order: &[AlternativeId]) -> Self {
        Self {
            positions: order
                .iter()
                .enumerate()
                .map(|(index, id)| (id.clone(), index))
                .collect(),
        }
    }

    pub fn position(&self, id: &AlternativeId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The recorded order applied to `current`.
    ///
    /// Alternatives added since the capture keep their relative order after
    /// the recorded ones; recorded alternatives that no longer exist are
    /// dropped.
    pub fn target_order(&self, current: &[AlternativeId]) -> Vec<AlternativeId> {
        let mut order = current.to_vec();
        order.sort_by_key(|id| self.position(id).unwrap_or(usize::MAX));
        order
    }

    /// `permutation[i]` is the index in `current` of the alternative that
    /// belongs at position `i`.
    pub fn permutation(&self, current: &[AlternativeId]) -> Vec<usize> {
        let mut permutation: Vec<usize> = (0..current.len()).collect();
        permutation.sort_by_key(|&index| self.position(&current[index]).unwrap_or(usize::MAX));
        permutation
    }
}

/// Deep snapshot of the objective tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectivesRecord {
    pub tree: ObjectiveTree,
}

impl ObjectivesRecord {
    pub fn capture(chart: &ValueChart) -> Self {
        Self {
            tree: chart.objectives().clone(),
        }
    }
}

/// A snapshot of one kind of chart state.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartMemento {
    ScoreFunction(ScoreFunctionRecord),
    WeightMap(WeightMap),
    AlternativeOrder(AlternativeOrderRecord),
    Objectives(ObjectivesRecord),
}

impl ChartMemento {
    pub fn kind(&self) -> ChangeKind {
        match self {
            ChartMemento::ScoreFunction(_) => ChangeKind::ScoreFunctionChange,
            ChartMemento::WeightMap(_) => ChangeKind::WeightMapChange,
            ChartMemento::AlternativeOrder(_) => ChangeKind::AlternativeOrderChange,
            ChartMemento::Objectives(_) => ChangeKind::ObjectivesChange,
        }
    }
}
