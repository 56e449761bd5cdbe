//! ScoreFunctionMap - one score function per primitive objective per user.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::ObjectiveId;

use super::score_function::ScoreFunction;

/// Mapping from objective id to that user's score function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreFunctionMap {
    score_functions: BTreeMap<ObjectiveId, ScoreFunction>,
}

impl ScoreFunctionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_objective_score_function(&self, id: &ObjectiveId) -> Option<&ScoreFunction> {
        self.score_functions.get(id)
    }

    pub fn get_objective_score_function_mut(&mut self, id: &ObjectiveId) -> Option<&mut ScoreFunction> {
        self.score_functions.get_mut(id)
    }

    /// Replaces the objective's score function, returning the previous one.
    pub fn set_objective_score_function(&mut self, id: ObjectiveId, function: ScoreFunction) -> Option<ScoreFunction> {
        self.score_functions.insert(id, function)
    }

    pub fn remove_objective_score_function(&mut self, id: &ObjectiveId) -> Option<ScoreFunction> {
        self.score_functions.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObjectiveId, &ScoreFunction)> {
        self.score_functions.iter()
    }

    pub fn len(&self) -> usize {
        self.score_functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.score_functions.is_empty()
    }
}

impl FromIterator<(ObjectiveId, ScoreFunction)> for ScoreFunctionMap {
    fn from_iter<I: IntoIterator<Item = (ObjectiveId, ScoreFunction)>>(iter: I) -> Self {
        ScoreFunctionMap {
            score_functions: iter.into_iter().collect(),
        }
    }
}
