//! WeightMap - per-user importance weight of each primitive objective.
//!
//! A WeightMap is a plain value type. It does not normalize itself; the
//! interactions that edit weights are responsible for keeping the total
//! constant.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{ObjectiveId, ValidationError};

/// Mapping from objective id to non-negative weight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightMap {
    weights: BTreeMap<ObjectiveId, f64>,
}

impl WeightMap {
    /// Creates an empty weight map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the weight of an objective, 0 when it has none.
    pub fn get_objective_weight(&self, id: &ObjectiveId) -> f64 {
        self.weights.get(id).copied().unwrap_or(0.0)
    }

    /// Returns true if the objective has an explicit entry.
    pub fn has_objective(&self, id: &ObjectiveId) -> bool {
        self.weights.contains_key(id)
    }

    /// Sets the weight of an objective.
    ///
    /// # Errors
    /// Rejects negative and non-finite weights.
    pub fn set_objective_weight(&mut self, id: ObjectiveId, weight: f64) -> Result<(), ValidationError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(ValidationError::out_of_range("weight", 0.0, f64::MAX, weight));
        }
        self.weights.insert(id, weight);
        Ok(())
    }

    pub fn remove_objective_weight(&mut self, id: &ObjectiveId) -> Option<f64> {
        self.weights.remove(id)
    }

    /// Sum over all entries.
    pub fn get_weight_total(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Weight as a fraction of the total; 0 when the total is 0.
    pub fn normalized_weight(&self, id: &ObjectiveId) -> f64 {
        let total = self.get_weight_total();
        if total > 0.0 {
            self.get_objective_weight(id) / total
        } else {
            0.0
        }
    }

    /// Returns a copy scaled so the weights sum to `total`.
    ///
    /// A map whose weights sum to 0 is returned unchanged.
    pub fn normalized(&self, total: f64) -> WeightMap {
        let current = self.get_weight_total();
        if current <= 0.0 {
            return self.clone();
        }
        let factor = total / current;
        WeightMap {
            weights: self
                .weights
                .iter()
                .map(|(id, weight)| (id.clone(), weight * factor))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObjectiveId, f64)> {
        self.weights.iter().map(|(id, weight)| (id, *weight))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Deep value copy used for undo records.
    pub fn get_memento(&self) -> WeightMap {
        self.clone()
    }
}

impl FromIterator<(ObjectiveId, f64)> for WeightMap {
    fn from_iter<I: IntoIterator<Item = (ObjectiveId, f64)>>(iter: I) -> Self {
        WeightMap {
            weights: iter.into_iter().collect(),
        }
    }
}
