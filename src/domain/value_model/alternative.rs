//! Alternatives - candidate decision options with one outcome per primitive objective.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{AlternativeId, ObjectiveId};

use super::domain::DomainValue;

/// A candidate option.
///
/// Outcome values are not checked against objective domains here; the
/// parser that builds the chart guarantees membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    pub id: AlternativeId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    objective_values: BTreeMap<ObjectiveId, DomainValue>,
}

impl Alternative {
    /// Creates an alternative with no outcomes.
    pub fn new(id: AlternativeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            objective_values: BTreeMap::new(),
        }
    }

    /// Builder-style outcome assignment.
    pub fn with_value(mut self, objective: ObjectiveId, value: impl Into<DomainValue>) -> Self {
        self.objective_values.insert(objective, value.into());
        self
    }

    pub fn get_objective_value(&self, objective: &ObjectiveId) -> Option<&DomainValue> {
        self.objective_values.get(objective)
    }

    pub fn set_objective_value(&mut self, objective: ObjectiveId, value: DomainValue) {
        self.objective_values.insert(objective, value);
    }

    pub fn remove_objective_value(&mut self, objective: &ObjectiveId) -> Option<DomainValue> {
        self.objective_values.remove(objective)
    }

    pub fn objective_values(&self) -> impl Iterator<Item = (&ObjectiveId, &DomainValue)> {
        self.objective_values.iter()
    }
}
