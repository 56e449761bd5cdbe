//! ValueChart aggregate root - objectives, alternatives and users.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::domain::foundation::{
    AlternativeId, ChartId, DomainError, ErrorCode, ObjectiveId, ValidationError,
};

use super::alternative::Alternative;
use super::objective::{Objective, ObjectiveTree};
use super::score_function_map::ScoreFunctionMap;
use super::user::User;
use super::weight_map::WeightMap;

/// The unit of persistence and of undo capture.
///
/// Deserialization goes through the same duplicate checks as
/// [`ValueChart::set_alternatives`] and [`ValueChart::add_user`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ValueChartData")]
pub struct ValueChart {
    #[serde(default)]
    id: ChartId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    objectives: ObjectiveTree,
    #[serde(default)]
    alternatives: Vec<Alternative>,
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueChartData {
    #[serde(default)]
    id: ChartId,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    creator: String,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    objectives: ObjectiveTree,
    #[serde(default)]
    alternatives: Vec<Alternative>,
    #[serde(default)]
    users: Vec<User>,
}

impl TryFrom<ValueChartData> for ValueChart {
    type Error = DomainError;

    fn try_from(data: ValueChartData) -> Result<Self, Self::Error> {
        let mut chart = Self {
            id: data.id,
            name: data.name,
            description: data.description,
            creator: data.creator,
            password: data.password,
            objectives: data.objectives,
            alternatives: Vec::new(),
            users: Vec::new(),
        };
        chart.set_alternatives(data.alternatives)?;
        for user in data.users {
            chart.add_user(user)?;
        }
        Ok(chart)
    }
}

impl ValueChart {
    /// Creates an empty chart.
    pub fn new(name: impl Into<String>, creator: impl Into<String>) -> Self {
        Self {
            id: ChartId::new(),
            name: name.into(),
            description: String::new(),
            creator: creator.into(),
            password: None,
            objectives: ObjectiveTree::new(),
            alternatives: Vec::new(),
            users: Vec::new(),
        }
    }

    pub fn id(&self) -> ChartId {
        self.id
    }

    // ───────────────────────────────────────────────────────────────
    // Objectives
    // ───────────────────────────────────────────────────────────────

    pub fn objectives(&self) -> &ObjectiveTree {
        &self.objectives
    }

    /// Replaces the whole objective tree. Used when restoring snapshots.
    pub fn set_objectives(&mut self, objectives: ObjectiveTree) {
        self.objectives = objectives;
    }

    /// Adds an objective. New primitives get each user's default score
    /// function and a zero weight.
    pub fn add_objective(&mut self, parent: Option<&ObjectiveId>, objective: Objective) -> Result<(), DomainError> {
        let primitive = objective.as_primitive().cloned();
        self.objectives.add_objective(parent, objective)?;
        if let Some(primitive) = primitive {
            for user in &mut self.users {
                user.score_function_map.set_objective_score_function(
                    primitive.id.clone(),
                    primitive.default_score_function.clone(),
                );
                user.weight_map.set_objective_weight(primitive.id.clone(), 0.0)?;
            }
        }
        Ok(())
    }

    /// Removes an objective subtree and every user/alternative entry keyed by it.
    pub fn remove_objective(&mut self, id: &ObjectiveId) -> Result<Vec<ObjectiveId>, DomainError> {
        let removed = self.objectives.remove_objective(id)?;
        for removed_id in &removed {
            for user in &mut self.users {
                user.weight_map.remove_objective_weight(removed_id);
                user.score_function_map.remove_objective_score_function(removed_id);
            }
            for alternative in &mut self.alternatives {
                alternative.remove_objective_value(removed_id);
            }
        }
        Ok(removed)
    }

    /// Moves an objective within its sibling list. Row order follows.
    pub fn move_objective(&mut self, id: &ObjectiveId, new_index: usize) -> Result<(), DomainError> {
        self.objectives.move_objective(id, new_index)
    }

    /// Looks up an objective by name.
    pub fn get_objective_by_name(&self, name: &str) -> Result<&Objective, DomainError> {
        self.objectives.get_by_name(name)
    }

    /// Weight of an objective under `weight_map`. Abstract objectives weigh
    /// the sum of their primitive descendants; an empty one weighs 0.
    pub fn objective_weight(&self, weight_map: &WeightMap, id: &ObjectiveId) -> f64 {
        self.objectives
            .primitive_descendants(id)
            .iter()
            .map(|primitive| weight_map.get_objective_weight(primitive))
            .sum()
    }

    /// Equal weight per primitive objective, summing to `total`.
    pub fn default_weight_map(&self, total: f64) -> WeightMap {
        let primitives = self.objectives.primitive_ids();
        if primitives.is_empty() {
            return WeightMap::new();
        }
        let share = total / primitives.len() as f64;
        primitives.into_iter().map(|id| (id, share)).collect()
    }

    /// Each primitive objective's default score function.
    pub fn default_score_function_map(&self) -> ScoreFunctionMap {
        self.objectives
            .all_primitive_objectives()
            .into_iter()
            .map(|o| (o.id.clone(), o.default_score_function.clone()))
            .collect()
    }

    // ───────────────────────────────────────────────────────────────
    // Alternatives
    // ───────────────────────────────────────────────────────────────

    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }

    pub fn get_alternative(&self, id: &AlternativeId) -> Option<&Alternative> {
        self.alternatives.iter().find(|a| &a.id == id)
    }

    /// Replaces the alternative list, rejecting duplicate ids.
    pub fn set_alternatives(&mut self, alternatives: Vec<Alternative>) -> Result<(), DomainError> {
        let mut seen = std::collections::HashSet::new();
        for alternative in &alternatives {
            if !seen.insert(&alternative.id) {
                return Err(ValidationError::duplicate("alternative id", alternative.id.as_str()).into());
            }
        }
        self.alternatives = alternatives;
        Ok(())
    }

    pub fn alternative_order(&self) -> Vec<AlternativeId> {
        self.alternatives.iter().map(|a| a.id.clone()).collect()
    }

    pub fn add_alternative(&mut self, alternative: Alternative) -> Result<(), DomainError> {
        if self.get_alternative(&alternative.id).is_some() {
            return Err(ValidationError::duplicate("alternative id", alternative.id.as_str()).into());
        }
        self.alternatives.push(alternative);
        Ok(())
    }

    pub fn remove_alternative(&mut self, id: &AlternativeId) -> Result<Alternative, DomainError> {
        let index = self
            .alternatives
            .iter()
            .position(|a| &a.id == id)
            .ok_or_else(|| DomainError::unknown_alternative(id.as_str()))?;
        Ok(self.alternatives.remove(index))
    }

    /// Reorders alternatives to follow `order`, which must be a permutation
    /// of the current ids. Nothing changes on error.
    pub fn reorder_alternatives(&mut self, order: &[AlternativeId]) -> Result<(), DomainError> {
        if order.len() != self.alternatives.len() {
            return Err(DomainError::validation(
                "alternative_order",
                format!(
                    "Order names {} alternatives but the chart has {}",
                    order.len(),
                    self.alternatives.len()
                ),
            ));
        }
        let mut by_id: HashMap<&AlternativeId, &Alternative> =
            self.alternatives.iter().map(|a| (&a.id, a)).collect();
        let mut reordered = Vec::with_capacity(order.len());
        for id in order {
            let alternative = by_id
                .remove(id)
                .ok_or_else(|| DomainError::unknown_alternative(id.as_str()))?;
            reordered.push(alternative.clone());
        }
        self.alternatives = reordered;
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────
    // Users
    // ───────────────────────────────────────────────────────────────

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn get_user(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username() == username)
    }

    pub fn get_user_mut(&mut self, username: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.username() == username)
    }

    pub fn add_user(&mut self, user: User) -> Result<(), DomainError> {
        if self.get_user(user.username()).is_some() {
            return Err(ValidationError::duplicate("username", user.username()).into());
        }
        self.users.push(user);
        Ok(())
    }

    pub fn remove_user(&mut self, username: &str) -> Option<User> {
        let index = self.users.iter().position(|u| u.username() == username)?;
        Some(self.users.remove(index))
    }

    /// Exactly one user.
    pub fn is_individual(&self) -> bool {
        self.users.len() == 1
    }

    /// More than one user.
    pub fn is_group(&self) -> bool {
        self.users.len() > 1
    }

    // ───────────────────────────────────────────────────────────────
    // Scoring
    // ───────────────────────────────────────────────────────────────

    /// Score of an alternative on one primitive objective under a user's function.
    pub fn score(&self, user: &User, alternative: &Alternative, objective: &ObjectiveId) -> Result<f64, DomainError> {
        let function = user
            .score_function_map
            .get_objective_score_function(objective)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::UnknownObjective,
                    format!("User '{}' has no score function for '{}'", user.username(), objective),
                )
            })?;
        let value = alternative.get_objective_value(objective).ok_or_else(|| {
            DomainError::new(
                ErrorCode::UnknownElement,
                format!("Alternative '{}' has no value for '{}'", alternative.name, objective),
            )
        })?;
        function.get_score(value)
    }

    /// Σ weight × score over the primitives below `objectives`.
    ///
    /// Objectives that cannot be scored contribute 0.
    pub fn weighted_score(&self, user: &User, alternative: &Alternative, objectives: &[ObjectiveId]) -> f64 {
        let mut total = 0.0;
        for objective in objectives {
            for primitive in self.objectives.primitive_descendants(objective) {
                let weight = user.weight_map.get_objective_weight(&primitive);
                match self.score(user, alternative, &primitive) {
                    Ok(score) => total += weight * score,
                    Err(err) => warn!(
                        alternative = %alternative.id,
                        objective = %primitive,
                        error = %err,
                        "Unscorable cell treated as zero"
                    ),
                }
            }
        }
        total
    }

    /// Weighted score over every primitive objective.
    pub fn total_score(&self, user: &User, alternative: &Alternative) -> f64 {
        let roots = self.objectives.roots().to_vec();
        self.weighted_score(user, alternative, &roots)
    }

    /// Lists every missing weight, score function and outcome value.
    ///
    /// Nothing here is enforced implicitly; callers decide what to do with
    /// an incomplete chart.
    pub fn validate(&self) -> Vec<DomainError> {
        let mut problems = Vec::new();
        for primitive in self.objectives.all_primitive_objectives() {
            for user in &self.users {
                if !user.weight_map.has_objective(&primitive.id) {
                    problems.push(
                        DomainError::validation("weight_map", format!("User '{}' has no weight for '{}'", user.username(), primitive.name))
                            .with_detail("objective", primitive.id.as_str()),
                    );
                }
                match user.score_function_map.get_objective_score_function(&primitive.id) {
                    None => problems.push(
                        DomainError::validation("score_function_map", format!("User '{}' has no score function for '{}'", user.username(), primitive.name))
                            .with_detail("objective", primitive.id.as_str()),
                    ),
                    Some(function) if !primitive.domain.accepts(function) => problems.push(DomainError::new(
                        ErrorCode::IncompatibleScoreFunction,
                        format!("User '{}' has a {} function for '{}'", user.username(), function.kind(), primitive.name),
                    )),
                    Some(_) => {}
                }
            }
            for alternative in &self.alternatives {
                if alternative.get_objective_value(&primitive.id).is_none() {
                    problems.push(
                        DomainError::validation("objective_values", format!("Alternative '{}' has no value for '{}'", alternative.name, primitive.name))
                            .with_detail("alternative", alternative.id.as_str()),
                    );
                }
            }
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_model::{
        AbstractObjective, ContinuousDomain, Domain, PrimitiveObjective,
    };

    fn oid(s: &str) -> ObjectiveId {
        ObjectiveId::new(s).unwrap()
    }

    fn aid(s: &str) -> AlternativeId {
        AlternativeId::new(s).unwrap()
    }

    fn percent() -> Domain {
        Domain::Continuous(ContinuousDomain::new(0.0, 100.0, None).unwrap())
    }

    fn chart() -> ValueChart {
        let mut chart = ValueChart::new("Laptops", "sam");
        chart
            .add_objective(None, Objective::Abstract(AbstractObjective::new(oid("root"), "Root")))
            .unwrap();
        chart
            .add_objective(Some(&oid("root")), Objective::Primitive(PrimitiveObjective::new(oid("cost"), "Cost", percent())))
            .unwrap();
        chart
            .add_objective(Some(&oid("root")), Objective::Primitive(PrimitiveObjective::new(oid("quality"), "Quality", percent())))
            .unwrap();
        chart
            .add_alternative(Alternative::new(aid("a"), "A").with_value(oid("cost"), 10.0).with_value(oid("quality"), 80.0))
            .unwrap();
        chart
            .add_alternative(Alternative::new(aid("b"), "B").with_value(oid("cost"), 90.0).with_value(oid("quality"), 20.0))
            .unwrap();
        let user = User::new("sam", chart.default_weight_map(1.0), chart.default_score_function_map()).unwrap();
        chart.add_user(user).unwrap();
        chart
    }

    #[test]
    fn default_weight_map_is_uniform() {
        let chart = chart();
        let map = chart.default_weight_map(1.0);
        assert_eq!(map.get_objective_weight(&oid("cost")), 0.5);
        assert_eq!(map.get_objective_weight(&oid("quality")), 0.5);
    }

    #[test]
    fn abstract_weight_is_sum_of_primitives() {
        let chart = chart();
        let user = &chart.users()[0];
        assert!((chart.objective_weight(&user.weight_map, &oid("root")) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn weighted_score_uses_default_linear_functions() {
        let chart = chart();
        let user = &chart.users()[0];
        let a = chart.get_alternative(&aid("a")).unwrap();
        // 0.5 * 0.1 + 0.5 * 0.8
        assert!((chart.total_score(user, a) - 0.45).abs() < 1e-12);
        assert!((chart.weighted_score(user, a, &[oid("quality")]) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn cardinality_decides_individual_or_group() {
        let mut chart = chart();
        assert!(chart.is_individual());
        let second = User::new("kim", chart.default_weight_map(1.0), chart.default_score_function_map()).unwrap();
        chart.add_user(second).unwrap();
        assert!(chart.is_group());
        assert!(chart.add_user(User::new("kim", WeightMap::new(), ScoreFunctionMap::new()).unwrap()).is_err());
    }

    #[test]
    fn reorder_alternatives_requires_permutation() {
        let mut chart = chart();
        chart.reorder_alternatives(&[aid("b"), aid("a")]).unwrap();
        assert_eq!(chart.alternative_order(), vec![aid("b"), aid("a")]);
        assert!(chart.reorder_alternatives(&[aid("b"), aid("b")]).is_err());
        assert!(chart.reorder_alternatives(&[aid("a")]).is_err());
        assert_eq!(chart.alternative_order(), vec![aid("b"), aid("a")]);
    }

    #[test]
    fn adding_primitive_extends_every_user() {
        let mut chart = chart();
        chart
            .add_objective(Some(&oid("root")), Objective::Primitive(PrimitiveObjective::new(oid("weight"), "Weight", percent())))
            .unwrap();
        let user = &chart.users()[0];
        assert!(user.score_function_map.get_objective_score_function(&oid("weight")).is_some());
        assert_eq!(user.weight_map.get_objective_weight(&oid("weight")), 0.0);
    }

    #[test]
    fn removing_objective_cleans_dependents() {
        let mut chart = chart();
        chart.remove_objective(&oid("cost")).unwrap();
        let user = &chart.users()[0];
        assert!(!user.weight_map.has_objective(&oid("cost")));
        assert!(chart.alternatives()[0].get_objective_value(&oid("cost")).is_none());
        assert!(chart.validate().is_empty());
    }

    #[test]
    fn validate_reports_missing_outcomes() {
        let mut chart = chart();
        chart.add_alternative(Alternative::new(aid("c"), "C")).unwrap();
        let problems = chart.validate();
        assert_eq!(problems.len(), 2);
        assert!(problems.iter().all(|p| p.code == ErrorCode::ValidationFailed));
    }

    #[test]
    fn get_objective_by_name_propagates_unknown() {
        let chart = chart();
        assert_eq!(chart.get_objective_by_name("Cost").unwrap().id(), &oid("cost"));
        assert_eq!(
            chart.get_objective_by_name("Speed").unwrap_err().code,
            ErrorCode::UnknownObjective
        );
    }

    #[test]
    fn json_with_unique_ids_loads() {
        let json = serde_json::to_string(&chart()).unwrap();
        let loaded: ValueChart = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.alternative_order(), vec![aid("a"), aid("b")]);
        assert!(loaded.is_individual());
    }

    #[test]
    fn json_with_duplicate_alternative_ids_is_rejected() {
        let mut value = serde_json::to_value(chart()).unwrap();
        value["alternatives"][1]["id"] = serde_json::json!("a");
        let err = serde_json::from_value::<ValueChart>(value).unwrap_err();
        assert!(err.to_string().contains("alternative id"));
    }

    #[test]
    fn json_with_duplicate_usernames_is_rejected() {
        let mut value = serde_json::to_value(chart()).unwrap();
        let user = value["users"][0].clone();
        value["users"].as_array_mut().unwrap().push(user);
        assert!(serde_json::from_value::<ValueChart>(value).is_err());
    }

    #[test]
    fn json_with_zero_interval_step_is_rejected() {
        let mut value = serde_json::to_value(chart()).unwrap();
        let cost = &mut value["objectives"][0]["subObjectives"][0];
        cost["domain"] = serde_json::json!({"type": "interval", "min": 0, "max": 10, "interval": 0});
        cost.as_object_mut().unwrap().remove("defaultScoreFunction");
        assert!(serde_json::from_value::<ValueChart>(value).is_err());
    }
}
