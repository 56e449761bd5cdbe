//! ValueChartService - holds the active chart and resolves the current user.

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::domain::foundation::{DomainError, ErrorCode, ObjectiveId};
use crate::domain::value_model::{ScoreFunction, User, ValueChart, WeightMap};

/// State container for the single active chart.
///
/// The current user is the user whose username matches the externally
/// supplied identity, falling back to the first user. Only a chart with no
/// users has no current user.
///
/// The maximum weight map is cached. Weight and user mutations made through
/// this service refresh it; callers that edit weights through
/// [`ValueChartService::chart_mut`] must call
/// [`ValueChartService::update_maximum_weight_map`] themselves.
#[derive(Debug, Clone)]
pub struct ValueChartService {
    chart: ValueChart,
    current_username: Option<String>,
    maximum_weight_map: WeightMap,
}

impl ValueChartService {
    pub fn new(chart: ValueChart, current_username: Option<String>) -> Self {
        let mut service = Self {
            chart,
            current_username,
            maximum_weight_map: WeightMap::new(),
        };
        service.update_maximum_weight_map();
        info!(chart = %service.chart.name, users = service.chart.users().len(), "Chart loaded");
        service
    }

    pub fn chart(&self) -> &ValueChart {
        &self.chart
    }

    pub fn chart_mut(&mut self) -> &mut ValueChart {
        &mut self.chart
    }

    /// Replaces the active chart.
    pub fn set_chart(&mut self, chart: ValueChart) {
        self.chart = chart;
        self.update_maximum_weight_map();
    }

    pub fn set_current_username(&mut self, username: Option<String>) {
        self.current_username = username;
    }

    /// The resolved current user.
    pub fn current_user(&self) -> Option<&User> {
        self.current_user_index().map(|index| &self.chart.users()[index])
    }

    pub fn current_user_mut(&mut self) -> Option<&mut User> {
        let username = self.current_user()?.username().to_string();
        self.chart.get_user_mut(&username)
    }

    pub fn current_username(&self) -> Option<&str> {
        self.current_user().map(User::username)
    }

    fn current_user_index(&self) -> Option<usize> {
        let users = self.chart.users();
        if users.is_empty() {
            return None;
        }
        let matched = self
            .current_username
            .as_deref()
            .and_then(|name| users.iter().position(|u| u.username() == name));
        Some(matched.unwrap_or(0))
    }

    pub fn is_individual(&self) -> bool {
        self.chart.is_individual()
    }

    pub fn is_group(&self) -> bool {
        self.chart.is_group()
    }

    /// Per-objective maximum weight across users, for layout sizing only.
    pub fn get_maximum_weight_map(&self) -> &WeightMap {
        &self.maximum_weight_map
    }

    /// Recomputes the cached maximum weight map.
    pub fn update_maximum_weight_map(&mut self) {
        self.maximum_weight_map = compute_maximum_weight_map(&self.chart);
        debug!(entries = self.maximum_weight_map.len(), "Maximum weight map updated");
    }

    /// Replaces the current user's weight map. Returns false when there is
    /// no current user.
    pub fn set_current_weight_map(&mut self, weight_map: WeightMap) -> bool {
        let Some(user) = self.current_user_mut() else {
            return false;
        };
        user.weight_map = weight_map;
        self.update_maximum_weight_map();
        true
    }

    /// Replaces the current user's score function for one objective.
    /// Returns false when there is no current user.
    ///
    /// # Errors
    /// - `UnknownObjective` when `objective_id` is not a primitive objective
    /// - `IncompatibleScoreFunction` when the function does not fit the domain
    pub fn set_current_score_function(
        &mut self,
        objective_id: &ObjectiveId,
        function: ScoreFunction,
    ) -> Result<bool, DomainError> {
        let primitive = self
            .chart
            .objectives()
            .get(objective_id)
            .and_then(|o| o.as_primitive())
            .ok_or_else(|| DomainError::unknown_objective(objective_id.as_str()))?;
        if !primitive.domain.accepts(&function) {
            return Err(DomainError::new(
                ErrorCode::IncompatibleScoreFunction,
                format!("A {} function does not fit '{}'", function.kind(), primitive.name),
            ));
        }
        let Some(user) = self.current_user_mut() else {
            return Ok(false);
        };
        user.score_function_map
            .set_objective_score_function(objective_id.clone(), function);
        Ok(true)
    }

    pub fn add_user(&mut self, user: User) -> Result<(), DomainError> {
        self.chart.add_user(user)?;
        self.update_maximum_weight_map();
        Ok(())
    }

    pub fn remove_user(&mut self, username: &str) -> Option<User> {
        let removed = self.chart.remove_user(username);
        if removed.is_some() {
            self.update_maximum_weight_map();
        }
        removed
    }
}

fn compute_maximum_weight_map(chart: &ValueChart) -> WeightMap {
    match chart.users() {
        [] => WeightMap::new(),
        [only] => only.weight_map.get_memento(),
        users => {
            let mut maximum: BTreeMap<ObjectiveId, f64> = BTreeMap::new();
            for user in users {
                for (id, weight) in user.weight_map.iter() {
                    let entry = maximum.entry(id.clone()).or_insert(weight);
                    if weight > *entry {
                        *entry = weight;
                    }
                }
            }
            maximum.into_iter().collect()
        }
    }
}
