//! Pump interaction - click an objective to grow or shrink its weight.

use tracing::debug;

use crate::application::ChartHandle;
use crate::domain::foundation::{DomainError, ObjectiveId};
use crate::domain::memento::ChartChange;
use crate::domain::value_model::WeightMap;

use super::spread_weight;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpDirection {
    Increase,
    Decrease,
}

impl PumpDirection {
    fn sign(self) -> f64 {
        match self {
            PumpDirection::Increase => 1.0,
            PumpDirection::Decrease => -1.0,
        }
    }
}

/// Moves a fixed step of weight into or out of the clicked objective.
pub struct PumpInteraction {
    handle: ChartHandle,
    direction: PumpDirection,
}

impl PumpInteraction {
    pub fn new(handle: ChartHandle, direction: PumpDirection) -> Self {
        Self { handle, direction }
    }

    pub fn direction(&self) -> PumpDirection {
        self.direction
    }

    pub fn set_direction(&mut self, direction: PumpDirection) {
        self.direction = direction;
    }

    /// Pumps one step on `objective_id` for the current user.
    ///
    /// Returns false, adding no history, when there is no current user or
    /// the weights are already at their limit.
    ///
    /// # Errors
    /// `UnknownObjective` when the objective is not in the chart.
    pub fn pump(&self, objective_id: &ObjectiveId) -> Result<bool, DomainError> {
        let amount = self.handle.config().pump_amount() * self.direction.sign();
        let pumped = {
            let mut charts = self.handle.charts_mut();
            let tree = charts.chart().objectives();
            if !tree.contains(objective_id) {
                return Err(DomainError::unknown_objective(objective_id.as_str()));
            }
            let primitives = tree.primitive_ids();
            let targets = tree.primitive_descendants(objective_id);
            let Some(user) = charts.current_user() else {
                debug!(objective = %objective_id, "Pump ignored without a current user");
                return Ok(false);
            };
            let before = user.weight_map.get_memento();
            let after = pump_weights(&before, &primitives, &targets, amount)?;
            if after == before {
                return Ok(false);
            }
            self.handle.history_mut().save_weight_map_record(&before);
            charts.set_current_weight_map(after.clone());
            debug!(objective = %objective_id, amount, "Pumped weight");
            after
        };
        self.handle.publish(ChartChange::WeightMap(pumped))?;
        Ok(true)
    }
}

/// Moves `amount` of weight onto `targets` (negative moves it off), taking
/// it from every other primitive in proportion to their weights.
///
/// The move is clamped so no weight goes negative; the total is conserved.
pub fn pump_weights(
    weights: &WeightMap,
    primitives: &[ObjectiveId],
    targets: &[ObjectiveId],
    amount: f64,
) -> Result<WeightMap, DomainError> {
    if !amount.is_finite() {
        return Err(DomainError::validation("amount", "Pump amount must be finite"));
    }
    let others: Vec<ObjectiveId> = primitives
        .iter()
        .filter(|id| !targets.contains(id))
        .cloned()
        .collect();
    let target_weight: f64 = targets.iter().map(|id| weights.get_objective_weight(id)).sum();
    let other_weight: f64 = others.iter().map(|id| weights.get_objective_weight(id)).sum();

    let delta = if targets.is_empty() || others.is_empty() {
        0.0
    } else {
        amount.clamp(-target_weight, other_weight)
    };

    let mut pumped = weights.get_memento();
    if delta != 0.0 {
        spread_weight(&mut pumped, targets, delta)?;
        spread_weight(&mut pumped, &others, -delta)?;
    }
    Ok(pumped)
}
