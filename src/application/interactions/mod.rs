//! Interaction handlers - user gestures that edit the chart.
//!
//! Every gesture follows the same order: capture an undo record, mutate the
//! chart, then publish the change once all borrows are released. Gestures
//! that end where they started discard their record.

mod pump;
mod reorder_alternatives;
mod reorder_objectives;
mod resize_weights;
mod score_function_edit;
mod sort_alternatives;

pub use pump::{pump_weights, PumpDirection, PumpInteraction};
pub use reorder_alternatives::ReorderAlternativesInteraction;
pub use reorder_objectives::ReorderObjectivesInteraction;
pub use resize_weights::ResizeWeightsInteraction;
pub use score_function_edit::ScoreFunctionInteraction;
pub use sort_alternatives::SortAlternativesInteraction;

use crate::domain::foundation::{DomainError, ObjectiveId};
use crate::domain::value_model::WeightMap;

/// Adds `amount` across `targets` in proportion to their current weights,
/// evenly when they are all zero. Results are floored at zero.
pub(crate) fn spread_weight(
    weights: &mut WeightMap,
    targets: &[ObjectiveId],
    amount: f64,
) -> Result<(), DomainError> {
    if targets.is_empty() || amount == 0.0 {
        return Ok(());
    }
    let current: Vec<f64> = targets.iter().map(|id| weights.get_objective_weight(id)).collect();
    let total: f64 = current.iter().sum();
    for (id, weight) in targets.iter().zip(current) {
        let share = if total > 0.0 {
            amount * weight / total
        } else {
            amount / targets.len() as f64
        };
        weights.set_objective_weight(id.clone(), (weight + share).max(0.0))?;
    }
    Ok(())
}
