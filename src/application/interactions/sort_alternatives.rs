//! Sort alternatives interaction - reorder all alternatives in one step.

use tracing::{debug, info};

use crate::application::ChartHandle;
use crate::domain::foundation::{AlternativeId, DomainError, ObjectiveId};
use crate::domain::layout::{alphabetical_order, objective_score_order};
use crate::domain::memento::{AlternativeOrderRecord, ChartChange, ChartMemento};

/// Sorts the alternatives by name, by score, or back to the loaded order.
///
/// Each sort that changes the order is one undoable step.
pub struct SortAlternativesInteraction {
    handle: ChartHandle,
}

impl SortAlternativesInteraction {
    pub fn new(handle: ChartHandle) -> Self {
        Self { handle }
    }

    /// Case-insensitive ascending by name.
    pub fn sort_alphabetically(&self) -> Result<bool, DomainError> {
        let order = alphabetical_order(self.handle.charts().chart());
        self.apply(order, "alphabetical")
    }

    /// Descending by the summed weighted score over `objective_id` and its
    /// primitive descendants, across all users.
    pub fn sort_by_objective(&self, objective_id: &ObjectiveId) -> Result<bool, DomainError> {
        let order = {
            let charts = self.handle.charts();
            let tree = charts.chart().objectives();
            if !tree.contains(objective_id) {
                return Err(DomainError::unknown_objective(objective_id.as_str()));
            }
            let objectives = tree.primitive_descendants(objective_id);
            objective_score_order(charts.chart(), &objectives)
        };
        self.apply(order, "objective score")
    }

    /// Restores the order the alternatives had when the chart was loaded.
    pub fn reset_order(&self) -> Result<bool, DomainError> {
        let order = {
            let original = AlternativeOrderRecord::from_order(self.handle.viewer().original_alternative_order());
            original.target_order(&self.handle.charts().chart().alternative_order())
        };
        self.apply(order, "original")
    }

    fn apply(&self, order: Vec<AlternativeId>, method: &str) -> Result<bool, DomainError> {
        {
            let mut charts = self.handle.charts_mut();
            if charts.chart().alternative_order() == order {
                debug!(method, "Sort left the order unchanged");
                return Ok(false);
            }
            let record = ChartMemento::AlternativeOrder(AlternativeOrderRecord::capture(charts.chart()));
            self.handle.history_mut().save_record(record.clone());
            if let Err(err) = charts.chart_mut().reorder_alternatives(&order) {
                self.handle.history_mut().discard_record(&record);
                return Err(err);
            }
        }
        info!(method, "Alternatives sorted");
        self.handle.publish(ChartChange::AlternativeOrderChanged)?;
        Ok(true)
    }
}
