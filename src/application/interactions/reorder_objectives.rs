//! Reorder objectives interaction - drag a label among its siblings.

use tracing::debug;

use crate::application::ChartHandle;
use crate::domain::foundation::{DomainError, ObjectiveId};
use crate::domain::layout::JumpPoints;
use crate::domain::memento::{ChartChange, ChartMemento, ObjectivesRecord};

struct ObjectiveDrag {
    objective_id: ObjectiveId,
    original_index: usize,
    candidate_index: usize,
    jump_points: JumpPoints,
    record: ChartMemento,
}

/// Moves an objective within its sibling list, keeping labels and rows in
/// step with the tree.
pub struct ReorderObjectivesInteraction {
    handle: ChartHandle,
    drag: Option<ObjectiveDrag>,
}

impl ReorderObjectivesInteraction {
    pub fn new(handle: ChartHandle) -> Self {
        Self { handle, drag: None }
    }

    pub fn is_active(&self) -> bool {
        self.drag.is_some()
    }

    /// Starts dragging `objective_id`. Returns false, with nothing recorded,
    /// when the objective has no siblings to trade places with.
    pub fn begin(&mut self, objective_id: &ObjectiveId) -> Result<bool, DomainError> {
        let drag = {
            let charts = self.handle.charts();
            let chart = charts.chart();
            let tree = chart.objectives();
            if !tree.contains(objective_id) {
                return Err(DomainError::unknown_objective(objective_id.as_str()));
            }
            let siblings = tree.siblings(objective_id);
            if siblings.len() <= 1 {
                debug!(objective = %objective_id, "Reorder ignored for an only child");
                return Ok(false);
            }
            let original_index = siblings
                .iter()
                .position(|id| id == objective_id)
                .ok_or_else(|| DomainError::unknown_objective(objective_id.as_str()))?;
            let maximum_weights = charts.get_maximum_weight_map();
            let extents: Vec<f64> = siblings
                .iter()
                .map(|id| chart.objective_weight(maximum_weights, id))
                .collect();
            let record = ChartMemento::Objectives(ObjectivesRecord::capture(chart));
            self.handle.history_mut().save_record(record.clone());
            ObjectiveDrag {
                objective_id: objective_id.clone(),
                original_index,
                candidate_index: original_index,
                jump_points: JumpPoints::from_extents(&extents),
                record,
            }
        };
        self.drag = Some(drag);
        Ok(true)
    }

    /// Updates the drop target from the total displacement since `begin`,
    /// returning the candidate index.
    pub fn drag(&mut self, displacement: f64) -> Option<usize> {
        let drag = self.drag.as_mut()?;
        drag.candidate_index = drag.jump_points.candidate_index(drag.original_index, displacement);
        Some(drag.candidate_index)
    }

    /// Drops the objective at its candidate index. Returns false, discarding
    /// the record, when it lands where it started.
    pub fn end(&mut self) -> Result<bool, DomainError> {
        let Some(drag) = self.drag.take() else {
            return Ok(false);
        };
        if drag.candidate_index == drag.original_index {
            self.handle.history_mut().discard_record(&drag.record);
            return Ok(false);
        }
        {
            let mut charts = self.handle.charts_mut();
            if let Err(err) = charts.chart_mut().move_objective(&drag.objective_id, drag.candidate_index) {
                self.handle.history_mut().discard_record(&drag.record);
                return Err(err);
            }
            self.handle
                .viewer_mut()
                .move_label(charts.chart(), &drag.objective_id, drag.candidate_index)?;
        }
        debug!(
            objective = %drag.objective_id,
            from = drag.original_index,
            to = drag.candidate_index,
            "Objective moved"
        );
        self.handle.publish(ChartChange::ObjectivesChanged)?;
        Ok(true)
    }
}
