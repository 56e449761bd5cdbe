//! Score function detail window - a child view on one primitive objective.

use tracing::debug;

use crate::domain::foundation::{DomainError, ErrorCode, ObjectiveId};
use crate::domain::value_model::{DomainValue, PrimitiveObjective, ScoreFunction};

use super::chart_handle::{ChartHandle, WindowId};
use super::interactions::ScoreFunctionInteraction;

/// A detail window opened from the chart.
///
/// Shares the chart's store, history and bus, so edits made here appear in
/// the main view and undo from either side. Closing (dropping) the window
/// deregisters it.
pub struct ScoreFunctionDetailView {
    handle: ChartHandle,
    objective_id: ObjectiveId,
    window_id: WindowId,
}

impl ScoreFunctionDetailView {
    /// # Errors
    /// - `UnknownObjective` when the objective is not in the chart
    /// - `ValidationFailed` when the objective is abstract
    pub fn open(handle: &ChartHandle, objective_id: ObjectiveId) -> Result<Self, DomainError> {
        {
            let charts = handle.charts();
            let objective = charts
                .chart()
                .objectives()
                .get(&objective_id)
                .ok_or_else(|| DomainError::unknown_objective(objective_id.as_str()))?;
            if !objective.is_primitive() {
                return Err(DomainError::new(
                    ErrorCode::ValidationFailed,
                    format!("'{}' has no score function to show", objective.name()),
                ));
            }
        }
        let window_id = handle.child_windows().register(objective_id.clone());
        debug!(objective = %objective_id, ?window_id, "Detail window opened");
        Ok(Self {
            handle: handle.clone(),
            objective_id,
            window_id,
        })
    }

    pub fn window_id(&self) -> WindowId {
        self.window_id
    }

    pub fn objective_id(&self) -> &ObjectiveId {
        &self.objective_id
    }

    pub fn handle(&self) -> &ChartHandle {
        &self.handle
    }

    pub fn objective(&self) -> Option<PrimitiveObjective> {
        self.handle
            .charts()
            .chart()
            .objectives()
            .get(&self.objective_id)
            .and_then(|objective| objective.as_primitive())
            .cloned()
    }

    /// The current user's function for this objective.
    pub fn score_function(&self) -> Option<ScoreFunction> {
        self.handle
            .charts()
            .current_user()
            .and_then(|user| user.score_function_map.get_objective_score_function(&self.objective_id))
            .cloned()
    }

    /// Sets one element's score as a single undoable edit. Returns false
    /// when nothing changed.
    pub fn set_element_score(&self, element: &DomainValue, score: f64) -> Result<bool, DomainError> {
        let mut edit = ScoreFunctionInteraction::new(self.handle.clone());
        if !edit.begin(&self.objective_id)? {
            return Ok(false);
        }
        if let Err(err) = edit.set_score(element, score) {
            edit.end()?;
            return Err(err);
        }
        edit.end()
    }

    pub fn undo(&self) -> Result<bool, DomainError> {
        self.handle.undo()
    }

    pub fn redo(&self) -> Result<bool, DomainError> {
        self.handle.redo()
    }
}

impl Drop for ScoreFunctionDetailView {
    fn drop(&mut self) {
        self.handle.child_windows().deregister(self.window_id);
        debug!(objective = %self.objective_id, "Detail window closed");
    }
}
