//! Score function interaction - drag an element's score up or down.

use tracing::debug;

use crate::application::ChartHandle;
use crate::domain::foundation::{DomainError, ErrorCode, ObjectiveId};
use crate::domain::memento::{ChartChange, ChartMemento, ScoreFunctionRecord};
use crate::domain::value_model::{DomainValue, ScoreFunction};

struct ScoreGesture {
    objective_id: ObjectiveId,
    start: ScoreFunction,
}

/// Edits the current user's score function for one objective.
///
/// Usable from the main view and from a detail window holding a clone of
/// the same handle.
pub struct ScoreFunctionInteraction {
    handle: ChartHandle,
    gesture: Option<ScoreGesture>,
}

impl ScoreFunctionInteraction {
    pub fn new(handle: ChartHandle) -> Self {
        Self { handle, gesture: None }
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Captures the function's starting state. Returns false when there is
    /// no current user.
    ///
    /// # Errors
    /// - `UnknownObjective` when the current user has no function for the objective
    /// - `ValidationFailed` when the function is immutable
    pub fn begin(&mut self, objective_id: &ObjectiveId) -> Result<bool, DomainError> {
        let start = {
            let charts = self.handle.charts();
            let Some(user) = charts.current_user() else {
                return Ok(false);
            };
            let function = user
                .score_function_map
                .get_objective_score_function(objective_id)
                .ok_or_else(|| DomainError::unknown_objective(objective_id.as_str()))?;
            if function.is_immutable() {
                return Err(DomainError::new(
                    ErrorCode::ValidationFailed,
                    format!("The score function for '{}' is locked", objective_id),
                ));
            }
            function.get_memento()
        };
        self.handle
            .history_mut()
            .save_score_function_record(objective_id.clone(), &start);
        debug!(objective = %objective_id, "Score function edit started");
        self.gesture = Some(ScoreGesture {
            objective_id: objective_id.clone(),
            start,
        });
        Ok(true)
    }

    /// Sets one element's score, clamped to [0, 1], and publishes the change.
    pub fn set_score(&mut self, element: &DomainValue, score: f64) -> Result<(), DomainError> {
        let Some(gesture) = &self.gesture else {
            return Ok(());
        };
        let updated = {
            let mut charts = self.handle.charts_mut();
            let Some(user) = charts.current_user_mut() else {
                return Ok(());
            };
            let function = user
                .score_function_map
                .get_objective_score_function_mut(&gesture.objective_id)
                .ok_or_else(|| DomainError::unknown_objective(gesture.objective_id.as_str()))?;
            function.set_element_score(element, score.clamp(0.0, 1.0))?;
            ScoreFunctionRecord::new(gesture.objective_id.clone(), function)
        };
        self.handle.publish(ChartChange::ScoreFunction(updated))
    }

    /// Ends the gesture. An unchanged function discards its record and
    /// returns false.
    pub fn end(&mut self) -> Result<bool, DomainError> {
        let Some(gesture) = self.gesture.take() else {
            return Ok(false);
        };
        let unchanged = self.handle.charts().current_user().map_or(true, |user| {
            user.score_function_map
                .get_objective_score_function(&gesture.objective_id)
                .map_or(true, |function| function == &gesture.start)
        });
        if unchanged {
            let record = ChartMemento::ScoreFunction(ScoreFunctionRecord::new(gesture.objective_id.clone(), &gesture.start));
            self.handle.history_mut().discard_record(&record);
            debug!(objective = %gesture.objective_id, "Score function edit ended without change");
            return Ok(false);
        }
        Ok(true)
    }
}
