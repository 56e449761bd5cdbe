//! Resize weights interaction - drag the boundary between two sibling labels.

use tracing::debug;

use crate::application::ChartHandle;
use crate::domain::foundation::{DomainError, ObjectiveId};
use crate::domain::memento::{ChartChange, ChartMemento};
use crate::domain::value_model::WeightMap;

use super::spread_weight;

struct ResizeGesture {
    grow: Vec<ObjectiveId>,
    shrink: Vec<ObjectiveId>,
    start: WeightMap,
}

/// Moves weight between two adjacent siblings while a boundary is dragged.
///
/// Deltas are in weight units and measured from the gesture start, so a
/// drag that returns to its origin restores the starting weights exactly.
pub struct ResizeWeightsInteraction {
    handle: ChartHandle,
    gesture: Option<ResizeGesture>,
}

impl ResizeWeightsInteraction {
    pub fn new(handle: ChartHandle) -> Self {
        Self { handle, gesture: None }
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Starts dragging the boundary after `first` and before `second`.
    ///
    /// Returns false when there is no current user.
    ///
    /// # Errors
    /// - `UnknownObjective` when either objective is missing
    /// - `ValidationFailed` when the two are not adjacent siblings
    pub fn begin(&mut self, first: &ObjectiveId, second: &ObjectiveId) -> Result<bool, DomainError> {
        let charts = self.handle.charts();
        let tree = charts.chart().objectives();
        for id in [first, second] {
            if !tree.contains(id) {
                return Err(DomainError::unknown_objective(id.as_str()));
            }
        }
        let siblings = tree.siblings(first);
        let first_index = siblings.iter().position(|s| s == first);
        let second_index = siblings.iter().position(|s| s == second);
        match (first_index, second_index) {
            (Some(a), Some(b)) if b == a + 1 => {}
            _ => {
                return Err(DomainError::validation(
                    "objectives",
                    format!("'{}' and '{}' are not adjacent siblings", first, second),
                ))
            }
        }
        let Some(user) = charts.current_user() else {
            return Ok(false);
        };
        let gesture = ResizeGesture {
            grow: tree.primitive_descendants(first),
            shrink: tree.primitive_descendants(second),
            start: user.weight_map.get_memento(),
        };
        self.handle.history_mut().save_weight_map_record(&gesture.start);
        debug!(first = %first, second = %second, "Weight resize started");
        self.gesture = Some(gesture);
        Ok(true)
    }

    /// Moves `delta` weight from the second objective to the first, measured
    /// from the gesture start and clamped so neither side goes negative.
    pub fn drag(&mut self, delta: f64) -> Result<(), DomainError> {
        let Some(gesture) = &self.gesture else {
            return Ok(());
        };
        if !delta.is_finite() {
            return Err(DomainError::validation("delta", "Drag delta must be finite"));
        }
        let grow_weight: f64 = gesture.grow.iter().map(|id| gesture.start.get_objective_weight(id)).sum();
        let shrink_weight: f64 = gesture.shrink.iter().map(|id| gesture.start.get_objective_weight(id)).sum();
        let moved = delta.clamp(-grow_weight, shrink_weight);

        let mut weights = gesture.start.get_memento();
        spread_weight(&mut weights, &gesture.grow, moved)?;
        spread_weight(&mut weights, &gesture.shrink, -moved)?;

        self.handle.charts_mut().set_current_weight_map(weights.clone());
        self.handle.publish(ChartChange::WeightMap(weights))
    }

    /// Ends the gesture. A gesture with no net change discards its record
    /// and returns false.
    pub fn end(&mut self) -> Result<bool, DomainError> {
        let Some(gesture) = self.gesture.take() else {
            return Ok(false);
        };
        let unchanged = self
            .handle
            .charts()
            .current_user()
            .map_or(true, |user| user.weight_map == gesture.start);
        if unchanged {
            self.handle
                .history_mut()
                .discard_record(&ChartMemento::WeightMap(gesture.start));
            debug!("Weight resize ended without change");
            return Ok(false);
        }
        Ok(true)
    }
}
