//! Reorder alternatives interaction - drag an alternative along the axis.

use tracing::debug;

use crate::application::ChartHandle;
use crate::domain::foundation::{AlternativeId, DomainError};
use crate::domain::layout::JumpPoints;
use crate::domain::memento::{AlternativeOrderRecord, ChartChange, ChartMemento};

struct AlternativeDrag {
    order: Vec<AlternativeId>,
    original_index: usize,
    candidate_index: usize,
    jump_points: JumpPoints,
    record: ChartMemento,
}

/// Moves one alternative to a new position in the display order.
pub struct ReorderAlternativesInteraction {
    handle: ChartHandle,
    drag: Option<AlternativeDrag>,
}

impl ReorderAlternativesInteraction {
    pub fn new(handle: ChartHandle) -> Self {
        Self { handle, drag: None }
    }

    pub fn is_active(&self) -> bool {
        self.drag.is_some()
    }

    /// Starts dragging `alternative_id`. Returns false, with nothing
    /// recorded, when the chart has a single alternative.
    pub fn begin(&mut self, alternative_id: &AlternativeId) -> Result<bool, DomainError> {
        let drag = {
            let charts = self.handle.charts();
            let order = charts.chart().alternative_order();
            let original_index = order
                .iter()
                .position(|id| id == alternative_id)
                .ok_or_else(|| DomainError::unknown_alternative(alternative_id.as_str()))?;
            if order.len() <= 1 {
                return Ok(false);
            }
            let record = ChartMemento::AlternativeOrder(AlternativeOrderRecord::from_order(&order));
            self.handle.history_mut().save_record(record.clone());
            AlternativeDrag {
                jump_points: JumpPoints::uniform(order.len(), self.handle.config().alternative_extent),
                order,
                original_index,
                candidate_index: original_index,
                record,
            }
        };
        self.drag = Some(drag);
        Ok(true)
    }

    pub fn drag(&mut self, displacement: f64) -> Option<usize> {
        let drag = self.drag.as_mut()?;
        drag.candidate_index = drag.jump_points.candidate_index(drag.original_index, displacement);
        Some(drag.candidate_index)
    }

    /// Drops the alternative at its candidate index. Returns false,
    /// discarding the record, when the order is unchanged.
    pub fn end(&mut self) -> Result<bool, DomainError> {
        let Some(mut drag) = self.drag.take() else {
            return Ok(false);
        };
        if drag.candidate_index == drag.original_index {
            self.handle.history_mut().discard_record(&drag.record);
            return Ok(false);
        }
        let moved = drag.order.remove(drag.original_index);
        drag.order.insert(drag.candidate_index, moved);
        if let Err(err) = self.handle.charts_mut().chart_mut().reorder_alternatives(&drag.order) {
            self.handle.history_mut().discard_record(&drag.record);
            return Err(err);
        }
        debug!(
            from = drag.original_index,
            to = drag.candidate_index,
            "Alternative moved"
        );
        self.handle.publish(ChartChange::AlternativeOrderChanged)?;
        Ok(true)
    }
}
