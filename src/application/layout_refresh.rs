//! LayoutRefreshHandler - recomputes the derived layout on chart changes.

use std::cell::RefCell;
use std::rc::Weak;

use tracing::debug;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::memento::ChartChange;
use crate::ports::ChartChangeHandler;

use super::value_chart_service::ValueChartService;
use super::viewer_service::ValueChartViewerService;

/// Keeps the viewer's rows and labels current.
///
/// Holds weak references so a dropped chart handle is not kept alive by
/// its own bus subscription.
pub struct LayoutRefreshHandler {
    charts: Weak<RefCell<ValueChartService>>,
    viewer: Weak<RefCell<ValueChartViewerService>>,
}

impl LayoutRefreshHandler {
    pub fn new(
        charts: Weak<RefCell<ValueChartService>>,
        viewer: Weak<RefCell<ValueChartViewerService>>,
    ) -> Self {
        Self { charts, viewer }
    }
}

impl ChartChangeHandler for LayoutRefreshHandler {
    fn handle(&self, change: &ChartChange) -> Result<(), DomainError> {
        let (Some(charts), Some(viewer)) = (self.charts.upgrade(), self.viewer.upgrade()) else {
            return Ok(());
        };
        let charts = charts.try_borrow().map_err(|_| busy("chart service"))?;
        let mut viewer = viewer.try_borrow_mut().map_err(|_| busy("viewer service"))?;
        let chart = charts.chart();
        let maximum_weights = charts.get_maximum_weight_map();

        debug!(topic = %change.topic(), "Refreshing layout");
        match change {
            ChartChange::ScoreFunction(_) => viewer.update_scores(chart),
            ChartChange::WeightMap(_) => viewer.update_weights(chart, maximum_weights),
            ChartChange::AlternativeOrder { .. } | ChartChange::AlternativeOrderChanged => {
                viewer.update_alternative_order(chart, maximum_weights)
            }
            ChartChange::Objectives(_) | ChartChange::ObjectivesChanged => {
                viewer.update_objectives(chart, maximum_weights)
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LayoutRefreshHandler"
    }
}

fn busy(what: &str) -> DomainError {
    DomainError::new(
        ErrorCode::InternalError,
        format!("The {} is borrowed while a change is being published", what),
    )
}
