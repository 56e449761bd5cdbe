//! ChartHandle - the shared store behind the chart view and its detail windows.
//!
//! One authoritative set of services lives behind `Rc<RefCell<_>>`. Every
//! view holds a cloned handle, mutates through it, and publishes on the same
//! bus so the other views can resynchronize. Everything runs on one thread.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

use crate::adapters::InMemoryChangeBus;
use crate::config::ViewerConfig;
use crate::domain::foundation::{DomainError, ObjectiveId};
use crate::domain::layout::{LabelData, RowData};
use crate::domain::memento::{ChangeTopic, ChartChange};
use crate::domain::value_model::ValueChart;
use crate::ports::{ChartChangeHandler, ChartChangePublisher, ChartChangeSubscriber};

use super::layout_refresh::LayoutRefreshHandler;
use super::undo_redo_service::ChartUndoRedoService;
use super::value_chart_service::ValueChartService;
use super::viewer_service::ValueChartViewerService;

/// Identifies one open child window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(u64);

/// Child windows currently open on a chart, with the objective each shows.
#[derive(Debug, Default)]
pub struct ChildWindowRegistry {
    windows: RefCell<BTreeMap<WindowId, ObjectiveId>>,
    next_id: Cell<u64>,
}

impl ChildWindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, objective_id: ObjectiveId) -> WindowId {
        let id = WindowId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.windows.borrow_mut().insert(id, objective_id);
        id
    }

    /// Returns false if the window was not registered.
    pub fn deregister(&self, id: WindowId) -> bool {
        self.windows.borrow_mut().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.windows.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.borrow().is_empty()
    }

    pub fn is_open_for(&self, objective_id: &ObjectiveId) -> bool {
        self.windows.borrow().values().any(|id| id == objective_id)
    }

    /// Objectives shown by open windows, in opening order.
    pub fn open_objectives(&self) -> Vec<ObjectiveId> {
        self.windows.borrow().values().cloned().collect()
    }
}

/// Cloneable handle on the shared chart state.
///
/// Borrows handed out by the accessors must be released before calling
/// [`ChartHandle::publish`], [`ChartHandle::undo`] or [`ChartHandle::redo`].
#[derive(Clone)]
pub struct ChartHandle {
    charts: Rc<RefCell<ValueChartService>>,
    history: Rc<RefCell<ChartUndoRedoService>>,
    viewer: Rc<RefCell<ValueChartViewerService>>,
    bus: Rc<InMemoryChangeBus>,
    child_windows: Rc<ChildWindowRegistry>,
    config: Rc<ViewerConfig>,
}

impl ChartHandle {
    /// Loads a chart, builds its layout, and subscribes the layout refresher
    /// ahead of any other handler.
    pub fn new(chart: ValueChart, config: ViewerConfig) -> Self {
        let charts = ValueChartService::new(chart, config.current_username.clone());
        let mut viewer = ValueChartViewerService::new(config.orientation);
        viewer.initialize(charts.chart(), charts.get_maximum_weight_map());

        let handle = Self {
            charts: Rc::new(RefCell::new(charts)),
            history: Rc::new(RefCell::new(ChartUndoRedoService::new())),
            viewer: Rc::new(RefCell::new(viewer)),
            bus: Rc::new(InMemoryChangeBus::new()),
            child_windows: Rc::new(ChildWindowRegistry::new()),
            config: Rc::new(config),
        };
        let refresher = LayoutRefreshHandler::new(Rc::downgrade(&handle.charts), Rc::downgrade(&handle.viewer));
        handle.bus.subscribe_all(&ChangeTopic::ALL, Rc::new(refresher));
        handle
    }

    pub fn charts(&self) -> Ref<'_, ValueChartService> {
        self.charts.borrow()
    }

    pub fn charts_mut(&self) -> RefMut<'_, ValueChartService> {
        self.charts.borrow_mut()
    }

    pub fn history(&self) -> Ref<'_, ChartUndoRedoService> {
        self.history.borrow()
    }

    pub fn history_mut(&self) -> RefMut<'_, ChartUndoRedoService> {
        self.history.borrow_mut()
    }

    pub fn viewer(&self) -> Ref<'_, ValueChartViewerService> {
        self.viewer.borrow()
    }

    pub fn viewer_mut(&self) -> RefMut<'_, ValueChartViewerService> {
        self.viewer.borrow_mut()
    }

    pub fn bus(&self) -> &InMemoryChangeBus {
        &self.bus
    }

    pub fn child_windows(&self) -> &ChildWindowRegistry {
        &self.child_windows
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Snapshot of the current rows.
    pub fn row_data(&self) -> Vec<RowData> {
        self.viewer.borrow().get_row_data().to_vec()
    }

    /// Snapshot of the current labels.
    pub fn label_data(&self) -> Vec<LabelData> {
        self.viewer.borrow().get_label_data().to_vec()
    }

    pub fn subscribe(&self, topic: ChangeTopic, handler: Rc<dyn ChartChangeHandler>) {
        self.bus.subscribe(topic, handler);
    }

    pub fn publish(&self, change: ChartChange) -> Result<(), DomainError> {
        self.bus.publish(change)
    }

    /// Undoes the newest change and broadcasts it. Returns whether anything
    /// was applied.
    pub fn undo(&self) -> Result<bool, DomainError> {
        let change = {
            let mut charts = self.charts.borrow_mut();
            self.history.borrow_mut().undo(&mut charts)?
        };
        self.broadcast(change)
    }

    /// Redoes the newest undone change and broadcasts it.
    pub fn redo(&self) -> Result<bool, DomainError> {
        let change = {
            let mut charts = self.charts.borrow_mut();
            self.history.borrow_mut().redo(&mut charts)?
        };
        self.broadcast(change)
    }

    fn broadcast(&self, change: Option<ChartChange>) -> Result<bool, DomainError> {
        match change {
            Some(change) => {
                debug!(topic = %change.topic(), "Broadcasting history change");
                self.publish(change)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// True when both handles share the same store.
    pub fn same_store(&self, other: &ChartHandle) -> bool {
        Rc::ptr_eq(&self.charts, &other.charts)
    }
}
