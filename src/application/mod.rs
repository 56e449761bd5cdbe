//! Application layer - services, interactions, and the shared chart store.
//!
//! Services own state and apply changes. Interactions turn user gestures
//! into recorded, published changes. [`ChartHandle`] ties them together
//! for the main view and its detail windows.

mod chart_handle;
mod detail_window;
pub mod interactions;
mod layout_refresh;
mod undo_redo_service;
mod value_chart_service;
mod viewer_service;

pub use chart_handle::{ChartHandle, ChildWindowRegistry, WindowId};
pub use detail_window::ScoreFunctionDetailView;
pub use interactions::{
    PumpDirection, PumpInteraction, ReorderAlternativesInteraction, ReorderObjectivesInteraction,
    ResizeWeightsInteraction, ScoreFunctionInteraction, SortAlternativesInteraction,
};
pub use layout_refresh::LayoutRefreshHandler;
pub use undo_redo_service::ChartUndoRedoService;
pub use value_chart_service::ValueChartService;
pub use viewer_service::ValueChartViewerService;
