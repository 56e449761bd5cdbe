//! Integration tests for score function detail windows.
//!
//! A detail window shares the chart's store, so edits and undo from either
//! side must be visible to both.

mod common;

use common::{laptop_handle, oid, stack_top, EPSILON};
use value_charts::application::{
    ReorderObjectivesInteraction, ResizeWeightsInteraction, ScoreFunctionDetailView,
};
use value_charts::domain::foundation::ErrorCode;
use value_charts::domain::memento::ChangeKind;
use value_charts::domain::value_model::DomainValue;

#[test]
fn window_shares_the_chart_store() {
    let handle = laptop_handle();
    let view = ScoreFunctionDetailView::open(&handle, oid("quality")).unwrap();
    assert!(view.handle().same_store(&handle));
    assert_eq!(view.objective().unwrap().name, "Quality");
    assert!(handle.child_windows().is_open_for(&oid("quality")));
}

#[test]
fn edit_in_window_updates_main_layout() {
    let handle = laptop_handle();
    let view = ScoreFunctionDetailView::open(&handle, oid("quality")).unwrap();

    assert!(view.set_element_score(&DomainValue::Number(100.0), 0.5).unwrap());
    assert!((stack_top(&handle.row_data(), "a", "sam") - 0.65).abs() < EPSILON);
    assert_eq!(handle.history().undo_depth(), 1);

    // Undo from the main view, observe from the window
    handle.undo().unwrap();
    let function = view.score_function().unwrap();
    assert_eq!(function.get_score(&DomainValue::Number(100.0)).unwrap(), 1.0);

    assert!(view.redo().unwrap());
    assert!((stack_top(&handle.row_data(), "a", "sam") - 0.65).abs() < EPSILON);
}

#[test]
fn rejected_score_leaves_no_history() {
    let handle = laptop_handle();
    let view = ScoreFunctionDetailView::open(&handle, oid("cost")).unwrap();
    let err = view.set_element_score(&DomainValue::Number(150.0), 0.5).unwrap_err();
    assert_eq!(err.code, ErrorCode::OutOfDomain);
    assert!(!handle.history().can_undo());
}

#[test]
fn abstract_objective_has_no_detail_window() {
    let handle = laptop_handle();
    let err = ScoreFunctionDetailView::open(&handle, oid("root")).err().unwrap();
    assert_eq!(err.code, ErrorCode::ValidationFailed);
    let err = ScoreFunctionDetailView::open(&handle, oid("weight")).err().unwrap();
    assert_eq!(err.code, ErrorCode::UnknownObjective);
    assert!(handle.child_windows().is_empty());
}

#[test]
fn closing_a_window_deregisters_it() {
    let handle = laptop_handle();
    let first = ScoreFunctionDetailView::open(&handle, oid("cost")).unwrap();
    let second = ScoreFunctionDetailView::open(&handle, oid("quality")).unwrap();
    assert_ne!(first.window_id(), second.window_id());
    assert_eq!(handle.child_windows().len(), 2);

    drop(first);
    assert_eq!(handle.child_windows().open_objectives(), vec![oid("quality")]);
    drop(second);
    assert!(handle.child_windows().is_empty());
}

#[test]
fn cancelled_drag_keeps_a_window_edit_made_during_it() {
    let handle = laptop_handle();
    let mut reorder = ReorderObjectivesInteraction::new(handle.clone());
    let view = ScoreFunctionDetailView::open(&handle, oid("quality")).unwrap();

    assert!(reorder.begin(&oid("cost")).unwrap());
    assert!(view.set_element_score(&DomainValue::Number(100.0), 0.5).unwrap());
    assert!(!reorder.end().unwrap());

    // Only the drag's own record is gone
    assert_eq!(handle.history().undo_depth(), 1);
    assert_eq!(handle.history().next_undo_kind(), Some(ChangeKind::ScoreFunctionChange));
    assert!(handle.undo().unwrap());
    let function = view.score_function().unwrap();
    assert_eq!(function.get_score(&DomainValue::Number(100.0)).unwrap(), 1.0);
    assert!(!handle.history().can_undo());
}

#[test]
fn cancelled_resize_keeps_a_window_edit_made_during_it() {
    let handle = laptop_handle();
    let mut resize = ResizeWeightsInteraction::new(handle.clone());
    let view = ScoreFunctionDetailView::open(&handle, oid("quality")).unwrap();

    assert!(resize.begin(&oid("cost"), &oid("quality")).unwrap());
    assert!(view.set_element_score(&DomainValue::Number(100.0), 0.5).unwrap());
    assert!(!resize.end().unwrap());

    assert_eq!(handle.history().undo_depth(), 1);
    assert_eq!(handle.history().next_undo_kind(), Some(ChangeKind::ScoreFunctionChange));
}
