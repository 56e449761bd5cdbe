//! ChartUndoRedoService - two memento stacks over the active chart.

use tracing::{debug, info, warn};

use crate::domain::foundation::{DomainError, ObjectiveId};
use crate::domain::memento::{
    AlternativeOrderRecord, ChangeKind, ChartChange, ChartMemento, ObjectivesRecord,
    ScoreFunctionRecord,
};
use crate::domain::value_model::{ScoreFunction, ValueChart, WeightMap};

use super::value_chart_service::ValueChartService;

/// Undo and redo history.
///
/// Records are captured at edit start. Saving a new record discards the
/// redo history. Applying a record captures the live state of the same kind
/// onto the opposite stack first, so undo and redo are symmetric.
#[derive(Debug, Clone, Default)]
pub struct ChartUndoRedoService {
    undo_stack: Vec<ChartMemento>,
    redo_stack: Vec<ChartMemento>,
}

#[derive(Clone, Copy)]
enum Direction {
    Undo,
    Redo,
}

impl ChartUndoRedoService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_score_function_record(&mut self, objective_id: ObjectiveId, score_function: &ScoreFunction) {
        self.save_record(ChartMemento::ScoreFunction(ScoreFunctionRecord::new(objective_id, score_function)));
    }

    pub fn save_weight_map_record(&mut self, weight_map: &WeightMap) {
        self.save_record(ChartMemento::WeightMap(weight_map.get_memento()));
    }

    pub fn save_alternative_order_record(&mut self, chart: &ValueChart) {
        self.save_record(ChartMemento::AlternativeOrder(AlternativeOrderRecord::capture(chart)));
    }

    pub fn save_objectives_record(&mut self, chart: &ValueChart) {
        self.save_record(ChartMemento::Objectives(ObjectivesRecord::capture(chart)));
    }

    /// Pushes a record and clears the redo history.
    pub fn save_record(&mut self, record: ChartMemento) {
        debug!(kind = %record.kind(), undo_depth = self.undo_stack.len() + 1, "Saving undo record");
        self.redo_stack.clear();
        self.undo_stack.push(record);
    }

    /// Removes the newest undo record equal to `record` without applying it.
    ///
    /// Records saved above it by other views stay where they are. Returns
    /// false when no such record is on the undo stack.
    pub fn discard_record(&mut self, record: &ChartMemento) -> bool {
        let Some(index) = self.undo_stack.iter().rposition(|saved| saved == record) else {
            debug!(kind = %record.kind(), "No matching undo record to discard");
            return false;
        };
        self.undo_stack.remove(index);
        debug!(kind = %record.kind(), above = self.undo_stack.len() - index, "Discarded no-op undo record");
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Kind of the record the next undo would apply.
    pub fn next_undo_kind(&self) -> Option<ChangeKind> {
        self.undo_stack.last().map(ChartMemento::kind)
    }

    pub fn next_redo_kind(&self) -> Option<ChangeKind> {
        self.redo_stack.last().map(ChartMemento::kind)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Applies the newest undo record and returns the change to broadcast.
    ///
    /// Returns `None` when there is nothing to undo, or when a score
    /// function or weight map record cannot apply because there is no
    /// current user; the stacks are left untouched in both cases.
    ///
    /// A score function record whose objective is gone from the chart or
    /// from the current user's score functions can never apply again. It is
    /// dropped with a warning and the next record is tried.
    ///
    /// # Errors
    /// Propagates failures applying the record. The record stays on the
    /// undo stack and the chart is unchanged.
    pub fn undo(&mut self, charts: &mut ValueChartService) -> Result<Option<ChartChange>, DomainError> {
        self.step(Direction::Undo, charts)
    }

    /// Applies the newest redo record; the mirror of [`Self::undo`].
    pub fn redo(&mut self, charts: &mut ValueChartService) -> Result<Option<ChartChange>, DomainError> {
        self.step(Direction::Redo, charts)
    }

    fn step(&mut self, direction: Direction, charts: &mut ValueChartService) -> Result<Option<ChartChange>, DomainError> {
        let (source, target) = match direction {
            Direction::Undo => (&mut self.undo_stack, &mut self.redo_stack),
            Direction::Redo => (&mut self.redo_stack, &mut self.undo_stack),
        };
        let current = loop {
            let Some(record) = source.last() else {
                return Ok(None);
            };
            match capture_current(record, charts) {
                Capture::Ready(current) => break current,
                Capture::NoUser => {
                    debug!(kind = %record.kind(), "No current user; record not applied");
                    return Ok(None);
                }
                Capture::Stale(objective_id) => {
                    warn!(kind = %record.kind(), objective = %objective_id, "Dropping record for an objective the user no longer scores");
                    source.pop();
                }
            }
        };
        let Some(record) = source.last() else {
            return Ok(None);
        };
        let change = apply_record(record, charts)?;
        let applied = source.pop();
        target.push(current);
        if let Some(applied) = applied {
            let verb = match direction {
                Direction::Undo => "Undid",
                Direction::Redo => "Redid",
            };
            info!(kind = %applied.kind(), undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "{} chart change", verb);
        }
        Ok(Some(change))
    }
}

enum Capture {
    Ready(ChartMemento),
    NoUser,
    Stale(ObjectiveId),
}

/// Snapshot of the live state the record would overwrite.
fn capture_current(record: &ChartMemento, charts: &ValueChartService) -> Capture {
    let current = match record {
        ChartMemento::ScoreFunction(record) => {
            let Some(user) = charts.current_user() else {
                return Capture::NoUser;
            };
            let primitive = charts
                .chart()
                .objectives()
                .get(&record.objective_id)
                .and_then(|o| o.as_primitive());
            let function = user.score_function_map.get_objective_score_function(&record.objective_id);
            let (Some(_), Some(function)) = (primitive, function) else {
                return Capture::Stale(record.objective_id.clone());
            };
            ChartMemento::ScoreFunction(ScoreFunctionRecord::new(record.objective_id.clone(), function))
        }
        ChartMemento::WeightMap(_) => {
            let Some(user) = charts.current_user() else {
                return Capture::NoUser;
            };
            ChartMemento::WeightMap(user.weight_map.get_memento())
        }
        ChartMemento::AlternativeOrder(_) => {
            ChartMemento::AlternativeOrder(AlternativeOrderRecord::capture(charts.chart()))
        }
        ChartMemento::Objectives(_) => ChartMemento::Objectives(ObjectivesRecord::capture(charts.chart())),
    };
    Capture::Ready(current)
}

fn apply_record(record: &ChartMemento, charts: &mut ValueChartService) -> Result<ChartChange, DomainError> {
    match record {
        ChartMemento::ScoreFunction(record) => {
            charts.set_current_score_function(&record.objective_id, record.score_function.get_memento())?;
            Ok(ChartChange::ScoreFunction(record.clone()))
        }
        ChartMemento::WeightMap(weights) => {
            charts.set_current_weight_map(weights.get_memento());
            Ok(ChartChange::WeightMap(weights.get_memento()))
        }
        ChartMemento::AlternativeOrder(record) => {
            let current = charts.chart().alternative_order();
            let permutation = record.permutation(&current);
            let target = record.target_order(&current);
            charts.chart_mut().reorder_alternatives(&target)?;
            Ok(ChartChange::AlternativeOrder {
                record: record.clone(),
                permutation,
            })
        }
        ChartMemento::Objectives(record) => {
            charts.chart_mut().set_objectives(record.tree.clone());
            Ok(ChartChange::Objectives(record.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::AlternativeId;
    use crate::domain::value_model::{
        Alternative, CategoricalDomain, Domain, DomainValue, Objective, PrimitiveObjective, User,
    };

    fn oid(s: &str) -> ObjectiveId {
        ObjectiveId::new(s).unwrap()
    }

    fn aid(s: &str) -> AlternativeId {
        AlternativeId::new(s).unwrap()
    }

    fn service(with_user: bool) -> ValueChartService {
        let mut chart = ValueChart::new("Pets", "ann");
        let domain = Domain::Categorical(
            CategoricalDomain::new(vec!["small".into(), "large".into()], true).unwrap(),
        );
        chart
            .add_objective(None, Objective::Primitive(PrimitiveObjective::new(oid("size"), "Size", domain.clone())))
            .unwrap();
        chart
            .add_objective(None, Objective::Primitive(PrimitiveObjective::new(oid("fur"), "Fur", domain)))
            .unwrap();
        chart
            .add_alternative(Alternative::new(aid("cat"), "Cat").with_value(oid("size"), "small").with_value(oid("fur"), "large"))
            .unwrap();
        chart
            .add_alternative(Alternative::new(aid("dog"), "Dog").with_value(oid("size"), "large").with_value(oid("fur"), "small"))
            .unwrap();
        if with_user {
            let user = User::new("ann", chart.default_weight_map(1.0), chart.default_score_function_map()).unwrap();
            chart.add_user(user).unwrap();
        }
        ValueChartService::new(chart, None)
    }

    fn size_score(charts: &ValueChartService, element: &str) -> f64 {
        charts
            .current_user()
            .unwrap()
            .score_function_map
            .get_objective_score_function(&oid("size"))
            .unwrap()
            .get_score(&DomainValue::category(element))
            .unwrap()
    }

    #[test]
    fn undo_on_empty_stack_is_a_no_op() {
        let mut charts = service(true);
        let mut history = ChartUndoRedoService::new();
        assert_eq!(history.undo(&mut charts).unwrap(), None);
        assert_eq!(history.redo(&mut charts).unwrap(), None);
    }

    #[test]
    fn undo_and_redo_weight_map() {
        let mut charts = service(true);
        let mut history = ChartUndoRedoService::new();
        let before = charts.current_user().unwrap().weight_map.clone();
        history.save_weight_map_record(&before);

        let after: WeightMap = vec![(oid("size"), 0.8), (oid("fur"), 0.2)].into_iter().collect();
        charts.set_current_weight_map(after.clone());

        let change = history.undo(&mut charts).unwrap().unwrap();
        assert_eq!(change, ChartChange::WeightMap(before.clone()));
        assert_eq!(charts.current_user().unwrap().weight_map, before);
        assert_eq!(charts.get_maximum_weight_map(), &before);

        history.redo(&mut charts).unwrap();
        assert_eq!(charts.current_user().unwrap().weight_map, after);
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn undo_and_redo_score_function() {
        let mut charts = service(true);
        let mut history = ChartUndoRedoService::new();
        let original = charts
            .current_user()
            .unwrap()
            .score_function_map
            .get_objective_score_function(&oid("size"))
            .unwrap()
            .clone();
        history.save_score_function_record(oid("size"), &original);
        charts
            .current_user_mut()
            .unwrap()
            .score_function_map
            .get_objective_score_function_mut(&oid("size"))
            .unwrap()
            .set_element_score(&DomainValue::category("small"), 0.7)
            .unwrap();

        let change = history.undo(&mut charts).unwrap().unwrap();
        assert_eq!(change.topic(), crate::domain::memento::ChangeTopic::ScoreFunction);
        assert_eq!(size_score(&charts, "small"), 0.0);

        history.redo(&mut charts).unwrap();
        assert_eq!(size_score(&charts, "small"), 0.7);
    }

    #[test]
    fn undo_alternative_order_reports_permutation() {
        let mut charts = service(true);
        let mut history = ChartUndoRedoService::new();
        history.save_alternative_order_record(charts.chart());
        charts.chart_mut().reorder_alternatives(&[aid("dog"), aid("cat")]).unwrap();

        let change = history.undo(&mut charts).unwrap().unwrap();
        match change {
            ChartChange::AlternativeOrder { permutation, .. } => assert_eq!(permutation, vec![1, 0]),
            other => panic!("unexpected change {:?}", other),
        }
        assert_eq!(charts.chart().alternative_order(), vec![aid("cat"), aid("dog")]);

        history.redo(&mut charts).unwrap();
        assert_eq!(charts.chart().alternative_order(), vec![aid("dog"), aid("cat")]);
    }

    #[test]
    fn undo_objectives_restores_tree() {
        let mut charts = service(true);
        let mut history = ChartUndoRedoService::new();
        let before = charts.chart().objectives().clone();
        history.save_objectives_record(charts.chart());
        charts.chart_mut().move_objective(&oid("fur"), 0).unwrap();

        history.undo(&mut charts).unwrap();
        assert_eq!(charts.chart().objectives(), &before);
        assert_eq!(history.next_redo_kind(), Some(ChangeKind::ObjectivesChange));
    }

    #[test]
    fn saving_clears_redo() {
        let mut charts = service(true);
        let mut history = ChartUndoRedoService::new();
        history.save_alternative_order_record(charts.chart());
        history.undo(&mut charts).unwrap();
        assert!(history.can_redo());

        history.save_objectives_record(charts.chart());
        assert!(!history.can_redo());
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn discard_record_removes_without_applying() {
        let mut history = ChartUndoRedoService::new();
        let record = ChartMemento::WeightMap(WeightMap::new());
        history.save_record(record.clone());
        assert!(history.discard_record(&record));
        assert!(!history.can_undo());
        assert!(!history.discard_record(&record));
    }

    #[test]
    fn discard_record_leaves_newer_records_of_other_kinds() {
        let charts = service(true);
        let mut history = ChartUndoRedoService::new();
        let weights = ChartMemento::WeightMap(charts.current_user().unwrap().weight_map.get_memento());
        history.save_record(weights.clone());
        history.save_alternative_order_record(charts.chart());

        assert!(history.discard_record(&weights));
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.next_undo_kind(), Some(ChangeKind::AlternativeOrderChange));

        let objectives = ChartMemento::Objectives(ObjectivesRecord::capture(charts.chart()));
        assert!(!history.discard_record(&objectives));
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn record_for_unscored_objective_is_dropped() {
        let mut charts = service(true);
        let mut history = ChartUndoRedoService::new();
        history.save_alternative_order_record(charts.chart());
        let size = charts
            .current_user()
            .unwrap()
            .score_function_map
            .get_objective_score_function(&oid("size"))
            .unwrap()
            .clone();
        history.save_score_function_record(oid("size"), &size);
        charts.chart_mut().reorder_alternatives(&[aid("dog"), aid("cat")]).unwrap();
        charts
            .current_user_mut()
            .unwrap()
            .score_function_map
            .remove_objective_score_function(&oid("size"));

        // The stale record is skipped and the order record below it applies
        let change = history.undo(&mut charts).unwrap().unwrap();
        assert!(matches!(change, ChartChange::AlternativeOrder { .. }));
        assert_eq!(charts.chart().alternative_order(), vec![aid("cat"), aid("dog")]);
        assert_eq!(history.undo_depth(), 0);
        assert_eq!(history.redo_depth(), 1);
        assert_eq!(history.next_redo_kind(), Some(ChangeKind::AlternativeOrderChange));
    }

    #[test]
    fn stale_record_alone_empties_the_stack() {
        let mut charts = service(true);
        let mut history = ChartUndoRedoService::new();
        let size = charts
            .current_user()
            .unwrap()
            .score_function_map
            .get_objective_score_function(&oid("size"))
            .unwrap()
            .clone();
        history.save_score_function_record(oid("size"), &size);
        charts
            .current_user_mut()
            .unwrap()
            .score_function_map
            .remove_objective_score_function(&oid("size"));

        assert_eq!(history.undo(&mut charts).unwrap(), None);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn user_records_without_current_user_leave_stacks_untouched() {
        let mut charts = service(false);
        let mut history = ChartUndoRedoService::new();
        history.save_weight_map_record(&WeightMap::new());

        assert_eq!(history.undo(&mut charts).unwrap(), None);
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.redo_depth(), 0);
    }
}
