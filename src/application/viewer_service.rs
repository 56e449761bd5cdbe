//! ValueChartViewerService - keeps the derived layout in step with the chart.

use std::collections::HashSet;
use tracing::debug;

use crate::domain::foundation::{AlternativeId, DomainError, ObjectiveId};
use crate::domain::layout::{
    generate_label_data, generate_row_data, move_label, reorder_cells, reorder_rows,
    update_label_weights, update_stacked_bar_offsets, update_user_scores, update_weight_offsets,
    LabelData, RowData, ViewOrientation,
};
use crate::domain::value_model::{ObjectiveTree, ValueChart, WeightMap};

/// Owns the renderer-facing rows and labels.
///
/// Full rebuilds happen only when the objective tree changes shape; weight,
/// score and order changes patch the existing structures.
#[derive(Debug, Clone)]
pub struct ValueChartViewerService {
    orientation: ViewOrientation,
    row_data: Vec<RowData>,
    label_data: Vec<LabelData>,
    original_alternative_order: Vec<AlternativeId>,
}

impl ValueChartViewerService {
    pub fn new(orientation: ViewOrientation) -> Self {
        Self {
            orientation,
            row_data: Vec::new(),
            label_data: Vec::new(),
            original_alternative_order: Vec::new(),
        }
    }

    /// Builds the layout for a freshly loaded chart and remembers its
    /// alternative order for later resets.
    pub fn initialize(&mut self, chart: &ValueChart, maximum_weights: &WeightMap) {
        self.original_alternative_order = chart.alternative_order();
        self.rebuild(chart, maximum_weights);
    }

    /// Regenerates rows and labels from scratch.
    pub fn rebuild(&mut self, chart: &ValueChart, maximum_weights: &WeightMap) {
        self.row_data = generate_row_data(chart);
        self.label_data = generate_label_data(chart, maximum_weights);
        update_user_scores(&mut self.row_data, chart);
        update_weight_offsets(&mut self.row_data, maximum_weights);
        update_stacked_bar_offsets(&mut self.row_data, self.orientation);
        debug!(rows = self.row_data.len(), labels = self.label_data.len(), "Layout rebuilt");
    }

    pub fn get_row_data(&self) -> &[RowData] {
        &self.row_data
    }

    pub fn get_label_data(&self) -> &[LabelData] {
        &self.label_data
    }

    pub fn orientation(&self) -> ViewOrientation {
        self.orientation
    }

    pub fn original_alternative_order(&self) -> &[AlternativeId] {
        &self.original_alternative_order
    }

    /// Switches orientation and re-stacks the bars.
    pub fn set_orientation(&mut self, orientation: ViewOrientation) {
        self.orientation = orientation;
        update_stacked_bar_offsets(&mut self.row_data, orientation);
    }

    /// After any user's weights changed.
    pub fn update_weights(&mut self, chart: &ValueChart, maximum_weights: &WeightMap) {
        update_user_scores(&mut self.row_data, chart);
        update_weight_offsets(&mut self.row_data, maximum_weights);
        update_label_weights(&mut self.label_data, maximum_weights);
        update_stacked_bar_offsets(&mut self.row_data, self.orientation);
    }

    /// After a score function changed.
    pub fn update_scores(&mut self, chart: &ValueChart) {
        update_user_scores(&mut self.row_data, chart);
        update_stacked_bar_offsets(&mut self.row_data, self.orientation);
    }

    /// After the alternatives were reordered. Cells are matched by id; a
    /// changed alternative set triggers a rebuild.
    pub fn update_alternative_order(&mut self, chart: &ValueChart, maximum_weights: &WeightMap) {
        let order = chart.alternative_order();
        let known: HashSet<&AlternativeId> = order.iter().collect();
        let in_sync = self.row_data.iter().all(|row| {
            row.cells.len() == order.len()
                && row.cells.iter().all(|cell| known.contains(&cell.alternative_id))
        });
        if in_sync {
            reorder_cells(&mut self.row_data, &order);
        } else {
            self.rebuild(chart, maximum_weights);
        }
    }

    /// Moves a label in lockstep with an objective moved in the tree.
    pub fn move_label(&mut self, chart: &ValueChart, id: &ObjectiveId, new_index: usize) -> Result<(), DomainError> {
        move_label(&mut self.label_data, chart.objectives(), id, new_index)
    }

    /// After the objective tree changed. Rows are re-sorted when the set of
    /// primitives is unchanged; otherwise everything is rebuilt.
    pub fn update_objectives(&mut self, chart: &ValueChart, maximum_weights: &WeightMap) {
        let desired = chart.objectives().primitive_index_map();
        let same_shape = desired.len() == self.row_data.len()
            && self.row_data.iter().all(|row| desired.contains_key(&row.objective_id))
            && labels_match_tree(&self.label_data, chart);
        if !same_shape {
            self.rebuild(chart, maximum_weights);
            return;
        }
        reorder_rows(&mut self.row_data, &desired);
        update_weight_offsets(&mut self.row_data, maximum_weights);
        update_stacked_bar_offsets(&mut self.row_data, self.orientation);
        if !label_order_matches_tree(&self.label_data, chart) {
            self.label_data = generate_label_data(chart, maximum_weights);
        }
    }
}

fn labels_match_tree(labels: &[LabelData], chart: &ValueChart) -> bool {
    fn visit(labels: &[LabelData], tree: &ObjectiveTree, count: &mut usize) -> bool {
        labels.iter().all(|label| {
            *count += 1;
            tree.contains(&label.objective_id)
                && tree.children(&label.objective_id).len() == label.sub_label_data.len()
                && visit(&label.sub_label_data, tree, count)
        })
    }
    let mut count = 0;
    visit(labels, chart.objectives(), &mut count) && count == chart.objectives().len()
}

fn label_order_matches_tree(labels: &[LabelData], chart: &ValueChart) -> bool {
    fn flatten<'a>(labels: &'a [LabelData], out: &mut Vec<&'a ObjectiveId>) {
        for label in labels {
            out.push(&label.objective_id);
            flatten(&label.sub_label_data, out);
        }
    }
    let mut flattened = Vec::new();
    flatten(labels, &mut flattened);
    let preorder = chart.objectives().all_objective_ids();
    flattened.len() == preorder.len() && flattened.into_iter().eq(preorder.iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::AlternativeId;
    use crate::domain::value_model::{
        AbstractObjective, Alternative, ContinuousDomain, Domain, Objective, PrimitiveObjective,
        User,
    };

    fn oid(s: &str) -> ObjectiveId {
        ObjectiveId::new(s).unwrap()
    }

    fn aid(s: &str) -> AlternativeId {
        AlternativeId::new(s).unwrap()
    }

    fn chart() -> ValueChart {
        let domain = || Domain::Continuous(ContinuousDomain::new(0.0, 100.0, None).unwrap());
        let mut chart = ValueChart::new("Hotels", "ann");
        chart
            .add_objective(None, Objective::Abstract(AbstractObjective::new(oid("root"), "Root")))
            .unwrap();
        for id in ["price", "location", "rooms"] {
            chart
                .add_objective(Some(&oid("root")), Objective::Primitive(PrimitiveObjective::new(oid(id), id, domain())))
                .unwrap();
        }
        for (id, v) in [("x", 20.0), ("y", 60.0)] {
            chart
                .add_alternative(
                    Alternative::new(aid(id), id)
                        .with_value(oid("price"), v)
                        .with_value(oid("location"), v)
                        .with_value(oid("rooms"), v),
                )
                .unwrap();
        }
        let user = User::new("ann", chart.default_weight_map(0.9), chart.default_score_function_map()).unwrap();
        chart.add_user(user).unwrap();
        chart
    }

    fn viewer_for(chart: &ValueChart) -> ValueChartViewerService {
        let mut viewer = ValueChartViewerService::new(ViewOrientation::Vertical);
        viewer.initialize(chart, &chart.users()[0].weight_map);
        viewer
    }

    #[test]
    fn initialize_builds_rows_labels_and_remembers_order() {
        let chart = chart();
        let viewer = viewer_for(&chart);
        assert_eq!(viewer.get_row_data().len(), 3);
        assert_eq!(viewer.get_label_data().len(), 1);
        assert_eq!(viewer.original_alternative_order(), &[aid("x"), aid("y")]);
        assert!((viewer.get_row_data()[2].weight_offset - 0.6).abs() < 1e-12);
    }

    #[test]
    fn reordered_tree_resorts_rows_without_rebuild() {
        let mut chart = chart();
        let mut viewer = viewer_for(&chart);
        chart.move_objective(&oid("rooms"), 0).unwrap();
        viewer.move_label(&chart, &oid("rooms"), 0).unwrap();
        let weights = chart.users()[0].weight_map.clone();
        viewer.update_objectives(&chart, &weights);

        let rows: Vec<_> = viewer.get_row_data().iter().map(|r| r.objective_id.clone()).collect();
        assert_eq!(rows, vec![oid("rooms"), oid("price"), oid("location")]);
        assert_eq!(viewer.get_label_data()[0].sub_label_data[0].objective_id, oid("rooms"));
        assert_eq!(viewer.get_row_data()[0].weight_offset, 0.0);
    }

    #[test]
    fn changed_tree_shape_rebuilds() {
        let mut chart = chart();
        let mut viewer = viewer_for(&chart);
        chart.remove_objective(&oid("rooms")).unwrap();
        let weights = chart.users()[0].weight_map.clone();
        viewer.update_objectives(&chart, &weights);
        assert_eq!(viewer.get_row_data().len(), 2);
        assert_eq!(viewer.get_label_data()[0].sub_label_data.len(), 2);
    }

    #[test]
    fn alternative_order_follows_chart() {
        let mut chart = chart();
        let mut viewer = viewer_for(&chart);
        chart.reorder_alternatives(&[aid("y"), aid("x")]).unwrap();
        let weights = chart.users()[0].weight_map.clone();
        viewer.update_alternative_order(&chart, &weights);
        assert!(viewer.get_row_data().iter().all(|row| row.cells[0].alternative_id == aid("y")));
    }

    #[test]
    fn weights_update_offsets_and_labels() {
        let mut chart = chart();
        let mut viewer = viewer_for(&chart);
        let weights: WeightMap = vec![(oid("price"), 0.5), (oid("location"), 0.25), (oid("rooms"), 0.25)]
            .into_iter()
            .collect();
        chart.get_user_mut("ann").unwrap().weight_map = weights.clone();
        viewer.update_weights(&chart, &weights);

        assert!((viewer.get_row_data()[1].weight_offset - 0.5).abs() < 1e-12);
        assert!((viewer.get_label_data()[0].weight - 1.0).abs() < 1e-12);
        let price_x = viewer.get_row_data()[0].cells[0].user_score("ann").unwrap();
        assert!((price_x.weight - 0.5).abs() < 1e-12);
    }

    #[test]
    fn orientation_switch_restacks() {
        let chart = chart();
        let mut viewer = viewer_for(&chart);
        let first_row_offset = |v: &ValueChartViewerService| v.get_row_data()[0].cells[0].user_scores[0].offset;
        assert!(first_row_offset(&viewer) > 0.0);
        viewer.set_orientation(ViewOrientation::Horizontal);
        assert_eq!(first_row_offset(&viewer), 0.0);
    }
}
