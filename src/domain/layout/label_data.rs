//! Label data - the hierarchical label area beside the rows.

use serde::Serialize;

use crate::domain::foundation::{DomainError, ObjectiveId, ValidationError};
use crate::domain::value_model::{ObjectiveTree, ValueChart, WeightMap};

/// One label per objective, mirroring the objective tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelData {
    pub objective_id: ObjectiveId,
    pub name: String,
    /// Primitive weight, or the sum over primitive descendants.
    pub weight: f64,
    pub depth: usize,
    /// Height of the subtree below this label.
    pub depth_of_children: usize,
    pub sub_label_data: Vec<LabelData>,
}

impl LabelData {
    pub fn is_primitive(&self) -> bool {
        self.sub_label_data.is_empty()
    }
}

/// Builds the label hierarchy for the whole objective tree.
pub fn generate_label_data(chart: &ValueChart, weights: &WeightMap) -> Vec<LabelData> {
    chart
        .objectives()
        .roots()
        .iter()
        .map(|root| build_label(chart, weights, root))
        .collect()
}

fn build_label(chart: &ValueChart, weights: &WeightMap, id: &ObjectiveId) -> LabelData {
    let tree = chart.objectives();
    LabelData {
        objective_id: id.clone(),
        name: tree.get(id).map(|o| o.name().to_string()).unwrap_or_default(),
        weight: chart.objective_weight(weights, id),
        depth: tree.depth(id).unwrap_or(0),
        depth_of_children: tree.max_depth_of_children(id),
        sub_label_data: tree
            .children(id)
            .iter()
            .map(|child| build_label(chart, weights, child))
            .collect(),
    }
}

/// Recomputes label weights bottom-up without rebuilding the hierarchy.
///
/// Abstract labels with no children weigh 0.
pub fn update_label_weights(labels: &mut [LabelData], weights: &WeightMap) {
    for label in labels.iter_mut() {
        if label.sub_label_data.is_empty() {
            label.weight = weights.get_objective_weight(&label.objective_id);
        } else {
            update_label_weights(&mut label.sub_label_data, weights);
            label.weight = label.sub_label_data.iter().map(|sub| sub.weight).sum();
        }
    }
}

pub fn find_label<'a>(labels: &'a [LabelData], id: &ObjectiveId) -> Option<&'a LabelData> {
    for label in labels {
        if &label.objective_id == id {
            return Some(label);
        }
        if let Some(found) = find_label(&label.sub_label_data, id) {
            return Some(found);
        }
    }
    None
}

pub fn find_label_mut<'a>(labels: &'a mut [LabelData], id: &ObjectiveId) -> Option<&'a mut LabelData> {
    for label in labels.iter_mut() {
        if &label.objective_id == id {
            return Some(label);
        }
        if let Some(found) = find_label_mut(&mut label.sub_label_data, id) {
            return Some(found);
        }
    }
    None
}

/// Moves a label within its sibling list, in lockstep with
/// [`ObjectiveTree::move_objective`].
pub fn move_label(
    labels: &mut Vec<LabelData>,
    tree: &ObjectiveTree,
    id: &ObjectiveId,
    new_index: usize,
) -> Result<(), DomainError> {
    let siblings = match tree.parent(id) {
        Some(parent) => {
            &mut find_label_mut(labels, parent)
                .ok_or_else(|| DomainError::unknown_objective(parent.as_str()))?
                .sub_label_data
        }
        None => labels,
    };
    let current = siblings
        .iter()
        .position(|label| &label.objective_id == id)
        .ok_or_else(|| DomainError::unknown_objective(id.as_str()))?;
    if new_index >= siblings.len() {
        return Err(ValidationError::out_of_range(
            "new_index",
            0.0,
            (siblings.len() - 1) as f64,
            new_index as f64,
        )
        .into());
    }
    let moved = siblings.remove(current);
    siblings.insert(new_index, moved);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::layout::test_support::{oid, two_by_two_chart};
    use crate::domain::value_model::{AbstractObjective, Objective};

    #[test]
    fn labels_mirror_tree_with_weights_and_depths() {
        let chart = two_by_two_chart();
        let labels = generate_label_data(&chart, &chart.users()[0].weight_map);
        assert_eq!(labels.len(), 1);
        let root = &labels[0];
        assert_eq!(root.depth, 0);
        assert_eq!(root.depth_of_children, 1);
        assert!((root.weight - 1.0).abs() < 1e-12);
        assert_eq!(root.sub_label_data[0].name, "Cost");
        assert_eq!(root.sub_label_data[0].depth, 1);
        assert!(root.sub_label_data[0].is_primitive());
    }

    #[test]
    fn empty_abstract_objective_weighs_zero() {
        let mut chart = two_by_two_chart();
        chart
            .add_objective(Some(&oid("root")), Objective::Abstract(AbstractObjective::new(oid("misc"), "Misc")))
            .unwrap();
        let weights = chart.users()[0].weight_map.clone();
        let mut labels = generate_label_data(&chart, &weights);
        let misc = find_label(&labels, &oid("misc")).unwrap();
        assert_eq!(misc.weight, 0.0);
        assert!(!misc.weight.is_nan());

        update_label_weights(&mut labels, &weights);
        assert_eq!(find_label(&labels, &oid("misc")).unwrap().weight, 0.0);
        assert!((labels[0].weight - 1.0).abs() < 1e-12);
    }

    #[test]
    fn update_label_weights_follows_new_map() {
        let chart = two_by_two_chart();
        let mut labels = generate_label_data(&chart, &chart.users()[0].weight_map);
        let weights: WeightMap = vec![(oid("cost"), 0.2), (oid("quality"), 0.3)].into_iter().collect();
        update_label_weights(&mut labels, &weights);
        assert!((labels[0].weight - 0.5).abs() < 1e-12);
        assert!((find_label(&labels, &oid("cost")).unwrap().weight - 0.2).abs() < 1e-12);
    }

    #[test]
    fn move_label_reorders_siblings() {
        let chart = two_by_two_chart();
        let mut labels = generate_label_data(&chart, &chart.users()[0].weight_map);
        move_label(&mut labels, chart.objectives(), &oid("quality"), 0).unwrap();
        assert_eq!(labels[0].sub_label_data[0].objective_id, oid("quality"));
        assert!(move_label(&mut labels, chart.objectives(), &oid("quality"), 5).is_err());
    }
}
