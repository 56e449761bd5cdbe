//! Row data - one row per primitive objective, one cell per alternative.
//!
//! Every function here joins on objective and alternative ids, never on
//! positions, so rows and cells survive independent reorderings.

use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

use crate::domain::foundation::{AlternativeId, ObjectiveId};
use crate::domain::value_model::{DomainValue, ValueChart, WeightMap};

use super::ViewOrientation;

/// One user's contribution to a cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserScoreData {
    pub username: String,
    /// Score in [0, 1] under the user's score function.
    pub score: f64,
    /// The user's weight for the row's objective.
    pub weight: f64,
    /// Start of this cell's segment in the alternative's stacked bar.
    pub offset: f64,
}

impl UserScoreData {
    pub fn weighted_score(&self) -> f64 {
        self.score * self.weight
    }

    /// End of this cell's segment in the stacked bar.
    pub fn cumulative(&self) -> f64 {
        self.offset + self.weighted_score()
    }
}

/// One alternative's outcome on one objective row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    pub alternative_id: AlternativeId,
    pub value: Option<DomainValue>,
    pub user_scores: Vec<UserScoreData>,
}

impl CellData {
    pub fn user_score(&self, username: &str) -> Option<&UserScoreData> {
        self.user_scores.iter().find(|s| s.username == username)
    }
}

/// One row per primitive objective.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowData {
    pub objective_id: ObjectiveId,
    /// Prefix sum of the maximum weights of the rows above.
    pub weight_offset: f64,
    pub cells: Vec<CellData>,
}

impl RowData {
    pub fn cell(&self, alternative: &AlternativeId) -> Option<&CellData> {
        self.cells.iter().find(|c| &c.alternative_id == alternative)
    }
}

/// Builds rows in primitive pre-order with cells in alternative order.
///
/// Offsets are left at zero; callers run [`update_weight_offsets`] and
/// [`update_stacked_bar_offsets`] afterwards.
pub fn generate_row_data(chart: &ValueChart) -> Vec<RowData> {
    chart
        .objectives()
        .primitive_ids()
        .into_iter()
        .map(|objective_id| {
            let cells = chart
                .alternatives()
                .iter()
                .map(|alternative| CellData {
                    alternative_id: alternative.id.clone(),
                    value: alternative.get_objective_value(&objective_id).cloned(),
                    user_scores: Vec::new(),
                })
                .collect();
            RowData {
                objective_id,
                weight_offset: 0.0,
                cells,
            }
        })
        .collect()
}

/// Recomputes every cell's per-user score and weight from the live chart.
pub fn update_user_scores(rows: &mut [RowData], chart: &ValueChart) {
    for row in rows.iter_mut() {
        for cell in row.cells.iter_mut() {
            let alternative = match chart.get_alternative(&cell.alternative_id) {
                Some(alternative) => alternative,
                None => {
                    warn!(alternative = %cell.alternative_id, "Row cell has no backing alternative");
                    cell.user_scores.clear();
                    continue;
                }
            };
            cell.user_scores = chart
                .users()
                .iter()
                .map(|user| {
                    let score = chart.score(user, alternative, &row.objective_id).unwrap_or_else(|err| {
                        warn!(
                            alternative = %cell.alternative_id,
                            objective = %row.objective_id,
                            error = %err,
                            "Unscorable cell treated as zero"
                        );
                        0.0
                    });
                    UserScoreData {
                        username: user.username().to_string(),
                        score,
                        weight: user.weight_map.get_objective_weight(&row.objective_id),
                        offset: 0.0,
                    }
                })
                .collect();
        }
    }
}

/// Assigns each row the running sum of the maximum weights above it.
pub fn update_weight_offsets(rows: &mut [RowData], maximum_weights: &WeightMap) {
    let mut offset = 0.0;
    for row in rows.iter_mut() {
        row.weight_offset = offset;
        offset += maximum_weights.get_objective_weight(&row.objective_id);
    }
}

/// Stacks each alternative's weighted scores per user.
///
/// Horizontal charts stack from row 0 onwards. Vertical charts draw row 0
/// at the top while bars grow upwards, so the stack starts at the last row.
pub fn update_stacked_bar_offsets(rows: &mut [RowData], orientation: ViewOrientation) {
    let mut running: HashMap<(AlternativeId, String), f64> = HashMap::new();
    let mut stack = |row: &mut RowData| {
        for cell in row.cells.iter_mut() {
            for user_score in cell.user_scores.iter_mut() {
                let total = running
                    .entry((cell.alternative_id.clone(), user_score.username.clone()))
                    .or_insert(0.0);
                user_score.offset = *total;
                *total += user_score.weighted_score();
            }
        }
    };
    match orientation {
        ViewOrientation::Horizontal => rows.iter_mut().for_each(&mut stack),
        ViewOrientation::Vertical => rows.iter_mut().rev().for_each(&mut stack),
    }
}

/// Stable-sorts rows by their objective's desired index.
///
/// Rows whose objective no longer appears keep their relative order at the end.
pub fn reorder_rows(rows: &mut [RowData], desired: &HashMap<ObjectiveId, usize>) {
    rows.sort_by_key(|row| desired.get(&row.objective_id).copied().unwrap_or(usize::MAX));
}

/// Reorders every row's cells to follow `order`, looked up by alternative id.
pub fn reorder_cells(rows: &mut [RowData], order: &[AlternativeId]) {
    let position: HashMap<&AlternativeId, usize> =
        order.iter().enumerate().map(|(i, id)| (id, i)).collect();
    for row in rows.iter_mut() {
        row.cells
            .sort_by_key(|cell| position.get(&cell.alternative_id).copied().unwrap_or(usize::MAX));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::layout::test_support::{aid, oid, two_by_two_chart};

    fn laid_out(orientation: ViewOrientation) -> Vec<RowData> {
        let chart = two_by_two_chart();
        let mut rows = generate_row_data(&chart);
        update_user_scores(&mut rows, &chart);
        update_weight_offsets(&mut rows, &chart.users()[0].weight_map);
        update_stacked_bar_offsets(&mut rows, orientation);
        rows
    }

    #[test]
    fn rows_follow_primitive_order_and_cells_follow_alternatives() {
        let rows = laid_out(ViewOrientation::Vertical);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].objective_id, oid("cost"));
        assert_eq!(rows[1].objective_id, oid("quality"));
        assert_eq!(rows[0].cells[0].alternative_id, aid("a"));
        assert_eq!(rows[0].cells[1].alternative_id, aid("b"));
    }

    #[test]
    fn weight_offsets_are_prefix_sums() {
        let rows = laid_out(ViewOrientation::Vertical);
        assert_eq!(rows[0].weight_offset, 0.0);
        assert!((rows[1].weight_offset - 0.5).abs() < 1e-12);
    }

    #[test]
    fn cell_scores_follow_score_functions() {
        let rows = laid_out(ViewOrientation::Horizontal);
        let cost_a = rows[0].cell(&aid("a")).unwrap().user_score("sam").unwrap();
        assert!((cost_a.score - 0.9).abs() < 1e-12);
        assert!((cost_a.weighted_score() - 0.45).abs() < 1e-12);
    }

    #[test]
    fn vertical_stacks_from_last_row() {
        let rows = laid_out(ViewOrientation::Vertical);
        let quality_a = rows[1].cell(&aid("a")).unwrap().user_score("sam").unwrap();
        let cost_a = rows[0].cell(&aid("a")).unwrap().user_score("sam").unwrap();
        assert_eq!(quality_a.offset, 0.0);
        assert!((cost_a.offset - 0.4).abs() < 1e-12);
        assert!((cost_a.cumulative() - 0.85).abs() < 1e-12);
    }

    #[test]
    fn horizontal_stacks_from_first_row() {
        let rows = laid_out(ViewOrientation::Horizontal);
        let cost_a = rows[0].cell(&aid("a")).unwrap().user_score("sam").unwrap();
        let quality_a = rows[1].cell(&aid("a")).unwrap().user_score("sam").unwrap();
        assert_eq!(cost_a.offset, 0.0);
        assert!((quality_a.cumulative() - 0.85).abs() < 1e-12);
    }

    #[test]
    fn reorder_cells_joins_on_alternative_id() {
        let mut rows = laid_out(ViewOrientation::Vertical);
        reorder_cells(&mut rows, &[aid("b"), aid("a")]);
        for row in &rows {
            assert_eq!(row.cells[0].alternative_id, aid("b"));
        }
        let cost_b = rows[0].cells[0].user_score("sam").unwrap();
        assert!((cost_b.score - 0.1).abs() < 1e-12);
    }

    #[test]
    fn reorder_rows_uses_desired_index() {
        let mut rows = laid_out(ViewOrientation::Vertical);
        let desired: HashMap<ObjectiveId, usize> =
            vec![(oid("quality"), 0), (oid("cost"), 1)].into_iter().collect();
        reorder_rows(&mut rows, &desired);
        assert_eq!(rows[0].objective_id, oid("quality"));
    }
}
