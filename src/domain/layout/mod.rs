//! Derived layout - renderer-facing structures computed from a ValueChart.
//!
//! Nothing here is persisted. Rows, cells and labels are pure functions of
//! the chart plus the maximum weight map, and every join between them uses
//! objective and alternative ids.
//!
//! # Module Organization
//!
//! - `row_data` - rows, cells, weight and stacked-bar offsets
//! - `label_data` - the label hierarchy mirroring the objective tree
//! - `sorting` - alternative orderings (alphabetical, by objective score)
//! - `jump_points` - insertion-index lookup for drag reordering

mod jump_points;
mod label_data;
mod row_data;
mod sorting;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use jump_points::JumpPoints;
pub use label_data::{
    find_label, find_label_mut, generate_label_data, move_label, update_label_weights, LabelData,
};
pub use row_data::{
    generate_row_data, reorder_cells, reorder_rows, update_stacked_bar_offsets,
    update_user_scores, update_weight_offsets, CellData, RowData, UserScoreData,
};
pub use sorting::{alphabetical_order, objective_score_order};

/// Direction the objective rows are laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewOrientation {
    /// Rows stacked top to bottom, bars grow upwards.
    #[default]
    Vertical,
    /// Rows side by side, bars grow rightwards.
    Horizontal,
}

impl fmt::Display for ViewOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewOrientation::Vertical => write!(f, "vertical"),
            ViewOrientation::Horizontal => write!(f, "horizontal"),
        }
    }
}

impl FromStr for ViewOrientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vertical" => Ok(ViewOrientation::Vertical),
            "horizontal" => Ok(ViewOrientation::Horizontal),
            other => Err(format!("unknown orientation '{}'", other)),
        }
    }
}
