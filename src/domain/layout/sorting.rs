//! Alternative orderings.
//!
//! Both sorts are stable and start from the chart's current order, so ties
//! keep their existing relative positions.

use std::cmp::Ordering;

use crate::domain::foundation::{AlternativeId, ObjectiveId};
use crate::domain::value_model::ValueChart;

/// Alternatives ordered by case-insensitive name.
pub fn alphabetical_order(chart: &ValueChart) -> Vec<AlternativeId> {
    let mut alternatives: Vec<_> = chart.alternatives().iter().collect();
    alternatives.sort_by_cached_key(|a| a.name.to_lowercase());
    alternatives.into_iter().map(|a| a.id.clone()).collect()
}

/// Alternatives ordered by descending weighted score over `objectives`.
///
/// Abstract objectives count through their primitive descendants. Group
/// charts sum the weighted score of every user.
pub fn objective_score_order(chart: &ValueChart, objectives: &[ObjectiveId]) -> Vec<AlternativeId> {
    let mut scored: Vec<(AlternativeId, f64)> = chart
        .alternatives()
        .iter()
        .map(|alternative| {
            let score = chart
                .users()
                .iter()
                .map(|user| chart.weighted_score(user, alternative, objectives))
                .sum();
            (alternative.id.clone(), score)
        })
        .collect();
    scored.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(id, _)| id).collect()
}
