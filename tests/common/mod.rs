//! Shared fixture for the integration tests.

#![allow(dead_code)]

use value_charts::application::ChartHandle;
use value_charts::config::ViewerConfig;
use value_charts::domain::foundation::{AlternativeId, ObjectiveId};
use value_charts::domain::layout::RowData;
use value_charts::domain::value_model::{
    AbstractObjective, Alternative, ContinuousDomain, ContinuousScoreFunction, Domain, DomainValue,
    Objective, PrimitiveObjective, ScoreFunction, ScoreFunctionMap, User, ValueChart, WeightMap,
};

pub const EPSILON: f64 = 1e-9;

pub fn oid(s: &str) -> ObjectiveId {
    ObjectiveId::new(s).unwrap()
}

pub fn aid(s: &str) -> AlternativeId {
    AlternativeId::new(s).unwrap()
}

fn linear(increasing: bool) -> ScoreFunction {
    let mut function = ScoreFunction::Continuous(ContinuousScoreFunction::new(0.0, 100.0));
    let (low, high) = if increasing { (0.0, 1.0) } else { (1.0, 0.0) };
    function.set_element_score(&DomainValue::Number(0.0), low).unwrap();
    function.set_element_score(&DomainValue::Number(100.0), high).unwrap();
    function
}

/// Root { Cost, Quality } over 0..100.
///
/// Laptop A costs 10 with quality 80; laptop B costs 90 with quality 20.
/// "sam" prefers low cost and high quality and weighs them equally, so A
/// totals 0.85 and B 0.15.
pub fn laptop_chart(with_user: bool) -> ValueChart {
    let percent = || Domain::Continuous(ContinuousDomain::new(0.0, 100.0, None).unwrap());
    let mut chart = ValueChart::new("Laptops", "sam");
    chart
        .add_objective(None, Objective::Abstract(AbstractObjective::new(oid("root"), "Root")))
        .unwrap();
    chart
        .add_objective(
            Some(&oid("root")),
            Objective::Primitive(PrimitiveObjective::new(oid("cost"), "Cost", percent())),
        )
        .unwrap();
    chart
        .add_objective(
            Some(&oid("root")),
            Objective::Primitive(PrimitiveObjective::new(oid("quality"), "Quality", percent())),
        )
        .unwrap();
    chart
        .add_alternative(
            Alternative::new(aid("a"), "A")
                .with_value(oid("cost"), 10.0)
                .with_value(oid("quality"), 80.0),
        )
        .unwrap();
    chart
        .add_alternative(
            Alternative::new(aid("b"), "B")
                .with_value(oid("cost"), 90.0)
                .with_value(oid("quality"), 20.0),
        )
        .unwrap();
    if with_user {
        let weights: WeightMap = vec![(oid("cost"), 0.5), (oid("quality"), 0.5)].into_iter().collect();
        let functions: ScoreFunctionMap =
            vec![(oid("cost"), linear(false)), (oid("quality"), linear(true))].into_iter().collect();
        chart.add_user(User::new("sam", weights, functions).unwrap()).unwrap();
    }
    chart
}

pub fn laptop_handle() -> ChartHandle {
    ChartHandle::new(laptop_chart(true), ViewerConfig::default())
}

pub fn current_weight(handle: &ChartHandle, id: &str) -> f64 {
    handle
        .charts()
        .current_user()
        .map(|user| user.weight_map.get_objective_weight(&oid(id)))
        .unwrap_or(0.0)
}

pub fn alternative_order(handle: &ChartHandle) -> Vec<AlternativeId> {
    handle.charts().chart().alternative_order()
}

/// Top of an alternative's stacked bar for one user.
pub fn stack_top(rows: &[RowData], alternative: &str, username: &str) -> f64 {
    rows.iter()
        .filter_map(|row| row.cell(&aid(alternative)))
        .filter_map(|cell| cell.user_score(username))
        .map(|score| score.cumulative())
        .fold(0.0, f64::max)
}
