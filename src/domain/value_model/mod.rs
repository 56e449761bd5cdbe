//! Value model - the persisted aggregate a chart is built from.
//!
//! # Module Organization
//!
//! - `domain` - element sets of primitive objectives
//! - `score_function` - per-user utility functions over a domain
//! - `objective` - the objective hierarchy (arena tree)
//! - `weight_map` / `score_function_map` - per-user preference maps
//! - `alternative` / `user` / `value_chart` - the aggregate root and its parts
//!
//! # Copy semantics
//!
//! WeightMap, ScoreFunction and ObjectiveTree are cloned deeply when captured
//! for undo; they are mutated in place afterwards. Domain values are never
//! mutated after construction and are shared freely.

mod alternative;
mod domain;
mod objective;
mod score_function;
mod score_function_map;
mod user;
mod value_chart;
mod weight_map;

pub use alternative::Alternative;
pub use domain::{
    CategoricalDomain, ContinuousDomain, Domain, DomainValue, IntervalDomain, ELEMENT_EPSILON,
    MAX_INTERVAL_ELEMENTS,
};
pub use objective::{AbstractObjective, Objective, ObjectiveSpec, ObjectiveTree, PrimitiveObjective};
pub use score_function::{
    ContinuousScoreFunction, DiscreteScoreFunction, ElementScore, ScoreFunction, ScoreFunctionKind,
};
pub use score_function_map::ScoreFunctionMap;
pub use user::User;
pub use value_chart::ValueChart;
pub use weight_map::WeightMap;
