//! Domain layer containing the value model and pure layout algorithms.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, errors)
//! - `value_model` - Objectives, domains, score functions, weights, the chart aggregate
//! - `layout` - Derived row/label data and ordering algorithms
//! - `memento` - Undo snapshots and change notifications

pub mod foundation;
pub mod layout;
pub mod memento;
pub mod value_model;
