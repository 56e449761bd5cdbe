//! ValueCharts - Multi-criteria decision analysis core
//!
//! This crate implements the value model behind a ValueChart (objectives,
//! alternatives, users with weights and score functions), the derived
//! layout a renderer draws from, and the interactions and undo/redo history
//! that edit it.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
