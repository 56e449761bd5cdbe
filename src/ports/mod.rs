//! Ports - interfaces between the application core and its collaborators.
//!
//! # Ports
//!
//! - `ChartChangePublisher` / `ChartChangeSubscriber` - synchronous change bus

mod change_bus;

pub use change_bus::{
    ChartChangeBus, ChartChangeHandler, ChartChangePublisher, ChartChangeSubscriber,
};
