//! Memento records and change notifications for undo/redo.

mod change;
mod records;

pub use change::{ChangeTopic, ChartChange};
pub use records::{
    AlternativeOrderRecord, ChangeKind, ChartMemento, ObjectivesRecord, ScoreFunctionRecord,
};
