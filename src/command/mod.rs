mod commands;
mod history;

use thiserror::Error;

use crate::id_generator::ElementId;

pub use commands::{Command, TableOp};
pub use history::History;

/// Result type for command operations
pub type CommandResult = Result<(), CommandError>;

/// Reasons a command left the model untouched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("No element with id {0}")]
    UnknownElement(ElementId),

    #[error("Element {0} is not a table")]
    NotATable(ElementId),

    #[error("No table cells selected")]
    NoCellSelection,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}
