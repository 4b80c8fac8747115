use std::collections::BTreeSet;

use super::{CommandError, CommandResult};
use crate::element::{CellIndex, Element, ElementPatch, ElementPrototype, ResizeDirection};
use crate::id_generator::ElementId;
use crate::state::{EditorModel, TableSelection};

/// Structural table edits that need the cell selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TableOp {
    /// Merge the selected cells into one spanning cell
    Merge,
    /// Split every selected merged cell
    Unmerge,
    /// Move the right (bottom) edge of the selected cells' columns (rows)
    ResizeCells {
        direction: ResizeDirection,
        delta: f32,
    },
}

/// Commands that can be executed against the editor model
#[derive(Clone, PartialEq)]
pub enum Command {
    /// Insert a new element and select it
    AddElement(ElementPrototype),

    /// Merge a partial update into an element, without a history entry
    UpdateElement { id: ElementId, patch: ElementPatch },

    /// Record the live collection in history if it changed since the last entry
    Commit,

    DeleteElement(ElementId),

    DuplicateElement(ElementId),

    BringToFront(ElementId),

    SendToBack(ElementId),

    /// Move an element by a delta, clamped to the page
    Nudge { id: ElementId, dx: f32, dy: f32 },

    /// Change (or clear) the selected element
    Select(Option<ElementId>),

    /// Swap in a whole new collection and restart history
    ReplaceAll(Vec<Element>),

    Undo,

    Redo,

    /// Enter cell-edit mode for a table, or leave it with `None`
    SetCellMode(Option<ElementId>),

    /// Replace the cell selection
    SelectCells {
        table: ElementId,
        cells: BTreeSet<CellIndex>,
    },

    /// Add one cell to the cell selection
    ExtendCellSelection { table: ElementId, cell: CellIndex },

    Table { id: ElementId, op: TableOp },
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::AddElement(prototype) => f
                .debug_tuple("AddElement")
                .field(&prototype.kind.type_name())
                .finish(),
            Command::UpdateElement { id, patch } => f
                .debug_struct("UpdateElement")
                .field("id", id)
                .field("patch", patch)
                .finish(),
            Command::Commit => write!(f, "Commit"),
            Command::DeleteElement(id) => f.debug_tuple("DeleteElement").field(id).finish(),
            Command::DuplicateElement(id) => f.debug_tuple("DuplicateElement").field(id).finish(),
            Command::BringToFront(id) => f.debug_tuple("BringToFront").field(id).finish(),
            Command::SendToBack(id) => f.debug_tuple("SendToBack").field(id).finish(),
            Command::Nudge { id, dx, dy } => f
                .debug_struct("Nudge")
                .field("id", id)
                .field("dx", dx)
                .field("dy", dy)
                .finish(),
            Command::Select(id) => f.debug_tuple("Select").field(id).finish(),
            Command::ReplaceAll(elements) => f
                .debug_struct("ReplaceAll")
                .field("len", &elements.len())
                .finish_non_exhaustive(),
            Command::Undo => write!(f, "Undo"),
            Command::Redo => write!(f, "Redo"),
            Command::SetCellMode(id) => f.debug_tuple("SetCellMode").field(id).finish(),
            Command::SelectCells { table, cells } => f
                .debug_struct("SelectCells")
                .field("table", table)
                .field("cells", cells)
                .finish(),
            Command::ExtendCellSelection { table, cell } => f
                .debug_struct("ExtendCellSelection")
                .field("table", table)
                .field("cell", cell)
                .finish(),
            Command::Table { id, op } => f
                .debug_struct("Table")
                .field("id", id)
                .field("op", op)
                .finish(),
        }
    }
}

impl Command {
    /// Execute the command against the model.
    ///
    /// Commands naming an unknown element leave the model untouched and
    /// report [`CommandError::UnknownElement`].
    pub fn execute(&self, model: &mut EditorModel) -> CommandResult {
        match self {
            Command::AddElement(prototype) => {
                let id = model.document.add(prototype);
                log::info!("➕ Added {} element {}", prototype.kind.type_name(), id);
                model.leave_cell_mode();
                model.commit();
                Ok(())
            }

            Command::UpdateElement { id, patch } => {
                if model.document.update(*id, patch) {
                    Ok(())
                } else {
                    Err(CommandError::UnknownElement(*id))
                }
            }

            Command::Commit => {
                model.commit();
                Ok(())
            }

            Command::DeleteElement(id) => {
                let removed = model
                    .document
                    .remove(*id)
                    .ok_or(CommandError::UnknownElement(*id))?;
                log::info!("🗑 Deleted {} element {}", removed.type_name(), id);
                if model.cell_mode() == Some(*id) {
                    model.leave_cell_mode();
                }
                model.commit();
                Ok(())
            }

            Command::DuplicateElement(id) => {
                let copy = model
                    .document
                    .duplicate(*id)
                    .ok_or(CommandError::UnknownElement(*id))?;
                log::info!("Duplicated {} as {}", id, copy);
                model.leave_cell_mode();
                model.commit();
                Ok(())
            }

            Command::BringToFront(id) => {
                if !model.document.bring_to_front(*id) {
                    return Err(CommandError::UnknownElement(*id));
                }
                model.commit();
                Ok(())
            }

            Command::SendToBack(id) => {
                if !model.document.send_to_back(*id) {
                    return Err(CommandError::UnknownElement(*id));
                }
                model.commit();
                Ok(())
            }

            Command::Nudge { id, dx, dy } => {
                let page = model.page_size();
                if !model.document.nudge(*id, *dx, *dy, page) {
                    return Err(CommandError::UnknownElement(*id));
                }
                model.commit();
                Ok(())
            }

            Command::Select(id) => {
                if let Some(id) = id {
                    if model.document.element(*id).is_none() {
                        return Err(CommandError::UnknownElement(*id));
                    }
                }
                model.document.select(*id);
                if model.cell_mode().is_some() && model.cell_mode() != *id {
                    model.leave_cell_mode();
                }
                Ok(())
            }

            Command::ReplaceAll(elements) => {
                log::info!("Replacing document with {} elements", elements.len());
                model.document.replace_all(elements.clone());
                model.history.reset(elements.clone());
                model.leave_cell_mode();
                Ok(())
            }

            Command::Undo => {
                let snapshot = model
                    .history
                    .undo()
                    .ok_or(CommandError::NothingToUndo)?
                    .to_vec();
                model.document.replace_all(snapshot);
                model.leave_cell_mode();
                log::debug!("Undo, cursor at {}", model.history.cursor());
                Ok(())
            }

            Command::Redo => {
                let snapshot = model
                    .history
                    .redo()
                    .ok_or(CommandError::NothingToRedo)?
                    .to_vec();
                model.document.replace_all(snapshot);
                model.leave_cell_mode();
                log::debug!("Redo, cursor at {}", model.history.cursor());
                Ok(())
            }

            Command::SetCellMode(None) => {
                model.leave_cell_mode();
                Ok(())
            }

            Command::SetCellMode(Some(id)) => {
                let element = model
                    .document
                    .element(*id)
                    .ok_or(CommandError::UnknownElement(*id))?;
                if element.as_table().is_none() {
                    return Err(CommandError::NotATable(*id));
                }
                model.document.select(Some(*id));
                model.enter_cell_mode(*id);
                log::debug!("Cell mode on for {}", id);
                Ok(())
            }

            Command::SelectCells { table, cells } => {
                model.require_table(*table)?;
                model.table_selection = Some(TableSelection {
                    table: *table,
                    cells: cells.clone(),
                });
                Ok(())
            }

            Command::ExtendCellSelection { table, cell } => {
                model.require_table(*table)?;
                match &mut model.table_selection {
                    Some(selection) if selection.table == *table => {
                        selection.cells.insert(*cell);
                    }
                    _ => {
                        model.table_selection = Some(TableSelection {
                            table: *table,
                            cells: BTreeSet::from([*cell]),
                        });
                    }
                }
                Ok(())
            }

            Command::Table { id, op } => execute_table_op(model, *id, *op),
        }
    }
}

fn execute_table_op(model: &mut EditorModel, id: ElementId, op: TableOp) -> CommandResult {
    model.require_table(id)?;
    let cells = model
        .table_selection
        .as_ref()
        .filter(|selection| selection.table == id && !selection.cells.is_empty())
        .map(|selection| selection.cells.clone())
        .ok_or(CommandError::NoCellSelection)?;

    let Some(element) = model.document.element_mut(id) else {
        return Err(CommandError::UnknownElement(id));
    };
    let size = element.size();
    let Some(table) = element.as_table_mut() else {
        return Err(CommandError::NotATable(id));
    };

    match op {
        TableOp::Merge => {
            if table.merge(&cells) {
                let anchor = cells
                    .iter()
                    .map(|&(r, c)| table.anchor_of(r, c))
                    .min()
                    .unwrap_or((0, 0));
                model.table_selection = Some(TableSelection {
                    table: id,
                    cells: BTreeSet::from([anchor]),
                });
                log::info!("Merged {} cells in {}", cells.len(), id);
                model.commit();
            }
        }
        TableOp::Unmerge => {
            for &(row, col) in &cells {
                table.unmerge(row, col);
            }
            model.commit();
        }
        TableOp::ResizeCells { direction, delta } => {
            table.resize_cells(&cells, direction, delta, size);
        }
    }
    Ok(())
}
