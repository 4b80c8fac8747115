use std::collections::BTreeSet;

use egui::Vec2;

use crate::command::{Command, CommandError, CommandResult, History};
use crate::config::EditorConfig;
use crate::document::Document;
use crate::element::{CellIndex, Element};
use crate::id_generator::ElementId;

/// Cells selected inside one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSelection {
    pub table: ElementId,
    pub cells: BTreeSet<CellIndex>,
}

/// Everything a command can touch: the document, its history and the
/// table cell-edit mode.
///
/// All mutation goes through [`EditorModel::execute`] so that tools and panels
/// stay free of model logic and can be tested without a window.
#[derive(Debug, Clone)]
pub struct EditorModel {
    pub(crate) document: Document,
    pub(crate) history: History,
    pub(crate) table_selection: Option<TableSelection>,
    cell_mode: Option<ElementId>,
    page_size: Vec2,
}

impl Default for EditorModel {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl EditorModel {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            document: Document::new(),
            history: History::new(config.history_limit),
            table_selection: None,
            cell_mode: None,
            page_size: config.page_size(),
        }
    }

    pub fn execute(&mut self, command: Command) -> CommandResult {
        log::trace!("Executing {:?}", command);
        command.execute(self)
    }

    /// Execute a batch, stopping at nothing: failures are logged and skipped
    pub fn execute_all(&mut self, commands: impl IntoIterator<Item = Command>) {
        for command in commands {
            if let Err(err) = self.execute(command) {
                log::debug!("Command skipped: {}", err);
            }
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn elements(&self) -> &[Element] {
        self.document.elements()
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.document.element(id)
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.document.selected()
    }

    pub fn selected_element(&self) -> Option<&Element> {
        self.document.selected_element()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn page_size(&self) -> Vec2 {
        self.page_size
    }

    /// The table currently in cell-edit mode
    pub fn cell_mode(&self) -> Option<ElementId> {
        self.cell_mode
    }

    pub fn table_selection(&self) -> Option<&TableSelection> {
        self.table_selection.as_ref()
    }

    /// Selected cells of `table`, empty when another table (or none) owns the selection
    pub fn selected_cells(&self, table: ElementId) -> BTreeSet<CellIndex> {
        self.table_selection
            .as_ref()
            .filter(|selection| selection.table == table)
            .map(|selection| selection.cells.clone())
            .unwrap_or_default()
    }

    /// Snapshot the live collection unless it already matches the latest entry
    pub(crate) fn commit(&mut self) {
        if self.document.elements() == self.history.current() {
            log::trace!("Commit skipped, nothing changed");
            return;
        }
        self.history.commit(self.document.elements().to_vec());
    }

    pub(crate) fn enter_cell_mode(&mut self, table: ElementId) {
        if self.cell_mode != Some(table) {
            self.table_selection = None;
        }
        self.cell_mode = Some(table);
    }

    pub(crate) fn leave_cell_mode(&mut self) {
        self.cell_mode = None;
        self.table_selection = None;
    }

    pub(crate) fn require_table(&self, id: ElementId) -> Result<(), CommandError> {
        let element = self
            .document
            .element(id)
            .ok_or(CommandError::UnknownElement(id))?;
        match element.as_table() {
            Some(_) => Ok(()),
            None => Err(CommandError::NotATable(id)),
        }
    }
}
