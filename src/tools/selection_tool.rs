use std::collections::BTreeSet;

use egui::{Key, Modifiers, Pos2, Vec2};
use log::debug;

use crate::command::{Command, TableOp};
use crate::config::EditorConfig;
use crate::element::{Element, ElementPatch, ResizeDirection};
use crate::geometry::hit_testing::{
    CELL_EDGE_TOLERANCE, RESIZE_HANDLE_RADIUS, drag_target, handle_at, resize_rect,
};
use crate::state::{EditorModel, EditorState};
use crate::tools::Tool;

/// Nudge distance for arrow keys, and with Shift held
const NUDGE_STEP: f32 = 1.0;
const NUDGE_STEP_LARGE: f32 = 10.0;

/// The canvas pointer state machine: select, drag, resize, and table cell
/// selection/resizing while a table is in cell mode.
#[derive(Debug, Clone)]
pub struct SelectionTool {
    state: EditorState,
    grid_size: f32,
    page_size: Vec2,
    handle_radius: f32,
}

impl Default for SelectionTool {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl SelectionTool {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            state: EditorState::Idle,
            grid_size: config.grid_size,
            page_size: config.page_size(),
            handle_radius: RESIZE_HANDLE_RADIUS,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Grow the handle pick radius at low zoom so handles stay grabbable
    pub fn set_handle_radius(&mut self, radius: f32) {
        self.handle_radius = radius.max(RESIZE_HANDLE_RADIUS);
    }

    /// Abandon any gesture without committing
    pub fn reset(&mut self) {
        self.state = EditorState::Idle;
    }

    fn transition(&mut self, state: EditorState) {
        debug!("Selection tool: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Pointer-down inside the table that is in cell mode
    fn begin_cell_gesture(&mut self, table: &Element, pos: Pos2, model: &EditorModel) -> Vec<Command> {
        let Some(grid) = table.as_table() else {
            return Vec::new();
        };
        let local = (pos - table.origin()).to_pos2();
        let size = table.size();

        if let Some((direction, cell)) = grid.edge_at(local, size, CELL_EDGE_TOLERANCE) {
            let mut commands = Vec::new();
            if !model.selected_cells(table.id).contains(&cell) {
                commands.push(Command::SelectCells {
                    table: table.id,
                    cells: BTreeSet::from([cell]),
                });
            }
            self.transition(EditorState::ResizingTableCell {
                id: table.id,
                direction,
                last: pos,
                moved: false,
            });
            return commands;
        }

        match grid.cell_at(local, size) {
            Some(cell) => {
                self.transition(EditorState::DraggingTableSelection { id: table.id, last: cell });
                vec![Command::SelectCells {
                    table: table.id,
                    cells: BTreeSet::from([cell]),
                }]
            }
            None => Vec::new(),
        }
    }

    /// Leave any gesture, committing if it changed the document
    fn finish(&mut self, model: &EditorModel) -> Vec<Command> {
        let commands = match &self.state {
            EditorState::Idle | EditorState::DraggingTableSelection { .. } => Vec::new(),
            EditorState::DraggingElement { id, original, .. }
            | EditorState::ResizingElement { id, original, .. } => {
                let changed = model.element(*id).is_some_and(|e| e.rect() != *original);
                if changed { vec![Command::Commit] } else { Vec::new() }
            }
            EditorState::ResizingTableCell { moved, .. } => {
                if *moved { vec![Command::Commit] } else { Vec::new() }
            }
        };
        if !self.state.is_idle() {
            self.transition(EditorState::Idle);
        }
        commands
    }
}

impl Tool for SelectionTool {
    fn name(&self) -> &'static str {
        "Selection"
    }

    fn on_pointer_down(
        &mut self,
        pos: Pos2,
        double_click: bool,
        model: &EditorModel,
    ) -> Vec<Command> {
        if !self.state.is_idle() {
            // a press without a release, e.g. focus was lost mid-gesture
            self.reset();
        }

        if let Some(table) = model.cell_mode().and_then(|id| model.element(id)) {
            if table.hit_test(pos) {
                return self.begin_cell_gesture(table, pos, model);
            }
        }

        if let Some(selected) = model.selected_element() {
            if let Some(handle) = handle_at(selected.rect(), pos, self.handle_radius) {
                self.transition(EditorState::ResizingElement {
                    id: selected.id,
                    handle,
                    original: selected.rect(),
                });
                return Vec::new();
            }
        }

        match model.document().element_at(pos) {
            Some(element) if double_click && element.as_table().is_some() => {
                vec![Command::SetCellMode(Some(element.id))]
            }
            Some(element) => {
                self.transition(EditorState::DraggingElement {
                    id: element.id,
                    offset: pos - element.origin(),
                    original: element.rect(),
                });
                if model.selected() == Some(element.id) {
                    Vec::new()
                } else {
                    vec![Command::Select(Some(element.id))]
                }
            }
            None => vec![Command::SetCellMode(None), Command::Select(None)],
        }
    }

    fn on_pointer_move(&mut self, pos: Pos2, model: &EditorModel) -> Vec<Command> {
        match &mut self.state {
            EditorState::Idle => Vec::new(),

            EditorState::DraggingElement { id, offset, .. } => {
                let Some(element) = model.element(*id) else {
                    return Vec::new();
                };
                let target = drag_target(pos, *offset, element.size(), self.page_size, self.grid_size);
                if target == element.origin() {
                    return Vec::new();
                }
                vec![Command::UpdateElement {
                    id: *id,
                    patch: ElementPatch::position(target),
                }]
            }

            EditorState::ResizingElement { id, handle, original } => {
                let rect = resize_rect(*original, *handle, pos);
                if model.element(*id).is_some_and(|e| e.rect() == rect) {
                    return Vec::new();
                }
                vec![Command::UpdateElement {
                    id: *id,
                    patch: ElementPatch::rect(rect),
                }]
            }

            EditorState::DraggingTableSelection { id, last } => {
                let Some(table) = model.element(*id) else {
                    return Vec::new();
                };
                let local = (pos - table.origin()).to_pos2();
                let cell = table
                    .as_table()
                    .and_then(|grid| grid.cell_at(local, table.size()));
                match cell {
                    Some(cell) if cell != *last => {
                        *last = cell;
                        vec![Command::ExtendCellSelection { table: *id, cell }]
                    }
                    _ => Vec::new(),
                }
            }

            EditorState::ResizingTableCell {
                id,
                direction,
                last,
                moved,
            } => {
                let delta = match direction {
                    ResizeDirection::Horizontal => pos.x - last.x,
                    ResizeDirection::Vertical => pos.y - last.y,
                };
                if delta == 0.0 {
                    return Vec::new();
                }
                *last = pos;
                *moved = true;
                vec![Command::Table {
                    id: *id,
                    op: TableOp::ResizeCells {
                        direction: *direction,
                        delta,
                    },
                }]
            }
        }
    }

    fn on_pointer_up(&mut self, _pos: Pos2, model: &EditorModel) -> Vec<Command> {
        self.finish(model)
    }

    fn on_pointer_leave(&mut self, model: &EditorModel) -> Vec<Command> {
        self.finish(model)
    }

    fn on_key(
        &mut self,
        key: Key,
        modifiers: Modifiers,
        text_input_focused: bool,
        model: &EditorModel,
    ) -> Vec<Command> {
        if text_input_focused {
            return Vec::new();
        }
        let selected = model.selected();

        match key {
            Key::Z if modifiers.command && modifiers.shift => vec![Command::Redo],
            Key::Z if modifiers.command => vec![Command::Undo],
            Key::Y if modifiers.command => vec![Command::Redo],
            Key::D if modifiers.command => selected
                .map(|id| vec![Command::DuplicateElement(id)])
                .unwrap_or_default(),
            Key::Delete | Key::Backspace => selected
                .map(|id| vec![Command::DeleteElement(id)])
                .unwrap_or_default(),
            Key::Escape => vec![Command::SetCellMode(None), Command::Select(None)],
            Key::ArrowLeft | Key::ArrowRight | Key::ArrowUp | Key::ArrowDown => {
                let Some(id) = selected else {
                    return Vec::new();
                };
                let step = if modifiers.shift { NUDGE_STEP_LARGE } else { NUDGE_STEP };
                let (dx, dy) = match key {
                    Key::ArrowLeft => (-step, 0.0),
                    Key::ArrowRight => (step, 0.0),
                    Key::ArrowUp => (0.0, -step),
                    _ => (0.0, step),
                };
                vec![Command::Nudge { id, dx, dy }]
            }
            _ => Vec::new(),
        }
    }
}
