//! Pointer interaction states of the canvas.
//!
//! Exactly one gesture is active at a time. Every gesture starts from `Idle`
//! on pointer-down and returns to `Idle` on pointer-up or pointer-leave:
//!
//! ```text
//!              ┌──────────────────────────┐
//!              │     DraggingElement      │
//!              ├──────────────────────────┤
//! ┌──────┐     │     ResizingElement      │     ┌──────┐
//! │ Idle ├────►├──────────────────────────┤────►│ Idle │
//! └──────┘     │  DraggingTableSelection  │     └──────┘
//!              ├──────────────────────────┤
//!              │    ResizingTableCell     │
//!              └──────────────────────────┘
//! ```
use egui::{Pos2, Rect, Vec2};

use crate::element::{CellIndex, ResizeDirection};
use crate::id_generator::ElementId;
use crate::widgets::Handle;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditorState {
    /// No active gesture
    #[default]
    Idle,
    /// Moving an element; `offset` is the pointer position inside the element
    DraggingElement {
        id: ElementId,
        offset: Vec2,
        original: Rect,
    },
    /// Dragging one of the eight handles of the selected element
    ResizingElement {
        id: ElementId,
        handle: Handle,
        original: Rect,
    },
    /// Sweeping a cell selection inside a table in cell mode
    DraggingTableSelection { id: ElementId, last: CellIndex },
    /// Dragging a cell's right or bottom edge
    ResizingTableCell {
        id: ElementId,
        direction: ResizeDirection,
        last: Pos2,
        moved: bool,
    },
}

impl EditorState {
    pub fn is_idle(&self) -> bool {
        matches!(self, EditorState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, EditorState::DraggingElement { .. })
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self, EditorState::ResizingElement { .. })
    }

    /// The element the active gesture operates on
    pub fn active_element(&self) -> Option<ElementId> {
        match self {
            EditorState::Idle => None,
            EditorState::DraggingElement { id, .. }
            | EditorState::ResizingElement { id, .. }
            | EditorState::DraggingTableSelection { id, .. }
            | EditorState::ResizingTableCell { id, .. } => Some(*id),
        }
    }

    /// Resize handle being dragged, for cursor feedback
    pub fn active_handle(&self) -> Option<Handle> {
        match self {
            EditorState::ResizingElement { handle, .. } => Some(*handle),
            _ => None,
        }
    }
}
