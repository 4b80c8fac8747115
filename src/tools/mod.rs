use egui::{Key, Modifiers, Pos2};

use crate::command::Command;
use crate::input::InputEvent;
use crate::state::EditorModel;

mod selection_tool;
pub use selection_tool::SelectionTool;

/// Tool trait defines the interface for canvas interaction tools.
///
/// Tools never touch the model directly: they read it and answer with the
/// commands the app should execute.
pub trait Tool {
    /// Return the name of the tool
    fn name(&self) -> &'static str;

    /// Handle pointer press on the canvas.
    /// Return the commands that **begin** an action, if any.
    fn on_pointer_down(
        &mut self,
        pos: Pos2,
        double_click: bool,
        model: &EditorModel,
    ) -> Vec<Command>;

    /// Handle pointer movement. Returns uncommitted updates while a gesture is active.
    fn on_pointer_move(&mut self, pos: Pos2, model: &EditorModel) -> Vec<Command>;

    /// Handle pointer release. Return the commands that **finalize** an action.
    fn on_pointer_up(&mut self, pos: Pos2, model: &EditorModel) -> Vec<Command>;

    /// The pointer left the canvas mid-gesture
    fn on_pointer_leave(&mut self, model: &EditorModel) -> Vec<Command>;

    /// Handle a key press
    fn on_key(
        &mut self,
        key: Key,
        modifiers: Modifiers,
        text_input_focused: bool,
        model: &EditorModel,
    ) -> Vec<Command>;

    /// Dispatch an input event to the matching handler
    fn handle_event(&mut self, event: &InputEvent, model: &EditorModel) -> Vec<Command> {
        match event {
            InputEvent::PointerDown { pos, double_click } => {
                self.on_pointer_down(*pos, *double_click, model)
            }
            InputEvent::PointerMove { pos } => self.on_pointer_move(*pos, model),
            InputEvent::PointerUp { pos } => self.on_pointer_up(*pos, model),
            InputEvent::PointerLeave => self.on_pointer_leave(model),
            InputEvent::KeyDown {
                key,
                modifiers,
                text_input_focused,
            } => self.on_key(*key, *modifiers, *text_input_focused, model),
        }
    }
}
