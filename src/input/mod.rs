use egui::{Context, Key, Modifiers, PointerButton, Pos2, Rect};

/// Pointer and keyboard events in page coordinates (zoom already divided out)
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed over the canvas
    PointerDown { pos: Pos2, double_click: bool },
    /// Pointer moved while over the canvas or during a gesture
    PointerMove { pos: Pos2 },
    /// Primary button released
    PointerUp { pos: Pos2 },
    /// Pointer left the canvas
    PointerLeave,
    /// A key the editor reacts to was pressed
    KeyDown {
        key: Key,
        modifiers: Modifiers,
        /// A text field owns the keyboard, so editing keys belong to it
        text_input_focused: bool,
    },
}

/// Keys forwarded to the editor; everything else stays with egui
const EDITOR_KEYS: [Key; 10] = [
    Key::Delete,
    Key::Backspace,
    Key::Escape,
    Key::Z,
    Key::Y,
    Key::D,
    Key::ArrowLeft,
    Key::ArrowRight,
    Key::ArrowUp,
    Key::ArrowDown,
];

const DOUBLE_CLICK_SECS: f64 = 0.3;
/// Screen points the pointer may travel between the two clicks
const DOUBLE_CLICK_SLOP: f32 = 6.0;

/// Maps between screen space and page space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageTransform {
    /// Screen position of the page's top-left corner
    pub origin: Pos2,
    /// Screen points per page unit (zoom percent / 100)
    pub scale: f32,
}

impl Default for PageTransform {
    fn default() -> Self {
        Self {
            origin: Pos2::ZERO,
            scale: 1.0,
        }
    }
}

impl PageTransform {
    pub fn to_page(&self, screen: Pos2) -> Pos2 {
        ((screen - self.origin) / self.scale).to_pos2()
    }

    pub fn to_screen(&self, page: Pos2) -> Pos2 {
        self.origin + page.to_vec2() * self.scale
    }

    pub fn rect_to_screen(&self, rect: Rect) -> Rect {
        Rect::from_min_max(self.to_screen(rect.min), self.to_screen(rect.max))
    }
}

/// Handles converting raw egui input into page-space [`InputEvent`]s
#[derive(Debug, Default)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    canvas_rect: Option<Rect>,
    transform: PageTransform,
    /// A press started on the canvas and hasn't been released yet
    pressed: bool,
    /// Time and screen position of the previous press
    last_press: Option<(f64, Pos2)>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the on-screen canvas area and the page mapping for this frame
    pub fn set_canvas(&mut self, canvas_rect: Rect, transform: PageTransform) {
        self.canvas_rect = Some(canvas_rect);
        self.transform = transform;
    }

    pub fn transform(&self) -> PageTransform {
        self.transform
    }

    fn over_canvas(&self, pos: Pos2) -> bool {
        self.canvas_rect.is_some_and(|rect| rect.contains(pos))
    }

    /// Process raw egui input and generate our InputEvents.
    ///
    /// `canvas_hovered` is false when another widget sits above the canvas.
    pub fn process_input(&mut self, ctx: &Context, canvas_hovered: bool) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let text_input_focused = ctx.wants_keyboard_input();

        ctx.input(|input| {
            let hover = input.pointer.hover_pos();
            let inside = hover.is_some_and(|pos| self.over_canvas(pos));

            if let Some(pos) = hover {
                if inside && Some(pos) != self.last_pointer_pos {
                    events.push(InputEvent::PointerMove {
                        pos: self.transform.to_page(pos),
                    });
                }
            }
            if !inside && self.last_pointer_pos.is_some() {
                events.push(InputEvent::PointerLeave);
                self.pressed = false;
            }
            self.last_pointer_pos = hover.filter(|_| inside);

            if input.pointer.button_pressed(PointerButton::Primary) && inside && canvas_hovered {
                if let Some(pos) = hover {
                    // egui reports double clicks on release; the editor needs them on press
                    let double_click = self.last_press.is_some_and(|(time, last)| {
                        input.time - time < DOUBLE_CLICK_SECS && last.distance(pos) < DOUBLE_CLICK_SLOP
                    });
                    self.last_press = if double_click { None } else { Some((input.time, pos)) };
                    self.pressed = true;
                    events.push(InputEvent::PointerDown {
                        pos: self.transform.to_page(pos),
                        double_click,
                    });
                }
            }
            if input.pointer.button_released(PointerButton::Primary) && self.pressed {
                self.pressed = false;
                let pos = hover
                    .or(input.pointer.interact_pos())
                    .map(|pos| self.transform.to_page(pos))
                    .unwrap_or_default();
                events.push(InputEvent::PointerUp { pos });
            }

            for event in &input.events {
                if let egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } = event
                {
                    if EDITOR_KEYS.contains(key) {
                        events.push(InputEvent::KeyDown {
                            key: *key,
                            modifiers: *modifiers,
                            text_input_focused,
                        });
                    }
                }
            }
        });

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_page_transform_round_trip() {
        let transform = PageTransform {
            origin: pos2(100.0, 50.0),
            scale: 0.5,
        };
        assert_eq!(transform.to_page(pos2(150.0, 100.0)), pos2(100.0, 100.0));
        assert_eq!(transform.to_screen(pos2(100.0, 100.0)), pos2(150.0, 100.0));
    }
}
