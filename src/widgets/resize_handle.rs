use egui::{Color32, CursorIcon, Painter, Pos2, Rect, Stroke, Vec2};

/// One of the eight resize handles around a selected element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::NW,
        Handle::N,
        Handle::NE,
        Handle::E,
        Handle::SE,
        Handle::S,
        Handle::SW,
        Handle::W,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Handle::N => "n",
            Handle::S => "s",
            Handle::E => "e",
            Handle::W => "w",
            Handle::NE => "ne",
            Handle::NW => "nw",
            Handle::SE => "se",
            Handle::SW => "sw",
        }
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            Handle::N | Handle::S => CursorIcon::ResizeVertical,
            Handle::E | Handle::W => CursorIcon::ResizeHorizontal,
            Handle::NW | Handle::SE => CursorIcon::ResizeNwSe,
            Handle::NE | Handle::SW => CursorIcon::ResizeNeSw,
        }
    }

    /// Handle moves the left edge
    pub fn moves_west(&self) -> bool {
        matches!(self, Handle::W | Handle::NW | Handle::SW)
    }

    /// Handle moves the right edge
    pub fn moves_east(&self) -> bool {
        matches!(self, Handle::E | Handle::NE | Handle::SE)
    }

    /// Handle moves the top edge
    pub fn moves_north(&self) -> bool {
        matches!(self, Handle::N | Handle::NE | Handle::NW)
    }

    /// Handle moves the bottom edge
    pub fn moves_south(&self) -> bool {
        matches!(self, Handle::S | Handle::SE | Handle::SW)
    }

    /// Where this handle sits on `rect`
    pub fn position(&self, rect: Rect) -> Pos2 {
        match self {
            Handle::N => rect.center_top(),
            Handle::S => rect.center_bottom(),
            Handle::E => rect.right_center(),
            Handle::W => rect.left_center(),
            Handle::NE => rect.right_top(),
            Handle::NW => rect.left_top(),
            Handle::SE => rect.right_bottom(),
            Handle::SW => rect.left_bottom(),
        }
    }
}

/// Paints the handles of a selected element
pub struct ResizeHandle {
    handle: Handle,
    position: Pos2,
    size: f32,
}

impl ResizeHandle {
    pub fn new(handle: Handle, position: Pos2, size: f32) -> Self {
        Self {
            handle,
            position,
            size,
        }
    }

    /// Draw the handle; `hot` when it is hovered or being dragged
    pub fn paint(&self, painter: &Painter, hot: bool) {
        let rect = Rect::from_center_size(self.position, Vec2::splat(self.size));
        let fill = if hot {
            Color32::from_rgb(30, 120, 255)
        } else {
            Color32::WHITE
        };
        painter.rect_filled(rect, 2.0, fill);
        painter.rect_stroke(rect, 2.0, Stroke::new(1.5, Color32::from_rgb(30, 120, 255)));
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_handle_positions() {
        let rect = Rect::from_min_max(pos2(10.0, 20.0), pos2(110.0, 70.0));
        assert_eq!(Handle::NW.position(rect), pos2(10.0, 20.0));
        assert_eq!(Handle::E.position(rect), pos2(110.0, 45.0));
        assert_eq!(Handle::S.position(rect), pos2(60.0, 70.0));
    }

    #[test]
    fn test_edges_moved() {
        assert!(Handle::NW.moves_west() && Handle::NW.moves_north());
        assert!(!Handle::N.moves_east() && !Handle::N.moves_west());
        assert!(Handle::SE.moves_east() && Handle::SE.moves_south());
    }
}
