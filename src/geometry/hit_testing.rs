use egui::{Pos2, Rect, Vec2, pos2, vec2};

use crate::element::{MIN_ELEMENT_HEIGHT, MIN_ELEMENT_WIDTH};
use crate::widgets::Handle;

/// Pick radius around a resize handle, in page units
pub const RESIZE_HANDLE_RADIUS: f32 = 6.0;
/// Drawn size of a resize handle, in screen points
pub const RESIZE_HANDLE_SIZE: f32 = 8.0;
/// Distance from a cell's right/bottom edge that starts a cell resize
pub const CELL_EDGE_TOLERANCE: f32 = 4.0;

/// Round a coordinate to the nearest grid line
pub fn snap(value: f32, grid: f32) -> f32 {
    if grid <= 0.0 {
        return value;
    }
    (value / grid).round() * grid
}

/// Target origin of a dragged element: snapped to the grid, then kept
/// fully inside the page.
pub fn drag_target(pointer: Pos2, offset: Vec2, size: Vec2, page: Vec2, grid: f32) -> Pos2 {
    let target = pointer - offset;
    let max = (page - size).max(Vec2::ZERO);
    pos2(
        snap(target.x, grid).clamp(0.0, max.x),
        snap(target.y, grid).clamp(0.0, max.y),
    )
}

/// New geometry of an element whose `handle` is dragged to `pointer`.
///
/// The edge opposite the handle stays put while the size is above the
/// minimum. Dragging past the opposite edge pins the size to the minimum.
pub fn resize_rect(original: Rect, handle: Handle, pointer: Pos2) -> Rect {
    let (x0, y0) = (original.min.x, original.min.y);
    let (w0, h0) = (original.width(), original.height());
    let (mut x, mut y, mut w, mut h) = (x0, y0, w0, h0);

    if handle.moves_east() {
        w = (pointer.x - x0).max(MIN_ELEMENT_WIDTH);
    }
    if handle.moves_west() {
        w = (w0 + (x0 - pointer.x)).max(MIN_ELEMENT_WIDTH);
        x = x0.min(pointer.x);
    }
    if handle.moves_south() {
        h = (pointer.y - y0).max(MIN_ELEMENT_HEIGHT);
    }
    if handle.moves_north() {
        h = (h0 + (y0 - pointer.y)).max(MIN_ELEMENT_HEIGHT);
        y = y0.min(pointer.y);
    }

    Rect::from_min_size(pos2(x, y), vec2(w, h))
}

/// The handle of `rect` under `pos`, if any
pub fn handle_at(rect: Rect, pos: Pos2, radius: f32) -> Option<Handle> {
    Handle::ALL
        .into_iter()
        .find(|handle| handle.position(rect).distance(pos) <= radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap() {
        assert_eq!(snap(14.0, 10.0), 10.0);
        assert_eq!(snap(15.0, 10.0), 20.0);
        assert_eq!(snap(-4.0, 10.0), 0.0);
        assert_eq!(snap(7.3, 0.0), 7.3);
    }

    #[test]
    fn test_drag_target_clamps_to_page() {
        let page = vec2(595.0, 842.0);
        let size = vec2(100.0, 50.0);
        let target = drag_target(pos2(-30.0, 900.0), Vec2::ZERO, size, page, 10.0);
        assert_eq!(target, pos2(0.0, 792.0));

        let target = drag_target(pos2(133.0, 47.0), vec2(10.0, 10.0), size, page, 10.0);
        assert_eq!(target, pos2(120.0, 40.0));
    }

    #[test]
    fn test_resize_east_floors_width() {
        let original = Rect::from_min_size(pos2(100.0, 100.0), vec2(100.0, 40.0));
        let rect = resize_rect(original, Handle::E, pos2(130.0, 120.0));
        assert_eq!(rect.width(), MIN_ELEMENT_WIDTH);
        assert_eq!(rect.min, original.min);
    }

    #[test]
    fn test_resize_west_moves_origin() {
        let original = Rect::from_min_size(pos2(100.0, 100.0), vec2(100.0, 40.0));
        let rect = resize_rect(original, Handle::W, pos2(80.0, 120.0));
        assert_eq!(rect.min.x, 80.0);
        assert_eq!(rect.width(), 120.0);
        assert_eq!(rect.height(), 40.0);
    }

    #[test]
    fn test_resize_corner_combines_axes() {
        let original = Rect::from_min_size(pos2(100.0, 100.0), vec2(100.0, 100.0));
        let rect = resize_rect(original, Handle::NW, pos2(90.0, 180.0));
        assert_eq!(rect.min.x, 90.0);
        assert_eq!(rect.width(), 110.0);
        assert_eq!(rect.min.y, 100.0);
        assert_eq!(rect.height(), MIN_ELEMENT_HEIGHT);
    }

    #[test]
    fn test_handle_at() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 60.0));
        assert_eq!(handle_at(rect, pos2(101.0, 31.0), RESIZE_HANDLE_RADIUS), Some(Handle::E));
        assert_eq!(handle_at(rect, pos2(2.0, 2.0), RESIZE_HANDLE_RADIUS), Some(Handle::NW));
        assert_eq!(handle_at(rect, pos2(50.0, 20.0), RESIZE_HANDLE_RADIUS), None);
    }
}
