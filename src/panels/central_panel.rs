use eframe::egui;

use crate::app::EditorApp;
use crate::geometry::hit_testing::{RESIZE_HANDLE_RADIUS, handle_at};
use crate::input::PageTransform;
use crate::scene;
use crate::state::EditorState;
use crate::tools::Tool;

/// Space around the page inside the scroll area
const PAGE_MARGIN: f32 = 40.0;
const DESK_COLOR: egui::Color32 = egui::Color32::from_gray(229);

pub fn central_panel(app: &mut EditorApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none().fill(DESK_COLOR))
        .show(ctx, |ui| {
            egui::ScrollArea::both()
                .auto_shrink([false, false])
                .show(ui, |ui| canvas(app, ctx, ui));
        });
}

fn canvas(app: &mut EditorApp, ctx: &egui::Context, ui: &mut egui::Ui) {
    let scale = app.zoom as f32 / 100.0;
    let page_size = app.config.page_size() * scale;
    let desired = (page_size + egui::Vec2::splat(PAGE_MARGIN * 2.0)).max(ui.available_size());
    let (response, painter) = ui.allocate_painter(desired, egui::Sense::click_and_drag());

    let origin = egui::pos2(
        response.rect.center().x - page_size.x / 2.0,
        response.rect.min.y + PAGE_MARGIN,
    );
    let transform = PageTransform { origin, scale };
    app.input.set_canvas(response.rect.intersect(ui.clip_rect()), transform);
    // keep handles grabbable when zoomed out
    app.tool.set_handle_radius(RESIZE_HANDLE_RADIUS / scale);

    for event in app.input.process_input(ctx, response.hovered()) {
        let commands = app.tool.handle_event(&event, &app.model);
        app.execute(commands);
    }

    update_cursor(app, ctx, &response, transform);

    let page = app.config.page_size();
    let scene = scene::build(app.model.elements(), page.x, page.y);
    app.renderer.render(&painter, transform, &scene, app.config.grid_size);
    app.renderer
        .render_overlays(&painter, transform, &app.model, app.tool.state());
}

fn update_cursor(app: &EditorApp, ctx: &egui::Context, response: &egui::Response, transform: PageTransform) {
    let cursor = match app.tool.state() {
        EditorState::ResizingElement { handle, .. } => Some(handle.cursor_icon()),
        EditorState::DraggingElement { .. } => Some(egui::CursorIcon::Grabbing),
        EditorState::ResizingTableCell { direction, .. } => Some(match direction {
            crate::element::ResizeDirection::Horizontal => egui::CursorIcon::ResizeColumn,
            crate::element::ResizeDirection::Vertical => egui::CursorIcon::ResizeRow,
        }),
        EditorState::DraggingTableSelection { .. } => Some(egui::CursorIcon::Cell),
        EditorState::Idle => response.hover_pos().and_then(|pos| {
            let pos = transform.to_page(pos);
            let radius = RESIZE_HANDLE_RADIUS / transform.scale;
            let on_handle = app
                .model
                .selected_element()
                .filter(|element| app.model.cell_mode() != Some(element.id))
                .and_then(|element| handle_at(element.rect(), pos, radius.max(RESIZE_HANDLE_RADIUS)));
            match on_handle {
                Some(handle) => Some(handle.cursor_icon()),
                None => app
                    .model
                    .document()
                    .element_at(pos)
                    .map(|_| egui::CursorIcon::Grab),
            }
        }),
    };
    if let Some(cursor) = cursor {
        ctx.set_cursor_icon(cursor);
    }
}
