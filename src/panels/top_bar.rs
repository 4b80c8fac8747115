use eframe::egui;

use crate::app::{EditorApp, StatusKind};
use crate::command::Command;

pub fn top_bar(app: &mut EditorApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.heading("Page Composer");
            ui.separator();

            if ui.button("🏠 Home").clicked() {
                app.screen = crate::app::Screen::Start;
            }
            if ui.button("🗋 New").clicked() {
                app.new_document();
            }
            ui.separator();

            let can_undo = app.model.can_undo();
            let can_redo = app.model.can_redo();
            if ui
                .add_enabled(can_undo, egui::Button::new("⟲ Undo"))
                .on_hover_text("Ctrl+Z")
                .clicked()
            {
                app.execute(vec![Command::Undo]);
            }
            if ui
                .add_enabled(can_redo, egui::Button::new("⟳ Redo"))
                .on_hover_text("Ctrl+Shift+Z")
                .clicked()
            {
                app.execute(vec![Command::Redo]);
            }
            ui.separator();

            if ui
                .add_enabled(app.zoom > app.config.zoom_min, egui::Button::new("−"))
                .clicked()
            {
                app.zoom_out();
            }
            ui.label(format!("{}%", app.zoom));
            if ui
                .add_enabled(app.zoom < app.config.zoom_max, egui::Button::new("+"))
                .clicked()
            {
                app.zoom_in();
            }
            let mut show_grid = app.show_grid;
            if ui.checkbox(&mut show_grid, "Grid").changed() {
                app.set_show_grid(show_grid);
            }

            if let Some(session) = &app.source {
                ui.separator();
                let page = session.page;
                let total = session.document.pages.len();
                let mut target = None;
                if ui.add_enabled(page > 0, egui::Button::new("◀")).clicked() {
                    target = Some(page - 1);
                }
                ui.label(format!("Page {} / {}", page + 1, total));
                if ui.add_enabled(page + 1 < total, egui::Button::new("▶")).clicked() {
                    target = Some(page + 1);
                }
                if let Some(target) = target {
                    app.go_to_import_page(target);
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let exporting = app.exporter.in_flight();
                let label = if exporting { "Exporting..." } else { "⬇ Export PDF" };
                if ui.add_enabled(!exporting, egui::Button::new(label)).clicked() {
                    app.start_export();
                }
                if exporting {
                    ui.spinner();
                }

                let now = ui.input(|i| i.time);
                if let Some(status) = app.visible_status(now) {
                    let color = match status.kind {
                        StatusKind::Info => egui::Color32::from_rgb(22, 101, 52),
                        StatusKind::Error => egui::Color32::from_rgb(185, 28, 28),
                    };
                    ui.colored_label(color, &status.text);
                    ctx.request_repaint_after(std::time::Duration::from_secs(1));
                }
            });
        });
    });
}
