use std::path::PathBuf;

use eframe::egui;

use crate::app::{EditorApp, StatusKind};
use crate::components::PaletteButton;
use crate::template;

pub fn start_page(app: &mut EditorApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading(egui::RichText::new("Page Composer").size(36.0).strong());
            ui.label("Create invoices and documents on an A4 page, or start from a PDF.");
            ui.add_space(24.0);

            ui.horizontal(|ui| {
                ui.add_space((ui.available_width() - 4.0 * 128.0).max(0.0) / 2.0);
                let size = egui::vec2(120.0, 96.0);
                if PaletteButton::new("➕", "Blank page").with_size(size).show(ui).clicked() {
                    app.new_document();
                }
                for template in template::templates() {
                    let button = PaletteButton::new("📄", template.name).with_size(size);
                    if button.show(ui).on_hover_text(template.description).clicked() {
                        app.load_template(template.id);
                    }
                }
            });

            ui.add_space(24.0);
            ui.separator();
            ui.label("Import a PDF to fill the invoice template from its text (or drop one here):");
            ui.horizontal(|ui| {
                ui.add_space((ui.available_width() - 420.0).max(0.0) / 2.0);
                ui.add(
                    egui::TextEdit::singleline(&mut app.import_path)
                        .hint_text("/path/to/document.pdf")
                        .desired_width(320.0),
                );
                let path = app.import_path.trim().to_owned();
                if ui.add_enabled(!path.is_empty(), egui::Button::new("Import PDF")).clicked() {
                    app.import_pdf_path(&PathBuf::from(path));
                }
            });

            if let Some(path) = app.latest_autosave() {
                ui.add_space(16.0);
                if ui.button("⟲ Restore last session").clicked() {
                    app.restore_autosave(&path);
                }
            }

            if let Some(status) = app.status().filter(|s| s.kind == StatusKind::Error) {
                ui.add_space(16.0);
                ui.colored_label(egui::Color32::from_rgb(185, 28, 28), &status.text);
            }
        });
    });
}
