use eframe::egui;

use crate::app::{EditorApp, ImportSession, Screen, StatusKind};
use crate::pdf_import::ExtractedFields;

enum Action {
    Stay,
    Cancel,
    OpenTemplate,
    OpenRawText,
    SmartFill,
}

fn field_rows(fields: &mut ExtractedFields) -> [(&'static str, &mut String); 4] {
    [
        ("Name", &mut fields.name),
        ("Address", &mut fields.address),
        ("Case number", &mut fields.case_number),
        ("Date", &mut fields.date),
    ]
}

/// Review screen for an imported PDF: page navigation, extracted text and
/// editable fields
pub fn import_panel(app: &mut EditorApp, ctx: &egui::Context) {
    let Screen::Import(mut session) = std::mem::take(&mut app.screen) else {
        return;
    };
    let mut action = Action::Stay;

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.heading("PDF Data Preview");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("✖ Close").clicked() {
                    action = Action::Cancel;
                }
            });
        });
        ui.separator();

        page_navigation(ui, &mut session);

        let page_index = session.page;
        let Some(page) = session.document.page_mut(page_index) else {
            ui.label("No data extracted.");
            return;
        };

        if page.garbled {
            ui.colored_label(
                egui::Color32::from_rgb(180, 83, 9),
                "⚠ The text on this page looks garbled. The PDF may use embedded fonts without a text mapping.",
            );
        }

        ui.columns(2, |columns| {
            columns[0].label(egui::RichText::new("Extracted fields").strong());
            egui::Grid::new("extracted_fields")
                .num_columns(2)
                .show(&mut columns[0], |ui| {
                    for (label, value) in field_rows(&mut page.data) {
                        ui.label(label);
                        ui.text_edit_singleline(value);
                        ui.end_row();
                    }
                });
            columns[0].small("The extraction may not be perfect. You can edit values here or in the editor.");

            columns[1].label(egui::RichText::new(format!("Page {} text", page.page_number)).strong());
            egui::ScrollArea::vertical()
                .max_height(360.0)
                .show(&mut columns[1], |ui| {
                    ui.label(&page.text);
                });
        });

        ui.add_space(12.0);
        ui.horizontal(|ui| {
            if ui.button("Open in editor").on_hover_text("Fill the invoice template").clicked() {
                action = Action::OpenTemplate;
            }
            if ui.button("Use raw text").clicked() {
                action = Action::OpenRawText;
            }
            let exporting = app.exporter.in_flight();
            if ui
                .add_enabled(!exporting, egui::Button::new("Generate case summary PDF"))
                .clicked()
            {
                action = Action::SmartFill;
            }
        });

        let now = ui.input(|i| i.time);
        if let Some(status) = app.visible_status(now) {
            let color = match status.kind {
                StatusKind::Info => egui::Color32::from_rgb(22, 101, 52),
                StatusKind::Error => egui::Color32::from_rgb(185, 28, 28),
            };
            ui.colored_label(color, &status.text);
        }
    });

    match action {
        Action::Stay => app.screen = Screen::Import(session),
        Action::Cancel => app.screen = Screen::Start,
        Action::OpenTemplate => app.open_import(session, false),
        Action::OpenRawText => app.open_import(session, true),
        Action::SmartFill => {
            let fields = session.fields();
            app.screen = Screen::Import(session);
            app.start_smart_fill_export(&fields);
        }
    }
}

fn page_navigation(ui: &mut egui::Ui, session: &mut ImportSession) {
    let total = session.document.pages.len();
    if total <= 1 {
        return;
    }
    ui.horizontal(|ui| {
        if ui.add_enabled(session.page > 0, egui::Button::new("◀ Previous")).clicked() {
            session.page -= 1;
        }
        ui.label(format!("Page {} of {}", session.page + 1, total));
        if ui
            .add_enabled(session.page + 1 < total, egui::Button::new("Next ▶"))
            .clicked()
        {
            session.page += 1;
        }
        ui.separator();
        ui.label("Go to");
        let mut number = session.page + 1;
        if ui.add(egui::DragValue::new(&mut number).range(1..=total)).changed() {
            session.page = number - 1;
        }
    });
}
