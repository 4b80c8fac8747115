use eframe::egui;

use crate::app::EditorApp;
use crate::command::Command;
use crate::components::PaletteButton;
use crate::element::ElementKind;
use crate::template;

/// Short label for the layer list
fn layer_label(kind: &ElementKind) -> String {
    let preview = |text: &str| {
        let line = text.lines().next().unwrap_or_default();
        match line.char_indices().nth(24) {
            Some((end, _)) => format!("{}…", &line[..end]),
            None => line.to_owned(),
        }
    };
    match kind {
        ElementKind::Text(props) => format!("T  {}", preview(&props.content)),
        ElementKind::Image(_) => "🖼  Image".to_owned(),
        ElementKind::Shape(shape) => format!("■  {:?}", shape),
        ElementKind::Icon(props) => format!("★  {}", preview(&props.glyph)),
        ElementKind::Block(props) => format!("▭  {}", preview(&props.label)),
        ElementKind::Table(table) => format!("⊞  Table {}×{}", table.rows(), table.cols()),
    }
}

pub fn tools_panel(app: &mut EditorApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.heading("Templates");
            ui.horizontal_wrapped(|ui| {
                for template in template::templates() {
                    let icon = match template.id {
                        "invoice" => "📋",
                        "resume-minimal" => "📄",
                        _ => "🎨",
                    };
                    let button = PaletteButton::new(icon, template.name).with_size(egui::vec2(84.0, 56.0));
                    if button.show(ui).on_hover_text(template.description).clicked() {
                        app.load_template(template.id);
                    }
                }
            });

            ui.separator();
            ui.heading("Layers");
            ui.label(format!("{} elements", app.model.elements().len()));

            let selected = app.model.selected();
            let mut clicked = None;
            egui::ScrollArea::vertical().show(ui, |ui| {
                // topmost first
                for element in app.model.document().elements_by_z().into_iter().rev() {
                    let label = layer_label(&element.kind);
                    if ui.selectable_label(selected == Some(element.id), label).clicked() {
                        clicked = Some(element.id);
                    }
                }
            });
            if let Some(id) = clicked {
                app.execute(vec![Command::Select(Some(id))]);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::factory;

    #[test]
    fn test_layer_labels() {
        let heading = factory::heading().instantiate(0);
        assert_eq!(layer_label(&heading.kind), "T  Heading Text");
        let table = factory::table(3, 2).instantiate(0);
        assert_eq!(layer_label(&table.kind), "⊞  Table 3×2");

        let mut long = factory::paragraph().instantiate(0);
        if let ElementKind::Text(props) = &mut long.kind {
            props.content = "a".repeat(40);
        }
        assert_eq!(layer_label(&long.kind), format!("T  {}…", "a".repeat(24)));
    }
}
