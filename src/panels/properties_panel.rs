use std::path::Path;

use eframe::egui::{self, Response, Ui};

use crate::command::{Command, TableOp};
use crate::components::PaletteButton;
use crate::element::image::data_uri_from_file;
use crate::element::{
    Element, ElementKind, ElementPatch, ElementPrototype, FontStyle, IconPatch, KindPatch,
    MIN_ELEMENT_HEIGHT, MIN_ELEMENT_WIDTH, ShapeType, Style, TablePatch, TextAlign, TextPatch,
    TextProps, factory, parse_color,
};
use crate::id_generator::ElementId;
use crate::state::EditorModel;

const FONT_FAMILIES: [&str; 4] = [
    "Arial, sans-serif",
    "Georgia, serif",
    "Courier New, monospace",
    "Helvetica, sans-serif",
];
const FONT_WEIGHTS: [&str; 4] = ["normal", "500", "600", "bold"];
const SWATCHES: [&str; 8] = [
    "#000000", "#374151", "#6b7280", "#ffffff", "#1e3a8a", "#3b82f6", "#f97316", "#dc2626",
];

/// Entries of the insert palette, in display order
pub fn palette() -> Vec<(&'static str, &'static str, ElementPrototype)> {
    vec![
        ("H", "Heading", factory::heading()),
        ("¶", "Paragraph", factory::paragraph()),
        ("T", "Text", factory::text()),
        ("■", "Box", factory::shape(ShapeType::Rectangle)),
        ("●", "Circle", factory::shape(ShapeType::Circle)),
        ("—", "Line", factory::shape(ShapeType::Line)),
        ("🖼", "Image", factory::image()),
        ("★", "Icon", factory::icon()),
        ("▭", "Block", factory::block()),
        ("⊞", "Table 2×2", factory::table(2, 2)),
        ("⊞", "Table 3×3", factory::table(3, 3)),
        ("⊞", "Table 4×4", factory::table(4, 4)),
        ("▀", "Header band", factory::header_band()),
        ("┄", "Divider", factory::divider()),
    ]
}

fn hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

fn rgb_of(value: &str) -> [u8; 3] {
    let [r, g, b, _] = parse_color(value).unwrap_or(egui::Color32::BLACK).to_srgba_unmultiplied();
    [r, g, b]
}

/// Commands produced by one frame of the inspector
struct Edits {
    id: ElementId,
    commands: Vec<Command>,
}

impl Edits {
    fn patch(&mut self, patch: ElementPatch) {
        self.commands.push(Command::UpdateElement { id: self.id, patch });
    }

    fn commit(&mut self) {
        self.commands.push(Command::Commit);
    }

    /// Continuous control: update live, commit when the interaction ends
    fn track(&mut self, response: &Response, patch: impl FnOnce() -> ElementPatch) {
        if response.changed() {
            self.patch(patch());
        }
        let discrete_change = response.changed() && !response.dragged() && !response.has_focus();
        if response.drag_stopped() || response.lost_focus() || discrete_change {
            self.commit();
        }
    }

    /// One-shot control: update and commit together
    fn apply(&mut self, patch: ElementPatch) {
        self.patch(patch);
        self.commit();
    }

    fn push(&mut self, command: Command) {
        self.commands.push(command);
    }
}

/// Right-hand inspector. A projection of the selected element; every edit
/// comes back as commands.
#[derive(Debug, Default)]
pub struct PropertiesPanel {
    image_path: String,
    image_error: Option<String>,
}

impl PropertiesPanel {
    pub fn show(&mut self, ctx: &egui::Context, model: &EditorModel) -> Vec<Command> {
        let mut commands = Vec::new();
        egui::SidePanel::right("properties_panel")
            .resizable(true)
            .default_width(270.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| match model.selected_element() {
                    Some(element) => commands = self.inspector(ui, model, element),
                    None => commands = insert_palette(ui),
                });
            });
        commands
    }

    fn inspector(&mut self, ui: &mut Ui, model: &EditorModel, element: &Element) -> Vec<Command> {
        let mut edits = Edits {
            id: element.id,
            commands: Vec::new(),
        };

        ui.heading(format!("{} properties", capitalize(element.type_name())));
        ui.separator();
        geometry_section(ui, element, &mut edits);

        match &element.kind {
            ElementKind::Text(props) => {
                text_section(ui, props, &mut edits);
                ui.separator();
                ui.label("Background");
                fill_editor(ui, "text_bg", element.style.background_color.as_deref(), &mut edits);
            }
            ElementKind::Image(props) => {
                self.image_section(ui, &props.src, &element.style, &mut edits);
            }
            ElementKind::Shape(shape) => {
                ui.separator();
                ui.horizontal(|ui| {
                    ui.label("Shape");
                    for (value, label) in [
                        (ShapeType::Rectangle, "Box"),
                        (ShapeType::Circle, "Circle"),
                        (ShapeType::Line, "Line"),
                    ] {
                        if ui.selectable_label(*shape == value, label).clicked() && *shape != value {
                            edits.apply(ElementPatch::kind(KindPatch::Shape(value)));
                        }
                    }
                });
                box_section(ui, &element.style, &mut edits);
            }
            ElementKind::Icon(props) => {
                ui.separator();
                ui.label("Icon");
                let mut glyph = props.glyph.clone();
                let response = ui.text_edit_singleline(&mut glyph);
                edits.track(&response, || {
                    ElementPatch::kind(KindPatch::Icon(IconPatch {
                        glyph: Some(glyph.clone()),
                        ..Default::default()
                    }))
                });
                let mut size = props.font_size;
                let response = ui.add(egui::Slider::new(&mut size, 12.0..=128.0).text("Size"));
                edits.track(&response, || {
                    ElementPatch::kind(KindPatch::Icon(IconPatch {
                        font_size: Some(size),
                        ..Default::default()
                    }))
                });
                if let Some(color) = color_editor(ui, "icon_color", &props.color) {
                    edits.apply(ElementPatch::kind(KindPatch::Icon(IconPatch {
                        color: Some(color),
                        ..Default::default()
                    })));
                }
            }
            ElementKind::Block(props) => {
                ui.separator();
                ui.label("Label");
                let mut label = props.label.clone();
                let response = ui.text_edit_singleline(&mut label);
                edits.track(&response, || ElementPatch::kind(KindPatch::Block { label: label.clone() }));
                box_section(ui, &element.style, &mut edits);
            }
            ElementKind::Table(_) => {
                table_section(ui, model, element, &mut edits);
                box_section(ui, &element.style, &mut edits);
            }
        }

        ui.separator();
        layer_actions(ui, element.id, &mut edits);
        edits.commands
    }

    fn image_section(&mut self, ui: &mut Ui, src: &str, style: &Style, edits: &mut Edits) {
        ui.separator();
        ui.label("Image source (path or URL)");
        let mut value = if src.starts_with("data:") {
            String::from("(embedded image)")
        } else {
            src.to_owned()
        };
        let response = ui.add_enabled(!src.starts_with("data:"), egui::TextEdit::singleline(&mut value));
        edits.track(&response, || ElementPatch::kind(KindPatch::Image { src: value.clone() }));

        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut self.image_path).hint_text("/path/to/image.png"));
            if ui.button("Load file").clicked() {
                match data_uri_from_file(Path::new(self.image_path.trim())) {
                    Ok(uri) => {
                        log::info!("Embedded image {}", self.image_path.trim());
                        self.image_error = None;
                        edits.apply(ElementPatch::kind(KindPatch::Image { src: uri }));
                    }
                    Err(err) => {
                        log::error!("Failed to load image {}: {}", self.image_path.trim(), err);
                        self.image_error = Some(err.to_string());
                    }
                }
            }
        });
        if let Some(err) = &self.image_error {
            ui.colored_label(egui::Color32::from_rgb(220, 38, 38), err);
        }
        if !src.is_empty() {
            ui.horizontal(|ui| {
                // re-sending the same source makes the canvas load it again
                if !src.starts_with("data:") && ui.button("Reload").clicked() {
                    edits.apply(ElementPatch::kind(KindPatch::Image { src: src.to_owned() }));
                }
                if ui.button("Clear image").clicked() {
                    edits.apply(ElementPatch::kind(KindPatch::Image { src: String::new() }));
                }
            });
        }

        let mut percent = (style.opacity * 100.0).round();
        let response = ui.add(egui::Slider::new(&mut percent, 0.0..=100.0).text("Opacity %"));
        edits.track(&response, || ElementPatch {
            opacity: Some(percent / 100.0),
            ..Default::default()
        });
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn insert_palette(ui: &mut Ui) -> Vec<Command> {
    let mut commands = Vec::new();
    ui.heading("Insert");
    ui.label("Nothing selected. Add an element to the page:");
    ui.add_space(4.0);
    egui::Grid::new("insert_palette").spacing([6.0, 6.0]).show(ui, |ui| {
        for (i, (icon, label, prototype)) in palette().into_iter().enumerate() {
            if PaletteButton::new(icon, label).show(ui).clicked() {
                log::info!("Adding {}", label);
                commands.push(Command::AddElement(prototype));
            }
            if i % 3 == 2 {
                ui.end_row();
            }
        }
    });
    commands
}

fn geometry_section(ui: &mut Ui, element: &Element, edits: &mut Edits) {
    egui::Grid::new("geometry").num_columns(4).show(ui, |ui| {
        let mut x = element.x;
        let mut y = element.y;
        ui.label("X");
        let response = ui.add(egui::DragValue::new(&mut x).speed(1.0));
        edits.track(&response, || ElementPatch {
            x: Some(x),
            ..Default::default()
        });
        ui.label("Y");
        let response = ui.add(egui::DragValue::new(&mut y).speed(1.0));
        edits.track(&response, || ElementPatch {
            y: Some(y),
            ..Default::default()
        });
        ui.end_row();

        let mut width = element.width;
        let mut height = element.height;
        ui.label("W");
        let response = ui.add(
            egui::DragValue::new(&mut width)
                .range(MIN_ELEMENT_WIDTH..=2000.0)
                .speed(1.0),
        );
        edits.track(&response, || ElementPatch {
            width: Some(width),
            ..Default::default()
        });
        ui.label("H");
        let response = ui.add(
            egui::DragValue::new(&mut height)
                .range(MIN_ELEMENT_HEIGHT..=2000.0)
                .speed(1.0),
        );
        edits.track(&response, || ElementPatch {
            height: Some(height),
            ..Default::default()
        });
        ui.end_row();
    });
}

fn text_section(ui: &mut Ui, props: &TextProps, edits: &mut Edits) {
    let text = |patch: TextPatch| ElementPatch::text(patch);

    ui.separator();
    ui.label("Content");
    let mut content = props.content.clone();
    let response = ui.add(egui::TextEdit::multiline(&mut content).desired_rows(3));
    edits.track(&response, || {
        text(TextPatch {
            content: Some(content.clone()),
            ..Default::default()
        })
    });

    let mut size = props.font_size;
    let response = ui.add(egui::Slider::new(&mut size, 8.0..=72.0).text("Font size"));
    edits.track(&response, || {
        text(TextPatch {
            font_size: Some(size),
            ..Default::default()
        })
    });

    egui::ComboBox::from_label("Font")
        .selected_text(props.font_family.split(',').next().unwrap_or_default())
        .show_ui(ui, |ui| {
            for family in FONT_FAMILIES {
                if ui.selectable_label(props.font_family == family, family).clicked() {
                    edits.apply(text(TextPatch {
                        font_family: Some(family.to_owned()),
                        ..Default::default()
                    }));
                }
            }
        });

    egui::ComboBox::from_label("Weight")
        .selected_text(props.font_weight.as_str())
        .show_ui(ui, |ui| {
            for weight in FONT_WEIGHTS {
                if ui.selectable_label(props.font_weight == weight, weight).clicked() {
                    edits.apply(text(TextPatch {
                        font_weight: Some(weight.to_owned()),
                        ..Default::default()
                    }));
                }
            }
        });

    ui.horizontal(|ui| {
        let mut italic = props.font_style == FontStyle::Italic;
        if ui.checkbox(&mut italic, "Italic").changed() {
            let style = if italic { FontStyle::Italic } else { FontStyle::Normal };
            edits.apply(text(TextPatch {
                font_style: Some(style),
                ..Default::default()
            }));
        }
        ui.separator();
        for (align, label) in [
            (TextAlign::Left, "⬅"),
            (TextAlign::Center, "↔"),
            (TextAlign::Right, "➡"),
        ] {
            if ui.selectable_label(props.text_align == align, label).clicked() && props.text_align != align {
                edits.apply(text(TextPatch {
                    text_align: Some(align),
                    ..Default::default()
                }));
            }
        }
    });

    ui.label("Color");
    if let Some(color) = color_editor(ui, "text_color", &props.color) {
        edits.apply(text(TextPatch {
            color: Some(color),
            ..Default::default()
        }));
    }

    let mut line_height = props.line_height;
    let response = ui.add(egui::Slider::new(&mut line_height, 1.0..=3.0).text("Line height"));
    edits.track(&response, || {
        text(TextPatch {
            line_height: Some(line_height),
            ..Default::default()
        })
    });
}

/// Color button plus a row of swatches. Returns the new hex color.
fn color_editor(ui: &mut Ui, id: &str, current: &str) -> Option<String> {
    let mut picked = None;
    ui.push_id(id, |ui| {
        ui.horizontal_wrapped(|ui| {
            let mut rgb = rgb_of(current);
            if ui.color_edit_button_srgb(&mut rgb).changed() {
                picked = Some(hex(rgb));
            }
            for swatch in SWATCHES {
                let color = parse_color(swatch).unwrap_or_default();
                let (rect, response) = ui.allocate_exact_size(egui::vec2(16.0, 16.0), egui::Sense::click());
                ui.painter().rect_filled(rect, 3.0, color);
                ui.painter()
                    .rect_stroke(rect, 3.0, egui::Stroke::new(1.0, egui::Color32::from_gray(180)));
                if response.on_hover_text(swatch).clicked() {
                    picked = Some(swatch.to_owned());
                }
            }
        });
    });
    picked
}

/// Background color with a "none" toggle
fn fill_editor(ui: &mut Ui, id: &str, current: Option<&str>, edits: &mut Edits) {
    ui.horizontal(|ui| {
        let mut enabled = current.is_some();
        if ui.checkbox(&mut enabled, "Fill").changed() {
            let value = enabled.then(|| "#ffffff".to_owned());
            edits.apply(ElementPatch {
                background_color: Some(value),
                ..Default::default()
            });
        }
        if let Some(current) = current {
            if let Some(color) = color_editor(ui, id, current) {
                edits.apply(ElementPatch {
                    background_color: Some(Some(color)),
                    ..Default::default()
                });
            }
        }
    });
}

fn box_section(ui: &mut Ui, style: &Style, edits: &mut Edits) {
    ui.separator();
    ui.label("Box");
    fill_editor(ui, "box_fill", style.background_color.as_deref(), edits);

    ui.horizontal(|ui| {
        ui.label("Border");
        let mut border = style.border.clone().unwrap_or_default();
        let response = ui.add(egui::TextEdit::singleline(&mut border).hint_text("1px solid #ccc"));
        edits.track(&response, || ElementPatch {
            border: Some((!border.trim().is_empty()).then(|| border.trim().to_owned())),
            ..Default::default()
        });
    });

    let mut radius = style.border_radius;
    let response = ui.add(egui::Slider::new(&mut radius, 0.0..=50.0).text("Radius"));
    edits.track(&response, || ElementPatch {
        border_radius: Some(radius),
        ..Default::default()
    });

    let mut padding = style.padding;
    let response = ui.add(egui::Slider::new(&mut padding, 0.0..=50.0).text("Padding"));
    edits.track(&response, || ElementPatch {
        padding: Some(padding),
        ..Default::default()
    });
}

fn table_section(ui: &mut Ui, model: &EditorModel, element: &Element, edits: &mut Edits) {
    let Some(table) = element.as_table() else {
        return;
    };
    let table_patch = |patch: TablePatch| ElementPatch::kind(KindPatch::Table(patch));

    ui.separator();
    ui.label("Table");
    ui.horizontal(|ui| {
        let mut rows = table.rows();
        ui.label("Rows");
        if ui.add(egui::DragValue::new(&mut rows).range(1..=20)).changed() {
            edits.apply(table_patch(TablePatch {
                rows: Some(rows),
                ..Default::default()
            }));
        }
        let mut cols = table.cols();
        ui.label("Cols");
        if ui.add(egui::DragValue::new(&mut cols).range(1..=20)).changed() {
            edits.apply(table_patch(TablePatch {
                cols: Some(cols),
                ..Default::default()
            }));
        }
    });

    ui.horizontal(|ui| {
        ui.label("Grid");
        let mut border = table.border.clone();
        let response = ui.text_edit_singleline(&mut border);
        edits.track(&response, || {
            table_patch(TablePatch {
                border: Some(border.clone()),
                ..Default::default()
            })
        });
    });
    ui.label("Header");
    if let Some(color) = color_editor(ui, "header_bg", &table.header_bg) {
        edits.apply(table_patch(TablePatch {
            header_bg: Some(color),
            ..Default::default()
        }));
    }
    ui.label("Cells");
    if let Some(color) = color_editor(ui, "cell_bg", &table.cell_bg) {
        edits.apply(table_patch(TablePatch {
            cell_bg: Some(color),
            ..Default::default()
        }));
    }

    ui.separator();
    let in_cell_mode = model.cell_mode() == Some(element.id);
    let mut cell_mode = in_cell_mode;
    if ui
        .toggle_value(&mut cell_mode, "✏ Edit cells")
        .on_hover_text("Select, merge and resize cells. Double-click the table to toggle.")
        .clicked()
    {
        edits.push(Command::SetCellMode(cell_mode.then_some(element.id)));
    }
    if !in_cell_mode {
        return;
    }

    let cells = model.selected_cells(element.id);
    let Some(&(row, col)) = cells.first() else {
        ui.label("Click a cell to select it, drag to select more.");
        return;
    };
    ui.label(format!("Cell {}, {} ({} selected)", row + 1, col + 1, cells.len()));
    if let Some(cell) = table.cell(row, col) {
        let mut content = cell.content.clone();
        let response = ui.add(egui::TextEdit::multiline(&mut content).desired_rows(2));
        edits.track(&response, || {
            table_patch(TablePatch {
                cell: Some((row, col, content.clone())),
                ..Default::default()
            })
        });

        ui.horizontal(|ui| {
            if ui.add_enabled(cells.len() > 1, egui::Button::new("Merge")).clicked() {
                edits.push(Command::Table {
                    id: element.id,
                    op: TableOp::Merge,
                });
            }
            let spanned = cell.row_span > 1 || cell.col_span > 1;
            if ui.add_enabled(spanned, egui::Button::new("Unmerge")).clicked() {
                edits.push(Command::Table {
                    id: element.id,
                    op: TableOp::Unmerge,
                });
            }
        });
    }
}

fn layer_actions(ui: &mut Ui, id: ElementId, edits: &mut Edits) {
    ui.label("Layer");
    ui.horizontal_wrapped(|ui| {
        if ui.button("Duplicate").clicked() {
            edits.push(Command::DuplicateElement(id));
        }
        if ui.button("Bring to front").clicked() {
            edits.push(Command::BringToFront(id));
        }
        if ui.button("Send to back").clicked() {
            edits.push(Command::SendToBack(id));
        }
        let delete = egui::Button::new(egui::RichText::new("Delete").color(egui::Color32::WHITE))
            .fill(egui::Color32::from_rgb(220, 38, 38));
        if ui.add(delete).clicked() {
            log::info!("Deleting element {}", id);
            edits.push(Command::DeleteElement(id));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_has_every_insert_action() {
        let labels = palette().into_iter().map(|(_, label, _)| label).collect::<Vec<_>>();
        assert_eq!(labels.len(), 14);
        assert!(labels.contains(&"Header band"));
        assert!(labels.contains(&"Table 4×4"));
    }

    #[test]
    fn test_hex_round_trip() {
        assert_eq!(hex(rgb_of("#3b82f6")), "#3b82f6");
        assert_eq!(hex(rgb_of("#fff")), "#ffffff");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("table"), "Table");
        assert_eq!(capitalize(""), "");
    }
}
