use eframe::egui;

/// Square icon button with a caption, used by the insert palette and the
/// template picker
pub struct PaletteButton<'a> {
    pub icon: &'a str,
    pub label: &'a str,
    pub size: egui::Vec2,
}

impl<'a> PaletteButton<'a> {
    pub fn new(icon: &'a str, label: &'a str) -> Self {
        Self {
            icon,
            label,
            size: egui::vec2(72.0, 56.0),
        }
    }

    pub fn with_size(mut self, size: egui::Vec2) -> Self {
        self.size = size;
        self
    }

    pub fn show(&self, ui: &mut egui::Ui) -> egui::Response {
        let (rect, response) = ui.allocate_exact_size(self.size, egui::Sense::click());

        if ui.is_rect_visible(rect) {
            let bg_color = if response.is_pointer_button_down_on() {
                egui::Color32::from_rgb(191, 219, 254)
            } else if response.hovered() {
                egui::Color32::from_rgb(239, 246, 255)
            } else {
                egui::Color32::from_gray(248)
            };
            let border = if response.hovered() {
                egui::Color32::from_rgb(59, 130, 246)
            } else {
                egui::Color32::from_gray(220)
            };

            ui.painter().rect_filled(rect, 6.0, bg_color);
            ui.painter().rect_stroke(rect, 6.0, egui::Stroke::new(1.0, border));

            ui.painter().text(
                rect.center() - egui::vec2(0.0, 8.0),
                egui::Align2::CENTER_CENTER,
                self.icon,
                egui::FontId::proportional(20.0),
                egui::Color32::from_gray(60),
            );
            ui.painter().text(
                egui::pos2(rect.center().x, rect.max.y - 10.0),
                egui::Align2::CENTER_CENTER,
                self.label,
                egui::FontId::proportional(11.0),
                egui::Color32::from_gray(80),
            );
        }

        response.on_hover_text(self.label)
    }
}
