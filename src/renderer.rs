use egui::text::{LayoutJob, TextFormat};
use egui::{Align, Color32, FontFamily, FontId, Painter, Rect, Stroke, pos2};

use crate::element::TextAlign;
use crate::geometry::hit_testing::RESIZE_HANDLE_SIZE;
use crate::input::PageTransform;
use crate::scene::{Content, Node, PLACEHOLDER_FILL, PLACEHOLDER_TEXT, Scene, TABLE_CELL_PADDING, TextBlock, contain_rect};
use crate::state::{EditorModel, EditorState};
use crate::texture_manager::TextureManager;
use crate::widgets::{Handle, ResizeHandle};

const SELECTION_COLOR: Color32 = Color32::from_rgb(30, 120, 255);
const CELL_SELECTION_FILL: Color32 = Color32::from_rgba_premultiplied(30, 120, 255, 40);
const GRID_COLOR: Color32 = Color32::from_gray(235);
const GUIDE_COLOR: Color32 = Color32::from_rgb(236, 72, 153);

/// Paints a [`Scene`] and the editor overlays with an egui painter
#[derive(Debug)]
pub struct Renderer {
    textures: TextureManager,
    show_grid: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            textures: TextureManager::default(),
            show_grid: true,
        }
    }

    pub fn set_show_grid(&mut self, show: bool) {
        self.show_grid = show;
    }

    /// Drop the cached texture for an image source so it loads again
    pub fn reload_image(&mut self, src: &str) {
        self.textures.invalidate(src);
    }

    /// Paint the page background, the grid and every node
    pub fn render(&mut self, painter: &Painter, transform: PageTransform, scene: &Scene, grid_size: f32) {
        self.textures.begin_frame();

        let page = transform.rect_to_screen(Rect::from_min_size(
            pos2(0.0, 0.0),
            egui::vec2(scene.width, scene.height),
        ));
        painter.rect_filled(page.translate(egui::vec2(3.0, 3.0)), 0.0, Color32::from_black_alpha(40));
        painter.rect_filled(page, 0.0, Color32::WHITE);

        if self.show_grid && grid_size * transform.scale >= 4.0 {
            paint_grid(painter, page, grid_size * transform.scale);
        }

        let clipped = painter.with_clip_rect(page);
        for node in &scene.nodes {
            self.paint_node(&clipped, transform, node);
        }
    }

    fn paint_node(&mut self, painter: &Painter, transform: PageTransform, node: &Node) {
        let rect = transform.rect_to_screen(node.rect);
        let scale = transform.scale;
        let radius = node.radius * scale;
        let alpha = node.opacity;

        if let Some(fill) = node.fill {
            painter.rect_filled(rect, radius, fill.gamma_multiply(alpha));
        }

        let content_rect = transform.rect_to_screen(node.content_rect());
        match &node.content {
            Content::None => {}
            Content::Text(block) => paint_text(painter, content_rect, block, scale, alpha),
            Content::Image { src } => {
                let ctx = painter.ctx().clone();
                match self.textures.get_or_load(&ctx, src) {
                    Some(texture) => {
                        let target = contain_rect(texture.size_vec2(), content_rect);
                        painter.image(
                            texture.id(),
                            target,
                            Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                            Color32::WHITE.gamma_multiply(alpha),
                        );
                    }
                    None if self.textures.is_fetching(src) => {
                        paint_placeholder(painter, rect, "Loading image…", scale);
                    }
                    None => paint_placeholder(painter, rect, "Image unavailable", scale),
                }
            }
            Content::ImagePlaceholder => {
                paint_placeholder(painter, rect, "Click to upload image", scale);
            }
            Content::Table { cells, border } => {
                let stroke = border
                    .map(|b| Stroke::new(b.width * scale, b.color.gamma_multiply(alpha)))
                    .unwrap_or(Stroke::NONE);
                for cell in cells {
                    let cell_rect = transform.rect_to_screen(cell.rect);
                    painter.rect_filled(cell_rect, 0.0, cell.fill.gamma_multiply(alpha));
                    painter.rect_stroke(cell_rect, 0.0, stroke);
                    let text_rect = cell_rect.shrink(TABLE_CELL_PADDING * scale);
                    paint_text(painter, text_rect, &cell.text, scale, alpha);
                }
            }
        }

        if let Some(border) = node.border {
            painter.rect_stroke(
                rect,
                radius,
                Stroke::new(border.width * scale, border.color.gamma_multiply(alpha)),
            );
        }
    }

    /// Selection outline, resize handles, cell selection and drag guides
    pub fn render_overlays(
        &self,
        painter: &Painter,
        transform: PageTransform,
        model: &EditorModel,
        state: &EditorState,
    ) {
        let Some(selected) = model.selected_element() else {
            return;
        };
        let rect = transform.rect_to_screen(selected.rect());

        if state.is_dragging() {
            let page = transform.rect_to_screen(Rect::from_min_size(pos2(0.0, 0.0), model.page_size()));
            let guide = Stroke::new(1.0, GUIDE_COLOR);
            painter.hline(page.x_range(), rect.center().y, guide);
            painter.vline(rect.center().x, page.y_range(), guide);
        }

        painter.rect_stroke(rect, 0.0, Stroke::new(1.5, SELECTION_COLOR));

        if model.cell_mode() == Some(selected.id) {
            let cells = model.selected_cells(selected.id);
            if let Some(table) = selected.as_table() {
                for &(row, col) in &cells {
                    if let Some(local) = table.cell_rect(row, col, selected.size()) {
                        let cell_rect = transform.rect_to_screen(local.translate(selected.origin().to_vec2()));
                        painter.rect_filled(cell_rect, 0.0, CELL_SELECTION_FILL);
                        painter.rect_stroke(cell_rect, 0.0, Stroke::new(2.0, SELECTION_COLOR));
                    }
                }
            }
            return;
        }

        let active = state.active_handle();
        for handle in Handle::ALL {
            ResizeHandle::new(handle, handle.position(rect), RESIZE_HANDLE_SIZE)
                .paint(painter, active == Some(handle));
        }
    }
}

fn paint_grid(painter: &Painter, page: Rect, step: f32) {
    let stroke = Stroke::new(0.5, GRID_COLOR);
    let mut x = page.min.x + step;
    while x < page.max.x {
        painter.vline(x, page.y_range(), stroke);
        x += step;
    }
    let mut y = page.min.y + step;
    while y < page.max.y {
        painter.hline(page.x_range(), y, stroke);
        y += step;
    }
}

fn paint_placeholder(painter: &Painter, rect: Rect, label: &str, scale: f32) {
    painter.rect_filled(rect, 4.0 * scale, PLACEHOLDER_FILL);
    painter.rect_stroke(rect, 4.0 * scale, Stroke::new(1.0, PLACEHOLDER_TEXT));
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        label,
        FontId::proportional(12.0 * scale),
        PLACEHOLDER_TEXT,
    );
}

/// Lay out a wrapped, aligned text block inside `rect`
fn paint_text(painter: &Painter, rect: Rect, block: &TextBlock, scale: f32, alpha: f32) {
    if block.text.is_empty() || rect.width() <= 0.0 {
        return;
    }
    let font_size = block.font_size * scale;
    let color = block.color.gamma_multiply(alpha);
    let mut job = LayoutJob::single_section(
        block.text.clone(),
        TextFormat {
            font_id: FontId::new(font_size, FontFamily::Proportional),
            color,
            italics: block.italic,
            line_height: Some(font_size * block.line_height),
            ..Default::default()
        },
    );
    job.wrap.max_width = rect.width();
    job.halign = match block.align {
        TextAlign::Left => Align::LEFT,
        TextAlign::Center => Align::Center,
        TextAlign::Right => Align::RIGHT,
    };

    let galley = painter.layout_job(job);
    let x = match block.align {
        TextAlign::Left => rect.min.x,
        TextAlign::Center => rect.center().x,
        TextAlign::Right => rect.max.x,
    };
    let y = if block.vertical_center {
        rect.center().y - galley.size().y / 2.0
    } else {
        rect.min.y
    };

    let clipped = painter.with_clip_rect(rect.expand(1.0).intersect(painter.clip_rect()));
    if block.bold {
        // no bold face in the default fonts: overstrike
        clipped.galley(pos2(x + 0.6 * scale, y), galley.clone(), color);
    }
    clipped.galley(pos2(x, y), galley, color);
}
