use egui::{Color32, Rect};
use fontdue::layout::{
    CoordinateSystem, HorizontalAlign, Layout, LayoutSettings, TextStyle, VerticalAlign, WrapStyle,
};
use fontdue::{Font, FontSettings};
use image::imageops::FilterType;
use tiny_skia::{
    FillRule, IntSize, Paint, Path, PathBuilder, Pixmap, PixmapPaint, PremultipliedColorU8, Stroke,
    Transform,
};

use crate::element::TextAlign;
use crate::element::image::load_image;
use crate::error::ExportError;
use crate::scene::{Content, Node, Scene, TABLE_CELL_PADDING, TextBlock, contain_rect};

/// Horizontal shear used to fake italics
const ITALIC_SHEAR: f32 = 0.2;
/// Cubic bezier handle length for quarter circles
const KAPPA: f32 = 0.552_284_8;

/// Off-screen painter for a [`Scene`], `scale` pixels per page unit
pub struct Rasterizer {
    /// Primary face first, then fallbacks for glyphs it lacks
    fonts: Vec<Font>,
    scale: f32,
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("fonts", &self.fonts.len())
            .field("scale", &self.scale)
            .finish()
    }
}

impl Rasterizer {
    /// Load the bundled egui fonts
    pub fn new(scale: f32) -> Result<Self, ExportError> {
        let faces: [&[u8]; 3] = [
            epaint_default_fonts::UBUNTU_LIGHT,
            epaint_default_fonts::NOTO_EMOJI_REGULAR,
            epaint_default_fonts::EMOJI_ICON,
        ];
        let fonts = faces
            .into_iter()
            .map(|bytes| Font::from_bytes(bytes, FontSettings::default()).map_err(ExportError::Font))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            fonts,
            scale: scale.max(0.1),
        })
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Paint the whole scene onto a white pixmap
    pub fn render(&self, scene: &Scene) -> Result<Pixmap, ExportError> {
        let width = (scene.width * self.scale).ceil() as u32;
        let height = (scene.height * self.scale).ceil() as u32;
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            ExportError::Raster(format!("Failed to create pixmap {}x{}", width, height))
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);

        for node in &scene.nodes {
            self.paint_node(&mut pixmap, node);
        }
        Ok(pixmap)
    }

    fn to_px(&self, rect: Rect) -> Rect {
        Rect::from_min_max(
            (rect.min.to_vec2() * self.scale).to_pos2(),
            (rect.max.to_vec2() * self.scale).to_pos2(),
        )
    }

    fn paint_node(&self, pixmap: &mut Pixmap, node: &Node) {
        let rect = self.to_px(node.rect);
        let radius = node.radius * self.scale;
        let opacity = node.opacity;

        if let Some(fill) = node.fill {
            fill_rect(pixmap, rect, radius, fill, opacity);
        }

        let content_rect = self.to_px(node.content_rect());
        match &node.content {
            Content::None | Content::ImagePlaceholder => {}
            Content::Text(block) => self.draw_text(pixmap, content_rect, block, opacity),
            Content::Image { src } => self.draw_image(pixmap, content_rect, src, opacity),
            Content::Table { cells, border } => {
                for cell in cells {
                    let cell_rect = self.to_px(cell.rect);
                    fill_rect(pixmap, cell_rect, 0.0, cell.fill, opacity);
                    if let Some(border) = border {
                        stroke_rect(pixmap, cell_rect, 0.0, border.width * self.scale, border.color, opacity);
                    }
                    let text_rect = cell_rect.shrink(TABLE_CELL_PADDING * self.scale);
                    self.draw_text(pixmap, text_rect, &cell.text, opacity);
                }
            }
        }

        if let Some(border) = node.border {
            stroke_rect(pixmap, rect, radius, border.width * self.scale, border.color, opacity);
        }
    }

    /// Index of the first font that has a glyph for `c`
    fn font_for(&self, c: char) -> usize {
        if c.is_whitespace() {
            return 0;
        }
        self.fonts
            .iter()
            .position(|font| font.lookup_glyph_index(c) != 0)
            .unwrap_or(0)
    }

    fn draw_text(&self, pixmap: &mut Pixmap, rect: Rect, block: &TextBlock, opacity: f32) {
        if block.text.trim().is_empty() || rect.width() <= 0.0 {
            return;
        }
        let px = block.font_size * self.scale;
        // CSS line-height is relative to the font size, fontdue's to the font's own line gap
        let natural = self.fonts[0]
            .horizontal_line_metrics(px)
            .map(|m| m.new_line_size)
            .unwrap_or(px);
        let line_height = (block.line_height * px / natural).max(0.1);

        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings {
            x: rect.min.x,
            y: rect.min.y,
            max_width: Some(rect.width()),
            max_height: block.vertical_center.then_some(rect.height()),
            horizontal_align: match block.align {
                TextAlign::Left => HorizontalAlign::Left,
                TextAlign::Center => HorizontalAlign::Center,
                TextAlign::Right => HorizontalAlign::Right,
            },
            vertical_align: if block.vertical_center {
                VerticalAlign::Middle
            } else {
                VerticalAlign::Top
            },
            line_height,
            wrap_style: WrapStyle::Word,
            wrap_hard_breaks: true,
        });

        // split into runs per font so missing glyphs fall back
        let mut run = String::new();
        let mut run_font = None;
        for c in block.text.chars() {
            let font = self.font_for(c);
            if run_font.is_some_and(|current| current != font) {
                layout.append(&self.fonts, &TextStyle::new(&run, px, run_font.unwrap_or(0)));
                run.clear();
            }
            run_font = Some(font);
            run.push(c);
        }
        if !run.is_empty() {
            layout.append(&self.fonts, &TextStyle::new(&run, px, run_font.unwrap_or(0)));
        }

        let [r, g, b, a] = block.color.to_srgba_unmultiplied();
        let alpha = a as f32 / 255.0 * opacity;
        let bold_offset = if block.bold { (0.04 * px).max(0.5) } else { 0.0 };

        for glyph in layout.glyphs() {
            if glyph.width == 0 || glyph.height == 0 || glyph.y > rect.max.y {
                continue;
            }
            let (metrics, coverage) = self.fonts[glyph.font_index].rasterize_config(glyph.key);
            let Some(glyph_pixmap) = coverage_pixmap(&coverage, metrics.width, metrics.height, [r, g, b], alpha) else {
                continue;
            };

            let mut transform = Transform::from_translate(glyph.x, glyph.y);
            if block.italic {
                let baseline = glyph.y + glyph.height as f32;
                transform = transform.post_concat(Transform::from_row(
                    1.0,
                    0.0,
                    -ITALIC_SHEAR,
                    1.0,
                    ITALIC_SHEAR * baseline,
                    0.0,
                ));
            }
            let paint = PixmapPaint::default();
            pixmap.draw_pixmap(0, 0, glyph_pixmap.as_ref(), &paint, transform, None);
            if bold_offset > 0.0 {
                let shifted = transform.post_translate(bold_offset, 0.0);
                pixmap.draw_pixmap(0, 0, glyph_pixmap.as_ref(), &paint, shifted, None);
            }
        }
    }

    fn draw_image(&self, pixmap: &mut Pixmap, rect: Rect, src: &str, opacity: f32) {
        let image = match load_image(src) {
            Ok(image) => image,
            Err(err) => {
                log::warn!("Skipping image in export: {}", err);
                return;
            }
        };

        let target = contain_rect(egui::vec2(image.width() as f32, image.height() as f32), rect);
        let width = target.width().round().max(1.0) as u32;
        let height = target.height().round().max(1.0) as u32;
        let resized = image::imageops::resize(&image.to_rgba8(), width, height, FilterType::Triangle);

        let mut data = resized.into_raw();
        premultiply(&mut data);
        let Some(size) = IntSize::from_wh(width, height) else {
            return;
        };
        let Some(image_pixmap) = Pixmap::from_vec(data, size) else {
            return;
        };
        let paint = PixmapPaint {
            opacity,
            ..Default::default()
        };
        pixmap.draw_pixmap(
            target.min.x.round() as i32,
            target.min.y.round() as i32,
            image_pixmap.as_ref(),
            &paint,
            Transform::identity(),
            None,
        );
    }
}

/// Turn a glyph coverage bitmap into a colored premultiplied pixmap
fn coverage_pixmap(coverage: &[u8], width: usize, height: usize, rgb: [u8; 3], alpha: f32) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(width as u32, height as u32)?;
    for (pixel, &cov) in pixmap.pixels_mut().iter_mut().zip(coverage) {
        let a = (cov as f32 * alpha).round().clamp(0.0, 255.0) as u8;
        let mul = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        if let Some(color) = PremultipliedColorU8::from_rgba(mul(rgb[0]), mul(rgb[1]), mul(rgb[2]), a) {
            *pixel = color;
        }
    }
    Some(pixmap)
}

fn premultiply(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
}

fn paint_for(color: Color32, opacity: f32) -> Paint<'static> {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let alpha = (a as f32 * opacity).round().clamp(0.0, 255.0) as u8;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, alpha);
    paint.anti_alias = true;
    paint
}

fn fill_rect(pixmap: &mut Pixmap, rect: Rect, radius: f32, color: Color32, opacity: f32) {
    if color.a() == 0 || opacity <= 0.0 {
        return;
    }
    if let Some(path) = rounded_rect_path(rect, radius) {
        pixmap.fill_path(&path, &paint_for(color, opacity), FillRule::Winding, Transform::identity(), None);
    }
}

fn stroke_rect(pixmap: &mut Pixmap, rect: Rect, radius: f32, width: f32, color: Color32, opacity: f32) {
    if width <= 0.0 || color.a() == 0 || opacity <= 0.0 {
        return;
    }
    // keep the stroke inside the box like a CSS border
    let inset = rect.shrink(width / 2.0);
    if let Some(path) = rounded_rect_path(inset, (radius - width / 2.0).max(0.0)) {
        let stroke = Stroke {
            width,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &paint_for(color, opacity), &stroke, Transform::identity(), None);
    }
}

/// Rectangle path with circular corners; `None` for empty rects
fn rounded_rect_path(rect: Rect, radius: f32) -> Option<Path> {
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let r = radius.min(rect.width() / 2.0).min(rect.height() / 2.0).max(0.0);
    if r == 0.0 {
        let skia_rect = tiny_skia::Rect::from_ltrb(rect.min.x, rect.min.y, rect.max.x, rect.max.y)?;
        return Some(PathBuilder::from_rect(skia_rect));
    }

    let (l, t, rt, b) = (rect.min.x, rect.min.y, rect.max.x, rect.max.y);
    let k = r * KAPPA;
    let mut pb = PathBuilder::new();
    pb.move_to(l + r, t);
    pb.line_to(rt - r, t);
    pb.cubic_to(rt - r + k, t, rt, t + r - k, rt, t + r);
    pb.line_to(rt, b - r);
    pb.cubic_to(rt, b - r + k, rt - r + k, b, rt - r, b);
    pb.line_to(l + r, b);
    pb.cubic_to(l + r - k, b, l, b - r + k, l, b - r);
    pb.line_to(l, t + r);
    pb.cubic_to(l, t + r - k, l + r - k, t, l + r, t);
    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ShapeType, factory};
    use crate::scene;

    fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let p = pixmap.pixel(x, y).unwrap();
        [p.red(), p.green(), p.blue(), p.alpha()]
    }

    #[test]
    fn test_renders_shapes_at_scale() {
        let mut shape = factory::shape(ShapeType::Rectangle).instantiate(0);
        shape.x = 10.0;
        shape.y = 10.0;
        shape.width = 50.0;
        shape.height = 50.0;
        let scene = scene::build(&[shape], 100.0, 100.0);

        let rasterizer = Rasterizer::new(2.0).unwrap();
        let pixmap = rasterizer.render(&scene).unwrap();

        assert_eq!((pixmap.width(), pixmap.height()), (200, 200));
        assert_eq!(pixel(&pixmap, 5, 5), [255, 255, 255, 255]);
        assert_eq!(pixel(&pixmap, 60, 60), [0x3b, 0x82, 0xf6, 255]);
    }

    #[test]
    fn test_text_leaves_ink() {
        let heading = factory::heading().instantiate(0);
        let scene = scene::build(&[heading], 595.0, 842.0);
        let pixmap = Rasterizer::new(1.0).unwrap().render(&scene).unwrap();

        let region = (100..400).flat_map(|x| (100..140).map(move |y| (x, y)));
        let dark = region.filter(|&(x, y)| pixel(&pixmap, x, y)[0] < 128).count();
        assert!(dark > 50, "expected heading glyphs, found {} dark pixels", dark);
    }

    #[test]
    fn test_rounded_path_bounds() {
        let rect = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(40.0, 20.0));
        let path = rounded_rect_path(rect, 100.0).unwrap();
        let bounds = path.bounds();
        assert!((bounds.width() - 40.0).abs() < 1e-3);
        assert!((bounds.height() - 20.0).abs() < 1e-3);
        assert!(rounded_rect_path(Rect::NOTHING, 0.0).is_none());
    }
}
