//! Toolkit-independent display list.
//!
//! The element collection is lowered into a [`Scene`] once per frame (or once
//! per export) and both the on-screen renderer and the PDF rasterizer paint
//! from it, so the two never disagree about geometry or resolved styles.
use egui::{Color32, Rect, Vec2, pos2, vec2};

use crate::element::{
    BorderStyle, CellIndex, Element, ElementKind, ShapeType, TextAlign, color_or, parse_border,
};
use crate::id_generator::ElementId;

pub const DEFAULT_SHAPE_COLOR: Color32 = Color32::from_rgb(0x3b, 0x82, 0xf6);
pub const PLACEHOLDER_FILL: Color32 = Color32::from_rgb(0xf3, 0xf4, 0xf6);
pub const PLACEHOLDER_TEXT: Color32 = Color32::from_rgb(0x9c, 0xa3, 0xaf);
pub const TABLE_CELL_PADDING: f32 = 8.0;
pub const TABLE_FONT_SIZE: f32 = 12.0;
/// Thickness of a line shape
pub const LINE_THICKNESS: f32 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub font_size: f32,
    pub color: Color32,
    pub bold: bool,
    pub italic: bool,
    pub align: TextAlign,
    /// Multiple of the font size
    pub line_height: f32,
    /// Center the block vertically in its box
    pub vertical_center: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellNode {
    pub index: CellIndex,
    /// Absolute page rect of the (possibly spanned) cell
    pub rect: Rect,
    pub fill: Color32,
    pub text: TextBlock,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    None,
    Text(TextBlock),
    Image { src: String },
    /// Image element without a source yet; only shown in the editor
    ImagePlaceholder,
    Table {
        cells: Vec<CellNode>,
        border: Option<BorderStyle>,
    },
}

/// One painted element
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: ElementId,
    /// Painted area; thinner than the element for line shapes
    pub rect: Rect,
    pub fill: Option<Color32>,
    pub border: Option<BorderStyle>,
    pub radius: f32,
    pub padding: f32,
    pub opacity: f32,
    pub content: Content,
}

impl Node {
    /// Area left for content after padding
    pub fn content_rect(&self) -> Rect {
        self.rect.shrink(self.padding).intersect(self.rect)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    /// Back to front
    pub nodes: Vec<Node>,
}

/// Largest rect with the image's aspect ratio centered inside `target`
pub fn contain_rect(image_size: Vec2, target: Rect) -> Rect {
    if image_size.x <= 0.0 || image_size.y <= 0.0 {
        return target;
    }
    let scale = (target.width() / image_size.x).min(target.height() / image_size.y);
    Rect::from_center_size(target.center(), image_size * scale)
}

/// Lower elements into paint order
pub fn build(elements: &[Element], width: f32, height: f32) -> Scene {
    let mut sorted = elements.iter().collect::<Vec<_>>();
    sorted.sort_by_key(|e| e.z_index);
    Scene {
        width,
        height,
        nodes: sorted.into_iter().map(node_for).collect(),
    }
}

fn node_for(element: &Element) -> Node {
    let style = &element.style;
    let mut node = Node {
        id: element.id,
        rect: element.rect(),
        fill: style
            .background_color
            .as_deref()
            .map(|bg| color_or(Some(bg), Color32::TRANSPARENT)),
        border: style.border.as_deref().and_then(parse_border),
        radius: style.border_radius,
        padding: style.padding,
        opacity: style.opacity.clamp(0.0, 1.0),
        content: Content::None,
    };

    match &element.kind {
        ElementKind::Text(props) => {
            node.content = Content::Text(TextBlock {
                text: props.content.clone(),
                font_size: props.font_size,
                color: color_or(Some(&props.color), Color32::BLACK),
                bold: props.is_bold(),
                italic: props.font_style == crate::element::FontStyle::Italic,
                align: props.text_align,
                line_height: props.line_height,
                vertical_center: false,
            });
        }
        ElementKind::Image(props) => {
            node.content = if props.src.trim().is_empty() {
                Content::ImagePlaceholder
            } else {
                Content::Image {
                    src: props.src.clone(),
                }
            };
        }
        ElementKind::Shape(shape) => {
            let color = node.fill.unwrap_or(DEFAULT_SHAPE_COLOR);
            match shape {
                ShapeType::Rectangle => node.fill = Some(color),
                ShapeType::Circle => {
                    node.fill = Some(color);
                    node.radius = element.width.min(element.height) / 2.0;
                }
                ShapeType::Line => {
                    let center = node.rect.center().y;
                    node.rect = Rect::from_min_size(
                        pos2(node.rect.min.x, center - LINE_THICKNESS / 2.0),
                        vec2(node.rect.width(), LINE_THICKNESS),
                    );
                    node.fill = Some(color);
                    node.radius = 0.0;
                    node.border = None;
                }
            }
        }
        ElementKind::Icon(props) => {
            node.content = Content::Text(TextBlock {
                text: props.glyph.clone(),
                font_size: props.font_size,
                color: color_or(Some(&props.color), Color32::BLACK),
                bold: false,
                italic: false,
                align: TextAlign::Center,
                line_height: 1.0,
                vertical_center: true,
            });
        }
        ElementKind::Block(props) => {
            node.content = Content::Text(TextBlock {
                text: props.label.clone(),
                font_size: 14.0,
                color: Color32::from_rgb(0x6b, 0x72, 0x80),
                bold: false,
                italic: false,
                align: TextAlign::Center,
                line_height: 1.4,
                vertical_center: true,
            });
        }
        ElementKind::Table(table) => {
            let header = color_or(Some(&table.header_bg), Color32::from_gray(229));
            let body = color_or(Some(&table.cell_bg), Color32::WHITE);
            let size = element.size();
            let mut cells = Vec::new();
            for (r, row) in table.cells().iter().enumerate() {
                for (c, cell) in row.iter().enumerate() {
                    let Some(local) = table.cell_rect(r, c, size) else {
                        continue;
                    };
                    cells.push(CellNode {
                        index: (r, c),
                        rect: local.translate(element.origin().to_vec2()),
                        fill: if r == 0 { header } else { body },
                        text: TextBlock {
                            text: cell.content.clone(),
                            font_size: TABLE_FONT_SIZE,
                            color: Color32::BLACK,
                            bold: r == 0,
                            italic: false,
                            align: TextAlign::Left,
                            line_height: 1.4,
                            vertical_center: false,
                        },
                    });
                }
            }
            node.content = Content::Table {
                cells,
                border: parse_border(&table.border),
            };
        }
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::factory;

    #[test]
    fn test_nodes_follow_z_order() {
        let mut a = factory::heading().instantiate(5);
        let b = factory::paragraph().instantiate(1);
        a.style.opacity = 0.5;
        let scene = build(&[a.clone(), b.clone()], 595.0, 842.0);
        assert_eq!(scene.nodes[0].id, b.id);
        assert_eq!(scene.nodes[1].id, a.id);
        assert_eq!(scene.nodes[1].opacity, 0.5);
    }

    #[test]
    fn test_circle_and_line_geometry() {
        let circle = factory::shape(ShapeType::Circle).instantiate(0);
        let line = factory::divider().instantiate(1);
        let scene = build(&[circle, line.clone()], 595.0, 842.0);

        assert_eq!(scene.nodes[0].radius, 75.0);
        let line_node = &scene.nodes[1];
        assert_eq!(line_node.rect.height(), LINE_THICKNESS);
        assert_eq!(line_node.rect.center().y, line.rect().center().y);
    }

    #[test]
    fn test_table_cells_are_absolute() {
        let mut element = factory::table(2, 2).instantiate(0);
        element.x = 10.0;
        element.y = 20.0;
        element.width = 200.0;
        element.height = 80.0;
        let scene = build(&[element], 595.0, 842.0);

        let Content::Table { cells, border } = &scene.nodes[0].content else {
            panic!("expected table content");
        };
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0].rect.min, pos2(10.0, 20.0));
        assert_eq!(cells[3].rect.max, pos2(210.0, 100.0));
        assert!(cells[0].text.bold);
        assert_eq!(border.map(|b| b.width), Some(1.0));
    }

    #[test]
    fn test_contain_rect_keeps_aspect() {
        let target = Rect::from_min_size(pos2(0.0, 0.0), vec2(200.0, 100.0));
        let rect = contain_rect(vec2(50.0, 50.0), target);
        assert_eq!(rect, Rect::from_min_size(pos2(50.0, 0.0), vec2(100.0, 100.0)));
    }

    #[test]
    fn test_empty_image_is_placeholder() {
        let scene = build(&[factory::image().instantiate(0)], 595.0, 842.0);
        assert_eq!(scene.nodes[0].content, Content::ImagePlaceholder);
    }
}
