use egui::{Pos2, Rect, Vec2, pos2, vec2};
use serde::{Deserialize, Serialize};

mod common;
pub mod image;
pub mod table;

pub use common::{
    BorderStyle, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_LINE_HEIGHT, DEFAULT_TEXT_COLOR,
    MIN_ELEMENT_HEIGHT, MIN_ELEMENT_WIDTH, Style, color_or, parse_border, parse_color,
};
pub use table::{CellIndex, ResizeDirection, Table, TableCell};

use crate::id_generator::{ElementId, generate_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextRole {
    Text,
    Heading,
    Paragraph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontStyle {
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextProps {
    pub role: TextRole,
    pub content: String,
    pub font_size: f32,
    pub font_family: String,
    /// CSS weight keyword or number: `normal`, `500`, `600`, `bold`
    pub font_weight: String,
    pub font_style: FontStyle,
    pub color: String,
    pub text_align: TextAlign,
    pub line_height: f32,
}

impl TextProps {
    pub fn new(role: TextRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
            font_weight: "normal".to_owned(),
            font_style: FontStyle::Normal,
            color: DEFAULT_TEXT_COLOR.to_owned(),
            text_align: TextAlign::Left,
            line_height: DEFAULT_LINE_HEIGHT,
        }
    }

    /// True for `bold` and numeric weights of 600 and above
    pub fn is_bold(&self) -> bool {
        match self.font_weight.trim() {
            "bold" | "bolder" => true,
            weight => weight.parse::<u32>().is_ok_and(|w| w >= 600),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageProps {
    /// Remote URL, local path or base64 data URI; empty until chosen
    pub src: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeType {
    Rectangle,
    Circle,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconProps {
    pub glyph: String,
    pub font_size: f32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockProps {
    pub label: String,
}

/// Variant payload of an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    Text(TextProps),
    Image(ImageProps),
    Shape(ShapeType),
    Icon(IconProps),
    Block(BlockProps),
    Table(Table),
}

impl ElementKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementKind::Text(props) => match props.role {
                TextRole::Text => "text",
                TextRole::Heading => "heading",
                TextRole::Paragraph => "paragraph",
            },
            ElementKind::Image(_) => "image",
            ElementKind::Shape(_) => "shape",
            ElementKind::Icon(_) => "icon",
            ElementKind::Block(_) => "block",
            ElementKind::Table(_) => "table",
        }
    }
}

/// A placeable object on the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub z_index: usize,
    pub style: Style,
    pub kind: ElementKind,
}

impl Element {
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(pos2(self.x, self.y), vec2(self.width, self.height))
    }

    pub fn origin(&self) -> Pos2 {
        pos2(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        vec2(self.width, self.height)
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn hit_test(&self, pos: Pos2) -> bool {
        self.rect().contains(pos)
    }

    pub fn as_table(&self) -> Option<&Table> {
        match &self.kind {
            ElementKind::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match &mut self.kind {
            ElementKind::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Merge a partial update into this element. Width and height are floored
    /// at the minimum element size; a variant patch for another variant is ignored.
    pub fn apply(&mut self, patch: &ElementPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width.max(MIN_ELEMENT_WIDTH);
        }
        if let Some(height) = patch.height {
            self.height = height.max(MIN_ELEMENT_HEIGHT);
        }
        if let Some(background) = &patch.background_color {
            self.style.background_color = background.clone();
        }
        if let Some(border) = &patch.border {
            self.style.border = border.clone();
        }
        if let Some(radius) = patch.border_radius {
            self.style.border_radius = radius.max(0.0);
        }
        if let Some(padding) = patch.padding {
            self.style.padding = padding.max(0.0);
        }
        if let Some(opacity) = patch.opacity {
            self.style.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(kind) = &patch.kind {
            if !kind.apply_to(&mut self.kind) {
                log::warn!(
                    "Ignoring {} patch for {} element {}",
                    kind.type_name(),
                    self.type_name(),
                    self.id
                );
            }
        }
    }
}

/// Partial attribute update. `None` leaves the attribute untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    /// `Some(None)` clears the background
    pub background_color: Option<Option<String>>,
    pub border: Option<Option<String>>,
    pub border_radius: Option<f32>,
    pub padding: Option<f32>,
    pub opacity: Option<f32>,
    pub kind: Option<KindPatch>,
}

impl ElementPatch {
    pub fn position(pos: Pos2) -> Self {
        Self {
            x: Some(pos.x),
            y: Some(pos.y),
            ..Default::default()
        }
    }

    pub fn size(size: Vec2) -> Self {
        Self {
            width: Some(size.x),
            height: Some(size.y),
            ..Default::default()
        }
    }

    pub fn rect(rect: Rect) -> Self {
        Self {
            x: Some(rect.min.x),
            y: Some(rect.min.y),
            width: Some(rect.width()),
            height: Some(rect.height()),
            ..Default::default()
        }
    }

    pub fn kind(kind: KindPatch) -> Self {
        Self {
            kind: Some(kind),
            ..Default::default()
        }
    }

    pub fn text(text: TextPatch) -> Self {
        Self::kind(KindPatch::Text(text))
    }
}

/// Variant-specific part of an [`ElementPatch`]
#[derive(Debug, Clone, PartialEq)]
pub enum KindPatch {
    Text(TextPatch),
    Image { src: String },
    Shape(ShapeType),
    Icon(IconPatch),
    Block { label: String },
    Table(TablePatch),
}

impl KindPatch {
    fn type_name(&self) -> &'static str {
        match self {
            KindPatch::Text(_) => "text",
            KindPatch::Image { .. } => "image",
            KindPatch::Shape(_) => "shape",
            KindPatch::Icon(_) => "icon",
            KindPatch::Block { .. } => "block",
            KindPatch::Table(_) => "table",
        }
    }

    /// Returns false if the patch doesn't match the element's variant
    fn apply_to(&self, kind: &mut ElementKind) -> bool {
        match (self, kind) {
            (KindPatch::Text(patch), ElementKind::Text(props)) => {
                patch.apply_to(props);
                true
            }
            (KindPatch::Image { src }, ElementKind::Image(props)) => {
                props.src = src.clone();
                true
            }
            (KindPatch::Shape(shape), ElementKind::Shape(current)) => {
                *current = *shape;
                true
            }
            (KindPatch::Icon(patch), ElementKind::Icon(props)) => {
                if let Some(glyph) = &patch.glyph {
                    props.glyph = glyph.clone();
                }
                if let Some(size) = patch.font_size {
                    props.font_size = size;
                }
                if let Some(color) = &patch.color {
                    props.color = color.clone();
                }
                true
            }
            (KindPatch::Block { label }, ElementKind::Block(props)) => {
                props.label = label.clone();
                true
            }
            (KindPatch::Table(patch), ElementKind::Table(table)) => {
                patch.apply_to(table);
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPatch {
    pub content: Option<String>,
    pub font_size: Option<f32>,
    pub font_family: Option<String>,
    pub font_weight: Option<String>,
    pub font_style: Option<FontStyle>,
    pub color: Option<String>,
    pub text_align: Option<TextAlign>,
    pub line_height: Option<f32>,
}

impl TextPatch {
    fn apply_to(&self, props: &mut TextProps) {
        if let Some(content) = &self.content {
            props.content = content.clone();
        }
        if let Some(size) = self.font_size {
            props.font_size = size;
        }
        if let Some(family) = &self.font_family {
            props.font_family = family.clone();
        }
        if let Some(weight) = &self.font_weight {
            props.font_weight = weight.clone();
        }
        if let Some(style) = self.font_style {
            props.font_style = style;
        }
        if let Some(color) = &self.color {
            props.color = color.clone();
        }
        if let Some(align) = self.text_align {
            props.text_align = align;
        }
        if let Some(line_height) = self.line_height {
            props.line_height = line_height;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IconPatch {
    pub glyph: Option<String>,
    pub font_size: Option<f32>,
    pub color: Option<String>,
}

/// Table style and content edits. Structural edits (merge, resize) go
/// through [`crate::command::TableOp`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TablePatch {
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    pub border: Option<String>,
    pub header_bg: Option<String>,
    pub cell_bg: Option<String>,
    /// (row, col, content)
    pub cell: Option<(usize, usize, String)>,
}

impl TablePatch {
    fn apply_to(&self, table: &mut Table) {
        if self.rows.is_some() || self.cols.is_some() {
            table.set_dimensions(
                self.rows.unwrap_or(table.rows()),
                self.cols.unwrap_or(table.cols()),
            );
        }
        if let Some(border) = &self.border {
            table.border = border.clone();
        }
        if let Some(bg) = &self.header_bg {
            table.header_bg = bg.clone();
        }
        if let Some(bg) = &self.cell_bg {
            table.cell_bg = bg.clone();
        }
        if let Some((row, col, content)) = &self.cell {
            table.set_cell(*row, *col, content);
        }
    }
}

/// An element without identity, used by the palette and by templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementPrototype {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub style: Style,
    pub kind: ElementKind,
}

impl ElementPrototype {
    pub fn new(rect: Rect, kind: ElementKind) -> Self {
        Self {
            x: rect.min.x,
            y: rect.min.y,
            width: rect.width(),
            height: rect.height(),
            style: Style::default(),
            kind,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Give the prototype a fresh identity
    pub fn instantiate(&self, z_index: usize) -> Element {
        Element {
            id: generate_id(),
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            z_index,
            style: self.style.clone(),
            kind: self.kind.clone(),
        }
    }
}

impl From<&Element> for ElementPrototype {
    fn from(element: &Element) -> Self {
        Self {
            x: element.x,
            y: element.y,
            width: element.width,
            height: element.height,
            style: element.style.clone(),
            kind: element.kind.clone(),
        }
    }
}

/// Default prototypes for the insert palette
pub mod factory {
    use super::*;

    pub fn heading() -> ElementPrototype {
        let mut props = TextProps::new(TextRole::Heading, "Heading Text");
        props.font_size = 24.0;
        props.font_weight = "bold".to_owned();
        ElementPrototype::new(
            Rect::from_min_size(pos2(100.0, 100.0), vec2(300.0, 40.0)),
            ElementKind::Text(props),
        )
    }

    pub fn paragraph() -> ElementPrototype {
        let mut props = TextProps::new(TextRole::Paragraph, "Paragraph text goes here...");
        props.color = "#333333".to_owned();
        ElementPrototype::new(
            Rect::from_min_size(pos2(100.0, 150.0), vec2(400.0, 60.0)),
            ElementKind::Text(props),
        )
    }

    pub fn text() -> ElementPrototype {
        ElementPrototype::new(
            Rect::from_min_size(pos2(100.0, 150.0), vec2(200.0, 30.0)),
            ElementKind::Text(TextProps::new(TextRole::Text, "Text")),
        )
    }

    pub fn shape(shape: ShapeType) -> ElementPrototype {
        let size = match shape {
            ShapeType::Line => vec2(200.0, MIN_ELEMENT_HEIGHT),
            ShapeType::Rectangle | ShapeType::Circle => vec2(150.0, 150.0),
        };
        ElementPrototype::new(
            Rect::from_min_size(pos2(100.0, 200.0), size),
            ElementKind::Shape(shape),
        )
        .with_style(Style {
            background_color: Some("#3b82f6".to_owned()),
            ..Default::default()
        })
    }

    pub fn image() -> ElementPrototype {
        ElementPrototype::new(
            Rect::from_min_size(pos2(100.0, 300.0), vec2(200.0, 200.0)),
            ElementKind::Image(ImageProps { src: String::new() }),
        )
    }

    pub fn image_with_src(src: String, at: Pos2) -> ElementPrototype {
        let mut prototype = image();
        prototype.x = at.x;
        prototype.y = at.y;
        prototype.kind = ElementKind::Image(ImageProps { src });
        prototype
    }

    pub fn icon() -> ElementPrototype {
        ElementPrototype::new(
            Rect::from_min_size(pos2(100.0, 100.0), vec2(60.0, 60.0)),
            ElementKind::Icon(IconProps {
                glyph: "★".to_owned(),
                font_size: 32.0,
                color: DEFAULT_TEXT_COLOR.to_owned(),
            }),
        )
    }

    pub fn block() -> ElementPrototype {
        ElementPrototype::new(
            Rect::from_min_size(pos2(100.0, 100.0), vec2(250.0, 120.0)),
            ElementKind::Block(BlockProps {
                label: "Pre-made Block".to_owned(),
            }),
        )
        .with_style(Style {
            background_color: Some("#ffffff".to_owned()),
            border: Some("1px solid #e5e7eb".to_owned()),
            border_radius: 4.0,
            ..Default::default()
        })
    }

    /// A table with a filled header row
    pub fn table(rows: usize, cols: usize) -> ElementPrototype {
        let mut table = Table::new(rows, cols);
        for col in 0..table.cols() {
            table.set_cell(0, col, &format!("Header {}", col + 1));
        }
        let width = (cols.max(1) as f32 * 100.0).min(500.0);
        let height = rows.max(1) as f32 * 40.0;
        ElementPrototype::new(
            Rect::from_min_size(pos2(50.0, 100.0), vec2(width, height)),
            ElementKind::Table(table),
        )
    }

    /// Full-width colored band for page headers
    pub fn header_band() -> ElementPrototype {
        ElementPrototype::new(
            Rect::from_min_size(pos2(0.0, 0.0), vec2(595.0, 100.0)),
            ElementKind::Shape(ShapeType::Rectangle),
        )
        .with_style(Style {
            background_color: Some("#1e3a8a".to_owned()),
            ..Default::default()
        })
    }

    /// Thin horizontal rule across the content width
    pub fn divider() -> ElementPrototype {
        ElementPrototype::new(
            Rect::from_min_size(pos2(50.0, 400.0), vec2(495.0, MIN_ELEMENT_HEIGHT)),
            ElementKind::Shape(ShapeType::Line),
        )
        .with_style(Style {
            background_color: Some("#d1d5db".to_owned()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_floors_size() {
        let mut element = factory::heading().instantiate(0);
        element.apply(&ElementPatch::size(vec2(10.0, 5.0)));
        assert_eq!(element.width, MIN_ELEMENT_WIDTH);
        assert_eq!(element.height, MIN_ELEMENT_HEIGHT);
    }

    #[test]
    fn test_mismatched_kind_patch_is_ignored() {
        let mut element = factory::shape(ShapeType::Circle).instantiate(0);
        let before = element.clone();
        element.apply(&ElementPatch::text(TextPatch {
            content: Some("nope".to_owned()),
            ..Default::default()
        }));
        assert_eq!(element, before);
    }

    #[test]
    fn test_text_patch_merges() {
        let mut element = factory::paragraph().instantiate(3);
        element.apply(&ElementPatch::text(TextPatch {
            font_size: Some(18.0),
            text_align: Some(TextAlign::Center),
            ..Default::default()
        }));
        let ElementKind::Text(props) = &element.kind else {
            panic!("expected text");
        };
        assert_eq!(props.font_size, 18.0);
        assert_eq!(props.text_align, TextAlign::Center);
        assert_eq!(props.content, "Paragraph text goes here...");
        assert_eq!(element.z_index, 3);
    }

    #[test]
    fn test_style_patch() {
        let mut element = factory::shape(ShapeType::Rectangle).instantiate(0);
        element.apply(&ElementPatch {
            background_color: Some(None),
            opacity: Some(1.7),
            border_radius: Some(-3.0),
            ..Default::default()
        });
        assert_eq!(element.style.background_color, None);
        assert_eq!(element.style.opacity, 1.0);
        assert_eq!(element.style.border_radius, 0.0);
    }

    #[test]
    fn test_font_weight_boldness() {
        let mut props = TextProps::new(TextRole::Text, "");
        assert!(!props.is_bold());
        props.font_weight = "600".to_owned();
        assert!(props.is_bold());
        props.font_weight = "500".to_owned();
        assert!(!props.is_bold());
        props.font_weight = "bold".to_owned();
        assert!(props.is_bold());
    }

    #[test]
    fn test_table_factory_header() {
        let element = factory::table(3, 3).instantiate(0);
        let table = element.as_table().unwrap();
        assert_eq!(table.cell(0, 2).unwrap().content, "Header 3");
        assert_eq!(element.height, 120.0);
    }
}
