use egui::{Rect, pos2, vec2};

use crate::element::{
    Element, ElementKind, ElementPrototype, ShapeType, Style, Table, TextAlign, TextProps, TextRole,
};
use crate::pdf_import::{ExtractedFields, ExtractedPage};

/// Placeholder keys understood by [`fill_placeholders`]
pub const PLACEHOLDERS: [&str; 4] = ["name", "address", "caseNumber", "date"];

/// A named starting layout
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub elements: Vec<ElementPrototype>,
}

impl Template {
    /// Clone the prototypes with fresh ids, z-index in order
    pub fn instantiate(&self) -> Vec<Element> {
        self.elements
            .iter()
            .enumerate()
            .map(|(z, prototype)| prototype.instantiate(z))
            .collect()
    }
}

fn text(rect: Rect, props: TextProps) -> ElementPrototype {
    ElementPrototype::new(rect, ElementKind::Text(props))
}

fn rect(x: f32, y: f32, w: f32, h: f32) -> Rect {
    Rect::from_min_size(pos2(x, y), vec2(w, h))
}

fn filled(color: &str) -> Style {
    Style {
        background_color: Some(color.to_owned()),
        ..Default::default()
    }
}

fn heading(content: &str, size: f32, color: &str) -> TextProps {
    let mut props = TextProps::new(TextRole::Heading, content);
    props.font_size = size;
    props.font_weight = "bold".to_owned();
    props.color = color.to_owned();
    props
}

fn paragraph(content: &str, size: f32, color: &str) -> TextProps {
    let mut props = TextProps::new(TextRole::Paragraph, content);
    props.font_size = size;
    props.color = color.to_owned();
    props
}

/// Invoice with a header band, client details and a line item table.
/// Client fields are placeholders so imported PDFs can populate it.
pub fn invoice() -> Template {
    let mut title = heading("INVOICE", 32.0, "#ffffff");
    title.text_align = TextAlign::Left;
    let mut number = paragraph("Case #{{caseNumber}}", 14.0, "#dbeafe");
    number.text_align = TextAlign::Right;

    let items = Table::from_contents(&[
        &["Description", "Qty", "Price", "Total"],
        &["Consultation", "1", "$150.00", "$150.00"],
        &["Document review", "2", "$75.00", "$150.00"],
        &["", "", "Subtotal", "$300.00"],
    ]);

    let mut total = heading("Total Due: $300.00", 18.0, "#1e3a8a");
    total.text_align = TextAlign::Right;

    Template {
        id: "invoice",
        name: "Invoice",
        description: "Professional invoice with client details and line items",
        elements: vec![
            ElementPrototype::new(rect(0.0, 0.0, 595.0, 100.0), ElementKind::Shape(ShapeType::Rectangle))
                .with_style(filled("#1e3a8a")),
            text(rect(40.0, 30.0, 250.0, 45.0), title),
            text(rect(315.0, 40.0, 240.0, 30.0), number),
            text(rect(40.0, 130.0, 200.0, 25.0), heading("Bill To", 14.0, "#6b7280")),
            text(rect(40.0, 160.0, 300.0, 30.0), heading("{{name}}", 18.0, "#111827")),
            text(rect(40.0, 195.0, 300.0, 50.0), paragraph("{{address}}", 12.0, "#374151")),
            text(rect(375.0, 130.0, 180.0, 25.0), heading("Date", 14.0, "#6b7280")),
            text(rect(375.0, 160.0, 180.0, 30.0), paragraph("{{date}}", 14.0, "#111827")),
            ElementPrototype::new(rect(40.0, 270.0, 515.0, 160.0), ElementKind::Table(items)),
            ElementPrototype::new(rect(40.0, 450.0, 515.0, 30.0), ElementKind::Shape(ShapeType::Line))
                .with_style(filled("#d1d5db")),
            text(rect(275.0, 490.0, 280.0, 35.0), total),
            text(
                rect(40.0, 760.0, 515.0, 40.0),
                paragraph("Thank you for your business. Payment is due within 30 days.", 11.0, "#6b7280"),
            ),
        ],
    }
}

/// Card layout with a tinted box and accent shapes
pub fn modern_box() -> Template {
    let mut title = heading("Your Title Here", 28.0, "#111827");
    title.text_align = TextAlign::Center;
    let mut subtitle = paragraph("A short description of what this document is about.", 14.0, "#4b5563");
    subtitle.text_align = TextAlign::Center;

    Template {
        id: "modern-box",
        name: "Modern Box",
        description: "Bold card layout with accent shapes",
        elements: vec![
            ElementPrototype::new(rect(40.0, 40.0, 515.0, 760.0), ElementKind::Shape(ShapeType::Rectangle))
                .with_style(Style {
                    background_color: Some("#f8fafc".to_owned()),
                    border: Some("2px solid #e2e8f0".to_owned()),
                    border_radius: 16.0,
                    ..Default::default()
                }),
            ElementPrototype::new(rect(257.0, 80.0, 80.0, 80.0), ElementKind::Shape(ShapeType::Circle))
                .with_style(filled("#f97316")),
            text(rect(80.0, 190.0, 435.0, 45.0), title),
            text(rect(80.0, 245.0, 435.0, 50.0), subtitle),
            ElementPrototype::new(rect(80.0, 310.0, 435.0, 30.0), ElementKind::Shape(ShapeType::Line))
                .with_style(filled("#f97316")),
            text(
                rect(80.0, 360.0, 435.0, 200.0),
                paragraph("Start writing here. Drag elements around, resize them, or add new ones from the palette.", 13.0, "#374151"),
            ),
        ],
    }
}

/// Clean single-column resume
pub fn resume_minimal() -> Template {
    let section = |y: f32, label: &str| {
        text(rect(50.0, y, 495.0, 28.0), heading(label, 16.0, "#1e3a8a"))
    };
    let rule = |y: f32| {
        ElementPrototype::new(rect(50.0, y, 495.0, 30.0), ElementKind::Shape(ShapeType::Line))
            .with_style(filled("#e5e7eb"))
    };

    Template {
        id: "resume-minimal",
        name: "Minimal Resume",
        description: "Clean minimalist resume",
        elements: vec![
            text(rect(50.0, 50.0, 495.0, 45.0), heading("Your Name", 30.0, "#111827")),
            text(
                rect(50.0, 100.0, 495.0, 25.0),
                paragraph("email@example.com · (555) 123-4567 · City, Country", 12.0, "#6b7280"),
            ),
            rule(125.0),
            section(165.0, "Experience"),
            text(
                rect(50.0, 200.0, 495.0, 90.0),
                paragraph("Job Title, Company (2020 - Present)\nDescribe your responsibilities and achievements.", 12.0, "#374151"),
            ),
            section(310.0, "Education"),
            text(
                rect(50.0, 345.0, 495.0, 60.0),
                paragraph("Degree, University (2016 - 2020)", 12.0, "#374151"),
            ),
            section(425.0, "Skills"),
            text(
                rect(50.0, 460.0, 495.0, 60.0),
                paragraph("Skill one · Skill two · Skill three", 12.0, "#374151"),
            ),
        ],
    }
}

/// Every built-in template, in palette order
pub fn templates() -> Vec<Template> {
    vec![invoice(), modern_box(), resume_minimal()]
}

pub fn find(id: &str) -> Option<Template> {
    templates().into_iter().find(|t| t.id == id)
}

/// Replace every `{{key}}` placeholder with its field value
pub fn fill_placeholders(text: &str, fields: &ExtractedFields) -> String {
    if !text.contains("{{") {
        return text.to_owned();
    }
    PLACEHOLDERS.iter().fold(text.to_owned(), |acc, key| {
        acc.replace(&format!("{{{{{}}}}}", key), fields.get(key).unwrap_or_default())
    })
}

fn fill_element(element: &mut Element, fields: &ExtractedFields) {
    match &mut element.kind {
        ElementKind::Text(props) => props.content = fill_placeholders(&props.content, fields),
        ElementKind::Icon(props) => props.glyph = fill_placeholders(&props.glyph, fields),
        ElementKind::Block(props) => props.label = fill_placeholders(&props.label, fields),
        ElementKind::Table(table) => table.map_contents(|content| fill_placeholders(content, fields)),
        ElementKind::Image(_) | ElementKind::Shape(_) => {}
    }
}

/// Instantiate a template and substitute the extracted fields
pub fn populate_template(template: &Template, fields: &ExtractedFields) -> Vec<Element> {
    let mut elements = template.instantiate();
    for element in &mut elements {
        fill_element(element, fields);
    }
    elements
}

/// A single bordered paragraph holding a page's raw text
pub fn raw_text_document(page: &ExtractedPage) -> Vec<Element> {
    let content = if page.text.is_empty() {
        "No text extracted".to_owned()
    } else {
        page.text.clone()
    };
    let mut props = paragraph(&content, 12.0, "#1f2937");
    props.line_height = 1.6;

    let prototype = text(rect(50.0, 50.0, 495.0, 700.0), props).with_style(Style {
        background_color: Some("#ffffff".to_owned()),
        border: Some("1px solid #e5e7eb".to_owned()),
        border_radius: 8.0,
        padding: 20.0,
        ..Default::default()
    });
    vec![prototype.instantiate(0)]
}

/// Fixed case summary sheet, filled from `fields` and exported like any page
pub fn smart_fill_document(fields: &ExtractedFields) -> Vec<Element> {
    let mut title = heading("Case Summary", 26.0, "#ffffff");
    title.text_align = TextAlign::Center;

    let mut elements = vec![
        ElementPrototype::new(rect(0.0, 0.0, 595.0, 90.0), ElementKind::Shape(ShapeType::Rectangle))
            .with_style(filled("#1e3a8a")),
        text(rect(20.0, 25.0, 555.0, 40.0), title),
    ];

    let rows = [
        ("Name", "{{name}}"),
        ("Address", "{{address}}"),
        ("Case Number", "{{caseNumber}}"),
        ("Date", "{{date}}"),
    ];
    for (i, (label, placeholder)) in rows.iter().enumerate() {
        let y = 130.0 + i as f32 * 70.0;
        elements.push(text(rect(50.0, y, 495.0, 22.0), heading(label, 12.0, "#6b7280")));
        elements.push(
            text(rect(50.0, y + 24.0, 495.0, 36.0), paragraph(placeholder, 16.0, "#111827")).with_style(Style {
                border: Some("1px solid #e5e7eb".to_owned()),
                border_radius: 4.0,
                padding: 8.0,
                ..Default::default()
            }),
        );
    }

    let template = Template {
        id: "smart-fill",
        name: "Case Summary",
        description: "Generated from extracted PDF fields",
        elements,
    };
    populate_template(&template, fields)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn fields() -> ExtractedFields {
        ExtractedFields {
            name: "John Smith".to_owned(),
            address: "1 Main St".to_owned(),
            case_number: "42".to_owned(),
            date: "2024-05-01".to_owned(),
        }
    }

    fn all_text(elements: &[Element]) -> String {
        let mut out = String::new();
        for element in elements {
            match &element.kind {
                ElementKind::Text(props) => out.push_str(&props.content),
                ElementKind::Table(table) => {
                    for cell in table.cells().iter().flatten() {
                        out.push_str(&cell.content);
                    }
                }
                _ => {}
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_fill_placeholders() {
        let filled = fill_placeholders("{{name}} / {{name}} / {{caseNumber}} / {{other}}", &fields());
        assert_eq!(filled, "John Smith / John Smith / 42 / {{other}}");
        assert_eq!(fill_placeholders("{{date}}", &ExtractedFields::default()), "");
    }

    #[test]
    fn test_instantiation_ids_are_disjoint() {
        let template = invoice();
        let first = template.instantiate();
        let second = template.instantiate();
        let ids = first.iter().chain(&second).map(|e| e.id).collect::<HashSet<_>>();
        assert_eq!(ids.len(), first.len() + second.len());
        assert!(first.iter().enumerate().all(|(z, e)| e.z_index == z));
    }

    #[test]
    fn test_populate_invoice() {
        let text = all_text(&populate_template(&invoice(), &fields()));
        assert!(text.contains("John Smith"));
        assert!(text.contains("1 Main St"));
        assert!(text.contains("Case #42"));
        assert!(!text.contains("{{"));
    }

    #[test]
    fn test_smart_fill_has_all_fields() {
        let text = all_text(&smart_fill_document(&fields()));
        for value in ["John Smith", "1 Main St", "42", "2024-05-01"] {
            assert!(text.contains(value), "missing {}", value);
        }
    }

    #[test]
    fn test_raw_text_document() {
        let page = ExtractedPage {
            page_number: 1,
            text: String::new(),
            data: ExtractedFields::default(),
            garbled: false,
        };
        let elements = raw_text_document(&page);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].width, 495.0);
        assert_eq!(elements[0].style.padding, 20.0);
        assert!(all_text(&elements).contains("No text extracted"));
    }

    #[test]
    fn test_find_by_id() {
        assert_eq!(find("resume-minimal").map(|t| t.name), Some("Minimal Resume"));
        assert!(find("missing").is_none());
    }
}
