use egui::{Pos2, Rect, Vec2};
use page_composer::element::{
    ElementKind, MIN_ELEMENT_HEIGHT, MIN_ELEMENT_WIDTH, ShapeType, TextPatch, factory,
};
use page_composer::{Document, Element, ElementPatch, ElementPrototype};

fn rectangle_at(x: f32, y: f32) -> ElementPrototype {
    ElementPrototype::new(
        Rect::from_min_size(Pos2::new(x, y), Vec2::new(100.0, 50.0)),
        ElementKind::Shape(ShapeType::Rectangle),
    )
}

#[test]
fn test_palette_defaults() {
    let heading = factory::heading().instantiate(0);
    assert_eq!(heading.type_name(), "text");
    match &heading.kind {
        ElementKind::Text(props) => {
            assert_eq!(props.content, "Heading Text");
            assert!(props.is_bold());
        }
        other => panic!("expected text, got {:?}", other),
    }

    let table = factory::table(3, 3).instantiate(0);
    let grid = table.as_table().unwrap();
    assert_eq!((grid.rows(), grid.cols()), (3, 3));
    assert_eq!(grid.cell(0, 2).unwrap().content, "Header 3");
    assert_eq!(grid.cell(1, 0).unwrap().content, "");
}

#[test]
fn test_instantiate_gives_unique_ids() {
    let prototype = factory::paragraph();
    let a = prototype.instantiate(0);
    let b = prototype.instantiate(1);
    assert_ne!(a.id, b.id);
    assert_eq!(a.rect(), b.rect());
}

#[test]
fn test_z_index_follows_insertion_order() {
    let mut doc = Document::new();
    let ids = (0..3)
        .map(|i| doc.add(&rectangle_at(10.0 * i as f32, 0.0)))
        .collect::<Vec<_>>();

    for (expected, id) in ids.iter().enumerate() {
        assert_eq!(doc.element(*id).unwrap().z_index, expected);
    }
    // the last one added is selected
    assert_eq!(doc.selected(), Some(ids[2]));
}

#[test]
fn test_hit_test_prefers_higher_z() {
    let mut doc = Document::new();
    let below = doc.add(&rectangle_at(0.0, 0.0));
    let above = doc.add(&rectangle_at(50.0, 20.0));

    assert_eq!(doc.element_at(Pos2::new(60.0, 30.0)).unwrap().id, above);
    assert_eq!(doc.element_at(Pos2::new(10.0, 10.0)).unwrap().id, below);
    assert!(doc.element_at(Pos2::new(400.0, 400.0)).is_none());

    doc.bring_to_front(below);
    assert_eq!(doc.element_at(Pos2::new(60.0, 30.0)).unwrap().id, below);
}

#[test]
fn test_patch_floors_size() {
    let mut element = rectangle_at(0.0, 0.0).instantiate(0);
    element.apply(&ElementPatch::size(Vec2::new(10.0, -5.0)));
    assert_eq!(element.width, MIN_ELEMENT_WIDTH);
    assert_eq!(element.height, MIN_ELEMENT_HEIGHT);
}

#[test]
fn test_patch_for_other_variant_is_ignored() {
    let mut element = rectangle_at(0.0, 0.0).instantiate(0);
    let before = element.clone();
    element.apply(&ElementPatch::text(TextPatch {
        content: Some("hello".to_owned()),
        ..Default::default()
    }));
    assert_eq!(element, before);
}

#[test]
fn test_element_json_shape() {
    let element = factory::icon().instantiate(4);
    let json = serde_json::to_string(&element).unwrap();
    let back: Element = serde_json::from_str(&json).unwrap();
    assert_eq!(back, element);
    assert_eq!(back.z_index, 4);
}
