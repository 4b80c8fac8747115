use egui::{Pos2, Rect, Vec2};
use page_composer::element::{ElementKind, ShapeType, factory};
use page_composer::id_generator::generate_id;
use page_composer::{Command, CommandError, EditorConfig, EditorModel, ElementPatch, ElementPrototype};

fn create_test_model() -> EditorModel {
    EditorModel::new(&EditorConfig::default())
}

fn box_prototype() -> ElementPrototype {
    ElementPrototype::new(
        Rect::from_min_size(Pos2::new(100.0, 100.0), Vec2::new(100.0, 50.0)),
        ElementKind::Shape(ShapeType::Rectangle),
    )
}

#[test]
fn test_add_undo_redo_keeps_identity() {
    let mut model = create_test_model();
    model.execute(Command::AddElement(factory::heading())).unwrap();

    assert_eq!(model.elements().len(), 1);
    let added = model.elements()[0].clone();
    assert_eq!(added.z_index, 0);
    assert_eq!(model.selected(), Some(added.id));

    model.execute(Command::Undo).unwrap();
    assert!(model.elements().is_empty());
    assert_eq!(model.selected(), None);

    model.execute(Command::Redo).unwrap();
    assert_eq!(model.elements().len(), 1);
    assert_eq!(model.elements()[0].id, added.id);
    assert_eq!(model.elements()[0], added);
}

#[test]
fn test_undo_past_start_is_an_error() {
    let mut model = create_test_model();
    assert!(matches!(model.execute(Command::Undo), Err(CommandError::NothingToUndo)));
    assert!(matches!(model.execute(Command::Redo), Err(CommandError::NothingToRedo)));
}

#[test]
fn test_unknown_id_leaves_model_untouched() {
    let mut model = create_test_model();
    model.execute(Command::AddElement(box_prototype())).unwrap();
    let before = model.elements().to_vec();
    let history_len = model.history().len();
    let ghost = generate_id();

    for command in [
        Command::DeleteElement(ghost),
        Command::DuplicateElement(ghost),
        Command::BringToFront(ghost),
        Command::SendToBack(ghost),
        Command::Nudge { id: ghost, dx: 5.0, dy: 5.0 },
        Command::UpdateElement {
            id: ghost,
            patch: ElementPatch::position(Pos2::ZERO),
        },
    ] {
        let result = model.execute(command);
        assert!(matches!(result, Err(CommandError::UnknownElement(id)) if id == ghost));
    }
    assert_eq!(model.elements(), before.as_slice());
    assert_eq!(model.history().len(), history_len);
}

#[test]
fn test_update_is_not_recorded_until_commit() {
    let mut model = create_test_model();
    model.execute(Command::AddElement(box_prototype())).unwrap();
    let id = model.elements()[0].id;
    let history_len = model.history().len();

    for x in [110.0, 120.0, 130.0] {
        model
            .execute(Command::UpdateElement {
                id,
                patch: ElementPatch::position(Pos2::new(x, 100.0)),
            })
            .unwrap();
    }
    assert_eq!(model.history().len(), history_len);

    model.execute(Command::Commit).unwrap();
    assert_eq!(model.history().len(), history_len + 1);

    // nothing changed since, so no new entry
    model.execute(Command::Commit).unwrap();
    assert_eq!(model.history().len(), history_len + 1);

    model.execute(Command::Undo).unwrap();
    assert_eq!(model.element(id).unwrap().x, 100.0);
}

#[test]
fn test_commit_after_undo_drops_redo_branch() {
    let mut model = create_test_model();
    model.execute(Command::AddElement(box_prototype())).unwrap();
    model.execute(Command::AddElement(factory::paragraph())).unwrap();
    model.execute(Command::Undo).unwrap();
    assert!(model.can_redo());

    model.execute(Command::AddElement(factory::icon())).unwrap();
    assert!(!model.can_redo());
    assert_eq!(model.elements().len(), 2);
    assert_eq!(model.elements()[1].type_name(), "icon");
}

#[test]
fn test_delete_clears_selection() {
    let mut model = create_test_model();
    model.execute(Command::AddElement(box_prototype())).unwrap();
    let id = model.elements()[0].id;

    model.execute(Command::DeleteElement(id)).unwrap();
    assert!(model.elements().is_empty());
    assert_eq!(model.selected(), None);

    model.execute(Command::Undo).unwrap();
    assert_eq!(model.element(id).map(|e| e.id), Some(id));
}

#[test]
fn test_delete_other_element_keeps_selection() {
    let mut model = create_test_model();
    model.execute(Command::AddElement(box_prototype())).unwrap();
    model.execute(Command::AddElement(factory::paragraph())).unwrap();
    let a = model.elements()[0].id;
    let b = model.elements()[1].id;

    model.execute(Command::Select(Some(a))).unwrap();
    model.execute(Command::DeleteElement(b)).unwrap();
    assert!(model.element(b).is_none());
    assert_eq!(model.elements().len(), 1);
    assert_eq!(model.selected(), Some(a));

    model.execute(Command::DeleteElement(a)).unwrap();
    assert!(model.elements().is_empty());
    assert_eq!(model.selected(), None);
}

#[test]
fn test_undo_redo_walks_whole_history() {
    let mut model = create_test_model();
    let original = model.elements().to_vec();

    let mut states = Vec::new();
    model.execute(Command::AddElement(box_prototype())).unwrap();
    states.push(model.elements().to_vec());
    let id = model.elements()[0].id;
    model.execute(Command::AddElement(factory::heading())).unwrap();
    states.push(model.elements().to_vec());
    model.execute(Command::Nudge { id, dx: 10.0, dy: 0.0 }).unwrap();
    states.push(model.elements().to_vec());
    model.execute(Command::BringToFront(id)).unwrap();
    states.push(model.elements().to_vec());
    model
        .execute(Command::UpdateElement {
            id,
            patch: ElementPatch::position(Pos2::new(40.0, 60.0)),
        })
        .unwrap();
    model.execute(Command::Commit).unwrap();
    states.push(model.elements().to_vec());
    let n = states.len();

    for step in (0..n).rev() {
        model.execute(Command::Undo).unwrap();
        let expected = if step == 0 { &original } else { &states[step - 1] };
        assert_eq!(model.elements(), expected.as_slice());
    }
    assert!(!model.can_undo());
    assert_eq!(model.elements(), original.as_slice());

    for state in &states {
        model.execute(Command::Redo).unwrap();
        assert_eq!(model.elements(), state.as_slice());
    }
    assert!(!model.can_redo());

    // a fresh commit from the middle discards everything after it
    for _ in 0..3 {
        model.execute(Command::Undo).unwrap();
    }
    assert_eq!(model.elements(), states[n - 4].as_slice());
    model.execute(Command::Nudge { id, dx: 0.0, dy: 5.0 }).unwrap();
    assert!(!model.can_redo());
    assert!(matches!(model.execute(Command::Redo), Err(CommandError::NothingToRedo)));
    model.execute(Command::Undo).unwrap();
    assert_eq!(model.elements(), states[n - 4].as_slice());
}

#[test]
fn test_duplicate_offsets_and_selects_copy() {
    let mut model = create_test_model();
    model.execute(Command::AddElement(box_prototype())).unwrap();
    let original = model.elements()[0].clone();

    model.execute(Command::DuplicateElement(original.id)).unwrap();
    let copy = model.selected_element().unwrap();
    assert_ne!(copy.id, original.id);
    assert_eq!(copy.x, original.x + 20.0);
    assert_eq!(copy.y, original.y + 20.0);
    assert_eq!(copy.z_index, 1);
    assert_eq!(copy.kind, original.kind);
}

#[test]
fn test_layer_order_commands() {
    let mut model = create_test_model();
    for _ in 0..3 {
        model.execute(Command::AddElement(box_prototype())).unwrap();
    }
    let ids = model.elements().iter().map(|e| e.id).collect::<Vec<_>>();

    model.execute(Command::BringToFront(ids[0])).unwrap();
    let top = model.document().element_at(Pos2::new(150.0, 120.0)).unwrap();
    assert_eq!(top.id, ids[0]);

    model.execute(Command::SendToBack(ids[0])).unwrap();
    let z = model.element(ids[0]).unwrap().z_index;
    assert!(model.elements().iter().all(|e| e.id == ids[0] || e.z_index > z));
}

#[test]
fn test_nudge_stays_on_page() {
    let mut model = create_test_model();
    model.execute(Command::AddElement(box_prototype())).unwrap();
    let id = model.elements()[0].id;

    model
        .execute(Command::Nudge { id, dx: -500.0, dy: 10.0 })
        .unwrap();
    let element = model.element(id).unwrap();
    assert_eq!((element.x, element.y), (0.0, 110.0));

    model
        .execute(Command::Nudge { id, dx: 10_000.0, dy: 10_000.0 })
        .unwrap();
    let element = model.element(id).unwrap();
    let page = model.page_size();
    assert_eq!(element.x + element.width, page.x);
    assert_eq!(element.y + element.height, page.y);
}

#[test]
fn test_replace_all_restarts_history() {
    let mut model = create_test_model();
    model.execute(Command::AddElement(box_prototype())).unwrap();

    let replacement = vec![factory::heading().instantiate(0), factory::divider().instantiate(1)];
    model
        .execute(Command::ReplaceAll(replacement.clone()))
        .unwrap();
    assert_eq!(model.elements(), replacement.as_slice());
    assert!(!model.can_undo());
    assert!(!model.can_redo());
}

#[test]
fn test_cell_mode_requires_table() {
    let mut model = create_test_model();
    model.execute(Command::AddElement(box_prototype())).unwrap();
    let id = model.elements()[0].id;

    assert!(matches!(
        model.execute(Command::SetCellMode(Some(id))),
        Err(CommandError::NotATable(_))
    ));
    assert_eq!(model.cell_mode(), None);
}
