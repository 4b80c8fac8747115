use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use page_composer::error::ImportError;
use page_composer::pdf_import::{extract_fields, import_file};
use page_composer::template::{self, populate_template};
use page_composer::element::ElementKind;
use page_composer::extract_document;

/// A minimal PDF with one page per entry, each page showing its lines in Courier
fn text_pdf(pages: &[&[&str]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::new();
    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("TL", vec![16.into()]),
            Operation::new("Td", vec![72.into(), 760.into()]),
        ];
        for line in lines.iter() {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

#[test]
fn test_name_field_from_pdf() {
    let bytes = text_pdf(&[&["Name: John Smith"]]);
    let document = extract_document(&bytes).unwrap();

    assert_eq!(document.total_pages, 1);
    let page = document.page(0).unwrap();
    assert_eq!(page.page_number, 1);
    assert_eq!(page.data.name, "John Smith");
    assert!(page.text.contains("John Smith"));
    assert!(!page.garbled);
}

#[test]
fn test_pages_are_extracted_separately() {
    let bytes = text_pdf(&[&["Name: Alice Jones"], &["Date: 2024-03-01"]]);
    let document = extract_document(&bytes).unwrap();

    assert_eq!(document.total_pages, 2);
    assert_eq!(document.pages.len(), 2);
    assert_eq!(document.page(0).unwrap().data.name, "Alice Jones");
    assert_eq!(document.page(1).unwrap().data.date, "2024-03-01");
    assert_eq!(document.page(1).unwrap().page_number, 2);
}

#[test]
fn test_labels_are_case_insensitive_and_trimmed() {
    let fields = extract_fields("NAME :   John Smith   \ncase no: 12-345\nADDRESS: 1 Main St");
    assert_eq!(fields.name, "John Smith");
    assert_eq!(fields.case_number, "12-345");
    assert_eq!(fields.address, "1 Main St");
    assert_eq!(fields.date, "");
}

#[test]
fn test_empty_input_is_no_file() {
    assert!(matches!(extract_document(&[]), Err(ImportError::NoFile)));
}

#[test]
fn test_pdf_without_text_is_no_text() {
    let bytes = text_pdf(&[&[]]);
    assert!(matches!(extract_document(&bytes), Err(ImportError::NoText)));
}

#[test]
fn test_import_file_fills_invoice() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("case.pdf");
    std::fs::write(&path, text_pdf(&[&["Name: John Smith"]])).unwrap();

    let document = import_file(&path).unwrap();
    let fields = document.page(0).unwrap().data.clone();
    let elements = populate_template(&template::invoice(), &fields);

    let texts = elements
        .iter()
        .filter_map(|e| match &e.kind {
            ElementKind::Text(props) => Some(props.content.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert!(texts.iter().any(|t| t.contains("John Smith")));
    assert!(texts.iter().all(|t| !t.contains("{{name}}")));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = import_file(&dir.path().join("missing.pdf"));
    assert!(matches!(result, Err(ImportError::Io(_))));
}
