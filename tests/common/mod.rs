use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

/// Text shown at an absolute position: (text, x, y).
pub type Placed<'a> = (&'a str, f32, f32);

pub fn build_test_pdf(pages: &[Vec<Placed<'_>>]) -> Result<Document, Box<dyn std::error::Error>> {
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

    let mut page_ids = Vec::new();

    for fragments in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
        ];

        for (text, x, y) in fragments {
            operations.push(Operation::new(
                "Tm",
                vec![
                    1.into(),
                    0.into(),
                    0.into(),
                    1.into(),
                    Object::Real(*x),
                    Object::Real(*y),
                ],
            ));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| (*id).into()).collect::<Vec<_>>(),
            "Count" => i64::try_from(page_ids.len())?,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    Ok(doc)
}

#[allow(dead_code)]
pub fn create_test_pdf(path: &Path, pages: &[Vec<Placed<'_>>]) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = build_test_pdf(pages)?;
    doc.save(path)?;
    Ok(())
}

#[allow(dead_code)]
pub fn test_pdf_bytes(pages: &[Vec<Placed<'_>>]) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut doc = build_test_pdf(pages)?;
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// A one-page ledger: a title above the table, two columns, a total line
/// ending the table and a footer below it.
#[allow(dead_code)]
pub fn ledger_page() -> Vec<Placed<'static>> {
    vec![
        ("Quarterly report", 300.0, 800.0),
        ("Ledger", 300.0, 760.0),
        ("Name", 50.0, 740.0),
        ("Amount", 200.0, 740.0),
        ("Alice", 50.0, 720.0),
        ("42", 200.0, 720.0),
        ("Bob", 50.5, 700.0),
        ("7", 199.5, 700.0),
        ("Total", 300.0, 680.0),
        ("Footnote", 50.0, 100.0),
    ]
}
