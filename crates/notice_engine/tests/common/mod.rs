#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

pub const REACTOR_TRIP_RECORD: &str = r#"<a name="en12345"></a>
<table>
<tr><td>Power Reactor<BR>Event Number: 12345</td></tr>
<tr><td>Facility: SAMPLE STATION<BR>State: AL<BR>Unit: [1] [] []<BR>10 CFR Section:<BR>50.72(b)(2)(iv)(B) - RPS ACTUATION - CRITICAL<BR>Person (Organization):<BR>JOHN DOE (NRC)</td></tr>
</table>
<table>
<tr><td>Unit</td><td>SCRAM Code</td><td>RX CRIT</td><td>Initial PWR</td><td>Initial RX Mode</td><td>Current PWR</td><td>Current RX Mode</td></tr>
<tr><td>1</td><td>A/R</td><td>Y</td><td>100</td><td>Power Operation</td><td>0</td><td>Hot Standby</td></tr>
</table>
<table>
<tr><td>Event Text<BR>Reactor tripped.</td></tr>
</table>
"#;

/// Last record of the page, cut off before its CFR block.
pub const CUT_OFF_RECORD: &str = r#"<a name="en12346"></a>
<table>
<tr><td>Fuel Cycle Facility<BR>Event Number: 12346</td></tr>
<tr><td>Event Text<BR>Page Last Reviewed/Updated</td></tr>
</table>
"#;

pub fn digest_page(records: &[&str]) -> String {
    format!(
        r#"<html><head><title>Event Notification Report</title></head>
<body>
<div id="mainSubFull">
{}
</div>
</body></html>"#,
        records.join("\n")
    )
}

/// A minimal PDF with one page per entry of `pages`.
pub fn pdf_bytes(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
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
