//! Fixture documents built in memory.
#![allow(dead_code)]

use std::io::Write;

pub fn docx_bytes(document_xml: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        let opts = zip::write::FileOptions::default();
        zip.start_file("[Content_Types].xml", opts).unwrap();
        zip.write_all(br#"<?xml version="1.0"?><Types/>"#).unwrap();
        zip.start_file("word/document.xml", opts).unwrap();
        zip.write_all(document_xml.as_bytes()).unwrap();
        zip.start_file("word/header1.xml", opts).unwrap();
        zip.write_all(br#"<w:hdr><w:p><w:r><w:t>CONFIDENTIAL sepsis</w:t></w:r></w:p></w:hdr>"#)
            .unwrap();
        zip.finish().unwrap();
    }
    buf
}

/// One page per entry; each fragment sits in its own `BT ... ET` block.
pub fn pdf_bytes(pages: &[&[&str]]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::Object;

    let streams = pages
        .iter()
        .map(|fragments| {
            let mut operations = Vec::new();
            for (i, fragment) in fragments.iter().enumerate() {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
                operations.push(Operation::new("Td", vec![72.into(), (700 - 20 * i as i64).into()]));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*fragment)]));
                operations.push(Operation::new("ET", vec![]));
            }
            Content { operations }.encode().unwrap()
        })
        .collect();
    pdf_from_streams(streams)
}

/// One page per raw content stream, with font `F1` available.
pub fn pdf_from_content(pages: &[&str]) -> Vec<u8> {
    pdf_from_streams(pages.iter().map(|c| c.as_bytes().to_vec()).collect())
}

fn pdf_from_streams(streams: Vec<Vec<u8>>) -> Vec<u8> {
    use lopdf::{dictionary, Document, Object, Stream};

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
    for stream in streams {
        let content_id = doc.add_object(Stream::new(dictionary! {}, stream));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// A blank white PNG.
pub fn blank_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255]));
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageOutputFormat::Png)
        .unwrap();
    buf.into_inner()
}
