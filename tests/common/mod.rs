//! Shared test infrastructure: an in-memory .pptx template with the
//! fixed shape vocabulary, CSV fixtures, and helpers for reading shapes
//! back out of a generated deck.

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

pub const PEOPLE_CSV: &str = "\
Name,Category,Title,SubTitle,FootNote,Updated,Section 1,Section 2,Section 3,QRCodeURL,ImgURL
Alice,A,Hi,Sub,Note,2024,A1,A2,A3,,
Bob,B,Other,BobSub,BobNote,2023,B1,B2,B3,,
";

pub const PRODUCTS_CSV: &str = "\
Product,Category,Section 1,Section 2,Section 3
Laptop,a,Q1,Q2,Q3
";

pub fn write_store(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write CSV fixture");
    path
}

/// Geometry given to the QR CODE placeholder in the test template.
pub const QR_EXTENT: (i64, i64, i64, i64) = (914400, 457200, 1828800, 1828800);
/// Geometry given to the IMAGE placeholder.
pub const IMAGE_EXTENT: (i64, i64, i64, i64) = (2743200, 457200, 3657600, 2743200);

fn text_shape(id: u32, name: &str, text: &str) -> String {
    format!(
        "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"{name}\"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>\
         <p:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"100\" cy=\"100\"/></a:xfrm></p:spPr>\
         <p:txBody><a:bodyPr/><a:lstStyle/>\
         <a:p><a:r><a:rPr lang=\"en-US\"/><a:t>{text}</a:t></a:r></a:p>\
         </p:txBody></p:sp>"
    )
}

fn placeholder_shape(id: u32, name: &str, extent: (i64, i64, i64, i64)) -> String {
    let (x, y, cx, cy) = extent;
    format!(
        "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"{name}\"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>\
         <p:spPr><a:xfrm><a:off x=\"{x}\" y=\"{y}\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm></p:spPr>\
         <p:txBody><a:bodyPr/><a:p><a:r><a:t>{name} placeholder</a:t></a:r></a:p></p:txBody></p:sp>"
    )
}

fn slide_xml() -> String {
    let shapes = [
        text_shape(2, "Title 1", "Old title"),
        text_shape(3, "TextBox 2", "Old subtitle"),
        text_shape(4, "TextBox 5", "Old sections"),
        text_shape(5, "TextBox 11", "Old updated"),
        text_shape(6, "Footer Placeholder 4", "Old footer"),
        placeholder_shape(7, "QR CODE", QR_EXTENT),
        placeholder_shape(8, "IMAGE", IMAGE_EXTENT),
        text_shape(9, "Content 9", "Untouched"),
    ]
    .concat();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <p:sld xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
         xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" \
         xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">\
         <p:cSld><p:spTree>\
         <p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
         <p:grpSpPr/>\
         {shapes}\
         </p:spTree></p:cSld></p:sld>"
    )
}

const CONTENT_TYPES: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
<Default Extension=\"xml\" ContentType=\"application/xml\"/>\
<Override PartName=\"/ppt/presentation.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml\"/>\
<Override PartName=\"/ppt/slides/slide1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>\
</Types>";

const ROOT_RELS: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"ppt/presentation.xml\"/>\
</Relationships>";

const PRESENTATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<p:presentation xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\"/>";

const PRESENTATION_RELS: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide\" Target=\"slides/slide1.xml\"/>\
</Relationships>";

const SLIDE_RELS: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout\" Target=\"../slideLayouts/slideLayout1.xml\"/>\
</Relationships>";

/// Build a minimal one-slide template carrying the full shape vocabulary.
pub fn build_template_pptx() -> Vec<u8> {
    let slide = slide_xml();
    let parts: Vec<(&str, &str)> = vec![
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("ppt/presentation.xml", PRESENTATION),
        ("ppt/_rels/presentation.xml.rels", PRESENTATION_RELS),
        ("ppt/slides/slide1.xml", slide.as_str()),
        ("ppt/slides/_rels/slide1.xml.rels", SLIDE_RELS),
    ];

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, contents) in parts {
        writer
            .start_file(name, options)
            .expect("Failed to start zip entry");
        writer
            .write_all(contents.as_bytes())
            .expect("Failed to write zip entry");
    }
    writer.finish().expect("Failed to finish zip").into_inner()
}

pub fn write_template(dir: &Path) -> PathBuf {
    let path = dir.join("template.pptx");
    std::fs::write(&path, build_template_pptx()).expect("Failed to write template fixture");
    path
}

/// Read one part out of a generated deck; None if the part is absent.
pub fn read_part(pptx: &[u8], name: &str) -> Option<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(pptx)).expect("Failed to open generated deck");
    let mut file = match archive.by_name(name) {
        Ok(f) => f,
        Err(_) => return None,
    };
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).expect("Failed to read part");
    Some(bytes)
}

pub fn read_part_string(pptx: &[u8], name: &str) -> Option<String> {
    read_part(pptx, name).map(|b| String::from_utf8(b).expect("part is not UTF-8"))
}

/// Shape name -> text frame content (paragraphs joined by '\n') for the
/// `p:sp` shapes of slide 1.
pub fn slide_texts(pptx: &[u8]) -> HashMap<String, String> {
    let xml = read_part_string(pptx, "ppt/slides/slide1.xml").expect("slide1.xml missing");
    let mut reader = Reader::from_str(&xml);
    let mut shapes = HashMap::new();
    let mut in_sp = false;
    let mut name = String::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;
    loop {
        match reader.read_event().expect("bad slide xml") {
            Event::Start(e) => match e.name().as_ref() {
                b"p:sp" => {
                    in_sp = true;
                    name.clear();
                    paragraphs.clear();
                }
                b"p:cNvPr" if in_sp && name.is_empty() => {
                    if let Some(attr) = e.try_get_attribute("name").expect("bad attr") {
                        name = attr.unescape_value().expect("bad name").trim().to_string();
                    }
                }
                b"a:p" if in_sp => {
                    in_paragraph = true;
                    current.clear();
                }
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"a:p" if in_sp => paragraphs.push(String::new()),
                b"p:cNvPr" if in_sp && name.is_empty() => {
                    if let Some(attr) = e.try_get_attribute("name").expect("bad attr") {
                        name = attr.unescape_value().expect("bad name").trim().to_string();
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_paragraph => {
                current.push_str(&t.unescape().expect("bad text"));
            }
            Event::End(e) => match e.name().as_ref() {
                b"a:p" if in_sp => {
                    in_paragraph = false;
                    paragraphs.push(current.clone());
                }
                b"p:sp" => {
                    in_sp = false;
                    shapes.insert(name.clone(), paragraphs.join("\n"));
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    shapes
}

/// The `r:embed` ids of every `p:pic` on slide 1, in document order,
/// paired with the picture's (x, y, cx, cy).
pub fn slide_pictures(pptx: &[u8]) -> Vec<(String, (i64, i64, i64, i64))> {
    let xml = read_part_string(pptx, "ppt/slides/slide1.xml").expect("slide1.xml missing");
    let mut reader = Reader::from_str(&xml);
    let mut pictures = Vec::new();
    let mut in_pic = false;
    let mut embed = String::new();
    let mut off = (0i64, 0i64);
    let mut ext = (0i64, 0i64);
    loop {
        let event = reader.read_event().expect("bad slide xml");
        let (is_start, e) = match &event {
            Event::Start(e) => (true, e),
            Event::Empty(e) => (false, e),
            Event::End(e) if e.name().as_ref() == b"p:pic" => {
                pictures.push((embed.clone(), (off.0, off.1, ext.0, ext.1)));
                in_pic = false;
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };
        match e.name().as_ref() {
            b"p:pic" if is_start => {
                in_pic = true;
                embed.clear();
            }
            b"a:blip" if in_pic => {
                if let Some(attr) = e.try_get_attribute("r:embed").expect("bad attr") {
                    embed = attr.unescape_value().expect("bad embed").to_string();
                }
            }
            b"a:off" if in_pic => {
                off = (attr_num(e, "x"), attr_num(e, "y"));
            }
            b"a:ext" if in_pic => {
                ext = (attr_num(e, "cx"), attr_num(e, "cy"));
            }
            _ => {}
        }
    }
    pictures
}

fn attr_num(e: &quick_xml::events::BytesStart, name: &str) -> i64 {
    e.try_get_attribute(name)
        .expect("bad attr")
        .expect("missing attr")
        .unescape_value()
        .expect("bad value")
        .parse()
        .expect("non-numeric value")
}
