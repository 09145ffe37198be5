//! The .pptx container: an OPC zip of XML parts plus media. Generation
//! pulls every part into memory, rewrites the slide parts, patches the
//! affected rels and `[Content_Types].xml`, and writes a fresh archive.
//! Nothing touches the filesystem besides reading the template, so
//! concurrent requests cannot interfere with each other.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{Cursor, Read, Write};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::errors::{AppError, PptxError};
use crate::pptx::plan::{PictureKind, SubstitutionPlan};
use crate::pptx::slide;

const IMAGE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const EMPTY_RELS: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
     <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
     </Relationships>";

/// Apply the plan to the template at `template` and return the generated
/// deck's bytes. A missing template is a NotFound, matching the CSV stores.
pub fn generate(template: &Path, plan: &SubstitutionPlan) -> Result<Vec<u8>, AppError> {
    let raw = std::fs::read(template).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound(format!("Template file not found: {}", template.display()))
        } else {
            AppError::Io(e)
        }
    })?;
    Ok(generate_from_bytes(&raw, plan)?)
}

pub fn generate_from_bytes(raw: &[u8], plan: &SubstitutionPlan) -> Result<Vec<u8>, PptxError> {
    let mut archive = ZipArchive::new(Cursor::new(raw))?;

    // Pull every part out up front; decks are small and this keeps the
    // rewrite a pure pass over (name, bytes).
    let mut parts: Vec<(String, Vec<u8>)> = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes)?;
        parts.push((file.name().to_string(), bytes));
    }

    let index: HashMap<String, usize> = parts
        .iter()
        .enumerate()
        .map(|(i, (name, _))| (name.clone(), i))
        .collect();
    let slide_names: Vec<String> = parts
        .iter()
        .map(|(name, _)| name.clone())
        .filter(|name| is_slide_part(name))
        .collect();

    let mut media_seq = next_media_index(&parts);
    let mut media_paths: HashMap<PictureKind, String> = HashMap::new();
    let mut new_parts: Vec<(String, Vec<u8>)> = Vec::new();
    // extension -> content type, for [Content_Types].xml defaults
    let mut needed_defaults: BTreeMap<String, String> = BTreeMap::new();

    for slide_name in slide_names {
        let slide_idx = index[&slide_name];
        let xml = String::from_utf8(std::mem::take(&mut parts[slide_idx].1))
            .map_err(|_| PptxError::Malformed(format!("{slide_name} is not UTF-8")))?;

        let rels_name = rels_part_name(&slide_name);
        let rels_idx = index.get(&rels_name).copied();
        let rels_xml = match rels_idx {
            Some(i) => String::from_utf8(parts[i].1.clone())
                .map_err(|_| PptxError::Malformed(format!("{rels_name} is not UTF-8")))?,
            None => EMPTY_RELS.to_string(),
        };
        let first_rid = max_rid(&rels_xml)? + 1;

        let rewrite = slide::rewrite_slide(&xml, plan, first_rid)?;
        parts[slide_idx].1 = if rewrite.changed {
            rewrite.xml
        } else {
            xml.into_bytes()
        };

        if rewrite.pictures.is_empty() {
            continue;
        }

        let mut additions: Vec<(String, String)> = Vec::new();
        for placed in &rewrite.pictures {
            let media_path = match media_paths.get(&placed.kind) {
                Some(path) => path.clone(),
                None => {
                    let asset = plan.asset(placed.kind);
                    let path = format!("ppt/media/image{media_seq}.{}", asset.extension);
                    media_seq += 1;
                    new_parts.push((path.clone(), asset.bytes.clone()));
                    needed_defaults
                        .insert(asset.extension.to_string(), asset.content_type.to_string());
                    media_paths.insert(placed.kind, path.clone());
                    path
                }
            };
            let file_name = media_path.rsplit('/').next().unwrap_or(&media_path);
            additions.push((placed.rid.clone(), format!("../media/{file_name}")));
        }

        let patched_rels = append_image_rels(&rels_xml, &additions)?;
        match rels_idx {
            Some(i) => parts[i].1 = patched_rels,
            None => new_parts.push((rels_name, patched_rels)),
        }
    }

    if !needed_defaults.is_empty() {
        let ct_idx = *index
            .get(CONTENT_TYPES_PART)
            .ok_or_else(|| PptxError::Malformed("missing [Content_Types].xml".to_string()))?;
        let ct_xml = String::from_utf8(std::mem::take(&mut parts[ct_idx].1))
            .map_err(|_| PptxError::Malformed("[Content_Types].xml is not UTF-8".to_string()))?;
        parts[ct_idx].1 = ensure_defaults(&ct_xml, &needed_defaults)?;
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, bytes) in parts.into_iter().chain(new_parts) {
        writer.start_file(name, options)?;
        writer.write_all(&bytes)?;
    }
    Ok(writer.finish()?.into_inner())
}

fn is_slide_part(name: &str) -> bool {
    name.starts_with("ppt/slides/slide") && name.ends_with(".xml")
}

/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`
fn rels_part_name(part_name: &str) -> String {
    match part_name.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part_name}.rels"),
    }
}

/// Next free `ppt/media/imageN` number in the package.
fn next_media_index(parts: &[(String, Vec<u8>)]) -> u32 {
    let mut max = 0;
    for (name, _) in parts {
        let Some(rest) = name.strip_prefix("ppt/media/image") else {
            continue;
        };
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        if let Ok(n) = digits.parse::<u32>() {
            max = max.max(n);
        }
    }
    max + 1
}

/// Highest numeric `rId` in a rels part, 0 when there is none.
fn max_rid(rels_xml: &str) -> Result<u32, PptxError> {
    let mut reader = Reader::from_str(rels_xml);
    let mut max = 0;
    loop {
        match reader.read_event()? {
            Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"Relationship" => {
                let attr = e
                    .try_get_attribute("Id")
                    .map_err(|err| PptxError::Malformed(err.to_string()))?;
                if let Some(attr) = attr {
                    let value = attr
                        .unescape_value()
                        .map_err(|err| PptxError::Malformed(err.to_string()))?;
                    if let Some(n) = value
                        .strip_prefix("rId")
                        .and_then(|s| s.parse::<u32>().ok())
                    {
                        max = max.max(n);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(max)
}

/// Append image relationships (`(rid, target)` pairs) to a rels part.
fn append_image_rels(rels_xml: &str, additions: &[(String, String)]) -> Result<Vec<u8>, PptxError> {
    let mut reader = Reader::from_str(rels_xml);
    let mut writer = Writer::new(Vec::new());
    loop {
        match reader.read_event()? {
            Event::End(e) if e.name().as_ref() == b"Relationships" => {
                for (rid, target) in additions {
                    let mut el = BytesStart::new("Relationship");
                    el.push_attribute(("Id", rid.as_str()));
                    el.push_attribute(("Type", IMAGE_REL_TYPE));
                    el.push_attribute(("Target", target.as_str()));
                    writer.write_event(Event::Empty(el))?;
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            ev => writer.write_event(ev)?,
        }
    }
    Ok(writer.into_inner())
}

/// Make sure `[Content_Types].xml` declares a Default for every media
/// extension the generation introduced.
fn ensure_defaults(
    ct_xml: &str,
    needed: &BTreeMap<String, String>,
) -> Result<Vec<u8>, PptxError> {
    let mut present: HashSet<String> = HashSet::new();
    let mut reader = Reader::from_str(ct_xml);
    loop {
        match reader.read_event()? {
            Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"Default" => {
                let attr = e
                    .try_get_attribute("Extension")
                    .map_err(|err| PptxError::Malformed(err.to_string()))?;
                if let Some(attr) = attr {
                    let value = attr
                        .unescape_value()
                        .map_err(|err| PptxError::Malformed(err.to_string()))?;
                    present.insert(value.to_lowercase());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut reader = Reader::from_str(ct_xml);
    let mut writer = Writer::new(Vec::new());
    loop {
        match reader.read_event()? {
            Event::End(e) if e.name().as_ref() == b"Types" => {
                for (ext, content_type) in needed {
                    if present.contains(&ext.to_lowercase()) {
                        continue;
                    }
                    let mut el = BytesStart::new("Default");
                    el.push_attribute(("Extension", ext.as_str()));
                    el.push_attribute(("ContentType", content_type.as_str()));
                    writer.write_event(Event::Empty(el))?;
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            ev => writer.write_event(ev)?,
        }
    }
    Ok(writer.into_inner())
}
