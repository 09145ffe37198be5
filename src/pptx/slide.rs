//! Per-slide XML rewrite. Streams the slide part through quick-xml,
//! buffering each `p:sp` so its name (and, for picture placeholders, its
//! geometry) is known before deciding what to emit. Replacement pictures
//! are appended at the end of the shape tree, in place of the dropped
//! placeholder shapes.

use quick_xml::escape::escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::errors::PptxError;
use crate::pptx::plan::{PictureKind, SubstitutionPlan, TextAction};

/// A picture emitted on this slide. `rid` is the relationship id the
/// `p:pic` references; the caller adds it to the slide's rels part.
#[derive(Debug)]
pub struct PlacedPicture {
    pub kind: PictureKind,
    pub rid: String,
}

#[derive(Debug)]
pub struct SlideRewrite {
    pub xml: Vec<u8>,
    pub pictures: Vec<PlacedPicture>,
    pub changed: bool,
}

/// Position and size in EMUs, copied from the placeholder shape.
struct Extent {
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
}

/// Rewrite one slide part according to the plan. `first_rid` is the first
/// free numeric relationship id in the slide's rels part.
pub fn rewrite_slide(
    xml: &str,
    plan: &SubstitutionPlan,
    first_rid: u32,
) -> Result<SlideRewrite, PptxError> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut pictures = Vec::new();
    let mut pending_pics: Vec<String> = Vec::new();
    let mut changed = false;
    let mut next_rid = first_rid;
    // High base keeps the new cNvPr ids clear of the template's own.
    let mut next_shape_id: u32 = 1001;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"p:sp" => {
                let shape = collect_shape(&mut reader, Event::Start(e.into_owned()))?;
                let name = shape_name(&shape)?;
                let name = name.as_deref().unwrap_or("");

                if let Some(action) = plan.text_action(name) {
                    match action {
                        TextAction::Runs(value) => {
                            replay_replacing_runs(&shape, value, &mut writer)?
                        }
                        TextAction::Frame(value) => {
                            replay_replacing_frame(&shape, value, &mut writer)?
                        }
                    }
                    changed = true;
                } else if let Some(kind) = plan.picture(name) {
                    match shape_extent(&shape)? {
                        Some(extent) => {
                            let rid = format!("rId{next_rid}");
                            next_rid += 1;
                            pending_pics.push(picture_xml(&rid, next_shape_id, &extent));
                            next_shape_id += 1;
                            pictures.push(PlacedPicture { kind, rid });
                            changed = true;
                        }
                        // No xfrm to copy the position from: leave the
                        // placeholder untouched rather than guess.
                        None => replay(&shape, &mut writer)?,
                    }
                } else {
                    replay(&shape, &mut writer)?;
                }
            }
            Event::End(e) if e.name().as_ref() == b"p:spTree" => {
                for fragment in pending_pics.drain(..) {
                    writer.write_event(Event::Text(BytesText::from_escaped(fragment)))?;
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            ev => writer.write_event(ev)?,
        }
    }

    Ok(SlideRewrite {
        xml: writer.into_inner(),
        pictures,
        changed,
    })
}

/// Buffer every event of a `p:sp` element, start tag included.
fn collect_shape(
    reader: &mut Reader<&[u8]>,
    start: Event<'static>,
) -> Result<Vec<Event<'static>>, PptxError> {
    let mut events = vec![start];
    let mut depth = 0u32;
    loop {
        let ev = reader.read_event()?.into_owned();
        match &ev {
            Event::Start(e) if e.name().as_ref() == b"p:sp" => depth += 1,
            Event::End(e) if e.name().as_ref() == b"p:sp" => {
                if depth == 0 {
                    events.push(ev);
                    return Ok(events);
                }
                depth -= 1;
            }
            Event::Eof => return Err(PptxError::Malformed("unclosed p:sp element".to_string())),
            _ => {}
        }
        events.push(ev);
    }
}

/// The shape's `p:cNvPr/@name`, trimmed.
fn shape_name(events: &[Event<'static>]) -> Result<Option<String>, PptxError> {
    for ev in events {
        let e = match ev {
            Event::Start(e) | Event::Empty(e) => e,
            _ => continue,
        };
        if e.name().as_ref() != b"p:cNvPr" {
            continue;
        }
        let attr = e
            .try_get_attribute("name")
            .map_err(|err| PptxError::Malformed(err.to_string()))?;
        return match attr {
            Some(attr) => {
                let value = attr
                    .unescape_value()
                    .map_err(|err| PptxError::Malformed(err.to_string()))?;
                Ok(Some(value.trim().to_string()))
            }
            None => Ok(None),
        };
    }
    Ok(None)
}

/// The first `a:off`/`a:ext` pair inside the shape (its own `a:xfrm`).
fn shape_extent(events: &[Event<'static>]) -> Result<Option<Extent>, PptxError> {
    let mut off: Option<(i64, i64)> = None;
    let mut ext: Option<(i64, i64)> = None;
    for ev in events {
        let e = match ev {
            Event::Start(e) | Event::Empty(e) => e,
            _ => continue,
        };
        match e.name().as_ref() {
            b"a:off" if off.is_none() => off = Some((attr_i64(e, "x")?, attr_i64(e, "y")?)),
            b"a:ext" if ext.is_none() => ext = Some((attr_i64(e, "cx")?, attr_i64(e, "cy")?)),
            _ => {}
        }
        if off.is_some() && ext.is_some() {
            break;
        }
    }
    Ok(match (off, ext) {
        (Some((x, y)), Some((cx, cy))) => Some(Extent { x, y, cx, cy }),
        _ => None,
    })
}

fn attr_i64(e: &BytesStart, name: &str) -> Result<i64, PptxError> {
    let attr = e
        .try_get_attribute(name)
        .map_err(|err| PptxError::Malformed(err.to_string()))?
        .ok_or_else(|| {
            PptxError::Malformed(format!(
                "missing attribute {name} on {}",
                String::from_utf8_lossy(e.name().as_ref())
            ))
        })?;
    let value = attr
        .unescape_value()
        .map_err(|err| PptxError::Malformed(err.to_string()))?;
    value
        .parse()
        .map_err(|_| PptxError::Malformed(format!("bad EMU value {value:?} for {name}")))
}

/// Write the buffered shape back out unchanged.
fn replay(events: &[Event<'static>], writer: &mut Writer<Vec<u8>>) -> Result<(), PptxError> {
    for ev in events {
        writer.write_event(ev.clone())?;
    }
    Ok(())
}

/// Overwrite the text of every `a:t` in the shape, keeping run
/// properties and paragraph structure intact.
fn replay_replacing_runs(
    events: &[Event<'static>],
    value: &str,
    writer: &mut Writer<Vec<u8>>,
) -> Result<(), PptxError> {
    let mut in_text = false;
    for ev in events {
        match ev {
            Event::Start(e) if e.name().as_ref() == b"a:t" => {
                writer.write_event(Event::Start(e.clone()))?;
                writer.write_event(Event::Text(BytesText::new(value)))?;
                in_text = true;
            }
            Event::End(e) if e.name().as_ref() == b"a:t" => {
                in_text = false;
                writer.write_event(Event::End(e.clone()))?;
            }
            Event::Empty(e) if e.name().as_ref() == b"a:t" => {
                writer.write_event(Event::Start(e.clone()))?;
                writer.write_event(Event::Text(BytesText::new(value)))?;
                writer.write_event(Event::End(BytesEnd::new("a:t")))?;
            }
            _ if in_text => {}
            ev => writer.write_event(ev.clone())?,
        }
    }
    Ok(())
}

/// Clear-and-set: keep everything before the first paragraph (bodyPr,
/// list styles), then emit one `a:p` per line of `value` and drop the
/// original paragraphs.
fn replay_replacing_frame(
    events: &[Event<'static>],
    value: &str,
    writer: &mut Writer<Vec<u8>>,
) -> Result<(), PptxError> {
    let mut in_frame = false;
    let mut replaced = false;
    let mut skipping = false;
    for ev in events {
        if skipping {
            if let Event::End(e) = ev {
                if e.name().as_ref() == b"p:txBody" {
                    skipping = false;
                    in_frame = false;
                    writer.write_event(Event::End(e.clone()))?;
                }
            }
            continue;
        }
        match ev {
            Event::Start(e) if e.name().as_ref() == b"p:txBody" => {
                in_frame = true;
                writer.write_event(Event::Start(e.clone()))?;
            }
            Event::Start(e) | Event::Empty(e)
                if in_frame && !replaced && e.name().as_ref() == b"a:p" =>
            {
                writer.write_event(Event::Text(BytesText::from_escaped(paragraphs_xml(value))))?;
                replaced = true;
                skipping = true;
            }
            Event::End(e) if e.name().as_ref() == b"p:txBody" => {
                // A frame with no paragraphs at all still gets the text.
                if in_frame && !replaced {
                    writer.write_event(Event::Text(BytesText::from_escaped(paragraphs_xml(
                        value,
                    ))))?;
                    replaced = true;
                }
                in_frame = false;
                writer.write_event(Event::End(e.clone()))?;
            }
            ev => writer.write_event(ev.clone())?,
        }
    }
    Ok(())
}

fn paragraphs_xml(text: &str) -> String {
    let mut xml = String::new();
    for line in text.split('\n') {
        if line.is_empty() {
            xml.push_str("<a:p/>");
        } else {
            xml.push_str("<a:p><a:r><a:t>");
            xml.push_str(&escape(line));
            xml.push_str("</a:t></a:r></a:p>");
        }
    }
    xml
}

fn picture_xml(rid: &str, shape_id: u32, extent: &Extent) -> String {
    format!(
        "<p:pic>\
         <p:nvPicPr><p:cNvPr id=\"{id}\" name=\"Picture {id}\"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr>\
         <p:blipFill><a:blip r:embed=\"{rid}\"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>\
         <p:spPr>\
         <a:xfrm><a:off x=\"{x}\" y=\"{y}\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>\
         <a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom>\
         </p:spPr>\
         </p:pic>",
        id = shape_id,
        rid = rid,
        x = extent.x,
        y = extent.y,
        cx = extent.cx,
        cy = extent.cy,
    )
}
