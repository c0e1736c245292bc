//! Package relationships and content types for custom XML parts
//!
//! A host only sees a custom XML part when the workbook has a `customXml`
//! relationship to it and the part has an item-properties part of its own:
//!
//! ```text
//! xl/_rels/workbook.xml.rels      -> ../customXml/item1.xml
//! customXml/_rels/item1.xml.rels  -> itemProps1.xml
//! [Content_Types].xml             Override /customXml/itemProps1.xml
//! ```

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::error::{StoreError, StoreResult};

pub const WORKBOOK_PART: &str = "xl/workbook.xml";
pub const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
pub const CONTENT_TYPES: &str = "[Content_Types].xml";

const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const DATASTORE_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/customXml";

pub const CUSTOM_XML_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/customXml";
pub const CUSTOM_XML_PROPS_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/customXmlProps";
pub const CUSTOM_XML_PROPS_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.customXmlProperties+xml";

/// Entry name of the `n`th custom XML item
pub fn item_part(n: u32) -> String {
    format!("customXml/item{n}.xml")
}

/// Entry name of the `n`th item-properties part
pub fn item_props_part(n: u32) -> String {
    format!("customXml/itemProps{n}.xml")
}

/// Entry name of the `n`th item's relationships
pub fn item_rels_part(n: u32) -> String {
    format!("customXml/_rels/item{n}.xml.rels")
}

/// A relationships part with no relationships
pub fn empty_relationships() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{RELATIONSHIPS_NS}"/>"#
    )
}

/// Item relationships pointing item `n` at its properties part
pub fn item_relationships(n: u32) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{RELATIONSHIPS_NS}"><Relationship Id="rId1" Type="{CUSTOM_XML_PROPS_REL}" Target="itemProps{n}.xml"/></Relationships>"#
    )
}

/// Item-properties part identifying a datastore item
pub fn item_props(item_id: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<ds:datastoreItem ds:itemID="{{{item_id}}}" xmlns:ds="{DATASTORE_NS}"><ds:schemaRefs/></ds:datastoreItem>"#
    )
}

/// Resolve a relationship target against the directory of its source part
pub fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Whether `rels` (relative to `base_dir`) has a relationship targeting `part`
pub fn has_relationship_to(rels: &str, base_dir: &str, part: &str) -> StoreResult<bool> {
    Ok(attribute_values(rels, b"Relationship", b"Target")?
        .iter()
        .any(|target| resolve_target(base_dir, target) == part))
}

/// Add a relationship with the first unused `rIdN` id
pub fn add_relationship(rels: &str, rel_type: &str, target: &str) -> StoreResult<String> {
    let ids = attribute_values(rels, b"Relationship", b"Id")?;
    let id = (1..)
        .map(|n| format!("rId{n}"))
        .find(|id| !ids.contains(id))
        .unwrap_or_default();

    let child = BytesStart::new("Relationship").with_attributes([
        ("Id", id.as_str()),
        ("Type", rel_type),
        ("Target", target),
    ]);
    append_child(rels, b"Relationships", child)
}

/// Drop every relationship whose target resolves to `part`
pub fn remove_relationships_to(rels: &str, base_dir: &str, part: &str) -> StoreResult<String> {
    remove_children(rels, b"Relationship", |e| {
        Ok(attribute(e, b"Target")?.is_some_and(|t| resolve_target(base_dir, &t) == part))
    })
}

/// Add an `Override` content type for `part_name` unless one exists
pub fn add_override(types: &str, part_name: &str, content_type: &str) -> StoreResult<String> {
    if attribute_values(types, b"Override", b"PartName")?
        .iter()
        .any(|p| p.eq_ignore_ascii_case(part_name))
    {
        return Ok(types.to_string());
    }

    let child = BytesStart::new("Override")
        .with_attributes([("PartName", part_name), ("ContentType", content_type)]);
    append_child(types, b"Types", child)
}

/// Drop the `Override` content type for `part_name`
pub fn remove_override(types: &str, part_name: &str) -> StoreResult<String> {
    remove_children(types, b"Override", |e| {
        Ok(attribute(e, b"PartName")?.is_some_and(|p| p.eq_ignore_ascii_case(part_name)))
    })
}

fn attribute(e: &BytesStart<'_>, name: &[u8]) -> StoreResult<Option<String>> {
    let attr = e
        .try_get_attribute(name)
        .map_err(quick_xml::Error::from)?;
    match attr {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

/// Values of `attr` on every `element` in the document
fn attribute_values(xml: &str, element: &[u8], attr: &[u8]) -> StoreResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut values = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == element => {
                if let Some(value) = attribute(&e, attr)? {
                    values.push(value);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(values)
}

/// Copy `xml`, inserting `child` as the last child of the `root` element
fn append_child(xml: &str, root: &[u8], child: BytesStart<'_>) -> StoreResult<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;
    let mut inserted = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                writer.write_event(Event::Start(e))?;
            }
            Event::End(e) => {
                if depth == 1 && e.local_name().as_ref() == root {
                    writer.write_event(Event::Empty(child.borrow()))?;
                    inserted = true;
                }
                depth = depth.saturating_sub(1);
                writer.write_event(Event::End(e))?;
            }
            Event::Empty(e) if depth == 0 && e.local_name().as_ref() == root => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                writer.write_event(Event::Start(e))?;
                writer.write_event(Event::Empty(child.borrow()))?;
                writer.write_event(Event::End(BytesEnd::new(name)))?;
                inserted = true;
            }
            Event::Eof => break,
            e => writer.write_event(e)?,
        }
    }

    if !inserted {
        return Err(StoreError::InvalidPart(format!(
            "no <{}> root element",
            String::from_utf8_lossy(root)
        )));
    }
    into_string(writer)
}

/// Copy `xml`, leaving out every `element` for which `matches` holds
fn remove_children<F>(xml: &str, element: &[u8], matches: F) -> StoreResult<String>
where
    F: Fn(&BytesStart<'_>) -> StoreResult<bool>,
{
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut skipping = 0usize;

    loop {
        let event = reader.read_event()?;
        if skipping > 0 {
            match event {
                Event::Start(_) => skipping += 1,
                Event::End(_) => skipping -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        match event {
            Event::Empty(e) if e.local_name().as_ref() == element && matches(&e)? => {}
            Event::Start(e) if e.local_name().as_ref() == element && matches(&e)? => {
                skipping = 1;
            }
            Event::Eof => break,
            e => writer.write_event(e)?,
        }
    }

    into_string(writer)
}

fn into_string(writer: Writer<Vec<u8>>) -> StoreResult<String> {
    String::from_utf8(writer.into_inner()).map_err(|e| StoreError::InvalidPart(e.to_string()))
}
