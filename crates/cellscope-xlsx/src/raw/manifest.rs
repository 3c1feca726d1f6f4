//! `xl/workbook.xml` and its relationships part.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

pub(crate) const WORKBOOK_PART: &str = "xl/workbook.xml";
pub(crate) const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";

/// A `<sheet>` entry from the workbook manifest, in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ManifestSheet {
    /// 1-based position among the manifest's `<sheet>` elements.
    pub ordinal: usize,
    pub name: String,
    pub rel_id: Option<String>,
}

impl ManifestSheet {
    /// Conventional part name used when the relationship cannot be resolved.
    pub fn fallback_part(&self) -> String {
        format!("xl/worksheets/sheet{}.xml", self.ordinal)
    }
}

pub(crate) fn parse_workbook_sheets(xml: &[u8]) -> Result<Vec<ManifestSheet>, quick_xml::Error> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut sheets = Vec::new();
    let mut ordinal = 0usize;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"sheet" => {
                ordinal += 1;
                let (name, rel_id) = sheet_attributes(&e)?;
                match name {
                    Some(name) => sheets.push(ManifestSheet {
                        ordinal,
                        name,
                        rel_id,
                    }),
                    None => log::warn!("workbook sheet #{ordinal} has no name; skipping"),
                }
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

fn sheet_attributes(e: &BytesStart<'_>) -> Result<(Option<String>, Option<String>), quick_xml::Error> {
    let mut name = None;
    let mut rel_id = None;
    for attr in e.attributes() {
        let attr = attr?;
        // `r:id` may use any prefix bound to the relationships namespace.
        if attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id" {
            rel_id = Some(attr.unescape_value()?.into_owned());
        } else if attr.key.as_ref() == b"name" {
            name = Some(attr.unescape_value()?.into_owned());
        }
    }
    Ok((name, rel_id))
}

/// Relationship id -> resolved part name for `xl/workbook.xml`.
pub(crate) fn parse_workbook_relationships(
    xml: &[u8],
) -> Result<HashMap<String, String>, quick_xml::Error> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut targets = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                let mut external = false;
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.local_name().as_ref() {
                        b"Id" => id = Some(attr.unescape_value()?.into_owned()),
                        b"Target" => target = Some(attr.unescape_value()?.into_owned()),
                        b"TargetMode" => {
                            external = attr.unescape_value()?.eq_ignore_ascii_case("External")
                        }
                        _ => {}
                    }
                }
                if let (Some(id), Some(target), false) = (id, target, external) {
                    targets.insert(id, resolve_workbook_target(&target));
                }
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(targets)
}

/// Resolve a relationship target against the `xl/` directory that holds the workbook part.
pub(crate) fn resolve_workbook_target(target: &str) -> String {
    // Part names never carry a URI fragment.
    let target = target.split('#').next().unwrap_or(target);
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
