//! Streaming scan of a single worksheet part.

use cellscope_model::{
    parse_cell_reference, parse_range_token, AddressError, CellAddress, CellKind, CellRecord,
    CellValue, RangeBounds, RangeFilter, SheetResult, EXCEL_MAX_ROWS,
};
use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::chunk::ChunkGovernor;
use crate::error::SheetError;
use crate::formula::normalize_formula;

/// Where character data inside the current `<c>` belongs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum TextTarget {
    None,
    Value,
    Formula,
    Inline,
}

#[derive(Debug)]
struct PendingCell {
    position: CellAddress,
    address: String,
    kind: CellKind,
    value: Option<String>,
    formula: Option<String>,
    inline: Option<String>,
}

impl PendingCell {
    fn into_record(self) -> Option<CellRecord> {
        let text = if self.kind == CellKind::InlineString {
            self.inline.or(self.value)
        } else {
            self.value
        };
        let text = text.filter(|t| !t.is_empty());
        let formula = self.formula.as_deref().map(normalize_formula).filter(|f| !f.is_empty());
        if text.is_none() && formula.is_none() {
            return None;
        }

        let value = text
            .map(|t| infer_value(self.kind, t))
            .unwrap_or(CellValue::Empty);
        Some(CellRecord {
            address: self.address,
            value,
            formula,
            kind: self.kind,
            position: self.position,
            merged_range: None,
        })
    }
}

/// Running max of populated cells, used when the part has no `<dimension>`.
#[derive(Copy, Clone, Debug, Default)]
struct Extent {
    max_row: u32,
    max_col: u32,
}

impl Extent {
    fn include(&mut self, cell: CellAddress) {
        self.max_row = self.max_row.max(cell.row);
        self.max_col = self.max_col.max(cell.col);
    }
}

/// Walk `xml` row by row, emitting cells that pass `filter` until the chunk budget runs out.
pub(crate) fn scan_worksheet(
    name: &str,
    xml: &[u8],
    filter: &RangeFilter,
    governor: &ChunkGovernor,
) -> Result<SheetResult, SheetError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut cells = Vec::new();
    let mut budget = governor.sheet(name);

    let mut declared: Option<RangeBounds> = None;
    let mut extent = Extent::default();
    let mut current_row = 0u32;
    let mut next_col = 1u32;
    let mut pending: Option<PendingCell> = None;
    let mut target = TextTarget::None;
    let mut in_phonetic = false;
    let mut exhausted = false;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match event {
            Event::Eof => break,
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"dimension" => declared = dimension_ref(e)?,
                    b"row" => {
                        current_row = match row_number(e)? {
                            Some(row) => row,
                            None => current_row + 1,
                        };
                        if current_row > EXCEL_MAX_ROWS {
                            return Err(AddressError::InvalidRow(current_row.to_string()).into());
                        }
                        next_col = 1;
                        extent.max_row = extent.max_row.max(current_row);
                    }
                    b"c" if !exhausted => {
                        let cell = open_cell(e, current_row.max(1), next_col)?;
                        current_row = current_row.max(cell.position.row);
                        next_col = cell.position.col + 1;
                        if !is_empty {
                            pending = Some(cell);
                        }
                    }
                    b"v" if pending.is_some() && !is_empty => target = TextTarget::Value,
                    b"f" if pending.is_some() && !is_empty => target = TextTarget::Formula,
                    b"rPh" if !is_empty => in_phonetic = true,
                    b"t" if pending.is_some() && !is_empty && !in_phonetic => {
                        target = TextTarget::Inline
                    }
                    _ => {}
                }
            }
            Event::Text(ref t) => {
                if let Some(cell) = pending.as_mut() {
                    let text = t.unescape()?;
                    append_text(cell, target, &text);
                }
            }
            Event::CData(ref t) => {
                if let Some(cell) = pending.as_mut() {
                    let text = String::from_utf8_lossy(t).into_owned();
                    append_text(cell, target, &text);
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"v" | b"f" | b"t" => target = TextTarget::None,
                b"rPh" => in_phonetic = false,
                b"c" => {
                    target = TextTarget::None;
                    if let Some(record) = pending.take().and_then(PendingCell::into_record) {
                        extent.include(record.position);
                        if filter.cell_passes(record.position.row, record.position.col) {
                            if budget.admit() {
                                cells.push(record);
                            } else if declared.is_some() {
                                break;
                            } else {
                                // Keep reading rows so the reported extent covers the sheet.
                                exhausted = true;
                            }
                        }
                    }
                }
                _ => {}
            },
            _ => {}
        }
        buf.clear();
    }

    let (max_row, max_col) = match declared {
        // Writers declare `A1` for sheets with no cells at all.
        _ if extent.max_col == 0 => (0, 0),
        Some(bounds) => (bounds.max_row, bounds.max_col),
        None => (extent.max_row, extent.max_col),
    };
    let outcome = budget.finish(filter.is_range_filtered(), max_row);

    Ok(SheetResult {
        name: name.to_string(),
        cells,
        dimensions: SheetResult::format_dimensions(max_row, max_col),
        filtered: filter.is_range_filtered(),
        truncated: outcome.truncated,
        total_rows: outcome.total_rows,
    })
}

fn append_text(cell: &mut PendingCell, target: TextTarget, text: &str) {
    let slot = match target {
        TextTarget::None => return,
        TextTarget::Value => &mut cell.value,
        TextTarget::Formula => &mut cell.formula,
        TextTarget::Inline => &mut cell.inline,
    };
    slot.get_or_insert_with(String::new).push_str(text);
}

fn dimension_ref(e: &BytesStart<'_>) -> Result<Option<RangeBounds>, SheetError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"ref" {
            let value = attr.unescape_value()?;
            return Ok(parse_range_token(&value).ok());
        }
    }
    Ok(None)
}

fn row_number(e: &BytesStart<'_>) -> Result<Option<u32>, SheetError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"r" {
            return Ok(attr.unescape_value()?.trim().parse::<u32>().ok().filter(|r| *r > 0));
        }
    }
    Ok(None)
}

/// Read `r` and `t` from a `<c>` element. Without `r` the cell sits at `(row, col)`.
fn open_cell(e: &BytesStart<'_>, row: u32, col: u32) -> Result<PendingCell, SheetError> {
    let mut reference: Option<String> = None;
    let mut type_attr: Option<String> = None;
    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"r" => reference = Some(attr.unescape_value()?.into_owned()),
            b"t" => type_attr = Some(attr.unescape_value()?.into_owned()),
            _ => {}
        }
    }

    let (position, address) = match reference {
        Some(text) => (parse_cell_reference(&text)?, text),
        None => {
            let position = CellAddress::new(row, col);
            (position, position.to_a1())
        }
    };
    Ok(PendingCell {
        position,
        address,
        kind: CellKind::from_type_attr(type_attr.as_deref()),
        value: None,
        formula: None,
        inline: None,
    })
}

/// Best-effort typed value for a raw `<v>` or inline string.
pub(crate) fn infer_value(kind: CellKind, text: String) -> CellValue {
    match kind {
        CellKind::Numeric => match text.trim().parse::<f64>() {
            Ok(n) => CellValue::Number(n),
            Err(_) => CellValue::String(text),
        },
        CellKind::Boolean => match text.trim() {
            "1" | "true" | "TRUE" => CellValue::Boolean(true),
            "0" | "false" | "FALSE" => CellValue::Boolean(false),
            _ => CellValue::String(text),
        },
        CellKind::Date => match parse_iso_datetime(text.trim()) {
            Some(dt) => CellValue::DateTime(dt),
            None => CellValue::String(text),
        },
        _ => CellValue::String(text),
    }
}

fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S%.f")
    {
        return Some(dt);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
