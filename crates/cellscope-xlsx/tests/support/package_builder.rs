#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::ZipWriter;

/// Builds synthetic XLSX zips from hand-written worksheet XML.
///
/// Nothing is validated, so tests can hand in malformed parts on purpose.
#[derive(Debug, Clone, Default)]
pub struct PackageBuilder {
    sheets: Vec<SheetSpec>,
    write_rels: bool,
    workbook_xml: Option<String>,
    extra_parts: Vec<(String, Vec<u8>)>,
}

#[derive(Debug, Clone)]
struct SheetSpec {
    name: String,
    rel_id: Option<String>,
    part: String,
    xml: Option<String>,
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self {
            write_rels: true,
            ..Self::default()
        }
    }

    /// Add a sheet stored at the conventional `xl/worksheets/sheet{n}.xml` part.
    pub fn sheet(self, name: &str, sheet_data: &str) -> Self {
        let n = self.sheets.len() + 1;
        self.sheet_at(name, &format!("xl/worksheets/sheet{n}.xml"), sheet_data)
    }

    /// Add a sheet whose worksheet part lives at `part`, linked through the workbook rels.
    pub fn sheet_at(mut self, name: &str, part: &str, sheet_data: &str) -> Self {
        let n = self.sheets.len() + 1;
        self.sheets.push(SheetSpec {
            name: name.to_string(),
            rel_id: Some(format!("rId{n}")),
            part: part.to_string(),
            xml: Some(worksheet_xml(sheet_data)),
        });
        self
    }

    /// Add a sheet with a verbatim (possibly malformed) worksheet part.
    pub fn raw_sheet(mut self, name: &str, xml: &str) -> Self {
        let n = self.sheets.len() + 1;
        self.sheets.push(SheetSpec {
            name: name.to_string(),
            rel_id: Some(format!("rId{n}")),
            part: format!("xl/worksheets/sheet{n}.xml"),
            xml: Some(xml.to_string()),
        });
        self
    }

    /// Declare a sheet in the manifest without writing its part.
    pub fn missing_sheet(mut self, name: &str) -> Self {
        let n = self.sheets.len() + 1;
        self.sheets.push(SheetSpec {
            name: name.to_string(),
            rel_id: Some(format!("rId{n}")),
            part: format!("xl/worksheets/sheet{n}.xml"),
            xml: None,
        });
        self
    }

    pub fn without_rels(mut self) -> Self {
        self.write_rels = false;
        self
    }

    pub fn workbook_xml(mut self, xml: &str) -> Self {
        self.workbook_xml = Some(xml.to_string());
        self
    }

    pub fn extra_part(mut self, name: &str, bytes: &[u8]) -> Self {
        self.extra_parts.push((name.to_string(), bytes.to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let cursor = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(cursor);
        let options =
            FileOptions::<()>::default().compression_method(zip::CompressionMethod::Deflated);

        let workbook = self
            .workbook_xml
            .clone()
            .unwrap_or_else(|| self.default_workbook_xml());
        zip.start_file("xl/workbook.xml", options).unwrap();
        zip.write_all(workbook.as_bytes()).unwrap();

        if self.write_rels {
            zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
            zip.write_all(self.rels_xml().as_bytes()).unwrap();
        }

        for sheet in &self.sheets {
            if let Some(xml) = &sheet.xml {
                zip.start_file(sheet.part.as_str(), options).unwrap();
                zip.write_all(xml.as_bytes()).unwrap();
            }
        }

        for (name, bytes) in &self.extra_parts {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(bytes).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }

    fn default_workbook_xml(&self) -> String {
        let mut sheets = String::new();
        for (idx, sheet) in self.sheets.iter().enumerate() {
            let rel = sheet
                .rel_id
                .as_deref()
                .map(|id| format!(r#" r:id="{id}""#))
                .unwrap_or_default();
            sheets.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}"{rel}/>"#,
                sheet.name,
                idx + 1
            ));
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{sheets}</sheets></workbook>"#
        )
    }

    fn rels_xml(&self) -> String {
        let mut rels = String::new();
        for sheet in &self.sheets {
            let Some(id) = &sheet.rel_id else {
                continue;
            };
            let target = sheet.part.strip_prefix("xl/").unwrap_or(&sheet.part);
            rels.push_str(&format!(
                r#"<Relationship Id="{id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="{target}"/>"#
            ));
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
        )
    }
}

pub fn worksheet_xml(sheet_data: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">{sheet_data}</worksheet>"#
    )
}

/// `<sheetData>` with one numeric cell per row in column A, values `1..=rows`.
pub fn column_of_numbers(rows: u32) -> String {
    let mut out = String::from("<sheetData>");
    for r in 1..=rows {
        out.push_str(&format!(r#"<row r="{r}"><c r="A{r}"><v>{r}</v></c></row>"#));
    }
    out.push_str("</sheetData>");
    out
}
