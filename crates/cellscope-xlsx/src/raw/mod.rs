//! Extraction straight from the workbook's zip-packaged XML parts.
//!
//! This path needs no spreadsheet object model. It trades fidelity for that: shared strings
//! stay as table indices, number formats are not applied, and merged regions are not read.
//! Every result it produces lists those gaps in [`ExtractionResult::fidelity`].

mod manifest;
mod sheet;

use std::collections::HashMap;
use std::io::{Read, Seek};

use cellscope_model::{BackendKind, ExtractionResult, FidelityNote, UnsupportedFeature};
use zip::ZipArchive;

use crate::backend::{recover_sheet_failure, ExtractionBackend, ExtractionPlan};
use crate::error::{ContainerError, ExtractError, SheetError};
use crate::zip_util::read_zip_part_optional_with_limit;

use manifest::{
    parse_workbook_relationships, parse_workbook_sheets, ManifestSheet, WORKBOOK_PART,
    WORKBOOK_RELS_PART,
};

#[derive(Copy, Clone, Debug, Default)]
pub struct RawContainerBackend;

impl ExtractionBackend for RawContainerBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::RawContainer
    }

    fn extract<R: Read + Seek>(
        &self,
        container: R,
        plan: &ExtractionPlan,
    ) -> Result<ExtractionResult, ExtractError> {
        let mut archive = ZipArchive::new(container).map_err(ContainerError::from)?;

        let workbook_xml =
            read_zip_part_optional_with_limit(&mut archive, WORKBOOK_PART, plan.max_part_bytes)
                .map_err(ContainerError::from)?
                .ok_or_else(|| ContainerError::MissingPart(WORKBOOK_PART.to_string()))?;
        let sheets = parse_workbook_sheets(&workbook_xml).map_err(|err| ContainerError::Xml {
            part: WORKBOOK_PART.to_string(),
            message: err.to_string(),
        })?;
        let targets = load_relationship_targets(&mut archive, plan.max_part_bytes)?;

        let mut result = plan.empty_result(BackendKind::RawContainer);
        result.fidelity = fidelity_notes(plan.filter.is_range_filtered());

        for entry in &sheets {
            if !plan.filter.sheet_passes(&entry.name) {
                log::debug!("sheet `{}` not requested; part left unopened", entry.name);
                continue;
            }
            let part = worksheet_part(entry, &targets);
            match read_sheet(&mut archive, entry, &part, plan) {
                Ok(sheet) => result.sheets.push(sheet),
                Err(err) => recover_sheet_failure(&mut result, err)?,
            }
        }

        Ok(result)
    }
}

/// The relationships part is optional; an unreadable one falls back to conventional names.
fn load_relationship_targets<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    max_part_bytes: u64,
) -> Result<HashMap<String, String>, ExtractError> {
    let rels_xml = read_zip_part_optional_with_limit(archive, WORKBOOK_RELS_PART, max_part_bytes)
        .map_err(ContainerError::from)?;
    let Some(rels_xml) = rels_xml else {
        return Ok(HashMap::new());
    };
    match parse_workbook_relationships(&rels_xml) {
        Ok(targets) => Ok(targets),
        Err(err) => {
            log::warn!("ignoring malformed {WORKBOOK_RELS_PART}: {err}");
            Ok(HashMap::new())
        }
    }
}

fn worksheet_part(entry: &ManifestSheet, targets: &HashMap<String, String>) -> String {
    entry
        .rel_id
        .as_ref()
        .and_then(|id| targets.get(id))
        .cloned()
        .unwrap_or_else(|| entry.fallback_part())
}

fn read_sheet<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    entry: &ManifestSheet,
    part: &str,
    plan: &ExtractionPlan,
) -> Result<cellscope_model::SheetResult, ExtractError> {
    log::debug!("scanning sheet `{}` from {part}", entry.name);
    let xml = read_zip_part_optional_with_limit(archive, part, plan.max_part_bytes)
        .map_err(|err| ExtractError::sheet(&entry.name, SheetError::from(err)))?
        .ok_or_else(|| {
            ExtractError::sheet(&entry.name, SheetError::MissingPart(part.to_string()))
        })?;
    sheet::scan_worksheet(&entry.name, &xml, &plan.filter, &plan.governor)
        .map_err(|err| ExtractError::sheet(&entry.name, err))
}

fn fidelity_notes(range_filtered: bool) -> Vec<FidelityNote> {
    let mut notes = vec![
        FidelityNote::new(
            UnsupportedFeature::MergedRegions,
            "merged regions are not read; no cell carries merged_range",
        ),
        FidelityNote::new(
            UnsupportedFeature::SharedStrings,
            "shared-string cells report their string table index as text",
        ),
        FidelityNote::new(
            UnsupportedFeature::NumberFormats,
            "number formats are not applied; dates stored as serial numbers stay numeric",
        ),
    ];
    if range_filtered {
        notes.push(FidelityNote::new(
            UnsupportedFeature::RangeOrderedWalk,
            "cells are emitted in document order, once each, rather than per range token",
        ));
    }
    notes
}
