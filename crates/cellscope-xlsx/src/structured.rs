//! Extraction through calamine's workbook model.

use std::io::{Read, Seek};

use calamine::{CellType, Data, Range, Reader, Xlsx};
use cellscope_model::{
    BackendKind, CellAddress, CellKind, CellRecord, CellValue, ExtractionResult,
    MergedRegionIndex, RangeBounds, SheetResult,
};
use chrono::NaiveDateTime;

use crate::backend::{recover_sheet_failure, ExtractionBackend, ExtractionPlan};
use crate::error::{ContainerError, ExtractError, SheetError};
use crate::formula::normalize_formula;

#[derive(Copy, Clone, Debug, Default)]
pub struct StructuredBackend;

impl ExtractionBackend for StructuredBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Structured
    }

    fn extract<R: Read + Seek>(
        &self,
        container: R,
        plan: &ExtractionPlan,
    ) -> Result<ExtractionResult, ExtractError> {
        let mut workbook: Xlsx<R> = Xlsx::new(container).map_err(ContainerError::from)?;
        let sheet_names = workbook.sheet_names().to_owned();

        let mut result = plan.empty_result(BackendKind::Structured);
        for name in sheet_names {
            if !plan.filter.sheet_passes(&name) {
                continue;
            }
            match read_sheet(&mut workbook, &name, plan) {
                Ok(sheet) => result.sheets.push(sheet),
                Err(err) => recover_sheet_failure(&mut result, err)?,
            }
        }
        Ok(result)
    }
}

fn read_sheet<R: Read + Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
    plan: &ExtractionPlan,
) -> Result<SheetResult, ExtractError> {
    let sheet_err = |err: calamine::XlsxError| ExtractError::sheet(name, SheetError::from(err));

    let values = workbook.worksheet_range(name).map_err(sheet_err)?;
    let formulas = workbook.worksheet_formula(name).map_err(sheet_err)?;
    let merges = match workbook.worksheet_merge_cells(name) {
        Some(Ok(dims)) => dims,
        Some(Err(err)) => return Err(sheet_err(err)),
        None => Vec::new(),
    };

    let extent = union(extent_of(&values), extent_of(&formulas));
    let Some(extent) = extent else {
        log::debug!("sheet `{name}` is empty");
        return Ok(SheetResult {
            name: name.to_string(),
            cells: Vec::new(),
            dimensions: SheetResult::format_dimensions(0, 0),
            filtered: plan.filter.is_range_filtered(),
            truncated: false,
            total_rows: None,
        });
    };

    // calamine dimensions are 0-based and inclusive.
    let merged = MergedRegionIndex::build(
        merges.iter().map(|d| {
            RangeBounds::new(
                CellAddress::new(d.start.0 + 1, d.start.1 + 1),
                CellAddress::new(d.end.0 + 1, d.end.1 + 1),
            )
        }),
        Some(&extent),
    );

    let walk: Vec<RangeBounds> = if plan.filter.is_range_filtered() {
        plan.filter
            .bounds()
            .iter()
            .filter_map(|bounds| bounds.clamp_to(&extent))
            .collect()
    } else {
        vec![extent]
    };

    let mut budget = plan.governor.sheet(name);
    let mut cells = Vec::new();
    'walk: for bounds in &walk {
        for cell in bounds.cells() {
            let Some(record) = cell_record(&values, &formulas, cell) else {
                continue;
            };
            if !budget.admit() {
                break 'walk;
            }
            cells.push(record.with_merged_range(merged.region_text(cell)));
        }
    }
    log::debug!("sheet `{name}`: {} cells over {} walk(s)", cells.len(), walk.len());

    let outcome = budget.finish(plan.filter.is_range_filtered(), extent.max_row);
    Ok(SheetResult {
        name: name.to_string(),
        cells,
        dimensions: SheetResult::format_dimensions(extent.max_row, extent.max_col),
        filtered: plan.filter.is_range_filtered(),
        truncated: outcome.truncated,
        total_rows: outcome.total_rows,
    })
}

/// `None` when the cell has neither a value nor a formula.
fn cell_record(values: &Range<Data>, formulas: &Range<String>, cell: CellAddress) -> Option<CellRecord> {
    let pos = (cell.row - 1, cell.col - 1);
    let (value, kind) = values
        .get_value(pos)
        .map(convert_value)
        .unwrap_or((CellValue::Empty, CellKind::Numeric));
    let formula = formulas
        .get_value(pos)
        .map(|f| normalize_formula(f))
        .filter(|f| !f.is_empty());

    match formula {
        Some(formula) => Some(CellRecord::new(cell, value, Some(formula), CellKind::Formula)),
        None if value.is_empty() => None,
        None => Some(CellRecord::new(cell, value, None, kind)),
    }
}

fn convert_value(value: &Data) -> (CellValue, CellKind) {
    match value {
        Data::Empty => (CellValue::Empty, CellKind::Numeric),
        Data::Int(v) => (CellValue::Number(*v as f64), CellKind::Numeric),
        Data::Float(v) => (CellValue::Number(*v), CellKind::Numeric),
        Data::String(v) => (CellValue::String(v.clone()), CellKind::String),
        Data::Bool(v) => (CellValue::Boolean(*v), CellKind::Boolean),
        Data::Error(e) => (CellValue::String(e.to_string()), CellKind::Error),
        Data::DateTime(v) if v.is_duration() => (CellValue::Number(v.as_f64()), CellKind::Numeric),
        Data::DateTime(v) => match v.as_datetime() {
            Some(dt) => (CellValue::DateTime(dt), CellKind::Date),
            None => (CellValue::Number(v.as_f64()), CellKind::Numeric),
        },
        Data::DateTimeIso(v) => match NaiveDateTime::parse_from_str(v, "%Y-%m-%dT%H:%M:%S%.f") {
            Ok(dt) => (CellValue::DateTime(dt), CellKind::Date),
            Err(_) => (CellValue::String(v.clone()), CellKind::Date),
        },
        Data::DurationIso(v) => (CellValue::String(v.clone()), CellKind::String),
    }
}

/// 1-based bounds of a calamine range, or `None` when it holds no cells.
fn extent_of<T: CellType>(range: &Range<T>) -> Option<RangeBounds> {
    let (start_row, start_col) = range.start()?;
    let (end_row, end_col) = range.end()?;
    Some(RangeBounds::new(
        CellAddress::new(start_row + 1, start_col + 1),
        CellAddress::new(end_row + 1, end_col + 1),
    ))
}

fn union(a: Option<RangeBounds>, b: Option<RangeBounds>) -> Option<RangeBounds> {
    match (a, b) {
        (Some(a), Some(b)) => Some(RangeBounds {
            min_col: a.min_col.min(b.min_col),
            min_row: a.min_row.min(b.min_row),
            max_col: a.max_col.max(b.max_col),
            max_row: a.max_row.max(b.max_row),
        }),
        (a, b) => a.or(b),
    }
}
