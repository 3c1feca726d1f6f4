//! Formula inventory over an [`ExtractionResult`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::address::{parse_cell_reference, CellAddress};
use crate::result::ExtractionResult;
use crate::value::CellValue;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormulaEntry {
    pub address: String,
    pub formula: String,
    /// Cached result captured alongside the formula.
    pub value: CellValue,
    pub row: u32,
    pub col: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SheetFormulas {
    pub sheet: String,
    pub formulas: Vec<FormulaEntry>,
}

/// Formula cells grouped by sheet, plus function and reference statistics.
///
/// Only sheets with at least one formula appear in `sheets`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FormulaAudit {
    pub sheets: Vec<SheetFormulas>,
    pub total_formulas: usize,
    pub functions_used: BTreeMap<String, usize>,
    pub distinct_references: usize,
}

impl FormulaAudit {
    pub fn from_result(result: &ExtractionResult) -> Self {
        let mut audit = FormulaAudit::default();
        let mut references = BTreeSet::new();

        for sheet in &result.sheets {
            let mut formulas = Vec::new();
            for cell in &sheet.cells {
                let Some(formula) = cell.formula.as_deref().filter(|f| !f.is_empty()) else {
                    continue;
                };
                for name in function_names(formula) {
                    *audit.functions_used.entry(name).or_insert(0) += 1;
                }
                references.extend(cell_references(formula));
                formulas.push(FormulaEntry {
                    address: cell.address.clone(),
                    formula: formula.to_string(),
                    value: cell.value.clone(),
                    row: cell.row(),
                    col: cell.col(),
                });
            }
            if !formulas.is_empty() {
                audit.total_formulas += formulas.len();
                audit.sheets.push(SheetFormulas {
                    sheet: sheet.name.clone(),
                    formulas,
                });
            }
        }

        audit.distinct_references = references.len();
        audit
    }

    /// Function usage, most frequent first (ties broken by name).
    pub fn functions_by_frequency(&self) -> Vec<(&str, usize)> {
        let mut out: Vec<(&str, usize)> = self
            .functions_used
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        out
    }
}

/// Upper-case identifiers immediately followed by `(`.
fn function_names(formula: &str) -> Vec<String> {
    static FUNCTION_RE: OnceLock<Regex> = OnceLock::new();
    let re = FUNCTION_RE
        .get_or_init(|| Regex::new(r"\b([A-Z][A-Z0-9.]*)\(").expect("valid regex"));
    re.captures_iter(formula)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Best-effort extraction of single-cell A1 references; range endpoints count individually.
fn cell_references(formula: &str) -> Vec<CellAddress> {
    static CELL_REF_RE: OnceLock<Regex> = OnceLock::new();
    let re = CELL_REF_RE.get_or_init(|| {
        Regex::new(r"(?:^|[^A-Za-z0-9_$])(\$?[A-Z]{1,3}\$?\d+)").expect("valid regex")
    });

    let mut refs = Vec::new();
    for cap in re.captures_iter(formula) {
        if let Some(m) = cap.get(1) {
            // LOG10( and friends look like references.
            if formula[m.end()..].starts_with('(') {
                continue;
            }
            if let Ok(addr) = parse_cell_reference(m.as_str()) {
                refs.push(addr);
            }
        }
    }
    refs
}
