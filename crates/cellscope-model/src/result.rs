use serde::{Deserialize, Serialize};

use crate::address::CellAddress;
use crate::value::{CellKind, CellValue};

fn is_false(v: &bool) -> bool {
    !*v
}

/// One emitted cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    /// Address text as found in the source (e.g. `B7`).
    pub address: String,
    pub value: CellValue,
    /// Formula text with a leading `=`, or `null`.
    pub formula: Option<String>,
    #[serde(rename = "type")]
    pub kind: CellKind,
    #[serde(flatten)]
    pub position: CellAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_range: Option<String>,
}

impl CellRecord {
    pub fn new(position: CellAddress, value: CellValue, formula: Option<String>, kind: CellKind) -> Self {
        Self {
            address: position.to_a1(),
            value,
            formula,
            kind,
            position,
            merged_range: None,
        }
    }

    pub fn with_merged_range(mut self, region: Option<impl Into<String>>) -> Self {
        self.merged_range = region.map(Into::into);
        self
    }

    pub fn row(&self) -> u32 {
        self.position.row
    }

    pub fn col(&self) -> u32 {
        self.position.col
    }
}

/// Extraction output for a single sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SheetResult {
    pub name: String,
    pub cells: Vec<CellRecord>,
    /// `{max_row}x{max_col}`.
    pub dimensions: String,
    /// True when a range filter was active for this call.
    pub filtered: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub truncated: bool,
    /// The sheet's maximum row, recorded only when truncated without a range filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<u32>,
}

impl SheetResult {
    pub fn format_dimensions(max_row: u32, max_col: u32) -> String {
        format!("{max_row}x{max_col}")
    }
}

/// The caller's filters, echoed back verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiltersEcho {
    pub sheets: Option<Vec<String>>,
    pub ranges: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Full workbook object model.
    Structured,
    /// Direct zip + XML traversal.
    RawContainer,
}

/// A capability a backend does not reproduce.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedFeature {
    MergedRegions,
    SharedStrings,
    NumberFormats,
    RangeOrderedWalk,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FidelityNote {
    pub feature: UnsupportedFeature,
    pub detail: String,
}

impl FidelityNote {
    pub fn new(feature: UnsupportedFeature, detail: impl Into<String>) -> Self {
        Self {
            feature,
            detail: detail.into(),
        }
    }
}

/// A sheet that could not be read; it is absent from [`ExtractionResult::sheets`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetWarning {
    pub sheet: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub filename: String,
    pub sheets: Vec<SheetResult>,
    pub filters: FiltersEcho,
    pub backend: BackendKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fidelity: Vec<FidelityNote>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<SheetWarning>,
}

impl ExtractionResult {
    pub fn new(filename: impl Into<String>, filters: FiltersEcho, backend: BackendKind) -> Self {
        Self {
            filename: filename.into(),
            sheets: Vec::new(),
            filters,
            backend,
            fidelity: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Number of cells emitted across all sheets.
    pub fn total_cells(&self) -> usize {
        self.sheets.iter().map(|s| s.cells.len()).sum()
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetResult> {
        self.sheets.iter().find(|s| s.name == name)
    }
}
