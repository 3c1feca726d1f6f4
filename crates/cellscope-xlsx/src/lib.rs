//! Filtered cell extraction from `.xlsx` workbooks.
//!
//! Two backends produce the same [`ExtractionResult`] shape:
//! - [`StructuredBackend`] (feature `structured`, on by default) reads through calamine;
//! - [`RawContainerBackend`] walks the zip-packaged XML directly and documents what it cannot
//!   reproduce in [`ExtractionResult::fidelity`].
//!
//! ```no_run
//! use cellscope_xlsx::{extract_path, ExtractOptions};
//!
//! let options = ExtractOptions::default()
//!     .with_sheets(["Sales"])
//!     .with_ranges("A1:C10,E5");
//! let result = extract_path("book.xlsx", &options)?;
//! println!("{} cells", result.total_cells());
//! # Ok::<(), cellscope_xlsx::ExtractError>(())
//! ```

mod backend;
mod chunk;
mod error;
mod formula;
mod options;
mod raw;
#[cfg(feature = "structured")]
mod structured;
mod zip_util;

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

pub use backend::{Backend, ExtractionBackend, ExtractionPlan};
pub use cellscope_model::{
    BackendKind, CellKind, CellRecord, CellValue, ExtractionResult, FidelityNote, FiltersEcho,
    FormulaAudit, RangeFilter, SheetResult, SheetWarning, UnsupportedFeature,
};
pub use chunk::{BudgetOutcome, ChunkGovernor, SheetBudget};
pub use error::{ContainerError, ExtractError, SheetError};
pub use options::{BackendPreference, ExtractOptions, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_PART_BYTES};
pub use raw::RawContainerBackend;
#[cfg(feature = "structured")]
pub use structured::StructuredBackend;

/// Extract cells from any seekable workbook container.
pub fn extract_from_reader<R: Read + Seek>(
    reader: R,
    source_name: &str,
    options: &ExtractOptions,
) -> Result<ExtractionResult, ExtractError> {
    let plan = ExtractionPlan::from_options(source_name, options)?;
    let backend = Backend::select(options.backend)?;
    backend.extract(reader, &plan)
}

pub fn extract_from_bytes(
    bytes: &[u8],
    source_name: &str,
    options: &ExtractOptions,
) -> Result<ExtractionResult, ExtractError> {
    extract_from_reader(Cursor::new(bytes), source_name, options)
}

/// Extract cells from a workbook on disk. The file name becomes [`ExtractionResult::filename`].
pub fn extract_path(
    path: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<ExtractionResult, ExtractError> {
    let path = path.as_ref();
    let plan = ExtractionPlan::from_options(source_name_for(path), options)?;
    let backend = Backend::select(options.backend)?;

    let file = File::open(path)?;
    backend.extract(BufReader::new(file), &plan)
}

fn source_name_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
