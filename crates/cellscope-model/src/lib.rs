//! `cellscope-model` holds the backend-independent pieces of cell extraction:
//! A1 address algebra, the sheet/range filter, the merged-region index, and the
//! `serde` result schema shared by every extraction backend.

mod address;
pub mod audit;
mod filter;
mod merge;
mod result;
mod value;

pub use address::{
    format_column_index, parse_cell_reference, parse_column_letters, parse_range_list,
    parse_range_token, AddressError, CellAddress, RangeBounds, EXCEL_MAX_COLS, EXCEL_MAX_ROWS,
};
pub use audit::FormulaAudit;
pub use filter::RangeFilter;
pub use merge::MergedRegionIndex;
pub use result::{
    BackendKind, CellRecord, ExtractionResult, FidelityNote, FiltersEcho, SheetResult,
    SheetWarning, UnsupportedFeature,
};
pub use value::{CellKind, CellValue};
