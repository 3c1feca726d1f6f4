use crate::error::ExtractError;

/// Caps the number of cells emitted per sheet.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChunkGovernor {
    chunk_size: usize,
}

impl ChunkGovernor {
    pub fn new(chunk_size: usize) -> Result<Self, ExtractError> {
        if chunk_size < 1 {
            return Err(ExtractError::InvalidConfiguration(
                "chunk size must be at least 1".to_string(),
            ));
        }
        Ok(Self { chunk_size })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Start counting for one sheet.
    pub fn sheet<'a>(&self, sheet: &'a str) -> SheetBudget<'a> {
        SheetBudget {
            sheet,
            limit: self.chunk_size,
            emitted: 0,
            truncated: false,
        }
    }
}

/// Per-sheet counter handed out by [`ChunkGovernor::sheet`].
#[derive(Debug)]
pub struct SheetBudget<'a> {
    sheet: &'a str,
    limit: usize,
    emitted: usize,
    truncated: bool,
}

/// Truncation fields for a finished sheet.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BudgetOutcome {
    pub truncated: bool,
    pub total_rows: Option<u32>,
}

impl SheetBudget<'_> {
    /// Ask to emit one more cell.
    ///
    /// Returns `false` once the limit is reached; the sheet is then marked truncated and the
    /// caller must stop walking.
    pub fn admit(&mut self) -> bool {
        if self.emitted < self.limit {
            self.emitted += 1;
            true
        } else {
            self.truncated = true;
            false
        }
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Close the sheet. `max_row` is only reported for truncated, unfiltered walks.
    pub fn finish(self, range_filtered: bool, max_row: u32) -> BudgetOutcome {
        if !self.truncated {
            return BudgetOutcome::default();
        }
        log::debug!(
            "sheet `{}` truncated after {} cells (max row {max_row})",
            self.sheet,
            self.emitted
        );
        BudgetOutcome {
            truncated: true,
            total_rows: (!range_filtered).then_some(max_row),
        }
    }
}
