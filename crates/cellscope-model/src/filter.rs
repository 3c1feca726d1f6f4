use std::collections::HashSet;

use crate::address::{parse_range_list, AddressError, RangeBounds};

/// Sheet and cell selection for one extraction call.
///
/// `bounds` keeps the caller's order; an empty list means no range restriction. A sheet
/// set of `None` (or an empty set) admits every sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RangeFilter {
    sheets: Option<HashSet<String>>,
    bounds: Vec<RangeBounds>,
}

impl RangeFilter {
    pub fn new<I, S>(sheets: Option<I>, bounds: Vec<RangeBounds>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sheets = sheets
            .map(|names| names.into_iter().map(Into::into).collect::<HashSet<String>>())
            .filter(|set| !set.is_empty());
        Self { sheets, bounds }
    }

    /// A filter that admits every sheet and every cell.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Build a filter from a sheet allow-list and a comma-separated range string.
    pub fn parse(sheets: Option<&[String]>, ranges: Option<&str>) -> Result<Self, AddressError> {
        let bounds = match ranges {
            Some(text) => parse_range_list(text)?,
            None => Vec::new(),
        };
        Ok(Self::new(sheets.map(|s| s.iter().cloned()), bounds))
    }

    /// Exact, case-sensitive sheet-name membership.
    pub fn sheet_passes(&self, name: &str) -> bool {
        self.sheets.as_ref().map_or(true, |set| set.contains(name))
    }

    /// True when no bounds are set or any bound contains `(row, col)`.
    pub fn cell_passes(&self, row: u32, col: u32) -> bool {
        self.bounds.is_empty() || self.bounds.iter().any(|b| b.contains(row, col))
    }

    pub fn is_range_filtered(&self) -> bool {
        !self.bounds.is_empty()
    }

    pub fn is_sheet_filtered(&self) -> bool {
        self.sheets.is_some()
    }

    pub fn bounds(&self) -> &[RangeBounds] {
        &self.bounds
    }
}
