use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Excel-compatible maximum rows per worksheet (1,048,576).
pub const EXCEL_MAX_ROWS: u32 = 1_048_576;

/// Excel-compatible maximum columns per worksheet (16,384, column `XFD`).
pub const EXCEL_MAX_COLS: u32 = 16_384;

/// Errors produced while parsing cell references, column letters, or range tokens.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("empty cell reference")]
    Empty,
    #[error("invalid column letters `{0}`")]
    InvalidColumn(String),
    #[error("column index {0} is out of range")]
    ColumnOutOfRange(u32),
    #[error("missing column in reference `{0}`")]
    MissingColumn(String),
    #[error("missing row in reference `{0}`")]
    MissingRow(String),
    #[error("invalid row in reference `{0}`")]
    InvalidRow(String),
    #[error("unexpected characters in reference `{0}`")]
    TrailingCharacters(String),
    #[error("invalid range `{0}`")]
    InvalidRange(String),
}

/// A reference to a single cell within a worksheet.
///
/// Rows and columns are **1-based**, matching A1 notation:
/// - `row = 1` is Excel row `1`
/// - `col = 1` is Excel column `A`
///
/// Ordering is row-major (row first, then column).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellAddress {
    /// 1-based row.
    pub row: u32,
    /// 1-based column.
    pub col: u32,
}

impl CellAddress {
    /// Construct a new [`CellAddress`]. Both coordinates must be at least 1.
    #[inline]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Convert to A1 notation (e.g. `A1`, `BC32`).
    pub fn to_a1(self) -> String {
        format!("{}{}", col_to_name(self.col), self.row)
    }

    /// Parse an A1-style reference. Alias for [`parse_cell_reference`].
    pub fn from_a1(a1: &str) -> Result<Self, AddressError> {
        parse_cell_reference(a1)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", col_to_name(self.col), self.row)
    }
}

/// A rectangular, inclusive block of cells.
///
/// Always normalized such that `min_col <= max_col` and `min_row <= max_row`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeBounds {
    pub min_col: u32,
    pub min_row: u32,
    pub max_col: u32,
    pub max_row: u32,
}

impl RangeBounds {
    /// Construct a new range from two corners, normalizing orientation.
    pub const fn new(a: CellAddress, b: CellAddress) -> Self {
        let (min_row, max_row) = if a.row <= b.row {
            (a.row, b.row)
        } else {
            (b.row, a.row)
        };
        let (min_col, max_col) = if a.col <= b.col {
            (a.col, b.col)
        } else {
            (b.col, a.col)
        };
        Self {
            min_col,
            min_row,
            max_col,
            max_row,
        }
    }

    /// A 1x1 range covering `cell`.
    #[inline]
    pub const fn single(cell: CellAddress) -> Self {
        Self::new(cell, cell)
    }

    /// Parse a range token. Alias for [`parse_range_token`].
    pub fn from_a1(a1: &str) -> Result<Self, AddressError> {
        parse_range_token(a1)
    }

    #[inline]
    pub const fn start(&self) -> CellAddress {
        CellAddress::new(self.min_row, self.min_col)
    }

    #[inline]
    pub const fn end(&self) -> CellAddress {
        CellAddress::new(self.max_row, self.max_col)
    }

    /// Returns true if `(row, col)` lies within the range, inclusive on all edges.
    #[inline]
    pub const fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.min_row && row <= self.max_row && col >= self.min_col && col <= self.max_col
    }

    #[inline]
    pub const fn contains_cell(&self, cell: CellAddress) -> bool {
        self.contains(cell.row, cell.col)
    }

    /// Number of columns in the range.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.max_col - self.min_col + 1
    }

    /// Number of rows in the range.
    #[inline]
    pub const fn height(&self) -> u32 {
        self.max_row - self.min_row + 1
    }

    #[inline]
    pub const fn is_single_cell(&self) -> bool {
        self.min_row == self.max_row && self.min_col == self.max_col
    }

    /// Clamp to `extent`, or `None` when the two ranges do not overlap.
    pub fn clamp_to(&self, extent: &RangeBounds) -> Option<RangeBounds> {
        let min_row = self.min_row.max(extent.min_row);
        let max_row = self.max_row.min(extent.max_row);
        let min_col = self.min_col.max(extent.min_col);
        let max_col = self.max_col.min(extent.max_col);
        (min_row <= max_row && min_col <= max_col).then_some(RangeBounds {
            min_col,
            min_row,
            max_col,
            max_row,
        })
    }

    /// Iterate every cell in the range in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellAddress> + '_ {
        (self.min_row..=self.max_row)
            .flat_map(move |row| (self.min_col..=self.max_col).map(move |col| CellAddress::new(row, col)))
    }
}

impl fmt::Display for RangeBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.start())
        } else {
            write!(f, "{}:{}", self.start(), self.end())
        }
    }
}

/// Interpret a letters-only string as a bijective base-26 number (`A` = 1 .. `Z` = 26).
///
/// Letters are case-insensitive. This does not enforce the worksheet column limit; see
/// [`parse_cell_reference`] for bounded parsing.
pub fn parse_column_letters(text: &str) -> Result<u32, AddressError> {
    if text.is_empty() {
        return Err(AddressError::Empty);
    }
    let mut col: u32 = 0;
    for b in text.bytes() {
        if !b.is_ascii_alphabetic() {
            return Err(AddressError::InvalidColumn(text.to_string()));
        }
        let digit = u32::from(b.to_ascii_uppercase() - b'A') + 1;
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add(digit))
            .ok_or_else(|| AddressError::InvalidColumn(text.to_string()))?;
    }
    Ok(col)
}

/// Inverse of [`parse_column_letters`]: `1 -> "A"`, `27 -> "AA"`.
pub fn format_column_index(index: u32) -> Result<String, AddressError> {
    if index < 1 {
        return Err(AddressError::ColumnOutOfRange(index));
    }
    Ok(col_to_name(index))
}

/// Parse an A1-style cell reference such as `B7`, `aa10`, or `$C$3`.
pub fn parse_cell_reference(text: &str) -> Result<CellAddress, AddressError> {
    let s = text.trim();
    if s.is_empty() {
        return Err(AddressError::Empty);
    }

    let bytes = s.as_bytes();
    let mut idx = 0usize;
    if bytes.get(idx) == Some(&b'$') {
        idx += 1;
    }

    let col_start = idx;
    while idx < bytes.len() && bytes[idx].is_ascii_alphabetic() {
        idx += 1;
    }
    if idx == col_start {
        return Err(AddressError::MissingColumn(s.to_string()));
    }
    let col_str = &s[col_start..idx];

    if bytes.get(idx) == Some(&b'$') {
        idx += 1;
    }

    let row_start = idx;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    if idx == row_start {
        return Err(AddressError::MissingRow(s.to_string()));
    }
    if idx != bytes.len() {
        return Err(AddressError::TrailingCharacters(s.to_string()));
    }

    let col = parse_column_letters(col_str)?;
    if col > EXCEL_MAX_COLS {
        return Err(AddressError::InvalidColumn(col_str.to_string()));
    }
    let row: u32 = s[row_start..idx]
        .parse()
        .map_err(|_| AddressError::InvalidRow(s.to_string()))?;
    if row == 0 || row > EXCEL_MAX_ROWS {
        return Err(AddressError::InvalidRow(s.to_string()));
    }

    Ok(CellAddress::new(row, col))
}

enum Endpoint {
    Cell(CellAddress),
    Column(u32),
    Row(u32),
}

fn parse_endpoint(text: &str) -> Result<Endpoint, AddressError> {
    let s = text.trim();
    let bare = s.trim_start_matches('$');
    if bare.is_empty() {
        return Err(AddressError::Empty);
    }
    if bare.bytes().all(|b| b.is_ascii_alphabetic()) {
        let col = parse_column_letters(bare)?;
        if col > EXCEL_MAX_COLS {
            return Err(AddressError::InvalidColumn(bare.to_string()));
        }
        return Ok(Endpoint::Column(col));
    }
    if bare.bytes().all(|b| b.is_ascii_digit()) {
        let row: u32 = bare
            .parse()
            .map_err(|_| AddressError::InvalidRow(s.to_string()))?;
        if row == 0 || row > EXCEL_MAX_ROWS {
            return Err(AddressError::InvalidRow(s.to_string()));
        }
        return Ok(Endpoint::Row(row));
    }
    parse_cell_reference(s).map(Endpoint::Cell)
}

/// Parse a single range token into normalized bounds.
///
/// Accepted forms:
/// - `A1:C10` (either corner order)
/// - `B7` (collapses to a 1x1 range)
/// - `A:C` (whole columns, rows `1..=EXCEL_MAX_ROWS`)
/// - `1:10` (whole rows, columns `1..=EXCEL_MAX_COLS`)
pub fn parse_range_token(text: &str) -> Result<RangeBounds, AddressError> {
    let s = text.trim();
    if s.is_empty() {
        return Err(AddressError::Empty);
    }

    let Some((a, b)) = s.split_once(':') else {
        return parse_cell_reference(s).map(RangeBounds::single);
    };

    match (parse_endpoint(a)?, parse_endpoint(b)?) {
        (Endpoint::Cell(start), Endpoint::Cell(end)) => Ok(RangeBounds::new(start, end)),
        (Endpoint::Column(c1), Endpoint::Column(c2)) => Ok(RangeBounds::new(
            CellAddress::new(1, c1),
            CellAddress::new(EXCEL_MAX_ROWS, c2),
        )),
        (Endpoint::Row(r1), Endpoint::Row(r2)) => Ok(RangeBounds::new(
            CellAddress::new(r1, 1),
            CellAddress::new(r2, EXCEL_MAX_COLS),
        )),
        _ => Err(AddressError::InvalidRange(s.to_string())),
    }
}

/// Parse a comma-separated list of range tokens, preserving the caller's order.
///
/// Overlapping tokens are kept as-is. A blank string yields an empty list.
pub fn parse_range_list(text: &str) -> Result<Vec<RangeBounds>, AddressError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    text.split(',').map(parse_range_token).collect()
}

fn col_to_name(col: u32) -> String {
    let mut n = col;
    let mut out = Vec::<u8>::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}
