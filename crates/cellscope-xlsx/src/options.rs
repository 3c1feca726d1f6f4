use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// Maximum cells emitted per sheet unless overridden.
pub const DEFAULT_CHUNK_SIZE: usize = 200;

/// Default maximum uncompressed size permitted for any single ZIP part inflated into memory.
pub const DEFAULT_MAX_PART_BYTES: u64 = 256 * 1024 * 1024; // 256MiB

/// Which backend an extraction should run on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendPreference {
    /// Structured when compiled in, raw-container otherwise.
    #[default]
    Auto,
    Structured,
    RawContainer,
}

/// Caller-facing knobs for one extraction call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Sheet allow-list; `None` extracts every sheet.
    pub sheets: Option<Vec<String>>,
    /// Comma-separated range tokens such as `A1:C10,E5`.
    pub ranges: Option<String>,
    pub chunk_size: usize,
    pub backend: BackendPreference,
    pub max_part_bytes: u64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            sheets: None,
            ranges: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            backend: BackendPreference::Auto,
            max_part_bytes: DEFAULT_MAX_PART_BYTES,
        }
    }
}

impl ExtractOptions {
    pub fn with_sheets<I, S>(mut self, sheets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sheets = Some(sheets.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_ranges(mut self, ranges: impl Into<String>) -> Self {
        self.ranges = Some(ranges.into());
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_backend(mut self, backend: BackendPreference) -> Self {
        self.backend = backend;
        self
    }

    /// Reject settings that can never produce a result.
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.chunk_size < 1 {
            return Err(ExtractError::InvalidConfiguration(
                "chunk size must be at least 1".to_string(),
            ));
        }
        if self.max_part_bytes == 0 {
            return Err(ExtractError::InvalidConfiguration(
                "max part bytes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
