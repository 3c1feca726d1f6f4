use std::io::{Read, Seek};

use cellscope_model::{BackendKind, ExtractionResult, FiltersEcho, RangeFilter, SheetWarning};

use crate::chunk::ChunkGovernor;
use crate::error::ExtractError;
use crate::options::{BackendPreference, ExtractOptions};
use crate::raw::RawContainerBackend;
#[cfg(feature = "structured")]
use crate::structured::StructuredBackend;

/// Everything a backend needs for one call, validated up front.
#[derive(Clone, Debug)]
pub struct ExtractionPlan {
    pub source_name: String,
    pub filter: RangeFilter,
    pub governor: ChunkGovernor,
    pub filters: FiltersEcho,
    pub max_part_bytes: u64,
}

impl ExtractionPlan {
    /// Validate `options` and parse the range string. Performs no I/O.
    pub fn from_options(
        source_name: impl Into<String>,
        options: &ExtractOptions,
    ) -> Result<Self, ExtractError> {
        options.validate()?;
        let governor = ChunkGovernor::new(options.chunk_size)?;
        let filter = RangeFilter::parse(options.sheets.as_deref(), options.ranges.as_deref())?;
        Ok(Self {
            source_name: source_name.into(),
            filter,
            governor,
            filters: FiltersEcho {
                sheets: options.sheets.clone(),
                ranges: options.ranges.clone(),
            },
            max_part_bytes: options.max_part_bytes,
        })
    }

    pub(crate) fn empty_result(&self, backend: BackendKind) -> ExtractionResult {
        ExtractionResult::new(self.source_name.clone(), self.filters.clone(), backend)
    }
}

/// Turn a per-sheet failure into a warning on `result`; anything else is passed back.
pub(crate) fn recover_sheet_failure(
    result: &mut ExtractionResult,
    err: ExtractError,
) -> Result<(), ExtractError> {
    match err {
        ExtractError::SheetParseFailure { sheet, source } => {
            log::warn!("skipping sheet `{sheet}`: {source}");
            result.warnings.push(SheetWarning {
                sheet,
                message: source.to_string(),
            });
            Ok(())
        }
        other => Err(other),
    }
}

/// A strategy for walking a workbook container into an [`ExtractionResult`].
pub trait ExtractionBackend {
    fn kind(&self) -> BackendKind;

    fn extract<R: Read + Seek>(
        &self,
        container: R,
        plan: &ExtractionPlan,
    ) -> Result<ExtractionResult, ExtractError>;
}

#[derive(Clone, Debug)]
pub enum Backend {
    #[cfg(feature = "structured")]
    Structured(StructuredBackend),
    RawContainer(RawContainerBackend),
}

impl Backend {
    /// Resolve a preference against the backends compiled into this build.
    pub fn select(preference: BackendPreference) -> Result<Self, ExtractError> {
        match preference {
            #[cfg(feature = "structured")]
            BackendPreference::Auto | BackendPreference::Structured => {
                Ok(Backend::Structured(StructuredBackend))
            }
            #[cfg(not(feature = "structured"))]
            BackendPreference::Auto => Ok(Backend::RawContainer(RawContainerBackend)),
            #[cfg(not(feature = "structured"))]
            BackendPreference::Structured => Err(ExtractError::InvalidConfiguration(
                "structured backend is not compiled in (enable the `structured` feature)"
                    .to_string(),
            )),
            BackendPreference::RawContainer => Ok(Backend::RawContainer(RawContainerBackend)),
        }
    }
}

impl ExtractionBackend for Backend {
    fn kind(&self) -> BackendKind {
        match self {
            #[cfg(feature = "structured")]
            Backend::Structured(b) => b.kind(),
            Backend::RawContainer(b) => b.kind(),
        }
    }

    fn extract<R: Read + Seek>(
        &self,
        container: R,
        plan: &ExtractionPlan,
    ) -> Result<ExtractionResult, ExtractError> {
        log::debug!(
            "extracting `{}` with the {:?} backend",
            plan.source_name,
            self.kind()
        );
        match self {
            #[cfg(feature = "structured")]
            Backend::Structured(b) => b.extract(container, plan),
            Backend::RawContainer(b) => b.extract(container, plan),
        }
    }
}
