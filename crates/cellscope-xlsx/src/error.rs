use cellscope_model::AddressError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to open workbook container: {0}")]
    ContainerOpenFailure(#[from] ContainerError),
    #[error("failed to parse sheet `{sheet}`: {source}")]
    SheetParseFailure {
        sheet: String,
        #[source]
        source: SheetError,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a workbook container could not be opened.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("missing xlsx part: {0}")]
    MissingPart(String),
    #[error("xml error in {part}: {message}")]
    Xml { part: String, message: String },
    #[error(
        "xlsx package part is too large to load safely: {part} is {size} bytes (max {max} bytes)"
    )]
    PartTooLarge { part: String, size: u64, max: u64 },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "structured")]
    #[error("xlsx error: {0}")]
    Calamine(#[from] calamine::XlsxError),
}

/// A failure confined to a single sheet; recovered into a warning by both backends.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("xml attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    #[error("invalid cell reference: {0}")]
    Address(#[from] AddressError),
    #[error("missing worksheet part: {0}")]
    MissingPart(String),
    #[error(
        "xlsx package part is too large to load safely: {part} is {size} bytes (max {max} bytes)"
    )]
    PartTooLarge { part: String, size: u64, max: u64 },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "structured")]
    #[error("xlsx error: {0}")]
    Calamine(#[from] calamine::XlsxError),
}

impl ExtractError {
    pub(crate) fn sheet(sheet: impl Into<String>, source: impl Into<SheetError>) -> Self {
        ExtractError::SheetParseFailure {
            sheet: sheet.into(),
            source: source.into(),
        }
    }
}
