mod support;

use std::io::Cursor;

use cellscope_xlsx::{
    extract_from_bytes, extract_from_reader, extract_path, BackendPreference, ExtractError,
    ExtractOptions, FormulaAudit, DEFAULT_CHUNK_SIZE,
};
use pretty_assertions::assert_eq;

use support::package_builder::{column_of_numbers, PackageBuilder};

const FORMULA_SHEET: &str = r#"<sheetData>
<row r="1"><c r="A1"><v>2</v></c><c r="B1"><v>3</v></c><c r="C1"><f>SUM(A1:B1)</f><v>5</v></c></row>
<row r="2"><c r="A2"><f>ROUND(C1/2,0)</f><v>3</v></c><c r="B2"><f>=SUM($A$1,B1)</f><v>5</v></c></row>
</sheetData>"#;

#[test]
fn defaults() {
    let options = ExtractOptions::default();
    assert_eq!(options.chunk_size, DEFAULT_CHUNK_SIZE);
    assert_eq!(options.backend, BackendPreference::Auto);
    assert_eq!(options.sheets, None);
    assert_eq!(options.ranges, None);
}

#[test]
fn zero_chunk_size_is_rejected_before_io() {
    let options = ExtractOptions::default().with_chunk_size(0);

    let err = extract_path("/definitely/not/here.xlsx", &options).unwrap_err();
    assert!(matches!(err, ExtractError::InvalidConfiguration(_)), "{err:?}");

    let err = extract_from_bytes(b"", "empty.xlsx", &options).unwrap_err();
    assert!(matches!(err, ExtractError::InvalidConfiguration(_)), "{err:?}");
}

#[test]
fn malformed_range_is_rejected_before_io() {
    let options = ExtractOptions::default().with_ranges("A1:B2,,C3");
    let err = extract_path("/definitely/not/here.xlsx", &options).unwrap_err();
    assert!(matches!(err, ExtractError::InvalidAddress(_)), "{err:?}");

    let options = ExtractOptions::default().with_ranges("A1:5");
    let err = extract_from_bytes(b"", "x.xlsx", &options).unwrap_err();
    assert!(matches!(err, ExtractError::InvalidAddress(_)), "{err:?}");
}

#[test]
fn missing_file_is_an_io_error() {
    let err = extract_path("/definitely/not/here.xlsx", &ExtractOptions::default()).unwrap_err();
    assert!(matches!(err, ExtractError::Io(_)), "{err:?}");
}

#[test]
fn extract_path_uses_the_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quarterly.xlsx");
    std::fs::write(&path, PackageBuilder::new().sheet("Data", &column_of_numbers(4)).build())
        .unwrap();

    let options = ExtractOptions::default().with_backend(BackendPreference::RawContainer);
    let result = extract_path(&path, &options).unwrap();
    assert_eq!(result.filename, "quarterly.xlsx");
    assert_eq!(result.total_cells(), 4);
}

#[test]
fn extract_from_reader_accepts_any_seekable_source() {
    let bytes = PackageBuilder::new().sheet("Data", &column_of_numbers(3)).build();
    let options = ExtractOptions::default().with_backend(BackendPreference::RawContainer);
    let result = extract_from_reader(Cursor::new(bytes), "stream", &options).unwrap();
    assert_eq!(result.filename, "stream");
    assert_eq!(result.sheets[0].cells.len(), 3);
}

#[test]
fn options_deserialize_with_defaults() {
    let options: ExtractOptions =
        serde_json::from_str(r#"{"ranges": "A1:B2", "backend": "raw_container"}"#).unwrap();
    assert_eq!(options.ranges.as_deref(), Some("A1:B2"));
    assert_eq!(options.backend, BackendPreference::RawContainer);
    assert_eq!(options.chunk_size, DEFAULT_CHUNK_SIZE);
}

#[test]
fn formula_audit_over_raw_extraction() {
    let bytes = PackageBuilder::new()
        .sheet("Calc", FORMULA_SHEET)
        .sheet("Plain", &column_of_numbers(2))
        .build();
    let options = ExtractOptions::default().with_backend(BackendPreference::RawContainer);
    let result = extract_from_bytes(&bytes, "calc.xlsx", &options).unwrap();

    let audit = FormulaAudit::from_result(&result);
    assert_eq!(audit.total_formulas, 3);
    assert_eq!(audit.sheets.len(), 1);
    assert_eq!(audit.sheets[0].sheet, "Calc");

    let formulas: Vec<(&str, &str)> = audit.sheets[0]
        .formulas
        .iter()
        .map(|f| (f.address.as_str(), f.formula.as_str()))
        .collect();
    assert_eq!(
        formulas,
        vec![
            ("C1", "=SUM(A1:B1)"),
            ("A2", "=ROUND(C1/2,0)"),
            ("B2", "=SUM($A$1,B1)"),
        ]
    );
    assert_eq!(
        audit.functions_by_frequency(),
        vec![("SUM", 2), ("ROUND", 1)]
    );
}

#[cfg(feature = "structured")]
#[test]
fn auto_prefers_the_structured_backend() {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    workbook.add_worksheet().write_number(0, 0, 1.0).unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let result = extract_from_bytes(&bytes, "auto.xlsx", &ExtractOptions::default()).unwrap();
    assert_eq!(result.backend, cellscope_xlsx::BackendKind::Structured);
}
