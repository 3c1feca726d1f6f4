use cellscope_model::{
    format_column_index, parse_cell_reference, parse_column_letters, parse_range_token,
    CellAddress, EXCEL_MAX_COLS, EXCEL_MAX_ROWS,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn column_letters() -> impl Strategy<Value = String> {
    // Bijective base-26 has no zero digit, so every letters-only string is canonical.
    "[A-Z]{1,6}"
}

fn sheet_cell() -> impl Strategy<Value = CellAddress> {
    (1u32..=EXCEL_MAX_ROWS, 1u32..=EXCEL_MAX_COLS).prop_map(|(row, col)| CellAddress::new(row, col))
}

proptest! {
    #[test]
    fn letters_roundtrip_through_index(letters in column_letters()) {
        let index = parse_column_letters(&letters).expect("parse letters");
        prop_assert_eq!(format_column_index(index).expect("format index"), letters);
    }

    #[test]
    fn index_roundtrips_through_letters(index in 1u32..=u32::MAX) {
        let letters = format_column_index(index).expect("format index");
        prop_assert_eq!(parse_column_letters(&letters).expect("parse letters"), index);
    }

    #[test]
    fn lowercase_letters_parse_like_uppercase(letters in "[a-z]{1,4}") {
        prop_assert_eq!(
            parse_column_letters(&letters).unwrap(),
            parse_column_letters(&letters.to_ascii_uppercase()).unwrap()
        );
    }

    #[test]
    fn a1_text_roundtrips(cell in sheet_cell()) {
        prop_assert_eq!(parse_cell_reference(&cell.to_a1()).unwrap(), cell);
    }

    #[test]
    fn range_corner_order_is_irrelevant(a in sheet_cell(), b in sheet_cell()) {
        let forward = parse_range_token(&format!("{a}:{b}")).unwrap();
        let backward = parse_range_token(&format!("{b}:{a}")).unwrap();
        prop_assert_eq!(forward, backward);
        prop_assert!(forward.min_row <= forward.max_row);
        prop_assert!(forward.min_col <= forward.max_col);
        prop_assert!(forward.contains_cell(a));
        prop_assert!(forward.contains_cell(b));
    }
}

#[test]
fn reversed_range_equals_forward_range() {
    assert_eq!(
        parse_range_token("C10:A1").unwrap(),
        parse_range_token("A1:C10").unwrap()
    );
}

#[test]
fn single_cell_range_is_one_by_one() {
    let bounds = parse_range_token("A1").unwrap();
    assert_eq!(
        (bounds.min_col, bounds.min_row, bounds.max_col, bounds.max_row),
        (1, 1, 1, 1)
    );
}
