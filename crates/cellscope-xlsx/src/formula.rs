/// Trim a stored formula and give it the leading `=` shown in the formula bar.
///
/// Whitespace-only input normalizes to an empty string.
pub(crate) fn normalize_formula(formula: &str) -> String {
    let trimmed = formula.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if trimmed.starts_with('=') {
        trimmed.to_owned()
    } else {
        format!("={trimmed}")
    }
}
