//! Text value parsing.

use tabmod_model::Cell;

/// Parses a string as `f64`, returning `None` for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses `true`/`false` (any case), returning `None` otherwise.
pub fn parse_bool(value: &str) -> Option<bool> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Infers a cell from raw text.
///
/// Empty text is `Undefined`, then numbers, then booleans; anything else
/// stays a string with surrounding whitespace removed.
pub fn infer_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Cell::Undefined;
    }
    if let Some(number) = parse_f64(trimmed) {
        return Cell::Number(number);
    }
    if let Some(flag) = parse_bool(trimmed) {
        return Cell::Boolean(flag);
    }
    Cell::String(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64("  "), None);
        assert_eq!(parse_f64("3.5"), Some(3.5));
        assert_eq!(parse_f64("  -2  "), Some(-2.0));
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_f64("inf"), None);
        assert_eq!(parse_f64("invalid"), None);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" false "), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn test_infer_cell() {
        assert_eq!(infer_cell(""), Cell::Undefined);
        assert_eq!(infer_cell("42"), Cell::Number(42.0));
        assert_eq!(infer_cell("True"), Cell::Boolean(true));
        assert_eq!(infer_cell("  hello "), Cell::string("hello"));
    }
}
