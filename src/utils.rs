//! Shared utility functions for cruise summary processing

/// Extract the zero-padded cast number from a bottle file name
///
/// The cast is the (up to) three characters immediately before the last `.`
/// in the name, left-padded with zeros to width 3. Returns `None` when the
/// name has no `.`.
///
/// # Examples
///
/// ```
/// use cruise_bottle_summary::utils::cast_from_file_name;
///
/// assert_eq!(cast_from_file_name("STA001_AR18002.btl").unwrap(), "002");
/// assert_eq!(cast_from_file_name("ar08b.7.btl").unwrap(), "b.7");
/// assert_eq!(cast_from_file_name("7.btl").unwrap(), "007");
/// assert!(cast_from_file_name("no_extension").is_none());
/// ```
pub fn cast_from_file_name(file_name: &str) -> Option<String> {
    let dot = file_name.rfind('.')?;
    let stem: Vec<char> = file_name[..dot].chars().collect();
    let start = stem.len().saturating_sub(3);
    let cast: String = stem[start..].iter().collect();
    Some(zfill(&cast, 3))
}

/// Left-pad `value` with zeros to `width` characters, keeping a leading sign in front
///
/// # Examples
///
/// ```
/// use cruise_bottle_summary::utils::zfill;
///
/// assert_eq!(zfill("2", 3), "002");
/// assert_eq!(zfill("-5", 4), "-005");
/// assert_eq!(zfill("12345", 3), "12345");
/// ```
pub fn zfill(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }

    let padding = "0".repeat(width - len);
    match value.chars().next() {
        Some(sign @ ('+' | '-')) => format!("{sign}{padding}{}", &value[1..]),
        _ => format!("{padding}{value}"),
    }
}

/// Canonical form of a join key
///
/// Numeric keys compare by value so that `"001"`, `"1"` and `"1.0"` match.
/// Other keys are trimmed.
///
/// # Examples
///
/// ```
/// use cruise_bottle_summary::utils::normalize_key;
///
/// assert_eq!(normalize_key("001"), "1");
/// assert_eq!(normalize_key(" 1.0 "), "1");
/// assert_eq!(normalize_key("2.50"), "2.5");
/// assert_eq!(normalize_key(" A12 "), "A12");
/// ```
pub fn normalize_key(value: &str) -> String {
    let trimmed = value.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => format_number(n),
        _ => trimmed.to_string(),
    }
}

/// Format a number the way spreadsheet cells are written: whole values without a fraction
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_from_file_name_three_digits() {
        assert_eq!(cast_from_file_name("STA001_AR18002.btl").unwrap(), "002");
    }

    #[test]
    fn test_cast_from_file_name_uses_last_dot() {
        assert_eq!(cast_from_file_name("ar18.v2_012.btl").unwrap(), "012");
    }

    #[test]
    fn test_cast_from_file_name_short_stem() {
        assert_eq!(cast_from_file_name("5.btl").unwrap(), "005");
        assert_eq!(cast_from_file_name(".btl").unwrap(), "000");
    }

    #[test]
    fn test_cast_from_file_name_no_dot() {
        assert!(cast_from_file_name("STA001").is_none());
    }

    #[test]
    fn test_zfill_plain() {
        assert_eq!(zfill("7", 16), "0000000000000007");
    }

    #[test]
    fn test_zfill_signed() {
        assert_eq!(zfill("+2", 4), "+002");
    }

    #[test]
    fn test_zfill_already_wide() {
        assert_eq!(zfill("abcd", 2), "abcd");
    }

    #[test]
    fn test_normalize_key_non_numeric() {
        assert_eq!(normalize_key("C12"), "C12");
        assert_eq!(normalize_key("1/2"), "1/2");
    }

    #[test]
    fn test_normalize_key_ignores_nan() {
        assert_eq!(normalize_key("NaN"), "NaN");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-9999999.0), "-9999999");
        assert_eq!(format_number(33.512), "33.512");
    }
}
