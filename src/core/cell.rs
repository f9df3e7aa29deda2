//! Cell value normalization
//!
//! Sheet cells are typed by hand, so numbers show up as `"1,234"`, `"45%"`,
//! `"12,5"` or plain garbage. Everything here is lenient: a cell that does
//! not read as a number is worth 0 and never fails the pipeline.

/// Normalize a funnel cell to a number.
///
/// - absent or blank → 0
/// - a trailing `%` is stripped, not divided by 100
/// - `,` is read as a thousands separator when it groups exactly three
///   digits after a non-zero integer part (`"1,234"` → 1234), otherwise as
///   the decimal separator (`"12,5"` → 12.5)
/// - anything unparseable (or non-finite) → 0
pub fn to_number(value: Option<&str>) -> f64 {
    let Some(raw) = value else {
        return 0.0;
    };

    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    if trimmed.is_empty() {
        return 0.0;
    }

    match normalize_separators(trimmed).parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

fn normalize_separators(text: &str) -> String {
    let last_comma = text.rfind(',');
    let last_dot = text.rfind('.');

    match (last_comma, last_dot) {
        (None, _) => text.to_string(),
        // "1.234,5": dots group, comma is decimal
        (Some(comma), Some(dot)) if comma > dot => text.replace('.', "").replace(',', "."),
        // "1,234.5": commas group
        (Some(_), Some(_)) => text.replace(',', ""),
        (Some(comma), None) => {
            if text.matches(',').count() > 1 {
                return text.replace(',', "");
            }
            let (int_part, frac_part) = (&text[..comma], &text[comma + 1..]);
            let int_digits = int_part.trim_start_matches(['+', '-']);
            let groups_thousands = frac_part.len() == 3
                && frac_part.bytes().all(|b| b.is_ascii_digit())
                && !int_digits.is_empty()
                && !int_digits.trim_start_matches('0').is_empty();
            if groups_thousands {
                format!("{}{}", int_part, frac_part)
            } else {
                format!("{}.{}", int_part, frac_part)
            }
        }
    }
}

/// Parse the longest numeric prefix of a cell, the way forecast cells are
/// read: `"12.5 u"` → 12.5, `"1,234"` → 1, `"n/a"` → 0.
pub fn leading_number(value: Option<&str>) -> f64 {
    let Some(raw) = value else {
        return 0.0;
    };
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return 0.0;
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    match text[..end].parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}
