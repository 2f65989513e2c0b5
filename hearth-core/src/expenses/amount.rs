/// Parses a decimal money string (`"12"`, `"12.5"`, `"-3.05"`) into cents.
///
/// At most two fractional digits are accepted. Returns `None` for anything
/// else, including empty input.
pub fn parse_amount_cents(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (digits, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if fraction.len() > 2
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };
    let cents = whole.checked_mul(100)?.checked_add(fraction)?;
    Some(if negative { -cents } else { cents })
}

/// Renders cents as a two-decimal string.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_shapes() {
        assert_eq!(parse_amount_cents("12"), Some(1200));
        assert_eq!(parse_amount_cents("12.5"), Some(1250));
        assert_eq!(parse_amount_cents(" 0.07 "), Some(7));
        assert_eq!(parse_amount_cents(".5"), Some(50));
        assert_eq!(parse_amount_cents("-3.05"), Some(-305));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_amount_cents(""), None);
        assert_eq!(parse_amount_cents("."), None);
        assert_eq!(parse_amount_cents("1.234"), None);
        assert_eq!(parse_amount_cents("12,50"), None);
        assert_eq!(parse_amount_cents("abc"), None);
    }

    #[test]
    fn formats_with_two_decimals() {
        assert_eq!(format_cents(1250), "12.50");
        assert_eq!(format_cents(7), "0.07");
        assert_eq!(format_cents(-305), "-3.05");
    }
}
