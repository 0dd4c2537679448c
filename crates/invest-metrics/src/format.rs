//! Human-readable rendering of amounts and changes

/// Format an amount in human-readable form ($1.50T, -$250.00M, ...)
pub fn format_currency(amount: f64) -> String {
    let abs_amount = amount.abs();
    let sign = if amount < 0.0 { "-" } else { "" };

    if abs_amount >= 1_000_000_000_000.0 {
        format!("{}${:.2}T", sign, abs_amount / 1_000_000_000_000.0)
    } else if abs_amount >= 1_000_000_000.0 {
        format!("{}${:.2}B", sign, abs_amount / 1_000_000_000.0)
    } else if abs_amount >= 1_000_000.0 {
        format!("{}${:.2}M", sign, abs_amount / 1_000_000.0)
    } else if abs_amount >= 1_000.0 {
        format!("{}${:.2}K", sign, abs_amount / 1_000.0)
    } else {
        format!("{sign}${abs_amount:.2}")
    }
}

/// Render a percent change with an explicit sign: `+12.50%`, `-3.20%`
///
/// Zero renders as `+0.00%`.
pub fn format_percent_change(percent: f64) -> String {
    let percent = if percent == 0.0 { 0.0 } else { percent };
    format!("{percent:+.2}%")
}

/// Parse a value produced by [`format_percent_change`]
pub fn parse_percent_change(text: &str) -> Option<f64> {
    let number = text.trim().strip_suffix('%')?.trim();
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1_500_000_000_000.0), "$1.50T");
        assert_eq!(format_currency(50_000_000_000.0), "$50.00B");
        assert_eq!(format_currency(250_000_000.0), "$250.00M");
        assert_eq!(format_currency(-1_000_000.0), "-$1.00M");
        assert_eq!(format_currency(5_000.0), "$5.00K");
        assert_eq!(format_currency(100.0), "$100.00");
    }

    #[test]
    fn test_format_percent_change() {
        assert_eq!(format_percent_change(12.5), "+12.50%");
        assert_eq!(format_percent_change(-3.2), "-3.20%");
        assert_eq!(format_percent_change(0.0), "+0.00%");
        assert_eq!(format_percent_change(-0.0), "+0.00%");
    }

    #[test]
    fn test_parse_percent_change() {
        assert_eq!(parse_percent_change("+12.50%"), Some(12.5));
        assert_eq!(parse_percent_change(" -3.20% "), Some(-3.2));
        assert_eq!(parse_percent_change("12.5"), None);
        assert_eq!(parse_percent_change("N/A"), None);
    }
}
