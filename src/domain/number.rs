// Numeric formatting helpers shared by the colour model and the plot renderer

/// Rounds a float to the given number of decimal places.
pub fn round_float(x: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (x * factor).round() / factor
}

/// Formats an axis label value. Floats with more than 4 digits after the
/// decimal point are rounded to 4 places, everything else keeps its shortest
/// representation.
pub fn format_axis_value(value: f64) -> String {
    let repr = value.to_string();
    match repr.split_once('.') {
        Some((_, fraction)) if fraction.len() > 4 => format!("{value:.4}"),
        _ => repr,
    }
}

/// Formats a tooltip value. Missing values render as "-". Fractions longer
/// than `max_digits` are truncated, not rounded.
pub fn format_tooltip_value(value: Option<f64>, max_digits: usize) -> String {
    let Some(value) = value else {
        return "-".to_string();
    };
    let repr = value.to_string();
    match repr.split_once('.') {
        Some((integral, fraction)) if fraction.len() > max_digits => {
            format!("{integral}.{}", &fraction[..max_digits])
        }
        _ => repr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_float() {
        assert_eq!(round_float(0.125, 2), 0.13);
        assert_eq!(round_float(1.0, 2), 1.0);
        assert_eq!(round_float(0.333333, 2), 0.33);
    }

    #[test]
    fn test_format_axis_value() {
        assert_eq!(format_axis_value(3.0), "3");
        assert_eq!(format_axis_value(0.25), "0.25");
        assert_eq!(format_axis_value(0.123456), "0.1235");
        assert_eq!(format_axis_value(-1.5), "-1.5");
    }

    #[test]
    fn test_format_tooltip_value_truncates() {
        assert_eq!(format_tooltip_value(Some(0.123456789), 8), "0.12345678");
        assert_eq!(format_tooltip_value(Some(2.0), 8), "2");
        assert_eq!(format_tooltip_value(Some(-0.999999999), 8), "-0.99999999");
    }

    #[test]
    fn test_format_tooltip_value_missing() {
        assert_eq!(format_tooltip_value(None, 8), "-");
    }
}
