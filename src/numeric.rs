use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_DECIMAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
        .expect("valid decimal regex")
});

const THOUSANDS_SEPARATOR: char = ',';

/// Normalizes a collector metric string: thousands separators are removed and
/// the longest leading decimal literal is parsed. Anything else is `NaN`.
pub fn parse_metric(text: &str) -> f64 {
    let stripped = text
        .chars()
        .filter(|c| *c != THOUSANDS_SEPARATOR)
        .collect::<String>();
    parse_leading_float(&stripped)
}

/// Parses the decimal prefix of `text` after leading whitespace, ignoring any
/// trailing garbage (`"12.5 hours"` is `12.5`).
pub fn parse_leading_float(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let Some(found) = LEADING_DECIMAL.find(trimmed) else {
        return f64::NAN;
    };

    let literal = found.as_str();
    let (sign, magnitude) = match literal.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, literal.strip_prefix('+').unwrap_or(literal)),
    };
    if magnitude == "Infinity" {
        return sign * f64::INFINITY;
    }

    magnitude
        .parse::<f64>()
        .map(|value| sign * value)
        .unwrap_or(f64::NAN)
}

const EXPONENT_UPPER: f64 = 1e21;
const EXPONENT_LOWER: f64 = 1e-6;

/// Shortest text form of a number, integral values without a fraction.
/// Magnitudes of at least `1e21` or below `1e-6` switch to exponent form with
/// an explicit exponent sign (`1e+21`, `1.5e-7`).
pub fn format_js_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }
    if value == 0.0 {
        // covers -0.0
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude >= EXPONENT_UPPER || magnitude < EXPONENT_LOWER {
        return format_exponent(value);
    }
    value.to_string()
}

fn format_exponent(value: f64) -> String {
    let text = format!("{:e}", value);
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => text,
    }
}

/// Inserts a separator before every digit that starts a run of digits whose
/// length is a multiple of three, provided it directly follows a word
/// character. Already separated text passes through unchanged.
pub fn format_with_commas(text: &str) -> String {
    let chars = text.chars().collect::<Vec<_>>();
    let mut output = String::with_capacity(text.len() + text.len() / 3);

    for (index, ch) in chars.iter().enumerate() {
        if index > 0 && ch.is_ascii_digit() && is_word_char(chars[index - 1]) {
            let run = chars[index..]
                .iter()
                .take_while(|c| c.is_ascii_digit())
                .count();
            if run % 3 == 0 {
                output.push(THOUSANDS_SEPARATOR);
            }
        }
        output.push(*ch);
    }

    output
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::{format_js_number, format_with_commas, parse_leading_float, parse_metric};

    #[test]
    fn strips_separators_before_parsing() {
        assert_eq!(parse_metric("1,200"), 1200.0);
        assert_eq!(parse_metric("12,345,678"), 12_345_678.0);
        assert_eq!(parse_metric("  3,000.5"), 3000.5);
    }

    #[test]
    fn parses_leading_prefix_only() {
        assert_eq!(parse_leading_float("12.5 hours"), 12.5);
        assert_eq!(parse_leading_float("-4e2x"), -400.0);
        assert_eq!(parse_leading_float(".75"), 0.75);
        assert_eq!(parse_leading_float("7."), 7.0);
        assert_eq!(parse_leading_float("1e"), 1.0);
        assert_eq!(parse_leading_float("+Infinity"), f64::INFINITY);
    }

    #[test]
    fn malformed_text_is_nan() {
        assert!(parse_metric("n/a").is_nan());
        assert!(parse_metric("").is_nan());
        assert!(parse_metric("-").is_nan());
        assert!(parse_metric("infinity").is_nan());
    }

    #[test]
    fn numbers_print_without_trailing_fraction() {
        assert_eq!(format_js_number(1200.0), "1200");
        assert_eq!(format_js_number(12.5), "12.5");
        assert_eq!(format_js_number(-0.0), "0");
        assert_eq!(format_js_number(f64::NAN), "NaN");
    }

    #[test]
    fn extreme_magnitudes_use_exponent_form() {
        assert_eq!(format_js_number(1e21), "1e+21");
        assert_eq!(format_js_number(-2.5e22), "-2.5e+22");
        assert_eq!(format_js_number(1e-7), "1e-7");
        assert_eq!(format_js_number(1.5e-7), "1.5e-7");
        assert_eq!(format_js_number(0.000001), "0.000001");
        assert_eq!(format_js_number(1e20), "100000000000000000000");
    }

    #[test]
    fn groups_digits_in_threes() {
        assert_eq!(format_with_commas("1234567"), "1,234,567");
        assert_eq!(format_with_commas("999"), "999");
        assert_eq!(format_with_commas("1000"), "1,000");
    }

    #[test]
    fn leaves_separated_text_alone() {
        assert_eq!(format_with_commas("12,345"), "12,345");
        assert_eq!(format_with_commas(""), "");
    }

    #[test]
    fn groups_fraction_digits_like_the_integer_part() {
        assert_eq!(format_with_commas("1234.5678"), "1,234.5,678");
    }
}
