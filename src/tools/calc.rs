use super::ToolError;
use super::input::parse_input;

/// `a=<number>;b=<number>` -> product.
pub fn multiply(input: &str) -> Result<String, ToolError> {
    let parsed = parse_input(input)?;
    let a = parsed.number("a")?;
    let b = parsed.number("b")?;
    Ok(format_float(a * b))
}

/// Shortest round-trip rendering with a `.0` suffix for integral values and
/// exponent notation outside `1e-4 <= |x| < 1e16`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let scientific = format!("{value:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };

    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|ch| *ch != '.').collect();

    let body = if (-4..16).contains(&exponent) {
        fixed_notation(&digits, exponent)
    } else {
        exponent_notation(&digits, exponent)
    };
    format!("{sign}{body}")
}

fn fixed_notation(digits: &str, exponent: i32) -> String {
    if exponent < 0 {
        let zeros = "0".repeat((-exponent - 1) as usize);
        return format!("0.{zeros}{digits}");
    }

    let int_len = (exponent + 1) as usize;
    if digits.len() <= int_len {
        let padding = "0".repeat(int_len - digits.len());
        format!("{digits}{padding}.0")
    } else {
        format!("{}.{}", &digits[..int_len], &digits[int_len..])
    }
}

fn exponent_notation(digits: &str, exponent: i32) -> String {
    let (lead, rest) = digits.split_at(1);
    let exp_sign = if exponent < 0 { '-' } else { '+' };
    let exp_abs = exponent.abs();
    if rest.is_empty() {
        format!("{lead}e{exp_sign}{exp_abs:02}")
    } else {
        format!("{lead}.{rest}e{exp_sign}{exp_abs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::{format_float, multiply};

    #[test]
    fn multiply_renders_integral_product_with_decimal_suffix() {
        assert_eq!(multiply("a=10000;b=50").expect("product"), "500000.0");
    }

    #[test]
    fn multiply_accepts_fractional_and_negative_operands() {
        assert_eq!(multiply("a=-2.5;b=4").expect("product"), "-10.0");
        assert_eq!(multiply("b=0.5;a=3").expect("product"), "1.5");
    }

    #[test]
    fn multiply_reports_missing_operand() {
        let err = multiply("a=10000").expect_err("missing b");
        assert_eq!(err.to_string(), "missing key 'b'");
    }

    #[test]
    fn multiply_reports_non_numeric_operand() {
        let err = multiply("a=sepuluh;b=2").expect_err("not a number");
        assert!(err.to_string().contains("'sepuluh'"));
    }

    #[test]
    fn multiply_reports_malformed_input() {
        let err = multiply("10000 x 50").expect_err("malformed");
        assert!(err.to_string().contains("not a key=value pair"));
    }

    #[test]
    fn format_float_matches_shortest_repr_rules() {
        assert_eq!(format_float(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_float(1234.5), "1234.5");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(0.00001), "1e-05");
        assert_eq!(format_float(1.5e-7), "1.5e-07");
        assert_eq!(format_float(1e15), "1000000000000000.0");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(-2.5e20), "-2.5e+20");
    }

    #[test]
    fn format_float_handles_special_values() {
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(-0.0), "-0.0");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_float(f64::NAN), "nan");
    }
}
