//! Exact-decimal numeric semantics.
//!
//! `serde_json`'s `arbitrary_precision` feature keeps numbers as their original decimal
//! text instead of collapsing them into an `f64`, but arithmetic on them (`multipleOf`,
//! numeric `const`/`enum` comparison) still needs a real number type. We parse that text
//! into a [`fraction::GenericFraction<BigUint>`], which represents any finite decimal
//! exactly as a ratio of integers, so `0.1 + 0.2 == 0.3`-style binary-float artifacts
//! never appear in schema evaluation.
use fraction::{BigUint, GenericFraction};
use serde_json::{Number, Value};

pub type Decimal = GenericFraction<BigUint>;

/// Parse a JSON number's exact decimal text into a [`Decimal`].
///
/// Returns `None` for NaN/Infinity representations, which cannot appear in valid JSON
/// text but could in principle reach us via programmatic construction.
#[must_use]
pub fn to_decimal(n: &Number) -> Option<Decimal> {
    parse_decimal_str(&n.to_string())
}

fn parse_decimal_str(text: &str) -> Option<Decimal> {
    let (sign, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (mantissa, exponent) = match text.split_once(['e', 'E']) {
        Some((m, e)) => (m, e.parse::<i64>().ok()?),
        None => (text, 0),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };
    let digits = format!("{int_part}{frac_part}");
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let numerator: BigUint = digits.parse().ok()?;
    let scale = frac_part.len() as i64 - exponent;

    let mut value = if scale <= 0 {
        let pow = BigUint::from(10u8).pow((-scale) as u32);
        Decimal::from(numerator * pow)
    } else {
        let pow = BigUint::from(10u8).pow(scale as u32);
        Decimal::new(numerator, pow)
    };
    if sign {
        value = -value;
    }
    Some(value)
}

/// Whether a JSON number is integral, i.e. `value == int(value)` in jschon's sense:
/// `5`, `5.0` and `5e0` are all integral; `5.5` is not.
#[must_use]
pub fn is_integral(n: &Number) -> bool {
    if n.is_u64() || n.is_i64() {
        return true;
    }
    to_decimal(n).is_some_and(|d| d.fract() == Decimal::from(0u8))
}

/// Deep structural equality with JSON Schema's numeric-tower semantics: numbers compare
/// by exact decimal value regardless of how they were spelled (`1` == `1.0` == `1e0`),
/// and object key order is irrelevant.
#[must_use]
pub fn deep_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (to_decimal(x), to_decimal(y)) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(x, y)| deep_eq(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| deep_eq(v, w)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integral_floats_and_exponents_are_recognized() {
        for text in ["5", "5.0", "5e0", "500e-2"] {
            let value: Value = serde_json::from_str(text).unwrap();
            assert!(is_integral(value.as_number().unwrap()), "{text}");
        }
        let non_integral: Value = serde_json::from_str("5.5").unwrap();
        assert!(!is_integral(non_integral.as_number().unwrap()));
    }

    #[test]
    fn decimal_equality_ignores_spelling() {
        assert!(deep_eq(&json!(1), &json!(1.0)));
        assert!(deep_eq(&json!(0.1), &json!(1e-1)));
        assert!(!deep_eq(&json!(0.1), &json!(0.2)));
    }

    #[test]
    fn object_equality_ignores_key_order() {
        assert!(deep_eq(
            &json!({"a": 1, "b": 2}),
            &json!({"b": 2.0, "a": 1e0})
        ));
    }

    #[test]
    fn multiple_of_uses_exact_decimal_arithmetic() {
        let instance = to_decimal(json!(0.3).as_number().unwrap()).unwrap();
        let divisor = to_decimal(json!(0.1).as_number().unwrap()).unwrap();
        // With binary floats, 0.3 / 0.1 drifts from 3; the exact ratio must not.
        let quotient = instance / divisor;
        assert_eq!(quotient, Decimal::from(3u8));
    }
}
