//! Loose argument coercion.
//!
//! Models do not always send the JSON type a schema asks for: `"7"` for 7,
//! `6.0` for 6. These helpers accept the harmless variants.

use serde_json::Value;

/// -2^63, the smallest `i64`
const I64_FLOOR: f64 = -9_223_372_036_854_775_808.0;
/// 2^63, one past the largest `i64`
const I64_CEIL: f64 = 9_223_372_036_854_775_808.0;
/// 2^64, one past the largest `u64`
const U64_CEIL: f64 = 18_446_744_073_709_551_616.0;

/// Integer view of a value, covering every `i64` and `u64`.
///
/// Floats truncate toward zero; anything outside that range is `None`
/// rather than clamped.
#[allow(clippy::cast_possible_truncation)]
pub fn as_integer(value: &Value) -> Option<i128> {
    let wide = match value {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && (I64_FLOOR..U64_CEIL).contains(f))
                    .map(|f| f.trunc() as i128)
            }),
        Value::String(s) => s.trim().parse::<i128>().ok(),
        _ => None,
    }?;
    (i128::from(i64::MIN)..=i128::from(u64::MAX))
        .contains(&wide)
        .then_some(wide)
}

/// Integer view of a value that rejects fractional and out-of-range numbers.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub fn as_exact_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0 && (I64_FLOOR..I64_CEIL).contains(f))
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Finite float view of a value
pub fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_as_integer() {
        assert_eq!(as_integer(&json!(7)), Some(7));
        assert_eq!(as_integer(&json!(7.9)), Some(7));
        assert_eq!(as_integer(&json!(-2.5)), Some(-2));
        assert_eq!(as_integer(&json!(" 11 ")), Some(11));
        assert_eq!(as_integer(&json!("seven")), None);
        assert_eq!(as_integer(&json!(null)), None);
    }

    #[test]
    fn test_as_integer_wide_values() {
        let largest_prime_u64 = 18_446_744_073_709_551_557_u64;
        assert_eq!(
            as_integer(&json!(largest_prime_u64)),
            Some(i128::from(largest_prime_u64))
        );
        assert_eq!(
            as_integer(&json!("18446744073709551557")),
            Some(i128::from(largest_prime_u64))
        );
        assert_eq!(as_integer(&json!(i64::MIN)), Some(i128::from(i64::MIN)));
        assert_eq!(as_integer(&json!(1e30)), None);
        assert_eq!(as_integer(&json!("18446744073709551616")), None);
    }

    #[test]
    fn test_as_exact_integer() {
        assert_eq!(as_exact_integer(&json!(6.0)), Some(6));
        assert_eq!(as_exact_integer(&json!(6.5)), None);
        assert_eq!(as_exact_integer(&json!("20")), Some(20));
        assert_eq!(as_exact_integer(&json!(true)), None);
        assert_eq!(as_exact_integer(&json!(1e30)), None);
    }

    #[test]
    fn test_as_number() {
        assert_eq!(as_number(&json!(2)), Some(2.0));
        assert_eq!(as_number(&json!("3.5")), Some(3.5));
        assert_eq!(as_number(&json!("inf")), None);
        assert_eq!(as_number(&json!([1])), None);
    }
}
