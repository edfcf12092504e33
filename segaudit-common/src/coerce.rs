//! Integer coercion with boolean exclusion
//!
//! Counts and indices arrive loosely typed. Both are resolved through
//! [`IntegerCoercion`] so the boolean rule is applied in exactly one place:
//! a JSON boolean is never an integer, whatever the field.
//!
//! # Modes
//! - [`IntegerCoercion::exact`]: JSON integers only. Used to establish and
//!   reconcile the expected count.
//! - [`IntegerCoercion::strict`]: JSON integers, or strings made only of
//!   ASCII digits. Used to decide whether a `record_count` is logged as
//!   invalid.
//! - [`IntegerCoercion::lenient`]: everything `strict` accepts, plus
//!   whitespace-padded and signed strings (`" 3 "`, `"-2"`) and finite floats
//!   (truncated toward zero). Used for `record_index`.
//!
//! Integers outside the signed 64-bit range are `NotAnInteger`.

use serde_json::{Number, Value};

/// Outcome of resolving a loosely-typed value to an integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerCoercion {
    /// Value resolved to this integer (may be zero or negative)
    Integer(i64),
    /// Value is not, and cannot be read as, an integer
    NotAnInteger,
    /// Value is a JSON boolean
    WasBoolean,
}

impl IntegerCoercion {
    /// Exact resolution (JSON integers only, never strings).
    pub fn exact(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Bool(_)) => Self::WasBoolean,
            Some(Value::Number(n)) => integer_number(n),
            _ => Self::NotAnInteger,
        }
    }

    /// Strict resolution (plain integers and digit-only strings).
    pub fn strict(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Bool(_)) => Self::WasBoolean,
            Some(Value::Number(n)) => integer_number(n),
            Some(Value::String(s)) => {
                if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
                    parse_i64(s)
                } else {
                    Self::NotAnInteger
                }
            }
            _ => Self::NotAnInteger,
        }
    }

    /// Lenient resolution (adds signed/padded strings and truncated floats).
    pub fn lenient(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Bool(_)) => Self::WasBoolean,
            Some(Value::Number(n)) if n.is_f64() => n.as_f64().map_or(Self::NotAnInteger, truncate),
            Some(Value::Number(n)) => integer_number(n),
            Some(Value::String(s)) => parse_i64(s.trim()),
            _ => Self::NotAnInteger,
        }
    }

    /// The integer, if one was resolved.
    pub fn integer(self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(n),
            _ => None,
        }
    }

    /// The integer, if one was resolved and it is greater than zero.
    pub fn positive(self) -> Option<i64> {
        self.integer().filter(|n| *n > 0)
    }
}

fn integer_number(n: &Number) -> IntegerCoercion {
    n.as_i64()
        .map_or(IntegerCoercion::NotAnInteger, IntegerCoercion::Integer)
}

fn parse_i64(s: &str) -> IntegerCoercion {
    s.parse::<i64>()
        .map_or(IntegerCoercion::NotAnInteger, IntegerCoercion::Integer)
}

fn truncate(f: f64) -> IntegerCoercion {
    let t = f.trunc();
    if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
        IntegerCoercion::Integer(t as i64)
    } else {
        IntegerCoercion::NotAnInteger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_booleans_are_never_integers() {
        assert_eq!(IntegerCoercion::strict(Some(&json!(true))), IntegerCoercion::WasBoolean);
        assert_eq!(IntegerCoercion::lenient(Some(&json!(false))), IntegerCoercion::WasBoolean);
    }

    #[test]
    fn test_exact_accepts_json_integers_only() {
        assert_eq!(IntegerCoercion::exact(Some(&json!(7))), IntegerCoercion::Integer(7));
        assert_eq!(IntegerCoercion::exact(Some(&json!(-2))), IntegerCoercion::Integer(-2));
        assert_eq!(IntegerCoercion::exact(Some(&json!(true))), IntegerCoercion::WasBoolean);
        for value in [json!("7"), json!(7.0), json!(null)] {
            assert_eq!(
                IntegerCoercion::exact(Some(&value)),
                IntegerCoercion::NotAnInteger,
                "value: {value}"
            );
        }
        assert_eq!(IntegerCoercion::exact(None), IntegerCoercion::NotAnInteger);
    }

    #[test]
    fn test_strict_accepts_integers_and_digit_strings() {
        assert_eq!(IntegerCoercion::strict(Some(&json!(5))), IntegerCoercion::Integer(5));
        assert_eq!(IntegerCoercion::strict(Some(&json!(-1))), IntegerCoercion::Integer(-1));
        assert_eq!(IntegerCoercion::strict(Some(&json!("10"))), IntegerCoercion::Integer(10));
        assert_eq!(IntegerCoercion::strict(Some(&json!("0"))), IntegerCoercion::Integer(0));
    }

    #[test]
    fn test_strict_rejects_everything_else() {
        for value in [
            json!("abc"),
            json!(""),
            json!("   "),
            json!(" 5"),
            json!("-1"),
            json!("@#$%"),
            json!(5.5),
            json!(5.0),
            json!(null),
            json!({"nested": "value"}),
            json!([1, 2, 3]),
        ] {
            assert_eq!(
                IntegerCoercion::strict(Some(&value)),
                IntegerCoercion::NotAnInteger,
                "value: {value}"
            );
        }
        assert_eq!(IntegerCoercion::strict(None), IntegerCoercion::NotAnInteger);
    }

    #[test]
    fn test_strict_rejects_overflowing_digit_strings() {
        let huge = json!("99999999999999999999999");
        assert_eq!(IntegerCoercion::strict(Some(&huge)), IntegerCoercion::NotAnInteger);
    }

    #[test]
    fn test_lenient_accepts_padded_and_signed_strings() {
        assert_eq!(IntegerCoercion::lenient(Some(&json!(" 3 "))), IntegerCoercion::Integer(3));
        assert_eq!(IntegerCoercion::lenient(Some(&json!("-2"))), IntegerCoercion::Integer(-2));
        assert_eq!(IntegerCoercion::lenient(Some(&json!("+4"))), IntegerCoercion::Integer(4));
    }

    #[test]
    fn test_lenient_truncates_floats() {
        assert_eq!(IntegerCoercion::lenient(Some(&json!(3.0))), IntegerCoercion::Integer(3));
        assert_eq!(IntegerCoercion::lenient(Some(&json!(5.9))), IntegerCoercion::Integer(5));
        assert_eq!(IntegerCoercion::lenient(Some(&json!(-1.5))), IntegerCoercion::Integer(-1));
    }

    #[test]
    fn test_lenient_rejects_unparsable_values() {
        for value in [json!("invalid"), json!(""), json!("   "), json!("@#$%"), json!(null), json!([1])] {
            assert_eq!(
                IntegerCoercion::lenient(Some(&value)),
                IntegerCoercion::NotAnInteger,
                "value: {value}"
            );
        }
    }

    #[test]
    fn test_positive_filter() {
        assert_eq!(IntegerCoercion::Integer(3).positive(), Some(3));
        assert_eq!(IntegerCoercion::Integer(0).positive(), None);
        assert_eq!(IntegerCoercion::Integer(-4).positive(), None);
        assert_eq!(IntegerCoercion::WasBoolean.positive(), None);
        assert_eq!(IntegerCoercion::NotAnInteger.integer(), None);
    }
}
