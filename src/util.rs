/// Utility helpers shared by the collector components.
///
/// This module contains:
/// - Decimal extraction from loosely typed JSON payloads
/// - Small formatting helpers
///
/// IMPORTANT:
/// - No upstream-specific business logic should live here.
/// - Helpers must never panic on malformed input.
///

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

/// Parses a JSON value into a `Decimal`.
///
/// Upstream APIs are inconsistent: Coinbase sends prices as
/// strings ("50000.12"), the FX API sends plain numbers (92.5).
/// Both are accepted, including exponent notation ("1e-8").
///
/// Returns `None` for anything else (null, bool, objects, NaN
/// strings, out-of-range numbers).
pub fn decimal_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => parse_decimal(s),
        Value::Number(n) => parse_decimal(&n.to_string()),
        _ => None,
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .ok()
        .or_else(|| Decimal::from_scientific(raw).ok())
}

/// Walks a path of object keys, e.g. `["data", "amount"]`.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(*key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_strings_and_numbers() {
        assert_eq!(decimal_from_json(&json!("50000.5")), Some(Decimal::new(500005, 1)));
        assert_eq!(decimal_from_json(&json!(92.5)), Some(Decimal::new(925, 1)));
        assert_eq!(decimal_from_json(&json!(90)), Some(Decimal::from(90)));
        assert_eq!(decimal_from_json(&json!("1e-2")), Some(Decimal::new(1, 2)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(decimal_from_json(&json!("NaN")), None);
        assert_eq!(decimal_from_json(&json!(null)), None);
        assert_eq!(decimal_from_json(&json!({"amount": "1"})), None);
    }

    #[test]
    fn lookup_follows_nested_keys() {
        let v = json!({ "data": { "amount": "1.0" } });
        assert_eq!(lookup(&v, &["data", "amount"]), Some(&json!("1.0")));
        assert_eq!(lookup(&v, &["data", "missing"]), None);
    }
}
