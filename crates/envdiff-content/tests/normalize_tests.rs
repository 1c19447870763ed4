//! Tests for value normalization

use envdiff_content::{NormalizedValue, ScalarValue, normalize};
use rstest::rstest;

fn text(s: &str) -> ScalarValue {
    ScalarValue::String(s.to_string())
}

#[rstest]
#[case(text("true"), NormalizedValue::Bool(true))]
#[case(text("FALSE"), NormalizedValue::Bool(false))]
#[case(text("  True "), NormalizedValue::Bool(true))]
#[case(text("1000"), NormalizedValue::Integer(1000))]
#[case(text(" -42 "), NormalizedValue::Integer(-42))]
#[case(text("+7"), NormalizedValue::Integer(7))]
#[case(text("0.50"), NormalizedValue::Float("0.5".to_string()))]
#[case(text("1e3"), NormalizedValue::Float("1000.0".to_string()))]
#[case(text("  debug\n"), NormalizedValue::String("debug".to_string()))]
#[case(text("null"), NormalizedValue::String("null".to_string()))]
#[case(text("yes"), NormalizedValue::String("yes".to_string()))]
#[case(text("NaN"), NormalizedValue::String("NaN".to_string()))]
#[case(text(""), NormalizedValue::String(String::new()))]
#[case(ScalarValue::Null, NormalizedValue::Null)]
#[case(ScalarValue::Integer(5432), NormalizedValue::Integer(5432))]
#[case(ScalarValue::Float(2.5), NormalizedValue::Float("2.5".to_string()))]
#[case(ScalarValue::Bool(true), NormalizedValue::Bool(true))]
fn test_normalize_cases(#[case] input: ScalarValue, #[case] expected: NormalizedValue) {
    assert_eq!(normalize(&input), expected);
}

#[test]
fn test_rate_limit_string_and_number_are_equal() {
    assert_eq!(normalize(&text("1000")), normalize(&ScalarValue::Integer(1000)));
}

#[test]
fn test_float_string_and_float_are_equal() {
    assert_eq!(normalize(&text("0.25")), normalize(&ScalarValue::Float(0.25)));
}

#[test]
fn test_large_integers_do_not_lose_precision() {
    let big = "170141183460469231731687303715884105727";
    assert_eq!(normalize(&text(big)), NormalizedValue::Integer(i128::MAX));
}

#[test]
fn test_serialized_shape() {
    let json = serde_json::to_string(&normalize(&text("1000"))).unwrap();
    assert_eq!(json, r#"{"type":"integer","value":1000}"#);

    let json = serde_json::to_string(&NormalizedValue::Null).unwrap();
    assert_eq!(json, r#"{"type":"null"}"#);
}
