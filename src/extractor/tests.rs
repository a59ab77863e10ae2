use super::*;
use serde_json::json;

#[test]
fn test_numeric_fields_ordered_by_key() {
    let payload = json!({ "z_score": 3.5, "age": 41, "rating": 2 });
    let vector = NumericFields.extract(&payload);
    assert_eq!(vector, vec![41.0, 2.0, 3.5]);
}

#[test]
fn test_non_numeric_fields_discarded() {
    let payload = json!({
        "score": 1.5,
        "name": "alpha",
        "active": true,
        "tags": [1, 2, 3],
        "meta": { "inner": 7 },
        "missing": null
    });
    let vector = NumericFields.extract(&payload);
    assert_eq!(vector, vec![1.5]);
}

#[test]
fn test_integer_and_float_both_numeric() {
    let payload = json!({ "a": 1, "b": -2.25 });
    let vector = NumericFields.extract(&payload);
    assert_eq!(vector, vec![1.0, -2.25]);
}

#[test]
fn test_payload_without_numbers_yields_empty() {
    let payload = json!({ "name": "beta", "ok": false });
    assert!(NumericFields.extract(&payload).is_empty());
}

#[test]
fn test_non_object_payload_yields_empty() {
    assert!(NumericFields.extract(&json!([1.0, 2.0])).is_empty());
    assert!(NumericFields.extract(&json!("text")).is_empty());
    assert!(NumericFields.extract(&json!(null)).is_empty());
}
