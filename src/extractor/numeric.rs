use serde_json::Value;

use super::FeatureExtractor;

/// Default projection: top-level numeric fields only, ordered
/// lexicographically by key.
///
/// Strings, booleans, nulls, arrays, and nested objects are discarded;
/// booleans are deliberately not coerced to 0/1. A payload that is not a JSON
/// object, or has no numeric fields, yields an empty vector and the point is
/// skipped by the clustering worker.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericFields;

impl FeatureExtractor for NumericFields {
    fn extract(&self, payload: &Value) -> Vec<f64> {
        let Some(map) = payload.as_object() else {
            return Vec::new();
        };

        let mut fields: Vec<(&str, f64)> = map
            .iter()
            .filter_map(|(key, value)| value.as_f64().map(|n| (key.as_str(), n)))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        fields.into_iter().map(|(_, n)| n).collect()
    }
}
