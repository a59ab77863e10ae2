mod numeric;

#[cfg(test)]
mod tests;

pub use numeric::NumericFields;

use serde_json::Value;

/// Strategy turning a raw data-point payload into a fixed-order feature
/// vector. Implementations must be deterministic: the same payload always
/// yields the same vector, and payloads sharing a key set yield vectors with
/// the same layout.
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, payload: &Value) -> Vec<f64>;
}
