mod centroid;
mod distance;
mod kmeans;
mod types;


pub use kmeans::kmeans;
pub use types::{EngineError, KMeansOutput};
