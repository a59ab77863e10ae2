// Public API exports
pub mod engine;
pub mod extractor;
pub mod job;
pub mod store;

// Re-export main types for convenience
pub use engine::{kmeans, EngineError, KMeansOutput};

pub use extractor::{FeatureExtractor, NumericFields};

pub use job::{JobError, JobOrchestrator, JobOrchestratorBuilder, JobView, SubmitRequest};

pub use store::{
    Cluster, ClusterMembership, ClusterResult, ClusterStore, DataPoint, Job, JobStatus,
};
