use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// A user-owned record with an arbitrary JSON payload. Immutable after
/// creation; clustering only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPoint {
    pub id: Uuid,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle of a clustering job: `Pending → Running → {Done, Failed}`.
/// `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
#[error("unknown job status: {0}")]
pub struct UnknownJobStatus(String);

impl FromStr for JobStatus {
    type Err = UnknownJobStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "done" => Ok(JobStatus::Done),
            "failed" => Ok(JobStatus::Failed),
            other => Err(UnknownJobStatus(other.to_string())),
        }
    }
}

/// One clustering run. Parameters are fixed at creation; only the background
/// execution path mutates the status afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: Uuid,
    pub n_clusters: usize,
    pub target_ids: Vec<Uuid>,
    pub status: JobStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// One partition produced by a completed job. Labels are 0-indexed and
/// unique within a job; never mutated after the job completes.
#[derive(Debug, Clone, Serialize)]
pub struct Cluster {
    pub id: Uuid,
    pub job_id: Uuid,
    pub label: u32,
    pub centroid: Vec<f64>,
}

/// Assignment of one data point to one cluster, with its Euclidean distance
/// to the cluster's centroid.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterMembership {
    pub cluster_id: Uuid,
    pub datapoint_id: Uuid,
    pub distance: f64,
}

/// Read view of one cluster of a finished job: label, centroid, and the ids
/// of its member data points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterResult {
    pub label: u32,
    pub centroid: Vec<f64>,
    pub members: Vec<Uuid>,
}
