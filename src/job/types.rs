use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::store::{Job, JobStatus};

/// A clustering submission: how many clusters to build over which points.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    #[serde(default = "default_n_clusters")]
    pub n_clusters: usize,
    pub datapoint_ids: Vec<Uuid>,
}

fn default_n_clusters() -> usize {
    5
}

impl SubmitRequest {
    pub fn new(n_clusters: usize, datapoint_ids: Vec<Uuid>) -> Self {
        Self {
            n_clusters,
            datapoint_ids,
        }
    }
}

/// Caller-facing view of a job's lifecycle state.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub id: Uuid,
    pub status: JobStatus,
    pub n_clusters: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            status: job.status,
            n_clusters: job.n_clusters,
            started_at: job.started_at,
            finished_at: job.finished_at,
        }
    }
}

/// Failures surfaced on the synchronous orchestrator paths. Background
/// execution failures never appear here; they are recorded as job state.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("job not found: {0}")]
    NotFound(Uuid),

    #[error("job not finished: {0}")]
    NotReady(Uuid),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
