use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tracing::error;
use uuid::Uuid;

use crate::extractor::{FeatureExtractor, NumericFields};
use crate::store::{ClusterResult, ClusterStore, JobStatus};

use super::types::{JobError, JobView, SubmitRequest};
use super::worker::{self, WorkerContext};

/// Accepts clustering submissions and exposes status/result reads.
///
/// Submission is decoupled from computation: `submit` records the job,
/// enqueues its id, and returns immediately; a background worker loop picks
/// the job up and drives it to `done` or `failed`. Dropping the orchestrator
/// closes the queue, letting the loop drain and exit.
pub struct JobOrchestrator {
    store: Arc<ClusterStore>,
    queue: mpsc::Sender<Uuid>,
}

/// Mutable builder for a [`JobOrchestrator`]. `build` spawns the worker loop
/// and must run inside a tokio runtime.
pub struct JobOrchestratorBuilder {
    store: Arc<ClusterStore>,
    extractor: Arc<dyn FeatureExtractor>,
    workers: usize,
    max_iters: usize,
    seed: u64,
    queue_depth: usize,
}

impl JobOrchestratorBuilder {
    pub fn new(store: Arc<ClusterStore>) -> Self {
        Self {
            store,
            extractor: Arc::new(NumericFields),
            workers: 2,
            max_iters: 100,
            seed: 0,
            queue_depth: 64,
        }
    }

    /// Substitute the feature-extraction strategy
    pub fn extractor(mut self, extractor: Arc<dyn FeatureExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Set how many jobs may execute concurrently
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the iteration bound for the clustering engine
    pub fn max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the centroid-seeding RNG seed (fixed for reproducible runs)
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> JobOrchestrator {
        let (tx, rx) = mpsc::channel(self.queue_depth);
        let ctx = Arc::new(WorkerContext {
            store: self.store.clone(),
            extractor: self.extractor,
            max_iters: self.max_iters,
            seed: self.seed,
        });
        tokio::spawn(worker::worker_loop(ctx, rx, self.workers));

        JobOrchestrator {
            store: self.store,
            queue: tx,
        }
    }
}

impl JobOrchestrator {
    pub fn builder(store: Arc<ClusterStore>) -> JobOrchestratorBuilder {
        JobOrchestratorBuilder::new(store)
    }

    /// Validate and record a clustering job, schedule its execution, and
    /// return the `pending` job without waiting for the computation.
    pub async fn submit(&self, request: SubmitRequest) -> Result<JobView, JobError> {
        if request.n_clusters < 1 {
            return Err(JobError::InvalidRequest(
                "n_clusters must be at least 1".into(),
            ));
        }
        if request.datapoint_ids.is_empty() {
            return Err(JobError::InvalidRequest(
                "datapoint_ids must not be empty".into(),
            ));
        }

        let job = self
            .store
            .create_job(request.n_clusters, &request.datapoint_ids)?;

        if self.queue.send(job.id).await.is_err() {
            // Worker loop is gone; leave a terminal record instead of a
            // forever-pending job
            error!(job_id = %job.id, "worker queue closed, failing job");
            fail_unclaimed(&self.store, job.id)?;
            return Err(JobError::Store(anyhow!("worker queue closed")));
        }

        Ok(job.into())
    }

    /// Read-through to the job store
    pub async fn get_status(&self, job_id: Uuid) -> Result<JobView, JobError> {
        let job = self
            .store
            .get_job(job_id)?
            .ok_or(JobError::NotFound(job_id))?;
        Ok(job.into())
    }

    /// Read a finished job's clusters, ordered by label ascending
    pub async fn get_result(&self, job_id: Uuid) -> Result<Vec<ClusterResult>, JobError> {
        let job = self
            .store
            .get_job(job_id)?
            .ok_or(JobError::NotFound(job_id))?;
        if job.status != JobStatus::Done {
            return Err(JobError::NotReady(job_id));
        }
        Ok(self.store.get_results(job_id)?)
    }
}

/// Drive a job that will never be picked up to `failed` through the regular
/// state machine: claim it first, then record the terminal outcome. A lost
/// claim means someone else owns the job and it is left alone.
pub(crate) fn fail_unclaimed(store: &ClusterStore, job_id: Uuid) -> anyhow::Result<()> {
    let now = chrono::Utc::now();
    if store.mark_running(job_id, now)? {
        store.mark_finished(job_id, JobStatus::Failed, now)?;
    }
    Ok(())
}
