use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use chrono::Utc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::engine::kmeans;
use crate::extractor::FeatureExtractor;
use crate::store::{Cluster, ClusterMembership, ClusterStore, Job, JobStatus};

/// Everything one clustering execution needs, threaded explicitly.
pub(crate) struct WorkerContext {
    pub(crate) store: Arc<ClusterStore>,
    pub(crate) extractor: Arc<dyn FeatureExtractor>,
    pub(crate) max_iters: usize,
    pub(crate) seed: u64,
}

/// Dequeue job ids and run each on the blocking pool, at most `workers`
/// concurrently. The loop drains and exits once every queue sender is
/// dropped.
pub(crate) async fn worker_loop(
    ctx: Arc<WorkerContext>,
    mut queue: mpsc::Receiver<Uuid>,
    workers: usize,
) {
    let semaphore = Arc::new(Semaphore::new(workers));

    while let Some(job_id) = queue.recv().await {
        let permit = match semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };
        let ctx = ctx.clone();
        tokio::task::spawn_blocking(move || {
            execute(&ctx, job_id);
            drop(permit);
        });
    }
    debug!("worker queue closed, loop exiting");
}

/// Run one clustering job to a terminal state.
///
/// The claim step guarantees at-most-one execution per job: whichever caller
/// flips `pending → running` proceeds, everyone else returns without side
/// effects. Failures are recorded on the job, never raised — there is no
/// synchronous caller to raise them to.
pub(crate) fn execute(ctx: &WorkerContext, job_id: Uuid) {
    let job = match ctx.store.get_job(job_id) {
        Ok(Some(job)) => job,
        Ok(None) => {
            error!(%job_id, "queued job missing from store");
            return;
        }
        Err(err) => {
            error!(%job_id, error = %err, "failed to load queued job");
            return;
        }
    };

    match ctx.store.mark_running(job_id, Utc::now()) {
        Ok(true) => {}
        Ok(false) => {
            debug!(%job_id, status = %job.status, "job already claimed, skipping");
            return;
        }
        Err(err) => {
            error!(%job_id, error = %err, "failed to claim job");
            return;
        }
    }

    let outcome = match run_clustering(ctx, &job) {
        Ok(()) => {
            info!(%job_id, n_clusters = job.n_clusters, "clustering job done");
            JobStatus::Done
        }
        Err(err) => {
            warn!(%job_id, error = %err, "clustering job failed");
            JobStatus::Failed
        }
    };

    if let Err(err) = ctx.store.mark_finished(job_id, outcome, Utc::now()) {
        error!(%job_id, error = %err, "failed to record job outcome");
    }
}

fn run_clustering(ctx: &WorkerContext, job: &Job) -> Result<()> {
    let points = ctx.store.load_datapoints(&job.target_ids)?;
    ensure!(!points.is_empty(), "no target data points resolved");

    // Pair each vector with its source id up front; labels and distances
    // from the engine line up with this order
    let mut ids = Vec::with_capacity(points.len());
    let mut vectors = Vec::with_capacity(points.len());
    for point in &points {
        let vector = ctx.extractor.extract(&point.payload);
        if vector.is_empty() {
            debug!(datapoint_id = %point.id, "skipping data point with no numeric features");
            continue;
        }
        ids.push(point.id);
        vectors.push(vector);
    }
    ensure!(
        ids.len() >= job.n_clusters,
        "only {} usable data points for {} clusters",
        ids.len(),
        job.n_clusters
    );

    let output = kmeans(&vectors, job.n_clusters, ctx.max_iters, ctx.seed)
        .context("clustering engine rejected input")?;

    let clusters: Vec<Cluster> = output
        .centroids
        .iter()
        .enumerate()
        .map(|(label, centroid)| Cluster {
            id: Uuid::new_v4(),
            job_id: job.id,
            label: label as u32,
            centroid: centroid.clone(),
        })
        .collect();

    let memberships: Vec<ClusterMembership> = ids
        .iter()
        .zip(output.labels.iter().zip(output.distances.iter()))
        .map(|(&datapoint_id, (&label, &distance))| ClusterMembership {
            cluster_id: clusters[label].id,
            datapoint_id,
            distance,
        })
        .collect();

    ctx.store.save_results(job.id, &clusters, &memberships)
}
