mod datapoints;
mod jobs;
mod results;
mod types;

#[cfg(test)]
mod tests;

pub use types::{
    Cluster, ClusterMembership, ClusterResult, DataPoint, Job, JobStatus, UnknownJobStatus,
};

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Durable store for jobs, clusters, memberships, and data points.
///
/// One handle wraps one SQLite connection; access is serialized through a
/// mutex so the handle can be shared between the submission path and the
/// background workers. There is no ambient global — every caller is handed
/// the store explicitly.
pub struct ClusterStore {
    conn: Mutex<Connection>,
}

impl ClusterStore {
    /// Create a new in-memory store (used by tests and the demo binary)
    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to create in-memory database")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Open (or create) a store backed by a database file
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .context(format!("Failed to open database at {}", path))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn()
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS data_points (
                    id TEXT PRIMARY KEY,
                    payload TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS jobs (
                    id TEXT PRIMARY KEY,
                    n_clusters INTEGER NOT NULL,
                    target_ids TEXT NOT NULL,
                    status TEXT NOT NULL,
                    started_at TEXT,
                    finished_at TEXT
                );

                CREATE TABLE IF NOT EXISTS clusters (
                    id TEXT PRIMARY KEY,
                    job_id TEXT NOT NULL,
                    label INTEGER NOT NULL,
                    centroid TEXT NOT NULL,
                    UNIQUE (job_id, label),
                    FOREIGN KEY (job_id) REFERENCES jobs(id)
                );

                CREATE TABLE IF NOT EXISTS cluster_memberships (
                    cluster_id TEXT NOT NULL,
                    datapoint_id TEXT NOT NULL,
                    distance REAL NOT NULL,
                    PRIMARY KEY (cluster_id, datapoint_id),
                    FOREIGN KEY (cluster_id) REFERENCES clusters(id),
                    FOREIGN KEY (datapoint_id) REFERENCES data_points(id)
                );

                CREATE INDEX IF NOT EXISTS idx_clusters_job ON clusters(job_id);
                CREATE INDEX IF NOT EXISTS idx_memberships_cluster
                    ON cluster_memberships(cluster_id);
                "#,
            )
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
