use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use super::types::{Job, JobStatus};
use super::ClusterStore;

impl ClusterStore {
    /// Persist a new job in `pending` state with a fresh identifier
    pub fn create_job(&self, n_clusters: usize, target_ids: &[Uuid]) -> Result<Job> {
        let job = Job {
            id: Uuid::new_v4(),
            n_clusters,
            target_ids: target_ids.to_vec(),
            status: JobStatus::Pending,
            started_at: None,
            finished_at: None,
        };
        let ids_json = serde_json::to_string(&job.target_ids)
            .context("Failed to encode job target ids")?;

        self.conn()
            .execute(
                "INSERT INTO jobs (id, n_clusters, target_ids, status) VALUES (?1, ?2, ?3, ?4)",
                params![
                    job.id.to_string(),
                    job.n_clusters as i64,
                    ids_json,
                    job.status.as_str()
                ],
            )
            .context(format!("Failed to insert job: {}", job.id))?;

        Ok(job)
    }

    /// Fetch a job by id
    pub fn get_job(&self, id: Uuid) -> Result<Option<Job>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT n_clusters, target_ids, status, started_at, finished_at \
                 FROM jobs WHERE id = ?1",
            )
            .context("Failed to prepare statement")?;

        let row = stmt
            .query_row(params![id.to_string()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<DateTime<Utc>>>(3)?,
                    row.get::<_, Option<DateTime<Utc>>>(4)?,
                ))
            })
            .optional()
            .context(format!("Failed to query job: {}", id))?;

        let Some((n_clusters, ids_json, status, started_at, finished_at)) = row else {
            return Ok(None);
        };

        Ok(Some(Job {
            id,
            n_clusters: n_clusters as usize,
            target_ids: serde_json::from_str(&ids_json)
                .context("Failed to decode job target ids")?,
            status: status.parse().context("Failed to decode job status")?,
            started_at,
            finished_at,
        }))
    }

    /// The claim step: conditionally transition `pending → running`.
    ///
    /// Returns whether this caller won the claim. A `false` result means the
    /// job was already claimed (or finished) and must not be executed again.
    pub fn mark_running(&self, id: Uuid, started_at: DateTime<Utc>) -> Result<bool> {
        let updated = self
            .conn()
            .execute(
                "UPDATE jobs SET status = 'running', started_at = ?2 \
                 WHERE id = ?1 AND status = 'pending'",
                params![id.to_string(), started_at],
            )
            .context(format!("Failed to claim job: {}", id))?;
        Ok(updated == 1)
    }

    /// Record a terminal outcome (`done` or `failed`) and its timestamp.
    /// `done` and `failed` are final: a job that already reached one of them
    /// is never moved again.
    pub fn mark_finished(
        &self,
        id: Uuid,
        status: JobStatus,
        finished_at: DateTime<Utc>,
    ) -> Result<()> {
        if !status.is_terminal() {
            bail!("non-terminal status {} for job {}", status, id);
        }
        let updated = self
            .conn()
            .execute(
                "UPDATE jobs SET status = ?2, finished_at = ?3 \
                 WHERE id = ?1 AND status IN ('pending', 'running')",
                params![id.to_string(), status.as_str(), finished_at],
            )
            .context(format!("Failed to finish job: {}", id))?;
        if updated == 0 {
            bail!("job not found or already terminal: {}", id);
        }
        Ok(())
    }
}
