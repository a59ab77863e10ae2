use anyhow::{Context, Result};
use rusqlite::params;
use uuid::Uuid;

use super::types::{Cluster, ClusterMembership, ClusterResult};
use super::ClusterStore;

impl ClusterStore {
    /// Persist the full outcome of a job in one transaction.
    ///
    /// Either all clusters and memberships become visible together or none
    /// do — concurrent readers never observe a partial write.
    pub fn save_results(
        &self,
        job_id: Uuid,
        clusters: &[Cluster],
        memberships: &[ClusterMembership],
    ) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .context("Failed to open results transaction")?;

        {
            let mut insert_cluster = tx
                .prepare(
                    "INSERT INTO clusters (id, job_id, label, centroid) \
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .context("Failed to prepare statement")?;
            for cluster in clusters {
                let centroid_json = serde_json::to_string(&cluster.centroid)
                    .context("Failed to encode centroid")?;
                insert_cluster
                    .execute(params![
                        cluster.id.to_string(),
                        job_id.to_string(),
                        cluster.label,
                        centroid_json
                    ])
                    .context(format!("Failed to insert cluster: {}", cluster.id))?;
            }

            let mut insert_membership = tx
                .prepare(
                    "INSERT INTO cluster_memberships (cluster_id, datapoint_id, distance) \
                     VALUES (?1, ?2, ?3)",
                )
                .context("Failed to prepare statement")?;
            for membership in memberships {
                insert_membership
                    .execute(params![
                        membership.cluster_id.to_string(),
                        membership.datapoint_id.to_string(),
                        membership.distance
                    ])
                    .context(format!(
                        "Failed to insert membership for data point: {}",
                        membership.datapoint_id
                    ))?;
            }
        }

        tx.commit().context("Failed to commit results")
    }

    /// Read the clusters of a job ordered by label ascending, each with its
    /// member data-point ids. Whether the job is actually `done` is the
    /// orchestrator's check, not the store's.
    pub fn get_results(&self, job_id: Uuid) -> Result<Vec<ClusterResult>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, label, centroid FROM clusters \
                 WHERE job_id = ?1 ORDER BY label ASC",
            )
            .context("Failed to prepare statement")?;

        let clusters: Vec<(String, u32, String)> = stmt
            .query_map(params![job_id.to_string()], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })
            .context("Failed to query clusters")?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to collect clusters")?;

        let mut members_stmt = conn
            .prepare(
                "SELECT datapoint_id FROM cluster_memberships \
                 WHERE cluster_id = ?1 ORDER BY rowid ASC",
            )
            .context("Failed to prepare statement")?;

        let mut results = Vec::with_capacity(clusters.len());
        for (cluster_id, label, centroid_json) in clusters {
            let member_ids: Vec<String> = members_stmt
                .query_map(params![cluster_id], |row| row.get(0))
                .context("Failed to query memberships")?
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to collect memberships")?;

            let members = member_ids
                .iter()
                .map(|raw| Uuid::parse_str(raw))
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to decode member ids")?;

            results.push(ClusterResult {
                label,
                centroid: serde_json::from_str(&centroid_json)
                    .context("Failed to decode centroid")?,
                members,
            });
        }

        Ok(results)
    }
}
