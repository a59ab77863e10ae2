use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use serde_json::Value;
use uuid::Uuid;

use super::types::DataPoint;
use super::ClusterStore;

impl ClusterStore {
    /// Insert a new data point with a fresh identifier
    pub fn insert_datapoint(&self, payload: Value) -> Result<DataPoint> {
        let point = DataPoint {
            id: Uuid::new_v4(),
            payload,
            created_at: Utc::now(),
        };
        let payload_json =
            serde_json::to_string(&point.payload).context("Failed to encode payload")?;

        self.conn()
            .execute(
                "INSERT INTO data_points (id, payload, created_at) VALUES (?1, ?2, ?3)",
                params![point.id.to_string(), payload_json, point.created_at],
            )
            .context(format!("Failed to insert data point: {}", point.id))?;

        Ok(point)
    }

    /// Fetch a data point by id
    pub fn get_datapoint(&self, id: Uuid) -> Result<Option<DataPoint>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT payload, created_at FROM data_points WHERE id = ?1")
            .context("Failed to prepare statement")?;
        Self::query_datapoint(&mut stmt, id)
    }

    /// Resolve a batch of data-point ids. Missing ids are simply absent from
    /// the result; present points come back in the requested order.
    pub fn load_datapoints(&self, ids: &[Uuid]) -> Result<Vec<DataPoint>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT payload, created_at FROM data_points WHERE id = ?1")
            .context("Failed to prepare statement")?;

        let mut points = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(point) = Self::query_datapoint(&mut stmt, id)? {
                points.push(point);
            }
        }
        Ok(points)
    }

    fn query_datapoint(
        stmt: &mut rusqlite::Statement<'_>,
        id: Uuid,
    ) -> Result<Option<DataPoint>> {
        let row = stmt
            .query_row(params![id.to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, DateTime<Utc>>(1)?,
                ))
            })
            .optional()
            .context(format!("Failed to query data point: {}", id))?;

        let Some((payload_json, created_at)) = row else {
            return Ok(None);
        };

        Ok(Some(DataPoint {
            id,
            payload: serde_json::from_str(&payload_json)
                .context("Failed to decode data point payload")?,
            created_at,
        }))
    }
}
