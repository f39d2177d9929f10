//! Incident reports with per-machine de-duplication.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::model::*;
use crate::rules::duplicate;

impl super::Db {
    /// Open and In Progress incidents joined with machine and reporter,
    /// newest first.
    pub async fn list_open_incidents(&self) -> Result<Vec<OpenIncident>> {
        let rows: Vec<OpenIncidentRow> = sqlx::query_as(
            "SELECT i.id, i.description, i.status, i.created_at,
                    m.name AS machine_name, m.machine_type, u.name AS reported_by
             FROM incident i
             JOIN machine m ON m.id = i.machine_id
             JOIN app_user u ON u.id = i.reported_by
             WHERE i.status IN ('open', 'in_progress')
             ORDER BY i.created_at DESC, i.id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(OpenIncidentRow::try_into_open_incident)
            .collect()
    }

    /// Would `description` collide with an active incident on the machine?
    pub async fn would_duplicate(&self, machine_id: MachineId, description: &str) -> Result<bool> {
        let existing = active_descriptions(&self.pool, machine_id).await?;
        Ok(duplicate::would_duplicate(description, &existing))
    }

    /// Insert an Open incident unless an equivalent one is active.
    ///
    /// The read and the insert share a transaction holding
    /// `pg_advisory_xact_lock(machine_id)`, so two reports for the same machine
    /// cannot both pass the duplicate check.
    pub async fn report_incident(&self, new: &NewIncident) -> Result<IncidentId> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(new.machine_id.0)
            .execute(&mut *tx)
            .await?;

        let existing = active_descriptions(&mut *tx, new.machine_id).await?;
        if duplicate::would_duplicate(&new.description, &existing) {
            tracing::info!(
                machine_id = %new.machine_id,
                signature = %duplicate::signature(&new.description),
                "duplicate incident rejected"
            );
            return Err(Error::Conflict(format!(
                "an equivalent incident is already open on machine {}",
                new.machine_id
            )));
        }

        let (id,): (IncidentId,) = sqlx::query_as(
            "INSERT INTO incident (description, status, machine_id, reported_by, created_at)
             VALUES ($1, $2, $3, $4, now())
             RETURNING id",
        )
        .bind(&new.description)
        .bind(IncidentStatus::Open.as_str())
        .bind(new.machine_id)
        .bind(new.reported_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(super::translate)?;

        tx.commit().await?;

        tracing::info!(
            incident_id = %id,
            machine_id = %new.machine_id,
            reported_by = %new.reported_by,
            "incident reported"
        );
        Ok(id)
    }
}

async fn active_descriptions<'e, E>(executor: E, machine_id: MachineId) -> Result<Vec<String>>
where
    E: sqlx::PgExecutor<'e>,
{
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT description FROM incident
         WHERE machine_id = $1 AND status IN ('open', 'in_progress')",
    )
    .bind(machine_id)
    .fetch_all(executor)
    .await?;
    Ok(rows.into_iter().map(|(d,)| d).collect())
}

/// Internal row type for sqlx::FromRow.
#[derive(sqlx::FromRow)]
struct OpenIncidentRow {
    id: IncidentId,
    description: String,
    status: String,
    created_at: DateTime<Utc>,
    machine_name: String,
    machine_type: String,
    reported_by: String,
}

impl OpenIncidentRow {
    fn try_into_open_incident(self) -> Result<OpenIncident> {
        Ok(OpenIncident {
            id: self.id,
            description: self.description,
            status: self.status.parse()?,
            created_at: self.created_at,
            machine_name: self.machine_name,
            machine_type: self.machine_type,
            reported_by: self.reported_by,
        })
    }
}
