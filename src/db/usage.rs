//! Usage sessions: start and end with one active session per machine.

use crate::error::Result;
use crate::model::*;
use crate::rules::usage;

const SESSION_COLUMNS: &str = "id, machine_id, user_id, started_at, ended_at";

impl super::Db {
    /// Open a usage session on a free machine.
    ///
    /// The partial unique index `machine_usage_one_active` backs the read
    /// check: if a concurrent start slips past it, the insert fails with a
    /// unique violation that surfaces as `Error::Conflict`.
    pub async fn start_usage(&self, machine_id: MachineId, user_id: UserId) -> Result<UsageId> {
        let mut tx = self.pool.begin().await?;

        let active: Option<UsageSession> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM machine_usage
             WHERE machine_id = $1 AND ended_at IS NULL
             FOR UPDATE"
        ))
        .bind(machine_id)
        .fetch_optional(&mut *tx)
        .await?;
        if let Err(e) = usage::ensure_machine_free(machine_id, active.as_ref()) {
            tracing::info!(%machine_id, "usage start rejected: machine busy");
            return Err(e);
        }

        let (id,): (UsageId,) = sqlx::query_as(
            "INSERT INTO machine_usage (machine_id, user_id, started_at, ended_at)
             VALUES ($1, $2, now(), NULL)
             RETURNING id",
        )
        .bind(machine_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(super::translate)?;

        tx.commit().await.map_err(super::translate)?;

        tracing::info!(usage_id = %id, %machine_id, %user_id, "usage started");
        Ok(id)
    }

    /// Close the active session on a machine.
    pub async fn end_usage(&self, machine_id: MachineId) -> Result<UsageId> {
        let closed: Option<(UsageId,)> = sqlx::query_as(
            "UPDATE machine_usage SET ended_at = now()
             WHERE machine_id = $1 AND ended_at IS NULL
             RETURNING id",
        )
        .bind(machine_id)
        .fetch_optional(&self.pool)
        .await?;

        let id = usage::ensure_session_closed(machine_id, closed.map(|(id,)| id))?;
        tracing::info!(usage_id = %id, %machine_id, "usage ended");
        Ok(id)
    }

    /// The active session on a machine, if any.
    pub async fn active_usage(&self, machine_id: MachineId) -> Result<Option<UsageSession>> {
        let session = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM machine_usage
             WHERE machine_id = $1 AND ended_at IS NULL"
        ))
        .bind(machine_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    /// Every active session, oldest first.
    pub async fn list_active_usage(&self) -> Result<Vec<UsageSession>> {
        let sessions = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM machine_usage
             WHERE ended_at IS NULL
             ORDER BY started_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }
}
