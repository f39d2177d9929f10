//! Postgres store: connection pool, migrations, seeding, and error translation.
//!
//! Queries are split by table family into submodules, each adding methods to
//! [`Db`]. The [`crate::store::WorkshopStore`] impl lives in `store`.

mod catalog;
mod incident;
mod store;
mod usage;

use sqlx::PgPool;
use sqlx::error::ErrorKind;
use sqlx::postgres::PgPoolOptions;

use crate::error::{Error, Result};
use crate::seed;

/// Partial unique index backing the one-active-session rule.
pub(crate) const ACTIVE_USAGE_INDEX: &str = "machine_usage_one_active";

/// Database handle. Owns the connection pool shared across all modules.
#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    /// Connect to Postgres and create a connection pool.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Run all pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Other(format!("migration failed: {e}")))?;
        Ok(())
    }

    /// Simple health check: run a SELECT 1.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Insert the sample machines and users when the machine table is empty.
    pub async fn seed_if_empty(&self) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        // Serialize concurrent boots on the same database.
        sqlx::query("LOCK TABLE machine IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM machine")
            .fetch_one(&mut *tx)
            .await?;
        if count > 0 {
            return Ok(false);
        }

        for (name, machine_type, status) in seed::MACHINES {
            sqlx::query("INSERT INTO machine (name, machine_type, status) VALUES ($1, $2, $3)")
                .bind(*name)
                .bind(*machine_type)
                .bind(*status)
                .execute(&mut *tx)
                .await?;
        }
        for (name, role) in seed::USERS {
            sqlx::query("INSERT INTO app_user (name, role) VALUES ($1, $2)")
                .bind(*name)
                .bind(*role)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::info!(
            machines = seed::MACHINES.len(),
            users = seed::USERS.len(),
            "seeded reference data"
        );
        Ok(true)
    }
}

/// Map constraint violations onto the domain taxonomy. Anything else stays a
/// storage error.
pub(crate) fn translate(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.kind() {
            ErrorKind::UniqueViolation if db_err.constraint() == Some(ACTIVE_USAGE_INDEX) => {
                return Error::Conflict("machine already in use".to_string());
            }
            ErrorKind::ForeignKeyViolation => {
                let field = match db_err.constraint() {
                    Some("incident_machine_fk" | "machine_usage_machine_fk") => "machineId",
                    Some("machine_usage_user_fk") => "userId",
                    Some("incident_reporter_fk") => "reportedBy",
                    _ => "reference",
                };
                return Error::validation(field, "does not reference an existing record");
            }
            _ => {}
        }
    }
    Error::Storage(err)
}
