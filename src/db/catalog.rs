//! Machines and users: read-only reference data.

use crate::error::Result;
use crate::model::{Machine, User};

impl super::Db {
    /// All machines ordered by name.
    pub async fn list_machines(&self) -> Result<Vec<Machine>> {
        let machines = sqlx::query_as::<_, Machine>(
            "SELECT id, name, machine_type, status FROM machine ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(machines)
    }

    /// All users ordered by name.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT id, name, role FROM app_user ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }
}
