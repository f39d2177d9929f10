use crate::error::Result;
use crate::model::*;
use crate::store::WorkshopStore;

use super::Db;

impl WorkshopStore for Db {
    async fn health_check(&self) -> Result<()> {
        Db::health_check(self).await
    }

    async fn seed_if_empty(&self) -> Result<bool> {
        Db::seed_if_empty(self).await
    }

    async fn list_machines(&self) -> Result<Vec<Machine>> {
        Db::list_machines(self).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Db::list_users(self).await
    }

    async fn list_open_incidents(&self) -> Result<Vec<OpenIncident>> {
        Db::list_open_incidents(self).await
    }

    async fn would_duplicate(&self, machine_id: MachineId, description: &str) -> Result<bool> {
        Db::would_duplicate(self, machine_id, description).await
    }

    async fn report_incident(&self, new: &NewIncident) -> Result<IncidentId> {
        Db::report_incident(self, new).await
    }

    async fn start_usage(&self, machine_id: MachineId, user_id: UserId) -> Result<UsageId> {
        Db::start_usage(self, machine_id, user_id).await
    }

    async fn end_usage(&self, machine_id: MachineId) -> Result<UsageId> {
        Db::end_usage(self, machine_id).await
    }

    async fn active_usage(&self, machine_id: MachineId) -> Result<Option<UsageSession>> {
        Db::active_usage(self, machine_id).await
    }

    async fn list_active_usage(&self) -> Result<Vec<UsageSession>> {
        Db::list_active_usage(self).await
    }
}
