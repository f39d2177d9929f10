//! The storage seam consumed by the API layer and the CLI.
//!
//! Every mutating operation runs its rule check and its write atomically:
//! Postgres does it in a transaction guarded by constraints and advisory
//! locks, [`MemoryStore`] under a single mutex.

mod memory;

pub use memory::MemoryStore;

use std::future::Future;

use crate::error::Result;
use crate::model::*;

pub trait WorkshopStore: Send + Sync + 'static {
    /// Cheap liveness probe of the backing store.
    fn health_check(&self) -> impl Future<Output = Result<()>> + Send;

    /// Install the sample machines and users if no machine exists yet.
    /// Returns whether anything was inserted.
    fn seed_if_empty(&self) -> impl Future<Output = Result<bool>> + Send;

    /// All machines ordered by name.
    fn list_machines(&self) -> impl Future<Output = Result<Vec<Machine>>> + Send;

    /// All users ordered by name.
    fn list_users(&self) -> impl Future<Output = Result<Vec<User>>> + Send;

    /// Open and In Progress incidents, newest first.
    fn list_open_incidents(&self) -> impl Future<Output = Result<Vec<OpenIncident>>> + Send;

    /// Would reporting `description` on `machine_id` duplicate an active
    /// incident? Read-only. An unknown machine has nothing to collide with.
    fn would_duplicate(
        &self,
        machine_id: MachineId,
        description: &str,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Insert an Open incident unless it duplicates an active one
    /// (`Error::Conflict`).
    fn report_incident(
        &self,
        new: &NewIncident,
    ) -> impl Future<Output = Result<IncidentId>> + Send;

    /// Open a usage session. `Error::Conflict` if the machine is already in use.
    fn start_usage(
        &self,
        machine_id: MachineId,
        user_id: UserId,
    ) -> impl Future<Output = Result<UsageId>> + Send;

    /// Close the active session on a machine. `Error::NotFound` if none is active.
    fn end_usage(&self, machine_id: MachineId) -> impl Future<Output = Result<UsageId>> + Send;

    /// The active session on a machine, if any.
    fn active_usage(
        &self,
        machine_id: MachineId,
    ) -> impl Future<Output = Result<Option<UsageSession>>> + Send;

    /// Every active session, oldest first.
    fn list_active_usage(&self) -> impl Future<Output = Result<Vec<UsageSession>>> + Send;
}
