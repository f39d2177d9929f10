//! In-process store for tests and local demos.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};

use crate::error::{Error, Result};
use crate::model::*;
use crate::rules::{duplicate, usage};
use crate::seed;

use super::WorkshopStore;

/// Mutex-guarded tables. Ids are assigned per table starting at 1, rows are
/// never deleted.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    machines: Vec<Machine>,
    users: Vec<User>,
    incidents: Vec<Incident>,
    usage: Vec<UsageSession>,
    last_tick: Option<DateTime<Utc>>,
}

impl Tables {
    /// Server clock, strictly increasing across calls.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let now = match self.last_tick {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_tick = Some(now);
        now
    }

    fn machine_exists(&self, id: MachineId) -> bool {
        self.machines.iter().any(|m| m.id == id)
    }

    fn user_exists(&self, id: UserId) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn active_descriptions(&self, machine_id: MachineId) -> impl Iterator<Item = &str> {
        self.incidents
            .iter()
            .filter(move |i| i.machine_id == machine_id && i.status.is_active())
            .map(|i| i.description.as_str())
    }

    fn active_session(&self, machine_id: MachineId) -> Option<&UsageSession> {
        self.usage
            .iter()
            .find(|s| s.machine_id == machine_id && s.is_active())
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the sample machines and users.
    pub fn seeded() -> Result<Self> {
        let store = Self::new();
        store.install_seed()?;
        Ok(store)
    }

    pub fn add_machine(&self, name: &str, machine_type: &str, status: &str) -> Result<MachineId> {
        let mut tables = self.lock()?;
        let id = MachineId(tables.machines.len() as i64 + 1);
        tables.machines.push(Machine {
            id,
            name: name.to_string(),
            machine_type: machine_type.to_string(),
            status: status.to_string(),
        });
        Ok(id)
    }

    pub fn add_user(&self, name: &str, role: &str) -> Result<UserId> {
        let mut tables = self.lock()?;
        let id = UserId(tables.users.len() as i64 + 1);
        tables.users.push(User {
            id,
            name: name.to_string(),
            role: role.to_string(),
        });
        Ok(id)
    }

    /// Force an incident into a given state. Status changes have no API yet;
    /// this lets tests put rows into In Progress or Closed.
    pub fn set_incident_status(&self, id: IncidentId, status: IncidentStatus) -> Result<()> {
        let mut tables = self.lock()?;
        let incident = tables
            .incidents
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| Error::NotFound(format!("incident {id}")))?;
        incident.status = status;
        Ok(())
    }

    /// Every usage row for a machine, active or not.
    pub fn usage_history(&self, machine_id: MachineId) -> Result<Vec<UsageSession>> {
        let tables = self.lock()?;
        Ok(tables
            .usage
            .iter()
            .filter(|s| s.machine_id == machine_id)
            .cloned()
            .collect())
    }

    fn install_seed(&self) -> Result<bool> {
        if !self.lock()?.machines.is_empty() {
            return Ok(false);
        }
        for (name, machine_type, status) in seed::MACHINES {
            self.add_machine(name, machine_type, status)?;
        }
        for (name, role) in seed::USERS {
            self.add_user(name, role)?;
        }
        Ok(true)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| Error::Other("memory store lock poisoned".to_string()))
    }
}

impl WorkshopStore for MemoryStore {
    async fn health_check(&self) -> Result<()> {
        self.lock().map(|_| ())
    }

    async fn seed_if_empty(&self) -> Result<bool> {
        self.install_seed()
    }

    async fn list_machines(&self) -> Result<Vec<Machine>> {
        let mut machines = self.lock()?.machines.clone();
        machines.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(machines)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users = self.lock()?.users.clone();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn list_open_incidents(&self) -> Result<Vec<OpenIncident>> {
        let tables = self.lock()?;
        let mut active: Vec<&Incident> = tables
            .incidents
            .iter()
            .filter(|i| i.status.is_active())
            .collect();
        active.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok(active
            .into_iter()
            .filter_map(|i| {
                let machine = tables.machines.iter().find(|m| m.id == i.machine_id)?;
                let reporter = tables.users.iter().find(|u| u.id == i.reported_by)?;
                Some(OpenIncident {
                    id: i.id,
                    description: i.description.clone(),
                    status: i.status,
                    created_at: i.created_at,
                    machine_name: machine.name.clone(),
                    machine_type: machine.machine_type.clone(),
                    reported_by: reporter.name.clone(),
                })
            })
            .collect())
    }

    async fn would_duplicate(&self, machine_id: MachineId, description: &str) -> Result<bool> {
        let tables = self.lock()?;
        Ok(duplicate::would_duplicate(
            description,
            tables.active_descriptions(machine_id),
        ))
    }

    async fn report_incident(&self, new: &NewIncident) -> Result<IncidentId> {
        let mut tables = self.lock()?;
        if duplicate::would_duplicate(&new.description, tables.active_descriptions(new.machine_id)) {
            return Err(Error::Conflict(format!(
                "an equivalent incident is already open on machine {}",
                new.machine_id
            )));
        }
        if !tables.machine_exists(new.machine_id) {
            return Err(Error::validation("machineId", "does not reference an existing machine"));
        }
        if !tables.user_exists(new.reported_by) {
            return Err(Error::validation("reportedBy", "does not reference an existing user"));
        }

        let id = IncidentId(tables.incidents.len() as i64 + 1);
        let created_at = tables.tick();
        tables.incidents.push(Incident {
            id,
            description: new.description.clone(),
            status: IncidentStatus::Open,
            machine_id: new.machine_id,
            reported_by: new.reported_by,
            created_at,
        });
        Ok(id)
    }

    async fn start_usage(&self, machine_id: MachineId, user_id: UserId) -> Result<UsageId> {
        let mut tables = self.lock()?;
        usage::ensure_machine_free(machine_id, tables.active_session(machine_id))?;
        if !tables.machine_exists(machine_id) {
            return Err(Error::validation("machineId", "does not reference an existing machine"));
        }
        if !tables.user_exists(user_id) {
            return Err(Error::validation("userId", "does not reference an existing user"));
        }

        let id = UsageId(tables.usage.len() as i64 + 1);
        let started_at = tables.tick();
        tables.usage.push(UsageSession {
            id,
            machine_id,
            user_id,
            started_at,
            ended_at: None,
        });
        Ok(id)
    }

    async fn end_usage(&self, machine_id: MachineId) -> Result<UsageId> {
        let mut tables = self.lock()?;
        let now = tables.tick();
        let closed = tables
            .usage
            .iter_mut()
            .find(|s| s.machine_id == machine_id && s.is_active())
            .map(|session| {
                session.ended_at = Some(now);
                session.id
            });
        usage::ensure_session_closed(machine_id, closed)
    }

    async fn active_usage(&self, machine_id: MachineId) -> Result<Option<UsageSession>> {
        Ok(self.lock()?.active_session(machine_id).cloned())
    }

    async fn list_active_usage(&self) -> Result<Vec<UsageSession>> {
        let tables = self.lock()?;
        Ok(tables.usage.iter().filter(|s| s.is_active()).cloned().collect())
    }
}
