//! Core data model.
//!
//! Machines and users are reference data. Incidents are maintenance reports
//! raised against a machine; usage sessions record who is operating a machine
//! and for how long.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_type!(
    /// Row id of a machine.
    MachineId
);
id_type!(
    /// Row id of a user.
    UserId
);
id_type!(
    /// Row id of an incident.
    IncidentId
);
id_type!(
    /// Row id of a usage session.
    UsageId
);

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Machine {
    pub id: MachineId,
    pub name: String,
    #[serde(rename = "type")]
    pub machine_type: String,
    /// Free-text state label ("Operational", "Under maintenance", "Broken").
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Free-text role (technician, supervisor, maintenance, operator).
    pub role: String,
}

// ---------------------------------------------------------------------------
// Incidents
// ---------------------------------------------------------------------------

/// Lifecycle state of an incident. Only `Open` is created today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncidentStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Closed,
}

impl IncidentStatus {
    /// Label stored in the `incident.status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            IncidentStatus::Open => "open",
            IncidentStatus::InProgress => "in_progress",
            IncidentStatus::Closed => "closed",
        }
    }

    /// Open and In Progress incidents take part in duplicate checks and
    /// the open-incident listing.
    pub fn is_active(self) -> bool {
        matches!(self, IncidentStatus::Open | IncidentStatus::InProgress)
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IncidentStatus::Open => "Open",
            IncidentStatus::InProgress => "In Progress",
            IncidentStatus::Closed => "Closed",
        };
        f.pad(s)
    }
}

impl std::str::FromStr for IncidentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(IncidentStatus::Open),
            "in_progress" | "in progress" => Ok(IncidentStatus::InProgress),
            "closed" => Ok(IncidentStatus::Closed),
            other => Err(Error::Other(format!("unknown incident status: {other}"))),
        }
    }
}

/// A stored incident.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: IncidentId,
    pub description: String,
    pub status: IncidentStatus,
    pub machine_id: MachineId,
    pub reported_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Row of the open-incident listing, joined with machine and reporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenIncident {
    pub id: IncidentId,
    pub description: String,
    pub status: IncidentStatus,
    pub created_at: DateTime<Utc>,
    pub machine_name: String,
    pub machine_type: String,
    pub reported_by: String,
}

/// A validated incident report, ready to insert.
///
/// Construct through [`crate::rules::validate::incident_report`]; the
/// description is already trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIncident {
    pub(crate) machine_id: MachineId,
    pub(crate) description: String,
    pub(crate) reported_by: UserId,
}

impl NewIncident {
    pub fn machine_id(&self) -> MachineId {
        self.machine_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn reported_by(&self) -> UserId {
        self.reported_by
    }
}

// ---------------------------------------------------------------------------
// Usage sessions
// ---------------------------------------------------------------------------

/// One stretch of a user operating a machine. `ended_at == None` means the
/// session is still active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UsageSession {
    pub id: UsageId,
    pub machine_id: MachineId,
    pub user_id: UserId,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl UsageSession {
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_storage_and_display_labels() {
        assert_eq!("open".parse::<IncidentStatus>().unwrap(), IncidentStatus::Open);
        assert_eq!(
            "in_progress".parse::<IncidentStatus>().unwrap(),
            IncidentStatus::InProgress
        );
        assert_eq!(
            "In Progress".parse::<IncidentStatus>().unwrap(),
            IncidentStatus::InProgress
        );
        assert!("reopened".parse::<IncidentStatus>().is_err());
    }

    #[test]
    fn status_serializes_with_display_label() {
        let json = serde_json::to_string(&IncidentStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        assert!(!IncidentStatus::Closed.is_active());
    }

    #[test]
    fn machine_type_is_exposed_as_type() {
        let machine = Machine {
            id: MachineId(1),
            name: "CNC-01".to_string(),
            machine_type: "CNC Milling Machine".to_string(),
            status: "Operational".to_string(),
        };
        let value = serde_json::to_value(&machine).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["type"], "CNC Milling Machine");
    }
}
