//! Request validation. Missing or blank fields become `Error::Validation`.

use crate::error::{Error, Result};
use crate::model::{MachineId, NewIncident, UserId};

/// Validate an incident report and bind it to the acting user.
pub fn incident_report(
    machine_id: Option<MachineId>,
    description: Option<&str>,
    reported_by: UserId,
) -> Result<NewIncident> {
    let machine_id = required(machine_id, "machineId")?;
    let description = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| Error::validation("description", "required field is missing or empty"))?;

    Ok(NewIncident {
        machine_id,
        description: description.to_string(),
        reported_by,
    })
}

/// Validate a usage start request.
pub fn usage_start(
    machine_id: Option<MachineId>,
    user_id: Option<UserId>,
) -> Result<(MachineId, UserId)> {
    Ok((required(machine_id, "machineId")?, required(user_id, "userId")?))
}

/// Validate a usage end request.
pub fn usage_end(machine_id: Option<MachineId>) -> Result<MachineId> {
    required(machine_id, "machineId")
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| Error::validation(field, "required field is missing or empty"))
}
