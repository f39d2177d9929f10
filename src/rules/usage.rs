//! Usage-session transitions.
//!
//! A machine has at most one active session. Starting requires the machine to
//! be free; ending requires an active session to close.

use crate::error::{Error, Result};
use crate::model::{MachineId, UsageId, UsageSession};

/// Fail with `Conflict` if a session is already active on the machine.
pub fn ensure_machine_free(machine_id: MachineId, active: Option<&UsageSession>) -> Result<()> {
    match active {
        Some(session) if session.is_active() => Err(Error::Conflict(format!(
            "machine {machine_id} already in use"
        ))),
        _ => Ok(()),
    }
}

/// Fail with `NotFound` if closing matched no active session.
pub fn ensure_session_closed(machine_id: MachineId, closed: Option<UsageId>) -> Result<UsageId> {
    closed.ok_or_else(|| Error::NotFound(format!("no active usage to end on machine {machine_id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserId;

    fn session(ended: bool) -> UsageSession {
        let now = chrono::Utc::now();
        UsageSession {
            id: UsageId(7),
            machine_id: MachineId(1),
            user_id: UserId(2),
            started_at: now,
            ended_at: ended.then_some(now),
        }
    }

    #[test]
    fn free_machine_may_start() {
        assert!(ensure_machine_free(MachineId(1), None).is_ok());
        assert!(ensure_machine_free(MachineId(1), Some(&session(true))).is_ok());
    }

    #[test]
    fn busy_machine_conflicts() {
        let err = ensure_machine_free(MachineId(1), Some(&session(false))).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)), "got {err:?}");
    }

    #[test]
    fn closing_nothing_is_not_found() {
        let err = ensure_session_closed(MachineId(1), None).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)), "got {err:?}");
        assert_eq!(ensure_session_closed(MachineId(1), Some(UsageId(3))).unwrap(), UsageId(3));
    }
}
