//! Student directory use-case service.
//!
//! # Responsibility
//! - Expose create/activate/deactivate operations to external callers.
//! - Surface the change events each mutation produced, so the trigger layer
//!   can run downstream handlers.
//!
//! # Invariants
//! - Validation and not-found failures happen before any side effect.
//! - Each operation is one repository transaction; an aborted transaction
//!   means the operation did not happen at all.

use crate::model::student::{NewStudent, Student, StudentId};
use crate::repo::student_repo::StudentRepository;
use crate::repo::RepoResult;
use crate::service::events::StudentEvent;
use log::info;

/// Outcome of a successful student registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedStudent {
    /// Stable id assigned by the store.
    pub id: StudentId,
    /// Creation event for the trigger layer.
    pub events: Vec<StudentEvent>,
}

/// Outcome of a successful activation-state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationChange {
    /// The carné the operation was addressed to, echoed back to the caller.
    pub carne: String,
    /// One update event per matched student row.
    pub events: Vec<StudentEvent>,
}

/// Use-case service owning student records and their activation state.
pub struct StudentDirectory<S: StudentRepository> {
    repo: S,
}

impl<S: StudentRepository> StudentDirectory<S> {
    /// Creates a directory using the provided repository implementation.
    pub fn new(repo: S) -> Self {
        Self { repo }
    }

    /// Registers a new student (deactivated) and returns its id.
    ///
    /// # Contract
    /// - Rejects missing/blank fields with a validation error before any write.
    /// - On success exactly one `Created` event is produced.
    pub fn create_student(&self, input: &NewStudent) -> RepoResult<CreatedStudent> {
        let id = self.repo.insert(input)?;
        let student = Student::registered(id, input);
        info!("event=student_create module=directory status=ok student_id={id}");

        Ok(CreatedStudent {
            id,
            events: vec![StudentEvent::Created { student }],
        })
    }

    /// Activates every student matching the carné.
    pub fn activate(&self, carne: &str) -> RepoResult<ActivationChange> {
        self.set_active(carne, true)
    }

    /// Deactivates every student matching the carné.
    pub fn deactivate(&self, carne: &str) -> RepoResult<ActivationChange> {
        self.set_active(carne, false)
    }

    fn set_active(&self, carne: &str, active: bool) -> RepoResult<ActivationChange> {
        let transitions = self.repo.set_active(carne, active)?;
        info!(
            "event=student_set_active module=directory status=ok carne={carne} active={active} matched={}",
            transitions.len()
        );

        let events = transitions
            .into_iter()
            .map(|transition| StudentEvent::Updated {
                before: transition.before,
                after: transition.after,
            })
            .collect();

        Ok(ActivationChange {
            carne: carne.to_string(),
            events,
        })
    }
}
