//! Credential provisioning trigger handler.
//!
//! # Responsibility
//! - React to student creation by provisioning exactly one credential.
//!
//! # Invariants
//! - Username derivation and the placeholder password follow the model
//!   contract; this handler adds no policy of its own.
//! - Failures propagate to the trigger host; a dropped credential is never
//!   silently tolerated.

use crate::model::credential::{CredentialId, NewCredential};
use crate::model::student::Student;
use crate::repo::credential_repo::CredentialRepository;
use crate::repo::RepoResult;
use log::info;

/// Trigger handler creating the user credential for each new student.
pub struct CredentialProvisioner<C: CredentialRepository> {
    repo: C,
}

impl<C: CredentialRepository> CredentialProvisioner<C> {
    /// Creates a provisioner using the provided repository implementation.
    pub fn new(repo: C) -> Self {
        Self { repo }
    }

    /// Provisions the credential for a just-created student.
    ///
    /// # Errors
    /// - `DuplicateCredential` on redelivery of a creation event.
    pub fn on_student_created(&self, student: &Student) -> RepoResult<CredentialId> {
        let new = NewCredential::for_student(student);
        let id = self.repo.insert(&new)?;
        info!(
            "event=credential_provision module=provisioner status=ok student_id={} credential_id={id}",
            student.uuid
        );
        Ok(id)
    }
}
