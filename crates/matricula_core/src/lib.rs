//! Core domain logic for Matricula, the student registry backend.
//! This crate is the single source of truth for registry invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::audit::{AuditEntry, AuditEntryId};
pub use model::credential::{
    derive_username, Credential, CredentialId, NewCredential, TEMPORARY_PASSWORD,
};
pub use model::notification::{
    NewNotification, Notification, NotificationId, ACTIVATED_SUBJECT, DEACTIVATED_SUBJECT,
    WELCOME_SUBJECT,
};
pub use model::student::{NewStudent, Student, StudentId, StudentValidationError};
pub use repo::audit_repo::{AuditLog, SqliteAuditLog};
pub use repo::credential_repo::{CredentialRepository, SqliteCredentialRepository};
pub use repo::notification_repo::{
    NotificationRepository, PendingNotification, SqliteNotificationRepository,
};
pub use repo::student_repo::{SqliteStudentRepository, StudentRepository, StudentTransition};
pub use repo::{RepoError, RepoResult};
pub use service::composer::NotificationComposer;
pub use service::directory::{ActivationChange, CreatedStudent, StudentDirectory};
pub use service::dispatcher::{DeliveryReport, NotificationDispatcher};
pub use service::events::StudentEvent;
pub use service::provisioner::CredentialProvisioner;
pub use service::triggers::StudentTriggers;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
