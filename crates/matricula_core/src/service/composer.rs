//! Notification composition trigger handler.
//!
//! # Responsibility
//! - React to student creation with a welcome notification.
//! - React to activation-flag flips with activated/deactivated notifications.
//!
//! # Invariants
//! - An update whose activation flag did not change composes nothing.
//! - The activation path requires the student's single credential; its
//!   absence is an error, not a silently skipped notification.
//! - Each composed notification and its audit line commit as one transaction.

use crate::model::notification::{NewNotification, NotificationId};
use crate::model::student::Student;
use crate::repo::credential_repo::CredentialRepository;
use crate::repo::notification_repo::NotificationRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;

/// Trigger handler composing pending notifications from student changes.
pub struct NotificationComposer<N: NotificationRepository, C: CredentialRepository> {
    notifications: N,
    credentials: C,
}

impl<N: NotificationRepository, C: CredentialRepository> NotificationComposer<N, C> {
    /// Creates a composer using the provided repository implementations.
    pub fn new(notifications: N, credentials: C) -> Self {
        Self {
            notifications,
            credentials,
        }
    }

    /// Composes the welcome notification for a just-created student.
    pub fn on_student_created(&self, student: &Student) -> RepoResult<NotificationId> {
        let message = NewNotification::welcome(student);
        let id = self.notifications.insert_pending(&message)?;
        info!(
            "event=notification_compose module=composer status=ok kind=welcome student_id={} notification_id={id}",
            student.uuid
        );
        Ok(id)
    }

    /// Composes a notification for an activation-flag transition.
    ///
    /// Returns `Ok(None)` when the flag did not change between the two
    /// snapshots; any other outcome is all-or-nothing.
    pub fn on_student_updated(
        &self,
        before: &Student,
        after: &Student,
    ) -> RepoResult<Option<NotificationId>> {
        if before.is_active == after.is_active {
            return Ok(None);
        }

        let credential = self
            .credentials
            .find_by_student(after.uuid)?
            .ok_or(RepoError::CredentialMissing(after.uuid))?;

        let (message, audit_text, kind) = if after.is_active {
            (
                NewNotification::account_activated(after, &credential),
                format!("student activated with ID: {}", after.uuid),
                "activated",
            )
        } else {
            (
                NewNotification::account_deactivated(after, &credential),
                format!("student deactivated with ID: {}", after.uuid),
                "deactivated",
            )
        };

        let id = self
            .notifications
            .insert_pending_logged(&message, &audit_text)?;
        info!(
            "event=notification_compose module=composer status=ok kind={kind} student_id={} notification_id={id}",
            after.uuid
        );
        Ok(Some(id))
    }
}
