//! Trigger routing for student change events.
//!
//! # Responsibility
//! - Deliver each `StudentEvent` to the handlers subscribed to it, mirroring
//!   a hosting platform's change-feed subscription in-process.
//!
//! # Invariants
//! - Creation events reach the provisioner before the composer, matching the
//!   causal order credential -> welcome notification.
//! - A handler failure is fatal for the event: it propagates to the caller
//!   (the hosting runtime's retry/alerting concern, not ours).

use crate::repo::credential_repo::CredentialRepository;
use crate::repo::notification_repo::NotificationRepository;
use crate::repo::RepoResult;
use crate::service::composer::NotificationComposer;
use crate::service::events::StudentEvent;
use crate::service::provisioner::CredentialProvisioner;

/// In-process router from student events to their trigger handlers.
pub struct StudentTriggers<P, C, N>
where
    P: CredentialRepository,
    C: CredentialRepository,
    N: NotificationRepository,
{
    provisioner: CredentialProvisioner<P>,
    composer: NotificationComposer<N, C>,
}

impl<P, C, N> StudentTriggers<P, C, N>
where
    P: CredentialRepository,
    C: CredentialRepository,
    N: NotificationRepository,
{
    /// Wires the two reactive handlers into one subscription.
    pub fn new(
        provisioner: CredentialProvisioner<P>,
        composer: NotificationComposer<N, C>,
    ) -> Self {
        Self {
            provisioner,
            composer,
        }
    }

    /// Delivers one event to every subscribed handler.
    pub fn handle(&self, event: &StudentEvent) -> RepoResult<()> {
        match event {
            StudentEvent::Created { student } => {
                self.provisioner.on_student_created(student)?;
                self.composer.on_student_created(student)?;
            }
            StudentEvent::Updated { before, after } => {
                self.composer.on_student_updated(before, after)?;
            }
        }
        Ok(())
    }

    /// Delivers a batch of events in order, stopping at the first failure.
    pub fn handle_all(&self, events: &[StudentEvent]) -> RepoResult<()> {
        for event in events {
            self.handle(event)?;
        }
        Ok(())
    }
}
