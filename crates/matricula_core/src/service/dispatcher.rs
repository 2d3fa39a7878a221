//! Notification dispatch use-case service.
//!
//! # Responsibility
//! - Expose the pending queue to the delivery side.
//! - Mark notifications sent only after the outbound channel confirms.
//!
//! # Invariants
//! - Delivery transport is a caller-supplied collaborator; this service never
//!   talks to a mail system itself.
//! - A failed send leaves the notification pending for the next pass.

use crate::model::notification::NotificationId;
use crate::repo::notification_repo::{NotificationRepository, PendingNotification};
use crate::repo::RepoResult;
use log::{info, warn};

/// Counts from one `deliver_pending` pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryReport {
    /// Notifications confirmed by the channel and marked sent.
    pub sent: usize,
    /// Notifications the channel rejected; still pending.
    pub failed: usize,
}

/// Use-case service feeding pending notifications to an outbound channel.
pub struct NotificationDispatcher<N: NotificationRepository> {
    repo: N,
}

impl<N: NotificationRepository> NotificationDispatcher<N> {
    /// Creates a dispatcher using the provided repository implementation.
    pub fn new(repo: N) -> Self {
        Self { repo }
    }

    /// Returns all undelivered notifications. Read-only.
    pub fn list_pending(&self) -> RepoResult<Vec<PendingNotification>> {
        self.repo.list_pending()
    }

    /// Marks one notification sent after the caller delivered it.
    pub fn mark_sent(&self, id: NotificationId) -> RepoResult<()> {
        self.repo.mark_sent(id)?;
        info!("event=notification_dispatch module=dispatcher status=ok notification_id={id}");
        Ok(())
    }

    /// Offers every pending notification to the outbound channel.
    ///
    /// The channel reports success or failure per notification; only
    /// successes are marked sent. Channel failures are counted and logged,
    /// not propagated, so one bad recipient cannot stall the queue.
    pub fn deliver_pending<F>(&self, mut send: F) -> RepoResult<DeliveryReport>
    where
        F: FnMut(&PendingNotification) -> Result<(), String>,
    {
        let mut report = DeliveryReport::default();

        for notification in self.repo.list_pending()? {
            match send(&notification) {
                Ok(()) => {
                    self.mark_sent(notification.id)?;
                    report.sent += 1;
                }
                Err(reason) => {
                    warn!(
                        "event=notification_dispatch module=dispatcher status=error notification_id={} error={reason}",
                        notification.id
                    );
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}
