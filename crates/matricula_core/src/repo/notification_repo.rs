//! Notification queue contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist pending notifications and expose dispatch-side reads.
//! - Mark notifications sent with a server-assigned dispatch timestamp.
//!
//! # Invariants
//! - `sent_at` is non-null if and only if `is_sent` is set.
//! - Every insert and every `mark_sent` writes its audit entry inside the
//!   same transaction as the mutation.
//! - `list_pending` is read-only and never changes queue state.

use crate::model::notification::{NewNotification, Notification, NotificationId};
use crate::repo::audit_repo::append_entry;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use serde::Serialize;
use uuid::Uuid;

const NOTIFICATION_SELECT_SQL: &str = "SELECT
    uuid,
    recipient,
    subject,
    body,
    created_at,
    is_sent,
    sent_at
FROM notifications";

const NOTIFICATION_REQUIREMENTS: &[(&str, &[&str])] = &[
    (
        "notifications",
        &["uuid", "recipient", "subject", "body", "created_at", "is_sent", "sent_at"],
    ),
    ("audit_log", &["uuid", "text", "created_at"]),
];

/// Read model for the dispatch path: one undelivered notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingNotification {
    pub id: NotificationId,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Queue persistence contract for notifications.
pub trait NotificationRepository {
    /// Inserts a pending notification and audits it under its own id.
    fn insert_pending(&self, new: &NewNotification) -> RepoResult<NotificationId>;
    /// Inserts a pending notification with a caller-supplied audit line.
    ///
    /// The activation/deactivation path audits the student transition rather
    /// than the notification id.
    fn insert_pending_logged(
        &self,
        new: &NewNotification,
        audit_text: &str,
    ) -> RepoResult<NotificationId>;
    /// Gets one notification by stable id.
    fn get(&self, id: NotificationId) -> RepoResult<Option<Notification>>;
    /// Returns all undelivered notifications. No guaranteed order contract.
    fn list_pending(&self) -> RepoResult<Vec<PendingNotification>>;
    /// Marks one notification sent with a server-assigned timestamp.
    ///
    /// # Errors
    /// - `NotificationNotFound` when the id does not exist; no state changes.
    fn mark_sent(&self, id: NotificationId) -> RepoResult<()>;
}

/// SQLite-backed notification queue.
pub struct SqliteNotificationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNotificationRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, NOTIFICATION_REQUIREMENTS)?;
        Ok(Self { conn })
    }

    fn insert_in_tx(
        &self,
        new: &NewNotification,
        audit_text: Option<&str>,
    ) -> RepoResult<NotificationId> {
        let id = Uuid::new_v4();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO notifications (uuid, recipient, subject, body, is_sent)
             VALUES (?1, ?2, ?3, ?4, 0);",
            params![
                id.to_string(),
                new.recipient.as_str(),
                new.subject.as_str(),
                new.body.as_str(),
            ],
        )?;

        match audit_text {
            Some(text) => append_entry(&tx, text)?,
            None => append_entry(&tx, &format!("notification inserted with ID: {id}"))?,
        };

        tx.commit()?;
        Ok(id)
    }
}

impl NotificationRepository for SqliteNotificationRepository<'_> {
    fn insert_pending(&self, new: &NewNotification) -> RepoResult<NotificationId> {
        self.insert_in_tx(new, None)
    }

    fn insert_pending_logged(
        &self,
        new: &NewNotification,
        audit_text: &str,
    ) -> RepoResult<NotificationId> {
        self.insert_in_tx(new, Some(audit_text))
    }

    fn get(&self, id: NotificationId) -> RepoResult<Option<Notification>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTIFICATION_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;

        if let Some(row) = rows.next()? {
            return Ok(Some(parse_notification_row(row)?));
        }
        Ok(None)
    }

    fn list_pending(&self) -> RepoResult<Vec<PendingNotification>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, recipient, subject, body
             FROM notifications
             WHERE is_sent = 0
             ORDER BY rowid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut pending = Vec::new();

        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            let id = Uuid::parse_str(&uuid_text).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid uuid value `{uuid_text}` in notifications.uuid"
                ))
            })?;
            pending.push(PendingNotification {
                id,
                recipient: row.get("recipient")?,
                subject: row.get("subject")?,
                body: row.get("body")?,
            });
        }

        Ok(pending)
    }

    fn mark_sent(&self, id: NotificationId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let changed = tx.execute(
            "UPDATE notifications
             SET is_sent = 1,
                 sent_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotificationNotFound(id));
        }

        append_entry(&tx, &format!("notification sent with ID: {id}"))?;
        tx.commit()?;
        Ok(())
    }
}

fn parse_notification_row(row: &Row<'_>) -> RepoResult<Notification> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{uuid_text}` in notifications.uuid"
        ))
    })?;

    let is_sent = match row.get::<_, i64>("is_sent")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_sent value `{other}` in notifications.is_sent"
            )));
        }
    };

    let sent_at: Option<i64> = row.get("sent_at")?;
    if sent_at.is_some() != is_sent {
        return Err(RepoError::InvalidData(format!(
            "sent_at/is_sent mismatch for notification `{uuid_text}`"
        )));
    }

    Ok(Notification {
        uuid,
        recipient: row.get("recipient")?,
        subject: row.get("subject")?,
        body: row.get("body")?,
        created_at: row.get("created_at")?,
        is_sent,
        sent_at,
    })
}
