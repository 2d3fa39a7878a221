//! Audit trail contracts and SQLite implementation.
//!
//! # Responsibility
//! - Append immutable text entries with server-assigned timestamps.
//! - Share the in-transaction append helper used by every write path.
//!
//! # Invariants
//! - Audit coverage is a correctness requirement: an append failure must
//!   abort the transaction that requested it, never degrade to best-effort.
//! - Entries are never updated or deleted.

use crate::model::audit::{AuditEntry, AuditEntryId};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use uuid::Uuid;

const AUDIT_REQUIREMENTS: &[(&str, &[&str])] =
    &[("audit_log", &["uuid", "text", "created_at"])];

/// Append-only audit trail contract.
pub trait AuditLog {
    /// Appends one entry and returns its stable id.
    fn append(&self, text: &str) -> RepoResult<AuditEntryId>;
    /// Returns all entries in insertion order. Test and inspection aid.
    fn list_entries(&self) -> RepoResult<Vec<AuditEntry>>;
}

/// SQLite-backed audit trail.
pub struct SqliteAuditLog<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuditLog<'conn> {
    /// Constructs an audit log from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, AUDIT_REQUIREMENTS)?;
        Ok(Self { conn })
    }
}

impl AuditLog for SqliteAuditLog<'_> {
    fn append(&self, text: &str) -> RepoResult<AuditEntryId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let id = append_entry(&tx, text)?;
        tx.commit().map_err(audit_write_error)?;
        Ok(id)
    }

    fn list_entries(&self) -> RepoResult<Vec<AuditEntry>> {
        let mut stmt = self.conn.prepare(
            // created_at has whole-second resolution, so same-second entries
            // tie; rowid is the append order for this insert-only table.
            "SELECT uuid, text, created_at
             FROM audit_log
             ORDER BY rowid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid uuid value `{uuid_text}` in audit_log.uuid"
                ))
            })?;
            entries.push(AuditEntry {
                uuid,
                text: row.get("text")?,
                created_at: row.get("created_at")?,
            });
        }

        Ok(entries)
    }
}

/// Appends one audit entry inside the caller's open transaction.
///
/// Used by every repository write path so the entry commits or aborts with
/// the mutation it describes. Failures map to `RepoError::AuditWrite`.
pub(crate) fn append_entry(conn: &Connection, text: &str) -> RepoResult<AuditEntryId> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO audit_log (uuid, text) VALUES (?1, ?2);",
        params![id.to_string(), text],
    )
    .map_err(audit_write_error)?;
    Ok(id)
}

fn audit_write_error(err: rusqlite::Error) -> RepoError {
    RepoError::AuditWrite(err.into())
}
