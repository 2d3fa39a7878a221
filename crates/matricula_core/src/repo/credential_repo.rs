//! Credential provisioning contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the single credential provisioned per student.
//! - Enforce the one-credential-per-student invariant at insert time.
//!
//! # Invariants
//! - `insert` rejects a second credential for the same student before any
//!   write happens; the schema `UNIQUE` constraint is the backstop.
//! - Credential insert and its audit entry share one transaction.

use crate::model::credential::{Credential, CredentialId, NewCredential};
use crate::model::student::StudentId;
use crate::repo::audit_repo::append_entry;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const CREDENTIAL_SELECT_SQL: &str = "SELECT
    uuid,
    student_uuid,
    username,
    password
FROM credentials";

const CREDENTIAL_REQUIREMENTS: &[(&str, &[&str])] = &[
    ("credentials", &["uuid", "student_uuid", "username", "password"]),
    ("audit_log", &["uuid", "text", "created_at"]),
];

/// Provisioning persistence contract for user credentials.
pub trait CredentialRepository {
    /// Inserts the credential for a student and audits the write.
    ///
    /// # Errors
    /// - `DuplicateCredential` when the student already has one.
    fn insert(&self, new: &NewCredential) -> RepoResult<CredentialId>;
    /// Gets the credential owned by the given student, if any.
    fn find_by_student(&self, student_uuid: StudentId) -> RepoResult<Option<Credential>>;
}

/// SQLite-backed credential storage.
pub struct SqliteCredentialRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCredentialRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, CREDENTIAL_REQUIREMENTS)?;
        Ok(Self { conn })
    }
}

impl CredentialRepository for SqliteCredentialRepository<'_> {
    fn insert(&self, new: &NewCredential) -> RepoResult<CredentialId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let existing: u32 = tx.query_row(
            "SELECT COUNT(*) FROM credentials WHERE student_uuid = ?1;",
            [new.student_uuid.to_string()],
            |row| row.get(0),
        )?;
        if existing > 0 {
            return Err(RepoError::DuplicateCredential(new.student_uuid));
        }

        let id = Uuid::new_v4();
        tx.execute(
            "INSERT INTO credentials (uuid, student_uuid, username, password)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                new.student_uuid.to_string(),
                new.username.as_str(),
                new.password.as_str(),
            ],
        )?;
        append_entry(&tx, &format!("user inserted with ID: {id}"))?;

        tx.commit()?;
        Ok(id)
    }

    fn find_by_student(&self, student_uuid: StudentId) -> RepoResult<Option<Credential>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CREDENTIAL_SELECT_SQL} WHERE student_uuid = ?1;"))?;
        let mut rows = stmt.query([student_uuid.to_string()])?;

        if let Some(row) = rows.next()? {
            return Ok(Some(parse_credential_row(row)?));
        }
        Ok(None)
    }
}

fn parse_credential_row(row: &Row<'_>) -> RepoResult<Credential> {
    let uuid = parse_uuid_column(row, "uuid")?;
    let student_uuid = parse_uuid_column(row, "student_uuid")?;

    Ok(Credential {
        uuid,
        student_uuid,
        username: row.get("username")?,
        password: row.get("password")?,
    })
}

fn parse_uuid_column(row: &Row<'_>, column: &str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{text}` in credentials.{column}"
        ))
    })
}
