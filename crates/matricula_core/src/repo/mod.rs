//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per registry aggregate.
//! - Isolate SQLite query and transaction details from service orchestration.
//!
//! # Invariants
//! - Write paths validate input before SQL mutations.
//! - Every multi-step mutation commits or aborts as one transaction,
//!   including its audit entry.
//! - Repository APIs return semantic errors (`StudentNotFound`,
//!   `NotificationNotFound`) in addition to DB transport errors.

use crate::db::{migrations::latest_version, DbError};
use crate::model::notification::NotificationId;
use crate::model::student::{StudentId, StudentValidationError};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod audit_repo;
pub mod credential_repo;
pub mod notification_repo;
pub mod student_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for registry persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Missing or malformed required input. Detected before any side effect.
    Validation(StudentValidationError),
    /// No student matches the given carné.
    StudentNotFound(String),
    /// No notification exists with the given id.
    NotificationNotFound(NotificationId),
    /// The activation path found no credential for the student.
    CredentialMissing(StudentId),
    /// A credential already exists for the student.
    DuplicateCredential(StudentId),
    /// The audit append failed; the enclosing transaction must abort.
    AuditWrite(DbError),
    /// Underlying store failure. The transaction was rolled back.
    Db(DbError),
    /// Persisted state failed to parse back into a domain record.
    InvalidData(String),
    /// Connection has not been migrated to the expected schema version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Connection schema is missing a table this repository requires.
    MissingRequiredTable(&'static str),
    /// Connection schema is missing a column this repository requires.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::StudentNotFound(carne) => write!(f, "student not found for carne: {carne}"),
            Self::NotificationNotFound(id) => write!(f, "notification not found: {id}"),
            Self::CredentialMissing(student) => {
                write!(f, "no credential exists for student: {student}")
            }
            Self::DuplicateCredential(student) => {
                write!(f, "a credential already exists for student: {student}")
            }
            Self::AuditWrite(err) => write!(f, "audit append failed, transaction aborted: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted registry data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection schema is missing required table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "connection schema is missing required column `{table}.{column}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::AuditWrite(err) | Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StudentValidationError> for RepoError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Verifies the connection is migrated and carries the tables/columns a
/// repository depends on. Called from every `try_new`.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    requirements: &[(&'static str, &[&'static str])],
) -> RepoResult<()> {
    let actual_version =
        conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for (table, columns) in requirements.iter().copied() {
        ensure_table_with_columns(conn, table, columns)?;
    }

    Ok(())
}

fn ensure_table_with_columns(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    let table_count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1;",
        [table],
        |row| row.get(0),
    )?;
    if table_count == 0 {
        return Err(RepoError::MissingRequiredTable(table));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut present = Vec::new();
    while let Some(row) = rows.next()? {
        present.push(row.get::<_, String>("name")?);
    }

    for column in columns.iter().copied() {
        if !present.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}
