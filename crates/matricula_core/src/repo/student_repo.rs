//! Student directory contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist student records and their activation state.
//! - Keep carné lookups defensive: updates apply to every matching row.
//!
//! # Invariants
//! - `insert` writes the student and its audit entry in one transaction.
//! - `set_active` reads a consistent snapshot of matching rows, then updates
//!   all of them inside the same transaction.
//! - No SQL mutation happens before input validation passes.

use crate::model::student::{require_field, NewStudent, Student, StudentId};
use crate::repo::audit_repo::append_entry;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const STUDENT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    surname,
    carne,
    email,
    phone,
    is_active
FROM students";

const STUDENT_REQUIREMENTS: &[(&str, &[&str])] = &[
    (
        "students",
        &["uuid", "name", "surname", "carne", "email", "phone", "is_active"],
    ),
    ("audit_log", &["uuid", "text", "created_at"]),
];

/// One activation-flag update observed by `set_active`.
///
/// Carries the before/after records needed to build trigger events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentTransition {
    pub before: Student,
    pub after: Student,
}

/// Directory persistence contract for student records.
pub trait StudentRepository {
    /// Inserts a validated student (deactivated) and audits the write.
    fn insert(&self, new: &NewStudent) -> RepoResult<StudentId>;
    /// Gets one student by stable id.
    fn get(&self, id: StudentId) -> RepoResult<Option<Student>>;
    /// Lists every student matching the carné business key.
    fn find_by_carne(&self, carne: &str) -> RepoResult<Vec<Student>>;
    /// Flips the activation flag on all students matching the carné.
    ///
    /// Returns the before/after pair for every updated row.
    fn set_active(&self, carne: &str, active: bool) -> RepoResult<Vec<StudentTransition>>;
}

/// SQLite-backed student directory storage.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, STUDENT_REQUIREMENTS)?;
        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn insert(&self, new: &NewStudent) -> RepoResult<StudentId> {
        new.validate()?;

        let id = Uuid::new_v4();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO students (uuid, name, surname, carne, email, phone, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0);",
            params![
                id.to_string(),
                new.name.as_str(),
                new.surname.as_str(),
                new.carne.as_str(),
                new.email.as_str(),
                new.phone.as_str(),
            ],
        )?;
        append_entry(&tx, &format!("student inserted with ID: {id}"))?;

        tx.commit()?;
        Ok(id)
    }

    fn get(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;

        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }
        Ok(None)
    }

    fn find_by_carne(&self, carne: &str) -> RepoResult<Vec<Student>> {
        let mut stmt = self.conn.prepare(&format!(
            "{STUDENT_SELECT_SQL} WHERE carne = ?1 ORDER BY uuid ASC;"
        ))?;
        let mut rows = stmt.query([carne])?;
        let mut students = Vec::new();

        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }

    fn set_active(&self, carne: &str, active: bool) -> RepoResult<Vec<StudentTransition>> {
        require_field("carne", carne)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        // Snapshot all matching rows first, then update each one; the carné
        // is intended unique but treated as potentially non-unique here.
        let snapshot = {
            let mut stmt = tx.prepare(&format!(
                "{STUDENT_SELECT_SQL} WHERE carne = ?1 ORDER BY uuid ASC;"
            ))?;
            let mut rows = stmt.query([carne])?;
            let mut students = Vec::new();
            while let Some(row) = rows.next()? {
                students.push(parse_student_row(row)?);
            }
            students
        };

        if snapshot.is_empty() {
            return Err(RepoError::StudentNotFound(carne.to_string()));
        }

        let mut transitions = Vec::with_capacity(snapshot.len());
        for before in snapshot {
            tx.execute(
                "UPDATE students
                 SET is_active = ?2,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1;",
                params![before.uuid.to_string(), i64::from(active)],
            )?;
            let after = before.with_active(active);
            transitions.push(StudentTransition { before, after });
        }

        tx.commit()?;
        Ok(transitions)
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in students.uuid"))
    })?;

    let is_active = match row.get::<_, i64>("is_active")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_active value `{other}` in students.is_active"
            )));
        }
    };

    Ok(Student {
        uuid,
        name: row.get("name")?,
        surname: row.get("surname")?,
        carne: row.get("carne")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        is_active,
    })
}
