//! Student change events consumed by reactive trigger handlers.
//!
//! # Responsibility
//! - Model the store's creation/update change feed as an explicit type,
//!   carrying before/after field values.
//!
//! # Invariants
//! - Events describe committed state; handlers must tolerate replay
//!   (at-least-once delivery by real platforms).

use crate::model::student::Student;

/// One observed change to a student record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentEvent {
    /// A student record was created.
    Created { student: Student },
    /// A student record was updated; carries both snapshots so handlers can
    /// detect which fields actually changed.
    Updated { before: Student, after: Student },
}
