//! User credential domain model.
//!
//! # Responsibility
//! - Define the credential record provisioned once per student.
//! - Own the username derivation rule shared by provisioning and tests.
//!
//! # Invariants
//! - `student_uuid` is an immutable back-reference to the owning student.
//! - At most one credential exists per student (enforced at insert time).

use crate::model::student::{Student, StudentId};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a credential record.
pub type CredentialId = Uuid;

/// Placeholder password assigned at provisioning time. Students are expected
/// to replace it through the (out-of-scope) account flows.
pub const TEMPORARY_PASSWORD: &str = "temporary-password";

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Derives the login username from a student's name and surname.
///
/// # Contract
/// - Shape is `name.surname` with all whitespace stripped from the surname,
///   so compound surnames collapse into one token.
pub fn derive_username(name: &str, surname: &str) -> String {
    let compact_surname = WHITESPACE_RE.replace_all(surname, "");
    format!("{name}.{compact_surname}")
}

/// Provisioning input for a new credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCredential {
    pub student_uuid: StudentId,
    pub username: String,
    pub password: String,
}

impl NewCredential {
    /// Builds the single credential provisioned for a newly created student.
    pub fn for_student(student: &Student) -> Self {
        Self {
            student_uuid: student.uuid,
            username: derive_username(&student.name, &student.surname),
            password: TEMPORARY_PASSWORD.to_string(),
        }
    }
}

/// Persisted credential record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub uuid: CredentialId,
    /// Owning student. Never repointed after creation.
    pub student_uuid: StudentId,
    pub username: String,
    pub password: String,
}
