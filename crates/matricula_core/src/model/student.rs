//! Student domain model.
//!
//! # Responsibility
//! - Define the student record owned by the directory component.
//! - Validate registration input before any persistence happens.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another student.
//! - `carne` is the business lookup key; intended unique, looked up defensively.
//! - `is_active` starts as `false` and only flips through directory operations.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a student record.
pub type StudentId = Uuid;

/// Registration input for a new student.
///
/// All fields are required; `validate()` must pass before the record reaches
/// the repository layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub surname: String,
    /// Institutional identification number ("carné").
    pub carne: String,
    pub email: String,
    pub phone: String,
}

/// Validation failure for student registration input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentValidationError {
    /// A required field is absent or blank.
    MissingField(&'static str),
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "required field `{field}` is missing or empty"),
        }
    }
}

impl Error for StudentValidationError {}

impl NewStudent {
    /// Checks that every required registration field carries a value.
    ///
    /// # Errors
    /// - `MissingField` naming the first absent/blank field.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        require_field("name", &self.name)?;
        require_field("surname", &self.surname)?;
        require_field("carne", &self.carne)?;
        require_field("email", &self.email)?;
        require_field("phone", &self.phone)?;
        Ok(())
    }
}

pub(crate) fn require_field(field: &'static str, value: &str) -> Result<(), StudentValidationError> {
    if value.trim().is_empty() {
        return Err(StudentValidationError::MissingField(field));
    }
    Ok(())
}

/// Canonical student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Stable global ID used for credential back-references and auditing.
    pub uuid: StudentId,
    pub name: String,
    pub surname: String,
    /// Institutional identification number ("carné").
    pub carne: String,
    pub email: String,
    pub phone: String,
    /// Activation state. The only field observed by change triggers.
    pub is_active: bool,
}

impl Student {
    /// Builds the record the directory persists for validated input.
    ///
    /// # Invariants
    /// - New students always start deactivated.
    pub fn registered(uuid: StudentId, input: &NewStudent) -> Self {
        Self {
            uuid,
            name: input.name.clone(),
            surname: input.surname.clone(),
            carne: input.carne.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            is_active: false,
        }
    }

    /// Returns a copy with the activation flag replaced.
    pub fn with_active(&self, is_active: bool) -> Self {
        Self {
            is_active,
            ..self.clone()
        }
    }
}
