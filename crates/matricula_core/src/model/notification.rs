//! Notification domain model and message composition.
//!
//! # Responsibility
//! - Define the pending/sent notification record.
//! - Compose the three registry message bodies in one place.
//!
//! # Invariants
//! - `sent_at` is `Some` if and only if `is_sent` is `true`.
//! - Notifications are mutated exactly once, by the dispatcher marking them sent.

use crate::model::credential::Credential;
use crate::model::student::Student;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a notification record.
pub type NotificationId = Uuid;

/// Subject line for the welcome message created on student registration.
pub const WELCOME_SUBJECT: &str = "new student registration";
/// Subject line for the account activation message.
pub const ACTIVATED_SUBJECT: &str = "student account activated";
/// Subject line for the account deactivation message.
pub const DEACTIVATED_SUBJECT: &str = "student account deactivated";

/// Composition input for a pending notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl NewNotification {
    /// Welcome message composed when a student record is created.
    ///
    /// Carries the registered data and the call to activate the account.
    pub fn welcome(student: &Student) -> Self {
        let body = format!(
            "Welcome to the university, {name}.\n\
             Registered data:\n\
             - carne: {carne}\n\
             - phone: {phone}\n\
             - email: {email}\n\
             You must activate your account to use the electronic services \
             provided by the university.",
            name = student.name,
            carne = student.carne,
            phone = student.phone,
            email = student.email,
        );
        Self {
            recipient: student.email.clone(),
            subject: WELCOME_SUBJECT.to_string(),
            body,
        }
    }

    /// Message composed on a deactivated-to-active transition.
    ///
    /// Includes both username and temporary password of the account.
    pub fn account_activated(student: &Student, credential: &Credential) -> Self {
        let body = format!(
            "Your account has been activated.\n\
             Account data:\n\
             - username: {username}\n\
             - password: {password}\n\
             Enjoy the electronic services provided by the university.",
            username = credential.username,
            password = credential.password,
        );
        Self {
            recipient: student.email.clone(),
            subject: ACTIVATED_SUBJECT.to_string(),
            body,
        }
    }

    /// Message composed on an active-to-deactivated transition.
    ///
    /// Includes the username only.
    pub fn account_deactivated(student: &Student, credential: &Credential) -> Self {
        let body = format!(
            "Your account has been deactivated.\n\
             Deactivated account:\n\
             - username: {username}\n\
             You must activate your account again to use the electronic \
             services provided by the university.",
            username = credential.username,
        );
        Self {
            recipient: student.email.clone(),
            subject: DEACTIVATED_SUBJECT.to_string(),
            body,
        }
    }
}

/// Persisted notification record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub uuid: NotificationId,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    /// Server-assigned creation time in epoch milliseconds.
    pub created_at: i64,
    pub is_sent: bool,
    /// Server-assigned dispatch time. `Some` exactly when `is_sent`.
    pub sent_at: Option<i64>,
}
