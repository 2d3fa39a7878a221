//! Audit trail domain model.
//!
//! # Responsibility
//! - Define the append-only text entry recording every registry mutation.
//!
//! # Invariants
//! - Entries are never mutated or deleted after insertion.
//! - `created_at` is assigned by the store, not by the caller.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an audit entry.
pub type AuditEntryId = Uuid;

/// One immutable line of the audit trail ("bitácora").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub uuid: AuditEntryId,
    /// Free-text description of the mutation.
    pub text: String,
    /// Server-assigned creation time in epoch milliseconds.
    pub created_at: i64,
}
