//! Domain model for the student registry.
//!
//! # Responsibility
//! - Define the canonical records owned by each registry component.
//! - Keep input validation next to the record it protects.
//!
//! # Invariants
//! - Every record is identified by a stable UUID assigned at insert time.
//! - Audit entries are append-only and never reshaped after creation.

pub mod audit;
pub mod credential;
pub mod notification;
pub mod student;
