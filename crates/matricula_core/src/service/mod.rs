//! Registry use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the directory, provisioning,
//!   composition and dispatch workflows.
//! - Keep callers decoupled from storage details behind repository traits.
//!
//! # Invariants
//! - Services never bypass repository validation/transaction contracts.
//! - Trigger handlers behave identically whether invoked synchronously in
//!   tests or by a hosting platform's change feed.

pub mod composer;
pub mod directory;
pub mod dispatcher;
pub mod events;
pub mod provisioner;
pub mod triggers;
