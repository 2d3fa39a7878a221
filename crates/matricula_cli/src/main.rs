//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `matricula_core` linkage.
//! - Run the full registration workflow once against an in-memory store,
//!   keeping output deterministic for quick local sanity checks.

use matricula_core::db::open_db_in_memory;
use matricula_core::{
    CredentialProvisioner, NewStudent, NotificationComposer, NotificationDispatcher,
    SqliteCredentialRepository, SqliteNotificationRepository, SqliteStudentRepository,
    StudentDirectory, StudentTriggers,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("matricula_core ping={}", matricula_core::ping());
    println!("matricula_core version={}", matricula_core::core_version());

    match run_smoke_flow() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("smoke flow failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_smoke_flow() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db_in_memory()?;

    let directory = StudentDirectory::new(SqliteStudentRepository::try_new(&conn)?);
    let triggers = StudentTriggers::new(
        CredentialProvisioner::new(SqliteCredentialRepository::try_new(&conn)?),
        NotificationComposer::new(
            SqliteNotificationRepository::try_new(&conn)?,
            SqliteCredentialRepository::try_new(&conn)?,
        ),
    );
    let dispatcher = NotificationDispatcher::new(SqliteNotificationRepository::try_new(&conn)?);

    let created = directory.create_student(&NewStudent {
        name: "Ana".to_string(),
        surname: "Lopez".to_string(),
        carne: "C001".to_string(),
        email: "ana@x.edu".to_string(),
        phone: "5551234".to_string(),
    })?;
    triggers.handle_all(&created.events)?;

    let activated = directory.activate("C001")?;
    triggers.handle_all(&activated.events)?;

    let pending = dispatcher.list_pending()?;
    println!("smoke student_id={}", created.id);
    println!("smoke pending_notifications={}", pending.len());

    Ok(())
}
