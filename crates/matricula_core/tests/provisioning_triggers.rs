use matricula_core::db::open_db_in_memory;
use matricula_core::{
    CredentialProvisioner, CredentialRepository, NewStudent, NotificationComposer,
    NotificationRepository, RepoError, SqliteCredentialRepository, SqliteNotificationRepository,
    SqliteStudentRepository, StudentDirectory, StudentEvent, StudentTriggers, TEMPORARY_PASSWORD,
    WELCOME_SUBJECT,
};
use rusqlite::Connection;

fn registration(carne: &str) -> NewStudent {
    NewStudent {
        name: "Ana".to_string(),
        surname: "Lopez".to_string(),
        carne: carne.to_string(),
        email: "ana@x.edu".to_string(),
        phone: "5551234".to_string(),
    }
}

fn directory(conn: &Connection) -> StudentDirectory<SqliteStudentRepository<'_>> {
    StudentDirectory::new(SqliteStudentRepository::try_new(conn).unwrap())
}

fn triggers(
    conn: &Connection,
) -> StudentTriggers<
    SqliteCredentialRepository<'_>,
    SqliteCredentialRepository<'_>,
    SqliteNotificationRepository<'_>,
> {
    StudentTriggers::new(
        CredentialProvisioner::new(SqliteCredentialRepository::try_new(conn).unwrap()),
        NotificationComposer::new(
            SqliteNotificationRepository::try_new(conn).unwrap(),
            SqliteCredentialRepository::try_new(conn).unwrap(),
        ),
    )
}

fn audit_texts(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT text FROM audit_log ORDER BY rowid ASC;")
        .unwrap();
    let rows = stmt.query_map([], |row| row.get(0)).unwrap();
    rows.map(|row| row.unwrap()).collect()
}

#[test]
fn creation_fans_out_into_credential_welcome_notification_and_audit() {
    let conn = open_db_in_memory().unwrap();
    let directory = directory(&conn);
    let triggers = triggers(&conn);

    let created = directory.create_student(&registration("C001")).unwrap();
    triggers.handle_all(&created.events).unwrap();

    let credentials = SqliteCredentialRepository::try_new(&conn).unwrap();
    let credential = credentials.find_by_student(created.id).unwrap().unwrap();
    assert_eq!(credential.username, "Ana.Lopez");
    assert_eq!(credential.password, TEMPORARY_PASSWORD);

    let notifications = SqliteNotificationRepository::try_new(&conn).unwrap();
    let pending = notifications.list_pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].recipient, "ana@x.edu");
    assert_eq!(pending[0].subject, WELCOME_SUBJECT);
    assert!(pending[0].body.contains("C001"));

    let texts = audit_texts(&conn);
    assert_eq!(texts.len(), 3);
    assert!(texts[0].starts_with("student inserted with ID:"));
    assert!(texts
        .iter()
        .any(|text| text.starts_with("user inserted with ID:")));
    assert!(texts
        .iter()
        .any(|text| text.starts_with("notification inserted with ID:")));
}

#[test]
fn username_collapses_compound_surname() {
    let conn = open_db_in_memory().unwrap();
    let directory = directory(&conn);
    let triggers = triggers(&conn);

    let mut input = registration("C002");
    input.name = "Maria".to_string();
    input.surname = "De La Cruz".to_string();
    let created = directory.create_student(&input).unwrap();
    triggers.handle_all(&created.events).unwrap();

    let credentials = SqliteCredentialRepository::try_new(&conn).unwrap();
    let credential = credentials.find_by_student(created.id).unwrap().unwrap();
    assert_eq!(credential.username, "Maria.DeLaCruz");
}

#[test]
fn redelivered_creation_event_is_rejected_as_duplicate() {
    let conn = open_db_in_memory().unwrap();
    let directory = directory(&conn);
    let triggers = triggers(&conn);

    let created = directory.create_student(&registration("C001")).unwrap();
    triggers.handle_all(&created.events).unwrap();

    let err = triggers.handle_all(&created.events).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateCredential(id) if id == created.id));

    let count: u32 = conn
        .query_row("SELECT COUNT(*) FROM credentials;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn activation_flip_composes_notification_with_username_and_password() {
    let conn = open_db_in_memory().unwrap();
    let directory = directory(&conn);
    let triggers = triggers(&conn);

    let created = directory.create_student(&registration("C001")).unwrap();
    triggers.handle_all(&created.events).unwrap();

    let change = directory.activate("C001").unwrap();
    triggers.handle_all(&change.events).unwrap();

    let notifications = SqliteNotificationRepository::try_new(&conn).unwrap();
    let pending = notifications.list_pending().unwrap();
    assert_eq!(pending.len(), 2);

    let activation = pending
        .iter()
        .find(|notification| notification.subject != WELCOME_SUBJECT)
        .unwrap();
    assert!(activation.body.contains("Ana.Lopez"));
    assert!(activation.body.contains(TEMPORARY_PASSWORD));

    let texts = audit_texts(&conn);
    assert!(texts
        .iter()
        .any(|text| *text == format!("student activated with ID: {}", created.id)));
}

#[test]
fn deactivation_flip_composes_notification_with_username_only() {
    let conn = open_db_in_memory().unwrap();
    let directory = directory(&conn);
    let triggers = triggers(&conn);

    let created = directory.create_student(&registration("C001")).unwrap();
    triggers.handle_all(&created.events).unwrap();
    triggers.handle_all(&directory.activate("C001").unwrap().events).unwrap();
    let change = directory.deactivate("C001").unwrap();
    triggers.handle_all(&change.events).unwrap();

    let notifications = SqliteNotificationRepository::try_new(&conn).unwrap();
    let pending = notifications.list_pending().unwrap();
    let deactivation = pending
        .iter()
        .find(|notification| notification.body.contains("deactivated"))
        .unwrap();
    assert!(deactivation.body.contains("Ana.Lopez"));
    assert!(!deactivation.body.contains(TEMPORARY_PASSWORD));

    let texts = audit_texts(&conn);
    assert!(texts
        .iter()
        .any(|text| *text == format!("student deactivated with ID: {}", created.id)));
}

#[test]
fn unchanged_activation_flag_produces_no_notification() {
    let conn = open_db_in_memory().unwrap();
    let directory = directory(&conn);
    let triggers = triggers(&conn);

    let created = directory.create_student(&registration("C001")).unwrap();
    triggers.handle_all(&created.events).unwrap();
    triggers.handle_all(&directory.activate("C001").unwrap().events).unwrap();

    let notifications = SqliteNotificationRepository::try_new(&conn).unwrap();
    let pending_before = notifications.list_pending().unwrap().len();

    // Activating an already-active student updates the row but composes nothing.
    let repeat = directory.activate("C001").unwrap();
    assert!(matches!(
        &repeat.events[0],
        StudentEvent::Updated { before, after } if before.is_active && after.is_active
    ));
    triggers.handle_all(&repeat.events).unwrap();

    assert_eq!(notifications.list_pending().unwrap().len(), pending_before);
}

#[test]
fn activation_flip_without_credential_is_an_error() {
    let conn = open_db_in_memory().unwrap();
    let directory = directory(&conn);
    let triggers = triggers(&conn);

    // Creation event never delivered, so no credential was provisioned.
    let created = directory.create_student(&registration("C001")).unwrap();
    let change = directory.activate("C001").unwrap();

    let err = triggers.handle_all(&change.events).unwrap_err();
    assert!(matches!(err, RepoError::CredentialMissing(id) if id == created.id));

    let notifications = SqliteNotificationRepository::try_new(&conn).unwrap();
    assert!(notifications.list_pending().unwrap().is_empty());
}
