use matricula_core::db::open_db_in_memory;
use matricula_core::{
    NewNotification, NotificationDispatcher, NotificationRepository, RepoError,
    SqliteNotificationRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn message(recipient: &str, subject: &str) -> NewNotification {
    NewNotification {
        recipient: recipient.to_string(),
        subject: subject.to_string(),
        body: "body".to_string(),
    }
}

fn dispatcher(conn: &Connection) -> NotificationDispatcher<SqliteNotificationRepository<'_>> {
    NotificationDispatcher::new(SqliteNotificationRepository::try_new(conn).unwrap())
}

#[test]
fn list_pending_returns_only_undelivered_notifications() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNotificationRepository::try_new(&conn).unwrap();

    let first = repo.insert_pending(&message("a@x.edu", "first")).unwrap();
    let second = repo.insert_pending(&message("b@x.edu", "second")).unwrap();
    repo.mark_sent(first).unwrap();

    let pending = repo.list_pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, second);
    assert_eq!(pending[0].recipient, "b@x.edu");
}

#[test]
fn mark_sent_sets_flag_and_server_timestamp_together() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNotificationRepository::try_new(&conn).unwrap();

    let id = repo.insert_pending(&message("a@x.edu", "subject")).unwrap();

    let created = repo.get(id).unwrap().unwrap();
    assert!(!created.is_sent);
    assert_eq!(created.sent_at, None);

    repo.mark_sent(id).unwrap();

    let sent = repo.get(id).unwrap().unwrap();
    assert!(sent.is_sent);
    let sent_at = sent.sent_at.unwrap();
    assert!(sent_at >= created.created_at);
}

#[test]
fn mark_sent_on_unknown_id_fails_without_state_change() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNotificationRepository::try_new(&conn).unwrap();

    let kept = repo.insert_pending(&message("a@x.edu", "kept")).unwrap();
    let missing = Uuid::new_v4();

    let err = repo.mark_sent(missing).unwrap_err();
    assert!(matches!(err, RepoError::NotificationNotFound(id) if id == missing));

    assert_eq!(repo.list_pending().unwrap().len(), 1);
    assert!(!repo.get(kept).unwrap().unwrap().is_sent);

    let audit: u32 = conn
        .query_row(
            "SELECT COUNT(*) FROM audit_log WHERE text LIKE 'notification sent%';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(audit, 0);
}

#[test]
fn mark_sent_writes_its_audit_entry() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNotificationRepository::try_new(&conn).unwrap();

    let id = repo.insert_pending(&message("a@x.edu", "subject")).unwrap();
    repo.mark_sent(id).unwrap();

    let text: String = conn
        .query_row(
            "SELECT text FROM audit_log WHERE text LIKE 'notification sent%';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(text, format!("notification sent with ID: {id}"));
}

#[test]
fn deliver_pending_marks_only_confirmed_notifications() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNotificationRepository::try_new(&conn).unwrap();
    let dispatcher = dispatcher(&conn);

    repo.insert_pending(&message("ok@x.edu", "deliverable")).unwrap();
    repo.insert_pending(&message("bounce@x.edu", "undeliverable"))
        .unwrap();

    let report = dispatcher
        .deliver_pending(|notification| {
            if notification.recipient == "bounce@x.edu" {
                Err("mailbox unavailable".to_string())
            } else {
                Ok(())
            }
        })
        .unwrap();

    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 1);

    let still_pending = dispatcher.list_pending().unwrap();
    assert_eq!(still_pending.len(), 1);
    assert_eq!(still_pending[0].recipient, "bounce@x.edu");
}

#[test]
fn failed_delivery_can_be_retried_on_next_pass() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNotificationRepository::try_new(&conn).unwrap();
    let dispatcher = dispatcher(&conn);

    repo.insert_pending(&message("flaky@x.edu", "retry me")).unwrap();

    let first = dispatcher
        .deliver_pending(|_| Err("temporary outage".to_string()))
        .unwrap();
    assert_eq!((first.sent, first.failed), (0, 1));

    let second = dispatcher.deliver_pending(|_| Ok(())).unwrap();
    assert_eq!((second.sent, second.failed), (1, 0));
    assert!(dispatcher.list_pending().unwrap().is_empty());
}

#[test]
fn pending_notifications_serialize_for_the_delivery_side() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNotificationRepository::try_new(&conn).unwrap();

    let id = repo.insert_pending(&message("a@x.edu", "subject")).unwrap();
    let pending = repo.list_pending().unwrap();

    let json = serde_json::to_value(&pending).unwrap();
    assert_eq!(json[0]["id"], serde_json::json!(id.to_string()));
    assert_eq!(json[0]["recipient"], serde_json::json!("a@x.edu"));
    assert_eq!(json[0]["subject"], serde_json::json!("subject"));
    assert_eq!(json[0]["body"], serde_json::json!("body"));
}
