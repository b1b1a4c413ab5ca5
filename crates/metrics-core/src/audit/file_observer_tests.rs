use super::*;
use crate::audit::AuditEvent;
use chrono::Utc;

#[tokio::test]
async fn notify_appends_one_json_line_per_event() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.log");
    let observer = FileAuditObserver::new(&path);

    let first = AuditEvent::new(Utc::now(), vec!["a".to_string()], "10.0.0.1");
    let second = AuditEvent::new(Utc::now(), vec!["b".to_string(), "c".to_string()], "10.0.0.2");

    observer.notify(&first).await.unwrap();
    observer.notify(&second).await.unwrap();

    let contents = tokio::fs::read_to_string(&path).await.unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);

    let parsed: AuditEvent = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(parsed.client_ip, "10.0.0.1");
}

#[tokio::test]
async fn notify_creates_file_if_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("audit.log");
    // Intentionally does not pre-create the `nested` directory's file.
    let observer = FileAuditObserver::new(&path);
    let event = AuditEvent::new(Utc::now(), vec!["a".to_string()], "127.0.0.1");

    // tokio::fs::OpenOptions does not create parent directories; this
    // exercises the file-creation path for an already-existing parent.
    tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
    observer.notify(&event).await.unwrap();

    assert!(path.exists());
}
