use chrono::{TimeZone, Utc};
use rewear_waitlist::core::WaitlistStore;
use rewear_waitlist::domain::model::{CanonicalEmail, WaitlistEntry};
use rewear_waitlist::{FileStore, WaitlistError};
use tempfile::TempDir;

fn entry(email: &str, hour: u32) -> WaitlistEntry {
    WaitlistEntry::new(
        CanonicalEmail::parse(email).unwrap(),
        Utc.with_ymd_and_hms(2025, 9, 1, hour, 0, 0).unwrap(),
    )
}

#[tokio::test]
async fn test_entries_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("waitlist.json");

    {
        let store = FileStore::open(&path).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.insert_if_absent(entry("a@b.com", 9)).await.unwrap());
        assert!(store.insert_if_absent(entry("c@d.com", 10)).await.unwrap());
    }

    assert!(path.exists());

    let store = FileStore::open(&path).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 2);

    let stored = store
        .get(&CanonicalEmail::parse("a@b.com").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.created_at, entry("a@b.com", 9).created_at);
}

#[tokio::test]
async fn test_duplicate_after_reopen_keeps_original_timestamp() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("waitlist.json");

    let store = FileStore::open(&path).await.unwrap();
    store.insert_if_absent(entry("a@b.com", 9)).await.unwrap();
    drop(store);

    let store = FileStore::open(&path).await.unwrap();
    assert!(!store.insert_if_absent(entry("a@b.com", 17)).await.unwrap());

    let stored = store
        .get(&CanonicalEmail::parse("A@B.com").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.created_at, entry("a@b.com", 9).created_at);
}

#[tokio::test]
async fn test_file_format_is_email_and_created_at() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("waitlist.json");

    let store = FileStore::open(&path).await.unwrap();
    store.insert_if_absent(entry("x@y.com", 12)).await.unwrap();

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(json[0]["email"], "x@y.com");
    assert_eq!(json[0]["createdAt"], "2025-09-01T12:00:00Z");
}

#[tokio::test]
async fn test_corrupt_file_is_a_storage_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("waitlist.json");
    std::fs::write(&path, b"{ this is not json").unwrap();

    let err = FileStore::open(&path).await.unwrap_err();
    assert!(matches!(err, WaitlistError::StorageError { .. }));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_empty_file_opens_as_empty_list() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("waitlist.json");
    std::fs::write(&path, b"\n").unwrap();

    let store = FileStore::open(&path).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_failed_write_rolls_back_and_retry_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("waitlist.json");

    let store = FileStore::open(&path).await.unwrap();
    assert!(store.insert_if_absent(entry("a@b.com", 9)).await.unwrap());

    // The temp file the store writes through is a directory, so the write fails.
    let blocker = temp_dir.path().join("waitlist.json.tmp");
    std::fs::create_dir(&blocker).unwrap();

    let err = store.insert_if_absent(entry("c@d.com", 10)).await.unwrap_err();
    assert!(matches!(err, WaitlistError::StorageError { .. }));
    assert_eq!(err.user_friendly_message(), "Server error");
    assert_eq!(store.count().await.unwrap(), 1);
    assert!(store
        .get(&CanonicalEmail::parse("c@d.com").unwrap())
        .await
        .unwrap()
        .is_none());

    std::fs::remove_dir(&blocker).unwrap();

    assert!(store.insert_if_absent(entry("c@d.com", 11)).await.unwrap());
    assert_eq!(store.count().await.unwrap(), 2);

    let reopened = FileStore::open(&path).await.unwrap();
    assert_eq!(reopened.count().await.unwrap(), 2);
}
