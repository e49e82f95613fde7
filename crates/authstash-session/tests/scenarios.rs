//! End-to-end behavior of a session handle against in-memory and on-disk
//! backends.

use std::sync::Arc;

use authstash_codec::RecordValue;
use authstash_session::{
    KeyData, MutationBatch, ObjectStoreConfig, SessionAuthState, SessionConfig, SessionError,
    SignalKeyStore, StorageMode,
};
use authstash_store::{DirObjectClient, InMemoryObjectClient};
use authstash_types::{KeyCategory, SessionId};

const BUCKET: &str = "your-bucket-name";

fn config(mode: StorageMode, root: &std::path::Path) -> SessionConfig {
    SessionConfig::new(
        SessionId::new("testId").unwrap(),
        ObjectStoreConfig {
            access_key_id: "S3_ACCESS_KEY_ID".into(),
            secret_access_key: "S3_SECRET_ACCESS_KEY".into(),
            region: "S3_REGION".into(),
            bucket: BUCKET.into(),
        },
    )
    .with_mode(mode)
    .with_sessions_root(root)
}

fn key(name: &str) -> String {
    format!("{BUCKET}/sessions/testId-{name}.json")
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn fresh_remote_session_writes_one_creds_object() {
    let root = tempfile::tempdir().unwrap();
    let client = Arc::new(InMemoryObjectClient::new());
    let state = SessionAuthState::open(&config(StorageMode::RemoteOnly, root.path()), client.clone())
        .await
        .unwrap();

    assert_eq!(client.keys(BUCKET), vec![key("creds")]);
    assert!(state.credentials().verify_signed_pre_key().is_ok());

    let loaded = state.keys().load(KeyCategory::PreKey, &[]).await;
    assert!(loaded.is_empty());
}

#[tokio::test]
async fn mode_routing_remote_only() {
    let root = tempfile::tempdir().unwrap();
    let client = Arc::new(InMemoryObjectClient::new());
    let state = SessionAuthState::open(&config(StorageMode::RemoteOnly, root.path()), client.clone())
        .await
        .unwrap();

    state
        .keys()
        .save(MutationBatch::new().set(KeyCategory::PreKey, "1", RecordValue::from(vec![1u8])))
        .await
        .unwrap();
    state.persist_credentials().await.unwrap();

    assert!(client.contains(BUCKET, &key("creds")));
    assert!(client.contains(BUCKET, &key("pre-key-1")));
    assert!(!root.path().join("testId").exists());
}

#[tokio::test]
async fn mode_routing_local_fast_path() {
    let root = tempfile::tempdir().unwrap();
    let client = Arc::new(InMemoryObjectClient::new());
    let state =
        SessionAuthState::open(&config(StorageMode::LocalFastPath, root.path()), client.clone())
            .await
            .unwrap();

    state
        .keys()
        .save(MutationBatch::new().set(KeyCategory::PreKey, "1", RecordValue::from(vec![1u8])))
        .await
        .unwrap();
    state.persist_credentials().await.unwrap();

    assert_eq!(client.keys(BUCKET), vec![key("creds")]);
    let text = std::fs::read_to_string(root.path().join("testId/pre-key-1.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json, serde_json::json!({ "type": "Buffer", "data": [1] }));
}

#[tokio::test]
async fn delete_previously_written_id() {
    let root = tempfile::tempdir().unwrap();
    let client = Arc::new(InMemoryObjectClient::new());
    let state = SessionAuthState::open(&config(StorageMode::RemoteOnly, root.path()), client.clone())
        .await
        .unwrap();
    let keys = state.keys();

    keys.save(MutationBatch::new().set(KeyCategory::PreKey, "5", RecordValue::from("k")))
        .await
        .unwrap();
    keys.save(MutationBatch::new().delete(KeyCategory::PreKey, "5"))
        .await
        .unwrap();

    assert_eq!(client.delete_count(), 1);
    let loaded = keys.load(KeyCategory::PreKey, &ids(&["5"])).await;
    assert!(matches!(loaded["5"], Ok(None)));
}

#[tokio::test]
async fn partial_failure_leaves_siblings_written() {
    let root = tempfile::tempdir().unwrap();
    let client = Arc::new(InMemoryObjectClient::new());
    let state = SessionAuthState::open(&config(StorageMode::RemoteOnly, root.path()), client.clone())
        .await
        .unwrap();
    client.fail_key(&key("session-b"));

    let batch = MutationBatch::new()
        .set(KeyCategory::Session, "a", RecordValue::from(1u64))
        .set(KeyCategory::Session, "b", RecordValue::from(2u64))
        .set(KeyCategory::Session, "c", RecordValue::from(3u64))
        .set(KeyCategory::SenderKey, "d", RecordValue::from(4u64));

    match state.keys().save(batch).await {
        Err(SessionError::PartialSave { failures }) => {
            let failed: Vec<&str> = failures.iter().map(|f| f.key.as_str()).collect();
            assert_eq!(failed, vec!["session-b"]);
        }
        other => panic!("unexpected {other:?}"),
    }

    let loaded = state
        .keys()
        .load(KeyCategory::Session, &ids(&["a", "c"]))
        .await;
    assert!(loaded.values().all(|r| matches!(r, Ok(Some(KeyData::Value(_))))));
    assert!(client.contains(BUCKET, &key("sender-key-d")));
}

#[tokio::test]
async fn binary_fields_survive_restart_on_disk() {
    let root = tempfile::tempdir().unwrap();
    let bucket_root = tempfile::tempdir().unwrap();
    let cfg = config(StorageMode::LocalFastPath, root.path());
    let record = RecordValue::object([
        ("record", RecordValue::from((0u8..=255).collect::<Vec<u8>>())),
        ("name", RecordValue::from("session")),
        ("version", RecordValue::from(3u64)),
    ]);

    let creds = {
        let client = Arc::new(DirObjectClient::new(bucket_root.path()));
        let state = SessionAuthState::open(&cfg, client).await.unwrap();
        state
            .keys()
            .save(MutationBatch::new().set(
                KeyCategory::Session,
                "5511999999999:2@s.whatsapp.net",
                record.clone(),
            ))
            .await
            .unwrap();
        state.credentials().clone()
    };

    let client = Arc::new(DirObjectClient::new(bucket_root.path()));
    let state = SessionAuthState::open(&cfg, client).await.unwrap();
    assert_eq!(state.credentials(), &creds);

    let id = "5511999999999:2@s.whatsapp.net".to_string();
    let loaded = state
        .keys()
        .load(KeyCategory::Session, std::slice::from_ref(&id))
        .await;
    match &loaded[&id] {
        Ok(Some(KeyData::Value(v))) => assert_eq!(v, &record),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn reopening_reuses_stored_credentials() {
    let root = tempfile::tempdir().unwrap();
    let client = Arc::new(InMemoryObjectClient::new());
    let cfg = config(StorageMode::RemoteOnly, root.path());

    let first = SessionAuthState::open(&cfg, client.clone()).await.unwrap();
    let second = SessionAuthState::open(&cfg, client.clone()).await.unwrap();

    assert_eq!(client.put_count(), 1);
    assert_eq!(first.credentials(), second.credentials());
}

#[tokio::test]
async fn unreachable_store_fails_open_without_writing() {
    let root = tempfile::tempdir().unwrap();
    let client = Arc::new(InMemoryObjectClient::new());
    client.fail_key(&key("creds"));

    let err = SessionAuthState::open(&config(StorageMode::RemoteOnly, root.path()), client.clone())
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Backend { .. }));
    assert_eq!(client.put_count(), 0);
}
