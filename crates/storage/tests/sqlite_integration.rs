use storage::repository::{KeyValueStore, Storage};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_set_overwrites_and_get_reads_back() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get("quiz_culture_stats").await.unwrap(), None);

    repo.set("quiz_culture_stats", r#"{"totalAttempts":1}"#)
        .await
        .unwrap();
    repo.set("quiz_culture_stats", r#"{"totalAttempts":2}"#)
        .await
        .unwrap();

    let value = repo.get("quiz_culture_stats").await.unwrap();
    assert_eq!(value.as_deref(), Some(r#"{"totalAttempts":2}"#));
}

#[tokio::test]
async fn migrations_can_run_twice() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn storage_sqlite_exposes_kv_backend() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage.kv.set("quiz_soc_wrong", "[\"Q1\"]").await.unwrap();
    assert_eq!(
        storage.kv.get("quiz_soc_wrong").await.unwrap().as_deref(),
        Some("[\"Q1\"]")
    );
}
