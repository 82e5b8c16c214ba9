use async_trait::async_trait;
use redacao_core::{
    EssayId, EssayRepository, EssayStore, KeyValueStorage, MemoryStorage, StorageError,
    StorageResult, StoreError, DEFAULT_STORAGE_KEY,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Storage that yields at every read/write so unsynchronized
/// read-modify-write cycles would interleave.
#[derive(Default)]
struct YieldingStorage {
    inner: MemoryStorage,
}

#[async_trait]
impl KeyValueStorage for YieldingStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        tokio::task::yield_now().await;
        let value = self.inner.get(key).await;
        tokio::task::yield_now().await;
        value
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        tokio::task::yield_now().await;
        self.inner.set(key, value).await
    }
}

/// Storage whose writes can be switched to fail.
#[derive(Default)]
struct FlakyStorage {
    inner: MemoryStorage,
    fail_writes: AtomicBool,
}

#[async_trait]
impl KeyValueStorage for FlakyStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "device storage full",
            )));
        }
        self.inner.set(key, value).await
    }
}

#[tokio::test]
async fn empty_storage_lists_as_empty_collection() {
    let store = EssayStore::new(MemoryStorage::new());
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_then_list_roundtrip() {
    let store = EssayStore::new(MemoryStorage::new());
    let created = store.create("Meu tema", "Corpo do texto").await.unwrap();

    let listed = store.list_all().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], created);
    assert_eq!(listed[0].title, "Meu tema");
    assert_eq!(listed[0].body, "Corpo do texto");
    assert!(!created.id.as_str().is_empty());
}

#[tokio::test]
async fn list_keeps_insertion_order_and_reversal_gives_display_order() {
    let store = EssayStore::new(MemoryStorage::new());
    store.create("A", "x").await.unwrap();
    store.create("B", "y").await.unwrap();

    let listed = store.list_all().await.unwrap();
    let titles: Vec<_> = listed.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B"]);

    let display: Vec<_> = listed.iter().rev().map(|r| r.title.as_str()).collect();
    assert_eq!(display, vec!["B", "A"]);
}

#[tokio::test]
async fn update_replaces_in_place_and_keeps_position() {
    let store = EssayStore::new(MemoryStorage::new());
    let first = store.create("A", "x").await.unwrap();
    let second = store.create("B", "y").await.unwrap();
    let third = store.create("C", "z").await.unwrap();

    let updated = store.update(&second.id, "B2", "y2").await.unwrap();
    assert_eq!(updated.id, second.id);
    assert_eq!(updated.title, "B2");

    let listed = store.list_all().await.unwrap();
    let ids: Vec<_> = listed.iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);
    assert_eq!(listed[1].body, "y2");
}

#[tokio::test]
async fn update_missing_id_fails_and_leaves_collection_unchanged() {
    let store = EssayStore::new(MemoryStorage::new());
    store.create("A", "x").await.unwrap();
    let before = store.list_all().await.unwrap();

    let missing = EssayId::parse("nao-existe").unwrap();
    let err = store.update(&missing, "t", "b").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == missing));
    assert_eq!(store.list_all().await.unwrap(), before);
}

#[tokio::test]
async fn delete_removes_only_the_target() {
    let store = EssayStore::new(MemoryStorage::new());
    let keep_a = store.create("A", "x").await.unwrap();
    let target = store.create("R", "r").await.unwrap();
    let keep_b = store.create("B", "y").await.unwrap();

    store.delete(&target.id).await.unwrap();

    let listed = store.list_all().await.unwrap();
    assert_eq!(listed, vec![keep_a, keep_b]);
    assert!(store.get(&target.id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_missing_id_is_idempotent_noop() {
    let store = EssayStore::new(MemoryStorage::new());
    let kept = store.create("A", "x").await.unwrap();
    store.delete(&kept.id).await.unwrap();
    store.delete(&kept.id).await.unwrap();

    let other = store.create("B", "y").await.unwrap();
    store
        .delete(&EssayId::parse("ghost").unwrap())
        .await
        .unwrap();
    assert_eq!(store.list_all().await.unwrap(), vec![other]);
}

#[tokio::test]
async fn mixed_operation_sequence_matches_net_effect() {
    let store = EssayStore::new(MemoryStorage::new());
    let mut expected = Vec::new();

    for round in 0..20 {
        let created = store
            .create(&format!("t{round}"), &format!("b{round}"))
            .await
            .unwrap();
        expected.push(created);

        if round % 3 == 0 {
            let victim = expected.remove(0);
            store.delete(&victim.id).await.unwrap();
        }
        if round % 4 == 1 {
            let last = expected.len() - 1;
            let id = expected[last].id.clone();
            let updated = store.update(&id, "edited", "body").await.unwrap();
            expected[last] = updated;
        }
    }

    assert_eq!(store.list_all().await.unwrap(), expected);
}

#[tokio::test]
async fn ten_thousand_creations_never_share_an_id() {
    let mut all_ids = HashSet::new();
    let storage = Arc::new(MemoryStorage::new());

    for collection in 0..100 {
        let store = EssayStore::with_key(Arc::clone(&storage), format!("redacoes-{collection}"));
        for _ in 0..100 {
            let created = store.create("", "").await.unwrap();
            assert!(all_ids.insert(created.id), "duplicate essay id generated");
        }
        let listed = store.list_all().await.unwrap();
        let unique: HashSet<_> = listed.iter().map(|r| r.id.clone()).collect();
        assert_eq!(unique.len(), 100);
    }

    assert_eq!(all_ids.len(), 10_000);
}

#[tokio::test]
async fn concurrent_creates_without_awaiting_both_land() {
    let store = EssayStore::new(YieldingStorage::default());

    let (first, second) = tokio::join!(store.create("A", "x"), store.create("B", "y"));
    let first = first.unwrap();
    let second = second.unwrap();

    let listed = store.list_all().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.contains(&first));
    assert!(listed.contains(&second));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_mutations_from_many_tasks_are_not_lost() {
    let store = Arc::new(EssayStore::new(YieldingStorage::default()));
    let seeded = store.create("seed", "s").await.unwrap();

    let mut handles = Vec::new();
    for idx in 0..40 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.create(&format!("t{idx}"), "b").await.unwrap()
        }));
    }
    let updater = {
        let store = Arc::clone(&store);
        let id = seeded.id.clone();
        tokio::spawn(async move { store.update(&id, "seed2", "s2").await.unwrap() })
    };

    let mut created = Vec::new();
    for handle in handles {
        created.push(handle.await.unwrap());
    }
    updater.await.unwrap();

    let listed = store.list_all().await.unwrap();
    assert_eq!(listed.len(), 41);
    assert_eq!(listed[0].id, seeded.id);
    assert_eq!(listed[0].title, "seed2");
    for record in created {
        assert!(listed.contains(&record));
    }
}

#[tokio::test]
async fn completed_write_is_visible_to_next_read() {
    let storage = Arc::new(MemoryStorage::new());
    let writer = EssayStore::new(Arc::clone(&storage));
    let reader = EssayStore::new(Arc::clone(&storage));

    let created = writer.create("A", "x").await.unwrap();
    assert_eq!(reader.list_all().await.unwrap(), vec![created]);
}

#[tokio::test]
async fn corrupt_blob_surfaces_read_error_and_is_not_overwritten() {
    let storage = Arc::new(MemoryStorage::with_value(DEFAULT_STORAGE_KEY, "{not json"));
    let store = EssayStore::new(Arc::clone(&storage));

    let err = store.list_all().await.unwrap_err();
    assert!(matches!(err, StoreError::StorageRead { ref key, .. } if key == "redacoes"));

    let err = store.create("A", "x").await.unwrap_err();
    assert!(matches!(err, StoreError::StorageRead { .. }));
    assert_eq!(
        storage.raw(DEFAULT_STORAGE_KEY).await.as_deref(),
        Some("{not json")
    );
}

#[tokio::test]
async fn reset_recovers_from_corrupt_blob() {
    let store = EssayStore::new(MemoryStorage::with_value(DEFAULT_STORAGE_KEY, "[1,2,3]"));
    assert!(store.list_all().await.is_err());

    store.reset().await.unwrap();
    assert!(store.list_all().await.unwrap().is_empty());
    store.create("A", "x").await.unwrap();
    assert_eq!(store.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn legacy_blob_is_readable_and_extendable() {
    let legacy = r#"[{"id":"k3j2h1x9a","titulo":"Antiga","texto":"texto antigo"}]"#;
    let store = EssayStore::new(MemoryStorage::with_value(DEFAULT_STORAGE_KEY, legacy));

    let created = store.create("Nova", "texto novo").await.unwrap();
    let listed = store.list_all().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id.as_str(), "k3j2h1x9a");
    assert_eq!(listed[1], created);

    let legacy_id = EssayId::parse("k3j2h1x9a").unwrap();
    let updated = store.update(&legacy_id, "Editada", "x").await.unwrap();
    assert_eq!(updated.title, "Editada");
}

#[tokio::test]
async fn failed_write_surfaces_error_and_mutation_is_not_applied() {
    let storage = Arc::new(FlakyStorage::default());
    let store = EssayStore::new(Arc::clone(&storage));
    let existing = store.create("A", "x").await.unwrap();

    storage.fail_writes.store(true, Ordering::SeqCst);
    let err = store.create("B", "y").await.unwrap_err();
    assert!(matches!(err, StoreError::StorageWrite(StorageError::Io(_))));
    let err = store.update(&existing.id, "A2", "x2").await.unwrap_err();
    assert!(matches!(err, StoreError::StorageWrite(_)));
    let err = store.delete(&existing.id).await.unwrap_err();
    assert!(matches!(err, StoreError::StorageWrite(_)));

    storage.fail_writes.store(false, Ordering::SeqCst);
    assert_eq!(store.list_all().await.unwrap(), vec![existing]);
}
