use std::sync::Arc;

use resiply::persist::{LocalStore, MemoryStore, StorageKey};
use resiply::types::{ChatConfig, Message, RemoteThread, Thread};
use resiply::{merge, ThreadStore, TombstoneSet};

fn thread(id: &str) -> Thread {
    Thread::new(id, format!("thread {id}"))
}

fn ids(threads: &[Thread]) -> Vec<String> {
    threads.iter().map(|t| t.id.clone()).collect()
}

fn remote(id: i64) -> RemoteThread {
    RemoteThread {
        id,
        title: None,
        messages: Vec::new(),
    }
}

fn fixtures() -> Vec<(Vec<Thread>, Vec<Thread>, TombstoneSet)> {
    vec![
        (vec![], vec![], TombstoneSet::new()),
        (vec![thread("2")], vec![thread("srv-1")], TombstoneSet::new()),
        (
            vec![thread("1718000000003"), thread("srv-9"), thread("5")],
            vec![thread("srv-9"), thread("srv-12"), thread("5")],
            ["5"].into_iter().collect(),
        ),
        (
            vec![thread("10"), thread("10"), thread("abc")],
            vec![thread("srv-10"), thread("srv-3")],
            ["srv-3", "missing"].into_iter().collect(),
        ),
    ]
}

#[test]
fn test_merge_is_idempotent() {
    for (local, remote, tombstones) in fixtures() {
        let once = merge(&local, &remote, &tombstones);
        let twice = merge(&once, &remote, &tombstones);
        assert_eq!(once, twice);
    }
}

#[test]
fn test_tombstoned_ids_never_survive() {
    for (local, remote, tombstones) in fixtures() {
        let merged = merge(&local, &remote, &tombstones);
        for id in tombstones.iter() {
            assert!(!ids(&merged).contains(id), "{id} resurrected");
        }
    }
}

#[test]
fn test_merge_has_no_duplicates() {
    for (local, remote, tombstones) in fixtures() {
        let mut merged = ids(&merge(&local, &remote, &tombstones));
        let before = merged.len();
        merged.sort();
        merged.dedup();
        assert_eq!(before, merged.len());
    }
}

#[test]
fn test_local_and_remote_union_sorted_by_numeric_id() {
    let merged = merge(&[thread("2")], &[thread("srv-1")], &TombstoneSet::new());
    assert_eq!(ids(&merged), vec!["2", "srv-1"]);
}

#[test]
fn test_deleted_thread_stays_deleted_after_remote_fetch() {
    let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new().with_entry(
        StorageKey::Threads.as_str(),
        r#"[{"id":"2","title":"오늘 저녁","messages":[]}]"#,
    ));
    let mut threads = ThreadStore::load(Arc::clone(&store), ChatConfig::default());
    assert!(threads.delete_thread("2"));
    assert!(threads.tombstones().contains("2"));

    // A remote list that still carries the local-shaped id.
    let merged = merge(threads.threads(), &[thread("2")], threads.tombstones());
    assert!(!ids(&merged).contains(&"2".to_string()));

    threads.apply_remote(&[remote(1)]);
    assert!(threads.get("2").is_none());
    assert!(threads.get("srv-1").is_some());

    let reloaded = ThreadStore::load(store, ChatConfig::default());
    assert!(reloaded.tombstones().contains("2"));
    assert!(reloaded.get("2").is_none());
}

#[test]
fn test_deleted_remote_thread_is_not_resurrected() {
    let mut threads = ThreadStore::load(Arc::new(MemoryStore::new()), ChatConfig::default());
    threads.apply_remote(&[remote(4), remote(7)]);
    assert!(threads.delete_thread("srv-7"));

    threads.apply_remote(&[remote(4), remote(7)]);
    assert!(threads.get("srv-7").is_none());
    assert!(threads.get("srv-4").is_some());
}

#[test]
fn test_late_remote_history_keeps_local_edits() {
    let mut threads = ThreadStore::load(Arc::new(MemoryStore::new()), ChatConfig::default());
    let created = threads.create_thread();
    threads.append(&created, Message::user("두부 요리 추천"));

    threads.apply_remote(&[remote(3)]);

    let local = threads.get(&created).unwrap();
    assert_eq!(local.title, "두부 요리 추천");
    assert_eq!(local.messages.len(), 2);
    assert!(threads.get("srv-3").is_some());
    assert_eq!(threads.threads()[0].id, created);
}

#[test]
fn test_deleting_active_selects_next_or_creates() {
    let mut threads = ThreadStore::load(Arc::new(MemoryStore::new()), ChatConfig::default());
    let first = threads.active_id().unwrap().to_string();
    let second = threads.create_thread();
    assert_eq!(threads.active_id(), Some(second.as_str()));

    threads.delete_thread(&second);
    assert_eq!(threads.active_id(), Some(first.as_str()));

    threads.delete_thread(&first);
    assert_eq!(threads.threads().len(), 1);
    let fresh = threads.active().unwrap();
    assert_ne!(fresh.id, first);
    assert_eq!(fresh.messages[0].text(), ChatConfig::default().texts.greeting);
}

#[test]
fn test_title_derivation_only_from_first_user_message() {
    let mut threads = ThreadStore::load(Arc::new(MemoryStore::new()), ChatConfig::default());
    let id = threads.active_id().unwrap().to_string();

    threads.append(&id, Message::assistant("먼저 답변"));
    assert_eq!(threads.get(&id).unwrap().title, "새 채팅");

    threads.append(&id, Message::user("일주일치 다이어트 식단을 짜주세요 부탁드립니다"));
    threads.append(&id, Message::user("두번째 메시지"));

    let title = &threads.get(&id).unwrap().title;
    assert_eq!(title.chars().count(), 20);
    assert!(title.starts_with("일주일치 다이어트 식단을"));
}

#[test]
fn test_legacy_ellipsis_titles_are_stripped_on_load() {
    let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new().with_entry(
        StorageKey::Threads.as_str(),
        r#"[{"id":"5","title":"김치찌개 끓이는 법...","messages":[]}, 42, {"bogus":true}]"#,
    ));
    let threads = ThreadStore::load(store, ChatConfig::default());
    assert_eq!(threads.threads().len(), 1);
    assert_eq!(threads.get("5").unwrap().title, "김치찌개 끓이는 법");
}

#[test]
fn test_numeric_tombstones_are_coerced() {
    let store: Arc<dyn LocalStore> = Arc::new(
        MemoryStore::new()
            .with_entry(StorageKey::Tombstones.as_str(), r#"[9, "srv-2", null]"#)
            .with_entry(
                StorageKey::Threads.as_str(),
                r#"[{"id":"9","title":"t","messages":[]},{"id":"8","title":"t","messages":[]}]"#,
            ),
    );
    let threads = ThreadStore::load(store, ChatConfig::default());
    assert!(threads.tombstones().contains("9"));
    assert!(threads.get("9").is_none());
    assert!(threads.get("8").is_some());
}

#[test]
fn test_corrupt_thread_storage_loads_fresh_thread() {
    let store: Arc<dyn LocalStore> =
        Arc::new(MemoryStore::new().with_entry(StorageKey::Threads.as_str(), "{{{"));
    let threads = ThreadStore::load(store, ChatConfig::default());
    assert_eq!(threads.threads().len(), 1);
    assert!(threads.active().is_some());
}
