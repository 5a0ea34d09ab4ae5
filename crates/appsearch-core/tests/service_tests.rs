//! Integration tests for the AppSearch public interface.
//!
//! These tests drive the full stack: enumerator, scheduler, token index,
//! usage store and ranking.

use std::sync::Arc;
use std::time::Duration;

use appsearch_core::{
    AppSearch, AppSearchError, ChangeEvent, EmptyQueryPolicy, InMemoryEnumerator, Item, ItemId,
    RawItem, Scope, ServiceConfig, TaskState, UsageStore,
};
use tempfile::TempDir;
use tokio::sync::mpsc;

fn app(namespace: &str, activity: &str, title: &str) -> RawItem {
    RawItem::new(ItemId::new(namespace, format!("{namespace}.{activity}")), title)
}

fn mail_apps() -> Vec<RawItem> {
    vec![
        app("com.android.email", "Email", "Email"),
        app("com.android.ebay", "Ebay", "Ebay"),
        app("com.android.fakeapp", "Fakeapp", "Fakeapp"),
    ]
}

fn alphabetic_apps() -> Vec<RawItem> {
    ["a", "b", "c", "d"]
        .iter()
        .map(|ns| app(ns, "View", &format!("Alphabetic{}", ns.to_uppercase())))
        .collect()
}

fn titles(items: &[Item]) -> Vec<&str> {
    items.iter().map(|i| i.title.as_str()).collect()
}

/// Build an instance and wait for its initial full rebuild.
async fn create_search(enumerator: Arc<InMemoryEnumerator>, db: Option<&TempDir>) -> AppSearch {
    let mut builder = AppSearch::builder(enumerator);
    if let Some(dir) = db {
        builder = builder.usage_db_path(dir.path().join("usage.sqlite"));
    }
    let search = builder.build().await.unwrap();
    search.wait_until_idle().await.unwrap();
    search
}

#[tokio::test(start_paused = true)]
async fn test_prefix_search_scenario() {
    let search = create_search(Arc::new(InMemoryEnumerator::with_items(mail_apps())), None).await;

    assert_eq!(titles(&search.search("ema")), vec!["Email"]);
    assert_eq!(titles(&search.search("e")), vec!["Ebay", "Email"]);
    assert_eq!(titles(&search.search("E")), vec!["Ebay", "Email"]);
    assert!(search.search("nosuchapp").is_empty());

    search.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_items_get_defaults() {
    let enumerator = Arc::new(InMemoryEnumerator::with_items([
        app("com.example.maps", "Main", "Maps").with_icon("maps_icon"),
        app("com.example.notes", "Main", "  "),
    ]));
    let search = create_search(enumerator, None).await;

    let maps = &search.search("maps")[0];
    assert_eq!(maps.icon, "maps_icon");
    assert_eq!(maps.description, "Application");

    // Blank titles fall back to the item name
    let notes = search
        .refresh(&ItemId::new("com.example.notes", "com.example.notes.Main"))
        .unwrap();
    assert_eq!(notes.title, "com.example.notes.Main");
    assert_eq!(notes.icon, "default_app_icon");

    search.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_usage_ranking_requires_privilege() {
    let temp_dir = TempDir::new().unwrap();
    let search = create_search(
        Arc::new(InMemoryEnumerator::with_items(alphabetic_apps())),
        Some(&temp_dir),
    )
    .await;

    for _ in 0..3 {
        assert!(search.record_launch(&ItemId::new("d", "d.View")));
    }
    assert!(search.record_launch(&ItemId::new("b", "b.View")));

    assert_eq!(
        titles(&search.search_ranked("alphabetic", &true)),
        vec!["AlphabeticD", "AlphabeticB", "AlphabeticA", "AlphabeticC"]
    );
    assert_eq!(
        titles(&search.search_ranked("alphabetic", &false)),
        vec!["AlphabeticA", "AlphabeticB", "AlphabeticC", "AlphabeticD"]
    );
    assert_eq!(
        titles(&search.search("alphabetic")),
        vec!["AlphabeticA", "AlphabeticB", "AlphabeticC", "AlphabeticD"]
    );

    search.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_full_matches_outrank_launch_counts() {
    let temp_dir = TempDir::new().unwrap();
    let enumerator = Arc::new(InMemoryEnumerator::with_items([
        app("com.google.maps", "Main", "Google Maps"),
        app("com.example.maps", "Main", "Maps Lite"),
    ]));
    let search = create_search(enumerator, Some(&temp_dir)).await;

    let google = ItemId::new("com.google.maps", "com.google.maps.Main");
    for _ in 0..10 {
        search.record_launch(&google);
    }

    assert_eq!(
        titles(&search.search_ranked("maps", &true)),
        vec!["Maps Lite", "Google Maps"]
    );
    search.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_launch_counts_survive_restart() {
    let temp_dir = TempDir::new().unwrap();
    let enumerator = Arc::new(InMemoryEnumerator::with_items(alphabetic_apps()));

    let search = create_search(enumerator.clone(), Some(&temp_dir)).await;
    let c = ItemId::new("c", "c.View");
    assert!(search.record_launch_uri(&c.to_uri()));
    search.shutdown().await;
    drop(search);

    let reopened = UsageStore::open(temp_dir.path().join("usage.sqlite")).unwrap();
    assert_eq!(reopened.get_all().get(&c), Some(&1));
    drop(reopened);

    let search = create_search(enumerator, Some(&temp_dir)).await;
    assert_eq!(search.launch_count(&c), Some(1));
    assert_eq!(
        titles(&search.search_ranked("alphabetic", &true))[0],
        "AlphabeticC"
    );
    search.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_launches_of_unknown_items_are_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let search = create_search(
        Arc::new(InMemoryEnumerator::with_items(mail_apps())),
        Some(&temp_dir),
    )
    .await;

    assert!(!search.record_launch(&ItemId::new("com.unknown", "com.unknown.Main")));
    assert!(!search.record_launch_uri("https://example.com/not-an-item"));
    assert!(!search.record_launch_uri(
        "content://applications/whatever/com.android.email/com.android.email.Email"
    ));
    assert_eq!(
        search.launch_count(&ItemId::new("com.android.email", "com.android.email.Email")),
        Some(0)
    );
    assert_eq!(search.launch_count(&ItemId::new("com.unknown", "com.unknown.Main")), None);

    search.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_corrupt_usage_database_degrades() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("usage.sqlite"), vec![0x5a; 4096]).unwrap();

    let search = create_search(
        Arc::new(InMemoryEnumerator::with_items(alphabetic_apps())),
        Some(&temp_dir),
    )
    .await;

    assert!(!search.usage_store().is_available());
    assert!(!search.record_launch(&ItemId::new("a", "a.View")));
    assert_eq!(
        titles(&search.search_ranked("alphabetic", &true)),
        vec!["AlphabeticA", "AlphabeticB", "AlphabeticC", "AlphabeticD"]
    );
    search.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_changes_are_debounced() {
    let enumerator = Arc::new(InMemoryEnumerator::with_items(mail_apps()));
    let search = create_search(enumerator.clone(), None).await;
    let calls_before = enumerator.call_count();

    let scope = Scope::namespace("com.android.fakeapp").unwrap();
    for i in 0..4 {
        enumerator.insert(app("com.android.fakeapp", "Fakeapp", &format!("Fakeapp {i}")));
        search.notify_changed(scope.clone()).unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    assert_eq!(search.scheduler_status().state_of(&scope), TaskState::Pending);

    search.wait_until_idle().await.unwrap();
    assert_eq!(enumerator.call_count(), calls_before + 1);
    assert_eq!(titles(&search.search("fakeapp")), vec!["Fakeapp 3"]);

    search.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_notify_removed_drops_namespace() {
    let enumerator = Arc::new(InMemoryEnumerator::with_items(mail_apps()));
    let search = create_search(enumerator.clone(), None).await;

    enumerator.remove_namespace("com.android.ebay");
    search
        .notify_removed(Scope::namespace("com.android.ebay").unwrap())
        .unwrap();
    search.wait_until_idle().await.unwrap();

    assert_eq!(titles(&search.search("e")), vec!["Email"]);
    assert!(search.refresh_shortcut("com.android.ebay/.Ebay").is_none());
    assert!(search.refresh_shortcut("com.android.email/.Email").is_some());
    assert!(search.refresh_shortcut("no-slash").is_none());

    search.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_change_source_events() {
    let enumerator = Arc::new(InMemoryEnumerator::with_items(mail_apps()));
    let search = create_search(enumerator.clone(), None).await;
    let (tx, rx) = mpsc::channel(16);
    let forwarder = search.attach_change_source(rx);

    enumerator.insert(app("com.android.gallery", "Main", "Gallery"));
    tx.send(ChangeEvent::Added("com.android.gallery".into())).await.unwrap();
    enumerator.remove_namespace("com.android.fakeapp");
    tx.send(ChangeEvent::Removed("com.android.fakeapp".into())).await.unwrap();
    drop(tx);
    forwarder.await.unwrap();

    search.wait_until_idle().await.unwrap();
    assert_eq!(titles(&search.search("gal")), vec!["Gallery"]);
    assert!(search.search("fake").is_empty());

    search.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_empty_query_policies() {
    let enumerator = Arc::new(InMemoryEnumerator::with_items(mail_apps()));

    let search = create_search(enumerator.clone(), None).await;
    assert!(search.search("").is_empty());
    assert!(search.search("   ").is_empty());
    search.shutdown().await;

    let config = ServiceConfig {
        empty_query_policy: EmptyQueryPolicy::Everything,
        ..ServiceConfig::default()
    };
    let search = AppSearch::new(enumerator, config).await.unwrap();
    search.wait_until_idle().await.unwrap();
    assert_eq!(titles(&search.search("")), vec!["Ebay", "Email", "Fakeapp"]);
    search.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_notifications_after_shutdown_are_rejected() {
    let search = create_search(Arc::new(InMemoryEnumerator::with_items(mail_apps())), None).await;
    search.shutdown().await;

    assert!(matches!(
        search.notify_changed(Scope::All),
        Err(AppSearchError::SchedulerStopped)
    ));
    // The last built index keeps answering
    assert_eq!(titles(&search.search("ebay")), vec!["Ebay"]);
    assert!(search.scheduler_status().stopped);
}

#[tokio::test]
async fn test_concurrent_queries_during_rebuilds() {
    let enumerator = Arc::new(InMemoryEnumerator::with_items(alphabetic_apps()));
    let search = Arc::new(
        AppSearch::builder(enumerator.clone())
            .debounce(Duration::from_millis(1))
            .build()
            .await
            .unwrap(),
    );
    search.wait_until_idle().await.unwrap();

    let mut readers = Vec::new();
    for _ in 0..4 {
        let search = search.clone();
        readers.push(tokio::spawn(async move {
            for _ in 0..200 {
                let results = search.search("alphabetic");
                // Either the old or new snapshot, never a mix
                assert!(results.len() == 4 || results.len() == 2, "{}", results.len());
                tokio::task::yield_now().await;
            }
        }));
    }

    for round in 0..10 {
        if round % 2 == 0 {
            enumerator.set_items(alphabetic_apps().into_iter().take(2));
        } else {
            enumerator.set_items(alphabetic_apps());
        }
        search.notify_changed(Scope::All).unwrap();
        search.wait_until_idle().await.unwrap();
    }

    for reader in readers {
        reader.await.unwrap();
    }
    search.shutdown().await;
}
