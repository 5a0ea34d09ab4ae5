//! Basic usage example - index a few apps, record launches and search

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use appsearch_core::{AppSearch, InMemoryEnumerator, ItemId, RawItem, Scope};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    // Usage database location from args or a file in the temp dir
    let db_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("appsearch-example.sqlite"));

    let apps = Arc::new(InMemoryEnumerator::with_items([
        RawItem::new(ItemId::new("com.android.email", "com.android.email.Main"), "Email"),
        RawItem::new(ItemId::new("com.android.ebay", "com.android.ebay.Main"), "Ebay"),
        RawItem::new(ItemId::new("com.google.maps", "com.google.maps.Main"), "Google Maps"),
    ]));

    let search = AppSearch::builder(apps.clone())
        .usage_db_path(&db_path)
        .build()
        .await?;
    search.wait_until_idle().await?;
    info!("Indexed {} apps, usage stored in {}", search.index().len(), db_path.display());

    search.record_launch(&ItemId::new("com.android.ebay", "com.android.ebay.Main"));

    for query in ["e", "maps", "nosuchapp"] {
        let results = search.search_ranked(query, &true);
        println!("{:?}:", query);
        for item in results {
            println!("  - {} ({})", item.title, item.uri());
        }
    }

    // A newly installed app shows up after the debounce delay
    apps.insert(RawItem::new(
        ItemId::new("com.android.gallery", "com.android.gallery.Main"),
        "Gallery",
    ));
    search.notify_changed(Scope::namespace("com.android.gallery")?)?;
    search.wait_until_idle().await?;
    let results = search.search("gal");
    let gallery: Vec<&str> = results.iter().map(|i| i.title.as_str()).collect();
    println!("\"gal\": {:?}", gallery);

    search.shutdown().await;
    Ok(())
}
