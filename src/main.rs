use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use ringkv::membership::types::NodeId;
use ringkv::membership::watcher::ClusterMembership;
use ringkv::storage::map::{ReplicatedMap, StoreConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BookMetadata {
    title: String,
    author: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let mut nodes = 3usize;
    let mut replication = 3usize;
    let mut shards = 100u32;
    let mut keys = 200usize;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--nodes" => {
                nodes = args[i + 1].parse()?;
                i += 2;
            }
            "--replication" => {
                replication = args[i + 1].parse()?;
                i += 2;
            }
            "--shards" => {
                shards = args[i + 1].parse()?;
                i += 2;
            }
            "--keys" => {
                keys = args[i + 1].parse()?;
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    tracing::info!(
        "Starting cluster: {} nodes, replication factor {}, {} shards per node",
        nodes,
        replication,
        shards
    );

    // 1. Membership roster:
    let node_ids: Vec<NodeId> = (0..nodes).map(|_| NodeId::new()).collect();
    let membership = ClusterMembership::new(node_ids.clone());

    // 2. Store, driven by membership events:
    let store = ReplicatedMap::<String, BookMetadata>::new(
        node_ids[0].clone(),
        membership.clone(),
        StoreConfig {
            replication_factor: replication,
            vnodes_per_node: shards,
        },
    );
    let driver = store.start();

    // 3. Stats reporter:
    let stats_store = store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        loop {
            interval.tick().await;
            let stats = stats_store.stats();
            tracing::info!(
                "Cluster stats: {}",
                serde_json::to_string(&stats).unwrap_or_default()
            );
        }
    });

    // 4. Load a workload:
    for n in 0..keys {
        let key = format!("book-{:04}", n);
        let book = BookMetadata {
            title: format!("Title {}", n),
            author: format!("Author {}", n % 17),
        };
        if let Err(err) = store.put(key, book).await {
            tracing::warn!("put failed: {}", err);
        }
    }
    tracing::info!("Loaded {} records", keys);

    // 5. Kill a random node and verify the data survived:
    if node_ids.len() > 1 {
        let victim = node_ids[rand::thread_rng().gen_range(1..node_ids.len())].clone();
        tracing::info!("Failing node {}", victim);
        membership.mark_failed(&victim);

        tokio::time::sleep(Duration::from_millis(500)).await;

        let mut readable = 0usize;
        for n in 0..keys {
            let key = format!("book-{:04}", n);
            if store.get(&key).await.is_some() {
                readable += 1;
            }
        }
        tracing::info!("After failure: {} of {} records readable", readable, keys);
    }

    // 6. Join a fresh node, then delete a record:
    let newcomer = NodeId::new();
    tracing::info!("Joining node {}", newcomer);
    membership.join(newcomer);
    tokio::time::sleep(Duration::from_millis(500)).await;

    store.delete("book-0000".to_string()).await?;
    tracing::info!(
        "book-0000 deleted, get -> {:?}",
        store.get(&"book-0000".to_string()).await
    );

    let stats = store.stats();
    tracing::info!(
        "Final stats: {}",
        serde_json::to_string(&stats).unwrap_or_default()
    );

    driver.abort();
    Ok(())
}
