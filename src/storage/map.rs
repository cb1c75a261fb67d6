use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;

use crate::membership::types::{MembershipEvent, NodeId};
use crate::membership::watcher::MembershipWatcher;
use crate::ring::hashring::HashRing;
use crate::ring::selector::ReplicaSelector;
use crate::ring::vnode::{VersionedEntry, VirtualNode, VnodeId};

/// Sizing knobs for the store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Replicas per key, on distinct physical nodes. Majority quorum is
    /// derived from this.
    pub replication_factor: usize,
    /// Shards per physical node; more shards smooth the key
    /// distribution.
    pub vnodes_per_node: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            replication_factor: 3,
            vnodes_per_node: 100,
        }
    }
}

/// Write rejected because fewer than a majority of replicas
/// acknowledged it.
///
/// Replicas that did apply the write keep it; convergence comes from the
/// max-version rule on later reads and writes, not from rollback.
#[derive(Debug, thiserror::Error)]
#[error("quorum not reached: need {needed} acks, got {got}")]
pub struct QuorumError {
    pub needed: usize,
    pub got: usize,
}

/// Ring topology and the write-version counter, guarded together so a
/// version allocation and its replica set are taken atomically.
pub(crate) struct RingState {
    pub(crate) ring: HashRing,
    pub(crate) version_counter: u64,
}

/// Store-wide counters for reporting. Entry counts are per replica, so
/// copies of the same key count once each.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub physical_nodes: usize,
    pub virtual_nodes: usize,
    pub live_entries: usize,
    pub tombstone_entries: usize,
}

/// Coordinator for the replicated key-value store.
///
/// Every operation resolves its replica set through the hash ring, fans
/// out to the owning virtual nodes, and applies last-writer-wins by
/// version. Writes (puts and tombstone-writing deletes) share one quorum
/// path: a fresh process-wide version is allocated under the coordinator
/// lock, and the write succeeds once a majority of the configured
/// replicas acknowledge it.
pub struct ReplicatedMap<K, V> {
    local_node: NodeId,
    pub(crate) state: Mutex<RingState>,
    /// Registry resolving virtual-node identities to their storage.
    pub(crate) vnodes: DashMap<VnodeId, Arc<VirtualNode<K, V>>>,
    pub(crate) selector: ReplicaSelector,
    membership: Arc<dyn MembershipWatcher>,
    pub(crate) vnodes_per_node: u32,
}

impl<K, V> ReplicatedMap<K, V>
where
    K: ToString + Clone + Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Build the ring from the membership snapshot taken now; later
    /// topology changes arrive through [`ReplicatedMap::start`].
    pub fn new(
        local_node: NodeId,
        membership: Arc<dyn MembershipWatcher>,
        config: StoreConfig,
    ) -> Arc<Self> {
        let mut ring = HashRing::new();
        let vnodes = DashMap::new();

        for node in membership.snapshot() {
            for shard in 0..config.vnodes_per_node {
                let id = VnodeId::new(node.clone(), shard);
                if ring.insert(id.clone()) {
                    vnodes.insert(id.clone(), Arc::new(VirtualNode::new(id)));
                }
            }
        }

        let selector = ReplicaSelector::new(config.replication_factor);

        tracing::info!(
            "Store on {} ready: {} virtual nodes over {} physical, replication factor {}",
            local_node,
            ring.len(),
            ring.node_count(),
            selector.replication_factor(),
        );

        Arc::new(Self {
            local_node,
            state: Mutex::new(RingState {
                ring,
                version_counter: 0,
            }),
            vnodes,
            selector,
            membership,
            vnodes_per_node: config.vnodes_per_node,
        })
    }

    pub async fn put(&self, key: K, value: V) -> Result<(), QuorumError> {
        self.write(key, Some(value)).await
    }

    /// Delete by writing a tombstone through the same quorum path, so
    /// the delete is ordered against concurrent puts. Deleting an absent
    /// key succeeds and leaves a tombstone.
    pub async fn delete(&self, key: K) -> Result<(), QuorumError> {
        self.write(key, None).await
    }

    /// Version-stamped quorum write shared by put, delete, and repair.
    ///
    /// Replicas that already hold a newer version ignore the write;
    /// partial writes below quorum are reported, not rolled back.
    pub(crate) async fn write(&self, key: K, value: Option<V>) -> Result<(), QuorumError> {
        let (version, replicas) = {
            let mut state = self.state.lock().await;
            state.version_counter += 1;
            let replicas = self
                .selector
                .replicas_for(&state.ring, key.to_string().as_bytes());
            (state.version_counter, replicas)
        };

        let needed = self.selector.quorum();
        let mut acks = 0usize;

        for id in &replicas {
            let Some(vnode) = self.vnodes.get(id).map(|slot| slot.value().clone()) else {
                continue;
            };
            let entry = VersionedEntry {
                value: value.clone(),
                version,
            };
            if vnode.put(key.clone(), entry) {
                acks += 1;
            } else {
                // a concurrent writer with a newer version landed first
                tracing::debug!("Write at version {} superseded on {}", version, id);
            }
        }

        if acks >= needed {
            Ok(())
        } else {
            tracing::warn!(
                "Write on {} missed quorum: {} of {} acks from {} replicas",
                self.local_node,
                acks,
                needed,
                replicas.len(),
            );
            Err(QuorumError { needed, got: acks })
        }
    }

    /// Read every replica and return the value with the highest version.
    ///
    /// Stale replicas are left as they are; there is no inline read
    /// repair. `None` covers absent keys, tombstones, and an empty ring.
    pub async fn get(&self, key: &K) -> Option<V> {
        self.newest_entry(key).await.and_then(|entry| entry.value)
    }

    /// The max-version entry across the key's replica set, tombstones
    /// included.
    pub(crate) async fn newest_entry(&self, key: &K) -> Option<VersionedEntry<V>> {
        let replicas = {
            let state = self.state.lock().await;
            self.selector
                .replicas_for(&state.ring, key.to_string().as_bytes())
        };

        let mut newest: Option<VersionedEntry<V>> = None;
        for id in &replicas {
            if let Some(vnode) = self.vnodes.get(id)
                && let Some(entry) = vnode.get(key)
                && newest.as_ref().is_none_or(|best| entry.version > best.version)
            {
                newest = Some(entry);
            }
        }

        newest
    }

    /// Spawn the membership-event driver.
    ///
    /// Failures and leaves trigger re-replication of the lost node's
    /// data; joins trigger a replica sync onto the newcomer.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let store = self.clone();
        let mut events = self.membership.events();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(MembershipEvent::Joined(node)) => store.handle_node_join(node).await,
                    Ok(MembershipEvent::Failed(node)) => store.handle_node_failure(&node).await,
                    Ok(MembershipEvent::Left(node)) => store.handle_node_leave(&node).await,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!("Membership event stream lagged, {} missed", missed);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    pub fn stats(&self) -> StoreStats {
        let mut nodes = HashSet::new();
        let mut live = 0usize;
        let mut dead = 0usize;

        for slot in self.vnodes.iter() {
            nodes.insert(slot.key().node.clone());
            let alive = slot.value().live_len();
            live += alive;
            dead += slot.value().len() - alive;
        }

        StoreStats {
            physical_nodes: nodes.len(),
            virtual_nodes: self.vnodes.len(),
            live_entries: live,
            tombstone_entries: dead,
        }
    }

    pub fn local_node(&self) -> &NodeId {
        &self.local_node
    }
}
