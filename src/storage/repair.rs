use std::hash::Hash;
use std::sync::Arc;

use crate::membership::types::NodeId;
use crate::ring::vnode::{VersionedEntry, VirtualNode, VnodeId};

use super::map::ReplicatedMap;

impl<K, V> ReplicatedMap<K, V>
where
    K: ToString + Clone + Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Remove a dead physical node from the ring and restore the
    /// replication factor for the data it held.
    ///
    /// One bounded pass: every surviving entry is re-issued through the
    /// normal quorum write path against the updated ring, which by
    /// construction no longer contains the dead node. Re-puts that miss
    /// quorum are logged and dropped, never retried. Calling this for a
    /// node already off the ring is a no-op.
    pub async fn handle_node_failure(&self, node: &NodeId) {
        let removed = {
            let mut state = self.state.lock().await;
            state.ring.remove_node(node)
        };

        if removed.is_empty() {
            tracing::debug!("Node {} is not on the ring, nothing to repair", node);
            return;
        }

        let mut orphaned: Vec<(K, VersionedEntry<V>)> = Vec::new();
        for id in &removed {
            if let Some((_, vnode)) = self.vnodes.remove(id) {
                orphaned.extend(vnode.entries());
            }
        }

        tracing::info!(
            "Node {} removed from ring ({} virtual nodes), re-replicating {} entries",
            node,
            removed.len(),
            orphaned.len(),
        );

        let mut replaced = 0usize;
        let mut dropped = 0usize;

        for (key, entry) in orphaned {
            // the dead node may have held a stale copy; prefer the
            // freshest surviving version of the key
            let newest = match self.newest_entry(&key).await {
                Some(held) if held.version > entry.version => held,
                _ => entry,
            };

            match self.write(key, newest.value).await {
                Ok(()) => replaced += 1,
                Err(err) => {
                    dropped += 1;
                    tracing::warn!("Re-replication after {} failed: {}", node, err);
                }
            }
        }

        if dropped > 0 {
            tracing::warn!(
                "Repair after {}: {} entries re-placed, {} dropped below quorum",
                node,
                replaced,
                dropped,
            );
        } else {
            tracing::info!("Repair after {}: {} entries re-placed", node, replaced);
        }
    }

    /// A graceful departure repairs the same way a crash does; the
    /// node's data is re-replicated from the surviving copies.
    pub async fn handle_node_leave(&self, node: &NodeId) {
        self.handle_node_failure(node).await;
    }

    /// Add a physical node's shards to the ring and copy onto it every
    /// entry it now owns.
    ///
    /// The sync keeps stored versions: replicas that already hold an
    /// entry ignore the copy, so only the new shards actually store
    /// anything. Copies left on nodes that fell out of a key's replica
    /// set stay where they are; they lose by version on any later read.
    pub async fn handle_node_join(&self, node: NodeId) {
        let existing: Vec<Arc<VirtualNode<K, V>>> = self
            .vnodes
            .iter()
            .map(|slot| slot.value().clone())
            .collect();

        let mut added = 0usize;
        {
            let mut state = self.state.lock().await;
            if state.ring.contains_node(&node) {
                tracing::debug!("Node {} is already on the ring", node);
                return;
            }
            for shard in 0..self.vnodes_per_node {
                let id = VnodeId::new(node.clone(), shard);
                if state.ring.insert(id.clone()) {
                    self.vnodes.insert(id.clone(), Arc::new(VirtualNode::new(id)));
                    added += 1;
                }
            }
        }

        tracing::info!("Node {} joined the ring with {} virtual nodes", node, added);

        let mut synced = 0usize;
        for vnode in existing {
            for (key, entry) in vnode.entries() {
                let replicas = {
                    let state = self.state.lock().await;
                    self.selector
                        .replicas_for(&state.ring, key.to_string().as_bytes())
                };

                // at most one replica can sit on the newcomer
                for id in &replicas {
                    if id.node != node {
                        continue;
                    }
                    if let Some(target) = self.vnodes.get(id).map(|slot| slot.value().clone())
                        && target.put(key.clone(), entry.clone())
                    {
                        synced += 1;
                    }
                }
            }
        }

        tracing::info!("Replica sync onto {}: {} entries copied", node, synced);
    }
}
