use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

use super::hashring::ring_hash;
use crate::membership::types::NodeId;

/// Identity of a virtual node: a physical node plus a shard index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct VnodeId {
    pub node: NodeId,
    pub shard: u32,
}

impl VnodeId {
    pub fn new(node: NodeId, shard: u32) -> Self {
        Self { node, shard }
    }

    /// Ring position derived from the owning node id and the shard index.
    ///
    /// The shard is encoded as raw big-endian bytes, so the position is a
    /// pure function of the identity and nothing ever parses it back.
    pub fn position(&self) -> u128 {
        let mut bytes = Vec::with_capacity(self.node.0.len() + 5);
        bytes.extend_from_slice(self.node.0.as_bytes());
        bytes.push(b'/');
        bytes.extend_from_slice(&self.shard.to_be_bytes());
        ring_hash(&bytes)
    }
}

impl std::fmt::Display for VnodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.node, self.shard)
    }
}

/// A versioned cell.
///
/// `value: None` is a tombstone left behind by a delete. Tombstones stay
/// in the map so a stale put with a lower version cannot resurrect the
/// key on this replica.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedEntry<V> {
    pub value: Option<V>,
    pub version: u64,
}

impl<V> VersionedEntry<V> {
    pub fn live(value: V, version: u64) -> Self {
        Self {
            value: Some(value),
            version,
        }
    }

    pub fn tombstone(version: u64) -> Self {
        Self {
            value: None,
            version,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        self.value.is_none()
    }
}

/// The atomic ownership and storage unit on the ring.
///
/// Owns one slice of the key space as a concurrent map of versioned
/// entries. Exactly one physical node owns a virtual node at a time.
pub struct VirtualNode<K, V> {
    id: VnodeId,
    data: DashMap<K, VersionedEntry<V>>,
}

impl<K, V> VirtualNode<K, V>
where
    K: Clone + Hash + Eq,
    V: Clone,
{
    pub fn new(id: VnodeId) -> Self {
        Self {
            id,
            data: DashMap::new(),
        }
    }

    pub fn id(&self) -> &VnodeId {
        &self.id
    }

    pub fn get(&self, key: &K) -> Option<VersionedEntry<V>> {
        self.data.get(key).map(|entry| entry.value().clone())
    }

    /// Store an entry if its version is strictly newer than what is held.
    ///
    /// Returns false when the write is stale, which is the expected
    /// outcome under concurrent writers, not an error. The stored version
    /// for a key never decreases.
    pub fn put(&self, key: K, entry: VersionedEntry<V>) -> bool {
        match self.data.entry(key) {
            Entry::Occupied(mut slot) => {
                if entry.version > slot.get().version {
                    slot.insert(entry);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }

    /// Snapshot of everything this virtual node holds, tombstones
    /// included.
    pub fn entries(&self) -> Vec<(K, VersionedEntry<V>)> {
        self.data
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Entries that are not tombstones.
    pub fn live_len(&self) -> usize {
        self.data
            .iter()
            .filter(|entry| !entry.value().is_tombstone())
            .count()
    }
}
