use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};

use super::vnode::VnodeId;
use crate::membership::types::NodeId;

/// Ring position for an identifier: the first 16 bytes of a SHA-256
/// digest, big-endian.
///
/// Stable across runs and implementations, which the std hasher is not.
pub fn ring_hash(bytes: &[u8]) -> u128 {
    let digest = Sha256::digest(bytes);
    let mut prefix = [0u8; 16];
    prefix.copy_from_slice(&digest[..16]);
    u128::from_be_bytes(prefix)
}

/// Consistent hash ring mapping positions to virtual nodes.
///
/// Placement only: the ring knows which virtual node covers a position,
/// not the data it holds. Conceptually circular; past the highest
/// position the walk wraps to the lowest.
#[derive(Debug, Default)]
pub struct HashRing {
    positions: BTreeMap<u128, VnodeId>,
}

impl HashRing {
    pub fn new() -> Self {
        HashRing {
            positions: BTreeMap::new(),
        }
    }

    /// Insert a virtual node at its derived position.
    ///
    /// An exact position collision keeps the incumbent and returns false.
    pub fn insert(&mut self, vnode: VnodeId) -> bool {
        let position = vnode.position();
        if self.positions.contains_key(&position) {
            tracing::debug!("Position collision for {}, keeping incumbent", vnode);
            return false;
        }
        self.positions.insert(position, vnode);
        true
    }

    /// Remove every virtual node owned by a physical node, returning
    /// the removed ids.
    pub fn remove_node(&mut self, node: &NodeId) -> Vec<VnodeId> {
        let to_remove: Vec<u128> = self
            .positions
            .iter()
            .filter(|(_, vnode)| &vnode.node == node)
            .map(|(position, _)| *position)
            .collect();

        to_remove
            .into_iter()
            .filter_map(|position| self.positions.remove(&position))
            .collect()
    }

    /// Clockwise walk starting at the first virtual node at or after
    /// `position`, wrapping past the end.
    ///
    /// Lazy and finite: every entry is yielded exactly once, so callers
    /// can take as many as they need without risking an infinite loop on
    /// a small ring.
    pub fn successors(&self, position: u128) -> impl Iterator<Item = &VnodeId> {
        self.positions
            .range(position..)
            .chain(self.positions.range(..position))
            .map(|(_, vnode)| vnode)
    }

    pub fn contains_node(&self, node: &NodeId) -> bool {
        self.positions.values().any(|vnode| &vnode.node == node)
    }

    /// Number of distinct physical nodes on the ring.
    pub fn node_count(&self) -> usize {
        self.positions
            .values()
            .map(|vnode| &vnode.node)
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
