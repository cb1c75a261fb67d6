use std::collections::HashSet;

use super::hashring::{HashRing, ring_hash};
use super::vnode::VnodeId;
use crate::membership::types::NodeId;

/// Chooses which virtual nodes hold the replicas of a key.
pub struct ReplicaSelector {
    replication_factor: usize,
}

impl ReplicaSelector {
    /// A factor of zero would make every write vacuous; it is clamped
    /// to one.
    pub fn new(replication_factor: usize) -> Self {
        Self {
            replication_factor: replication_factor.max(1),
        }
    }

    pub fn replication_factor(&self) -> usize {
        self.replication_factor
    }

    /// Majority quorum for the configured factor.
    ///
    /// Derived from the factor, not from however many replicas the ring
    /// can currently supply: a shrunken cluster fails writes instead of
    /// silently lowering durability.
    pub fn quorum(&self) -> usize {
        self.replication_factor / 2 + 1
    }

    /// Walk the ring clockwise from the key's position and keep the
    /// first `replication_factor` virtual nodes on distinct physical
    /// nodes.
    ///
    /// Deterministic for a fixed ring. Capped, never padded: fewer
    /// physical nodes than the factor yields one entry per node, and an
    /// empty ring yields nothing.
    pub fn replicas_for(&self, ring: &HashRing, key: &[u8]) -> Vec<VnodeId> {
        let mut replicas = Vec::with_capacity(self.replication_factor);
        let mut seen: HashSet<NodeId> = HashSet::new();

        for vnode in ring.successors(ring_hash(key)) {
            if !seen.insert(vnode.node.clone()) {
                continue;
            }
            replicas.push(vnode.clone());
            if replicas.len() == self.replication_factor {
                break;
            }
        }

        replicas
    }
}
