use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NodeState {
    Up,
    Failed,
}

/// A single physical node in the roster.
///
/// A node is `Up` until it is declared failed. A failed node keeps its
/// roster entry so its id cannot be reused, but it no longer counts as a
/// replica target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: NodeId,
    pub state: NodeState,
}

/// Topology change notifications pushed to subscribers.
///
/// - `Joined`: a new node entered the roster and should receive shards.
/// - `Left`: a node departed gracefully.
/// - `Failed`: a node was declared down; its shards must be rebuilt from
///   the surviving replicas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MembershipEvent {
    Joined(NodeId),
    Left(NodeId),
    Failed(NodeId),
}
