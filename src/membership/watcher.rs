use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use super::types::{Member, MembershipEvent, NodeId, NodeState};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Source of cluster topology for the store.
///
/// `snapshot` answers "who is up right now" and is polled once when the
/// store builds its ring; everything after that arrives as events, so
/// the store never has to poll again.
pub trait MembershipWatcher: Send + Sync {
    /// Physical nodes currently up.
    fn snapshot(&self) -> Vec<NodeId>;

    /// Subscribe to join/leave/failure notifications.
    fn events(&self) -> broadcast::Receiver<MembershipEvent>;
}

/// In-process membership roster.
///
/// Tracks which physical nodes are up and broadcasts every topology
/// change. All transitions are idempotent: joining a known node,
/// re-failing a failed node, or removing an unknown one is a no-op.
pub struct ClusterMembership {
    members: DashMap<NodeId, Member>,
    events: broadcast::Sender<MembershipEvent>,
}

impl ClusterMembership {
    pub fn new(initial: Vec<NodeId>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let members = DashMap::new();

        for id in initial {
            members.insert(
                id.clone(),
                Member {
                    id,
                    state: NodeState::Up,
                },
            );
        }

        Arc::new(Self { members, events })
    }

    /// Add a node to the roster. Returns false if the id is already
    /// known, failed ids included.
    pub fn join(&self, id: NodeId) -> bool {
        if self.members.contains_key(&id) {
            return false;
        }

        info!("Node {} joining cluster", id);
        self.members.insert(
            id.clone(),
            Member {
                id: id.clone(),
                state: NodeState::Up,
            },
        );
        let _ = self.events.send(MembershipEvent::Joined(id));

        true
    }

    /// Remove a node from the roster entirely.
    pub fn leave(&self, id: &NodeId) -> bool {
        match self.members.remove(id) {
            Some((_, member)) => {
                if member.state == NodeState::Up {
                    info!("Node {} left cluster", id);
                    let _ = self.events.send(MembershipEvent::Left(id.clone()));
                }
                true
            }
            None => false,
        }
    }

    /// Declare a node down. The first declaration wins; repeats and
    /// unknown ids return false without publishing anything.
    pub fn mark_failed(&self, id: &NodeId) -> bool {
        let Some(mut member) = self.members.get_mut(id) else {
            tracing::debug!("Failure reported for unknown node {}", id);
            return false;
        };

        if member.state == NodeState::Failed {
            return false;
        }

        member.state = NodeState::Failed;
        drop(member);

        tracing::warn!("Node {} declared failed", id);
        let _ = self.events.send(MembershipEvent::Failed(id.clone()));

        true
    }

    pub fn alive(&self) -> Vec<NodeId> {
        self.members
            .iter()
            .filter(|entry| entry.value().state == NodeState::Up)
            .map(|entry| entry.value().id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl MembershipWatcher for ClusterMembership {
    fn snapshot(&self) -> Vec<NodeId> {
        self.alive()
    }

    fn events(&self) -> broadcast::Receiver<MembershipEvent> {
        self.events.subscribe()
    }
}
