//! Membership Module Tests
//!
//! Validates the roster data structures and the event channel.
//!
//! ## Test Scopes
//! - **Identifiers**: uniqueness and hashing of node ids.
//! - **Roster Logic**: join/leave/failure transitions and their idempotence.
//! - **Events**: every transition reaches subscribers exactly once.

#[cfg(test)]
mod tests {
    use crate::membership::types::{MembershipEvent, NodeId};
    use crate::membership::watcher::{ClusterMembership, MembershipWatcher};

    fn roster(names: &[&str]) -> Vec<NodeId> {
        names.iter().map(|n| NodeId(n.to_string())).collect()
    }

    // ============================================================
    // NODE ID TESTS
    // ============================================================

    #[test]
    fn test_node_id_is_unique() {
        let id1 = NodeId::new();
        let id2 = NodeId::new();

        assert_ne!(id1, id2, "Each NodeId should be unique");
    }

    #[test]
    fn test_node_id_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(NodeId("node-1".to_string()));
        set.insert(NodeId("node-1".to_string())); // duplicate
        set.insert(NodeId("node-2".to_string()));

        assert_eq!(set.len(), 2, "HashSet should have 2 unique NodeIds");
    }

    #[test]
    fn test_node_id_serialization() {
        let id = NodeId("test-node".to_string());

        let json = serde_json::to_string(&id).expect("Serialization failed");
        let restored: NodeId = serde_json::from_str(&json).expect("Deserialization failed");

        assert_eq!(restored, id);
    }

    // ============================================================
    // ROSTER TESTS
    // ============================================================

    #[test]
    fn test_initial_snapshot() {
        let membership = ClusterMembership::new(roster(&["a", "b", "c"]));

        assert_eq!(membership.len(), 3);
        assert_eq!(membership.snapshot().len(), 3);
    }

    #[test]
    fn test_join_is_idempotent() {
        let membership = ClusterMembership::new(roster(&["a"]));

        assert!(membership.join(NodeId("b".to_string())));
        assert!(!membership.join(NodeId("b".to_string())));
        assert_eq!(membership.len(), 2);
    }

    #[test]
    fn test_mark_failed_removes_from_snapshot() {
        let membership = ClusterMembership::new(roster(&["a", "b"]));
        let b = NodeId("b".to_string());

        assert!(membership.mark_failed(&b));
        assert!(!membership.snapshot().contains(&b));

        // the roster entry stays, so the id cannot be reused
        assert_eq!(membership.len(), 2);
        assert!(!membership.join(b.clone()));
    }

    #[test]
    fn test_mark_failed_is_idempotent() {
        let membership = ClusterMembership::new(roster(&["a", "b"]));
        let b = NodeId("b".to_string());

        assert!(membership.mark_failed(&b));
        assert!(!membership.mark_failed(&b), "second report changes nothing");
        assert!(!membership.mark_failed(&NodeId("ghost".to_string())));
    }

    #[test]
    fn test_leave_removes_the_entry() {
        let membership = ClusterMembership::new(roster(&["a", "b"]));
        let b = NodeId("b".to_string());

        assert!(membership.leave(&b));
        assert_eq!(membership.len(), 1);
        assert!(!membership.leave(&b));
    }

    // ============================================================
    // EVENT TESTS
    // ============================================================

    #[tokio::test]
    async fn test_join_event_reaches_subscribers() {
        let membership = ClusterMembership::new(roster(&["a"]));
        let mut events = membership.events();

        let b = NodeId("b".to_string());
        membership.join(b.clone());

        assert_eq!(events.recv().await.unwrap(), MembershipEvent::Joined(b));
    }

    #[tokio::test]
    async fn test_failure_event_is_published_once() {
        let membership = ClusterMembership::new(roster(&["a", "b"]));
        let mut events = membership.events();

        let b = NodeId("b".to_string());
        membership.mark_failed(&b);
        membership.mark_failed(&b);

        assert_eq!(
            events.recv().await.unwrap(),
            MembershipEvent::Failed(b.clone())
        );
        assert!(
            events.try_recv().is_err(),
            "the repeated report must not publish again"
        );
    }

    #[tokio::test]
    async fn test_leave_event_reaches_subscribers() {
        let membership = ClusterMembership::new(roster(&["a", "b"]));
        let mut events = membership.events();

        let b = NodeId("b".to_string());
        membership.leave(&b);

        assert_eq!(events.recv().await.unwrap(), MembershipEvent::Left(b));
    }
}
