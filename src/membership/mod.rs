//! Membership Module
//!
//! Tracks the roster of physical nodes backing the store and pushes
//! topology changes (join, leave, failure) to subscribers.
//!
//! ## Core Mechanisms
//! - **Watcher seam**: the store depends on the `MembershipWatcher` trait,
//!   so any discovery mechanism (static list, gossip, orchestrator) can
//!   drive it.
//! - **Event channel**: changes are broadcast rather than polled; the
//!   store reacts to failures by re-replicating and to joins by handing
//!   shards to the newcomer.

pub mod types;
pub mod watcher;

#[cfg(test)]
mod tests;
