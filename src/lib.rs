//! Replicated Key-Value Store
//!
//! This library crate implements an in-process, replicated key-value
//! store built on consistent hashing: tunable replication, quorum-based
//! write acknowledgement, last-writer-wins conflict resolution, and
//! re-replication after node failure.
//!
//! ## Architecture Modules
//! The system is composed of three loosely coupled subsystems:
//!
//! - **`membership`**: The cluster roster. Tracks which physical nodes
//!   are up and broadcasts join/leave/failure events through the
//!   `MembershipWatcher` seam.
//! - **`ring`**: Deterministic placement. Maps keys and virtual nodes
//!   onto a shared hash space and selects the distinct-node replica set
//!   for any key.
//! - **`storage`**: The coordinator. Implements the replicated map
//!   (`put`/`get`/`delete`) with quorum writes, versioned tombstones,
//!   and failure/join repair passes.

pub mod membership;
pub mod ring;
pub mod storage;
