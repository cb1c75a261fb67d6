//! Distributed Storage Module
//!
//! Implements a replicated in-memory key-value store over the hash ring.
//!
//! ## Core Concepts
//! - **Placement**: every key hashes to a position on the ring; the
//!   replica set is the first `replication_factor` distinct physical
//!   nodes walking clockwise from there.
//! - **Quorum writes**: puts and deletes fan out to the whole replica
//!   set and succeed once a majority acknowledges.
//! - **Last-writer-wins**: a process-wide version counter stamps every
//!   mutation; replicas keep only the highest version they have seen,
//!   and deletes are versioned tombstones so stale puts cannot
//!   resurrect a key.
//! - **Repair**: when a node fails or joins, its slice of the key space
//!   is re-replicated in one bounded pass.

pub mod map;
mod repair;
