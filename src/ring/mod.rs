//! Hash Ring Module
//!
//! Deterministic placement of keys across a dynamic set of physical
//! nodes via consistent hashing.
//!
//! ## Core Concepts
//! - **Positions**: keys and virtual nodes share one hash space; a key
//!   belongs to the first virtual node at or after its position.
//! - **Virtual nodes**: each physical node owns many shards scattered
//!   around the ring, so membership changes remap only a small slice of
//!   the key space and load spreads evenly.
//! - **Replica selection**: walking clockwise past the owner yields the
//!   backup replicas, one per distinct physical node.

pub mod hashring;
pub mod selector;
pub mod vnode;
