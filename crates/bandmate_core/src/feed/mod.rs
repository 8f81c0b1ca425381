//! Discovery feed scoring and ordering.
//!
//! # Responsibility
//! - Score candidate posts against one musician profile.
//! - Produce a deterministic feed order.
//!
//! # Invariants
//! - Ranking is pure: no I/O and no shared mutable state.

pub mod ranking;
