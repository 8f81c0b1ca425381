//! Project workflow board logic.
//!
//! # Responsibility
//! - Propagate task mutations into every board that should hold the task.
//! - Maintain board add/remove without breaking task membership.
//!
//! # Invariants
//! - Fan-out functions are pure over an in-memory snapshot.

pub mod fanout;
