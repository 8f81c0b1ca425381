//! Domain model for feed discovery and project workflow boards.
//!
//! # Responsibility
//! - Define canonical data structures used by ranking and fan-out logic.
//! - Keep wire shapes stable for the mobile UI boundary.
//!
//! # Invariants
//! - Every persisted domain object is identified by a stable `Uuid`.
//! - A task appears only on the boards its `Assignment` targets.

pub mod board;
pub mod profile;
pub mod task;
