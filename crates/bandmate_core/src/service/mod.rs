//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and pure domain logic into use-case APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod feed_service;
pub mod workflow_service;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in Unix epoch milliseconds.
///
/// Falls back to `0` if the system clock is before the epoch.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
