//! Flutter-facing FFI surface for the Bandmate core.

pub mod api;
