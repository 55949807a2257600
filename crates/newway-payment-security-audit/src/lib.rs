//! Security invariant tests for the newway-payment provider layer.
//!
//! This crate has no runtime code. The checks live in `tests/` and run with
//! `cargo test --workspace`.
