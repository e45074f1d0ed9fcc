//! Integration test crate for the Queeker feed engine.
//!
//! This crate has no library code. Its tests exercise end-to-end flows
//! across the workspace crates: engine services over an in-memory database,
//! the optimistic client controllers against the engine, and the daemon's
//! JSON-RPC socket.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p queeker-integration-tests
//! ```
