//! Deterministic, pure logic shared by the store, the flows and the server.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod checkout;
pub mod coverage;
pub mod invariants;
pub mod reducer;
pub mod status;
pub mod summary;
pub mod types;
