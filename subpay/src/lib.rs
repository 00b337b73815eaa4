//! In-memory domain store for the SubPay subscription-savings demo.
//!
//! The demo fabricates balances, yields and transactions; nothing here talks
//! to a payment rail or a chain. The crate is split like this:
//!
//! - **[`core`]**: Pure, deterministic logic (reducer, status machine, coverage
//!   arithmetic, query parsing). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config and seed files).
//!
//! [`store`] owns the session state and routes every mutation through the
//! reducer; [`flows`] implements the screen workflows on top of it.

pub mod clock;
pub mod core;
pub mod exit_codes;
pub mod flows;
pub mod io;
pub mod logging;
pub mod state;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod walkthrough;
