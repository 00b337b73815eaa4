//! Stable exit codes for the `subpay` CLI.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed: unreadable config, invalid seed file, or a flow error.
pub const INVALID: i32 = 1;
