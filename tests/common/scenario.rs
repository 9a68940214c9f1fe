//! Shared names for integration tests.
//!
//! Integration tests are compiled as separate crates (one per top-level file in
//! `tests/`). Placing shared constants under `tests/common/` avoids creating an
//! additional integration test binary while still allowing reuse via:
//!
//! ```rust
//! #[path = "common/scenario.rs"]
//! mod scenario;
//! ```

/// Region every scenario resolves in.
pub const REGION: &str = "us-east-1";
/// Physical scaling group name.
pub const GROUP: &str = "autoscaling-group-name";
/// Stack that declares the scaling group.
pub const STACK: &str = "stack-name";
/// Logical id of the scaling group inside [`STACK`].
pub const LOGICAL_ID: &str = "logical-autoscaling-group-name";
/// Members of [`GROUP`].
pub const MEMBERS: [&str; 4] = ["i-1", "i-2", "i-3", "i-4"];
