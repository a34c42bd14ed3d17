//! CLI command implementations.

pub mod domains;
pub mod fetch;
pub mod watch;
