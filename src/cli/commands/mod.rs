//! Command implementations for the CLI.
//!
//! Each command is implemented in its own module.

pub mod init;
pub mod watch;

pub use init::{run_config, run_init};
pub use watch::run_watch;
