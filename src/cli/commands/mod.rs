//! CLI command implementations.

pub mod execution;
pub mod init;
pub mod log;
pub mod workflow;
