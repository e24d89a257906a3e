//! Command implementations shared between the CLI and tests.

pub mod init;
